use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scraper::Selector;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use valuelist::config::{AppConfig, CategoryConfig, ExportFormat, HeaderConfig, CONFIG_DIR};
use valuelist::crawler::WikiFetcher;
use valuelist::parser::Document;
use valuelist::runner;
use valuelist::utils::logger;

#[derive(Parser)]
#[command(name = "valuelist")]
#[command(about = "抓取 Wiki 价值表并导出为 CSV / JSON / HTML", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 生成默认配置文件
    Init,
    /// 抓取页面并导出表格数据
    Scrape {
        /// 页面地址，默认使用 settings.toml 中的 url
        #[arg(short, long)]
        url: Option<String>,
        /// 读取本地保存的HTML，不发起网络请求
        #[arg(short, long, conflicts_with = "url")]
        input: Option<PathBuf>,
        /// 导出格式: csv / json / html
        #[arg(short, long)]
        format: Option<String>,
        /// 输出目录
        #[arg(short, long)]
        output: Option<String>,
    },
    /// 检查页面能否直接抓取
    Probe {
        #[arg(short, long)]
        url: Option<String>,
        /// 把页面源码保存到该文件
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logger();
    info!("valuelist 启动");

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_command()?;
        }
        Commands::Scrape {
            url,
            input,
            format,
            output,
        } => {
            scrape_command(url, input, format, output).await?;
        }
        Commands::Probe { url, save } => {
            probe_command(url, save).await?;
        }
    }

    Ok(())
}

fn init_command() -> Result<()> {
    info!("初始化配置...");

    let config_dir = Path::new(CONFIG_DIR);
    std::fs::create_dir_all(config_dir)?;

    let app_config = AppConfig::default();
    std::fs::create_dir_all(&app_config.export.output_dir)?;

    app_config.save(config_dir.join("settings.toml"))?;
    info!("已生成配置文件: config/settings.toml");

    HeaderConfig::default().save(config_dir.join("headers.toml"))?;
    info!("已生成表头映射: config/headers.toml");

    CategoryConfig::default().save(config_dir.join("categories.toml"))?;
    info!("已生成分类规则: config/categories.toml");

    info!("✅ 初始化完成！运行 'valuelist scrape' 开始抓取");
    Ok(())
}

fn parse_format(format: &str) -> Result<ExportFormat> {
    match format.to_ascii_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        "html" => Ok(ExportFormat::Html),
        other => Err(anyhow::anyhow!("不支持的导出格式: {}", other)),
    }
}

async fn scrape_command(
    url: Option<String>,
    input: Option<PathBuf>,
    format: Option<String>,
    output: Option<String>,
) -> Result<()> {
    let mut app_config = AppConfig::load()?;
    let header_config = HeaderConfig::load()?;
    let category_config = CategoryConfig::load()?;

    if let Some(dir) = output {
        app_config.export.output_dir = dir;
    }
    let format = match format {
        Some(f) => parse_format(&f)?,
        None => app_config.export.format,
    };

    let source = match input {
        Some(path) => {
            info!("读取本地页面: {}", path.display());
            std::fs::read_to_string(&path)
                .with_context(|| format!("无法读取 {}", path.display()))?
        }
        None => {
            let url = url.unwrap_or_else(|| app_config.fetch.url.clone());
            let fetcher = WikiFetcher::new(&app_config.fetch)?;
            let page = fetcher.fetch(&url).await?;
            if page.needs_javascript() {
                warn!("页面提示需要 JavaScript，表格可能由脚本动态生成");
            }
            page.body
        }
    };

    let path = runner::run(&source, &app_config, &header_config, &category_config, format)?;
    info!("✅ 导出完成: {}", path.display());
    Ok(())
}

async fn probe_command(url: Option<String>, save: Option<PathBuf>) -> Result<()> {
    let app_config = AppConfig::load()?;
    let url = url.unwrap_or_else(|| app_config.fetch.url.clone());

    let fetcher = WikiFetcher::new(&app_config.fetch)?;
    let page = fetcher.probe(&url).await?;
    info!("状态码: {}", page.status);
    info!("内容长度: {} 字节", page.body.len());

    match Document::parse(&page.body) {
        Ok(document) => {
            let selector = Selector::parse(&app_config.extract.table_selector)
                .map_err(|_| anyhow::anyhow!("CSS选择器无效: {}", app_config.extract.table_selector))?;
            info!("找到 {} 个表格", document.count_matching(&selector));
        }
        Err(e) => warn!("页面无法解析: {}", e),
    }

    if let Some(path) = save {
        std::fs::write(&path, &page.body)?;
        info!("页面已保存: {}", path.display());
    }

    if page.needs_javascript() {
        warn!("页面提示需要 JavaScript 才能显示内容");
    }

    Ok(())
}
