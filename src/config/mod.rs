pub mod categories;
pub mod headers;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::ScrapeResult;

pub use categories::{CategoryConfig, KeywordRule};
pub use headers::HeaderConfig;

pub const CONFIG_DIR: &str = "config";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// 允许信任的标签页/章节名称
    pub sections: Vec<String>,
    /// 祖先容器上标记标签页名称的属性
    pub tab_attributes: Vec<String>,
    pub table_selector: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub output_dir: String,
    pub base_name: String,
    pub format: ExportFormat,
    /// 文件名附加时间戳，避免覆盖上一次的导出
    pub versioned: bool,
    /// 优先输出的列顺序，其余列按字母序排在后面
    pub columns: Vec<String>,
}

impl AppConfig {
    pub fn load() -> ScrapeResult<Self> {
        Self::load_from(Path::new(CONFIG_DIR).join("settings.toml"))
    }

    pub fn load_from(path: impl AsRef<Path>) -> ScrapeResult<Self> {
        load_toml(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ScrapeResult<()> {
        save_toml(self, path)
    }
}

/// 读取TOML配置，文件不存在时使用默认值
pub(crate) fn load_toml<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> ScrapeResult<T> {
    let config_path = path.as_ref();

    if !config_path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(config_path)?;
    Ok(toml::from_str(&content)?)
}

pub(crate) fn save_toml<T: Serialize>(value: &T, path: impl AsRef<Path>) -> ScrapeResult<()> {
    let content = toml::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig {
                url: "https://animeadventures.fandom.com/wiki/Value_List".to_string(),
                user_agent: "Mozilla/5.0".to_string(),
                timeout_secs: 10,
                max_retries: 3,
                retry_delay_ms: 2000,
            },
            extract: ExtractConfig {
                sections: [
                    "Game Pass", "Skins", "Relics", "Stats", "S Tier", "A Tier", "B Tier", "C Tier",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                tab_attributes: vec!["data-subtab".to_string(), "data-tab".to_string()],
                table_selector: "table".to_string(),
            },
            export: ExportConfig {
                output_dir: "output".to_string(),
                base_name: "value_list".to_string(),
                format: ExportFormat::Csv,
                versioned: true,
                columns: [
                    "Category",
                    "Section",
                    "Character Name",
                    "File Name",
                    "Rarity",
                    "Tier",
                    "Status",
                    "Value",
                    "Quantity",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
        }
    }
}
