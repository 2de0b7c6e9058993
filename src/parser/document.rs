use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

use crate::utils::{ScrapeError, ScrapeResult};

static IMAGE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(png|jpe?g|gif|webp|svg)$").unwrap());

// 源码中至少出现一个标签（含 doctype / 注释）才算HTML
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[!/]?[a-zA-Z]").unwrap());

/// 已抓取并解析好的页面，只读
pub struct Document {
    html: Html,
}

impl Document {
    /// 解析HTML源码。只有空白内容或根本不是HTML的文本（如JSON错误响应）视为异常文档，
    /// 没有表格的空页面照常返回，由后续流程报告无数据
    pub fn parse(source: &str) -> ScrapeResult<Self> {
        if source.trim().is_empty() {
            return Err(ScrapeError::MalformedDocument("页面内容为空".to_string()));
        }

        if !TAG_RE.is_match(source) {
            return Err(ScrapeError::MalformedDocument(
                "内容中没有任何HTML标签".to_string(),
            ));
        }

        Ok(Self {
            html: Html::parse_document(source),
        })
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn count_matching(&self, selector: &Selector) -> usize {
        self.html.select(selector).count()
    }
}

/// 不参与文本提取的元素：脚本、样式、编辑链接、脚注
fn is_hidden(el: ElementRef<'_>) -> bool {
    let value = el.value();
    match value.name() {
        "script" | "style" | "noscript" => true,
        "sup" => value.classes().any(|c| c == "reference"),
        _ => value.classes().any(|c| c == "mw-editsection"),
    }
}

/// 元素内可见文本。每段文本去掉首尾空白后直接拼接，段内连续空白压成一个空格
pub fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in el.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != el.id())
            .filter_map(ElementRef::wrap)
            .any(is_hidden);
        if hidden {
            continue;
        }

        let piece = text.split_whitespace().collect::<Vec<_>>().join(" ");
        out.push_str(&piece);
    }

    out
}

/// 单元格里只有图片时，用图片的说明文字或文件名代替
pub fn image_label(cell: ElementRef<'_>) -> Option<String> {
    let img = cell
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "img")?;

    if let Some(alt) = img.value().attr("alt").map(str::trim) {
        if !alt.is_empty() {
            return Some(alt.to_string());
        }
    }

    // Lazy-loaded images keep a placeholder data URI in `src`
    let src = match img.value().attr("src") {
        Some(src) if !src.starts_with("data:") => Some(src),
        _ => img.value().attr("data-src"),
    }?;

    filename_from_src(src)
}

/// 从图片地址推出文件名，优先取带图片扩展名的路径段
pub fn filename_from_src(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    segments
        .iter()
        .rev()
        .find(|s| IMAGE_EXT_RE.is_match(s))
        .or(segments.last())
        .map(|s| s.replace("%20", " "))
}
