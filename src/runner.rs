use anyhow::Result;
use std::path::PathBuf;

use crate::config::{AppConfig, CategoryConfig, ExportFormat, HeaderConfig};
use crate::export;
use crate::parser::{Document, ExtractionPipeline};

/// 页面源码 → 解析 → 流水线 → 导出。
///
/// 流水线没有产出任何行时直接返回 `ScrapeError::NoDataExtracted`，不会创建输出目录或文件。
pub fn run(
    source: &str,
    app_config: &AppConfig,
    header_config: &HeaderConfig,
    category_config: &CategoryConfig,
    format: ExportFormat,
) -> Result<PathBuf> {
    let document = Document::parse(source)?;
    let pipeline = ExtractionPipeline::new(&app_config.extract, header_config, category_config)?;
    let result = pipeline.process(&document)?;

    export::export(&result, &app_config.export, format, category_config)
}
