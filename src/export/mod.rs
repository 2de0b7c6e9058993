pub mod csv;
pub mod json;
pub mod report;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{CategoryConfig, ExportConfig, ExportFormat};
use crate::parser::{NormalizedRow, PipelineOutput};

pub use self::csv::CsvSink;
pub use json::JsonSink;
pub use report::HtmlReportSink;

/// 接收最终结果的输出端
pub trait RowSink {
    fn write(&self, output: &PipelineOutput, path: &Path) -> Result<()>;
}

pub fn sink_for(format: ExportFormat, export: &ExportConfig, categories: &CategoryConfig) -> Box<dyn RowSink> {
    match format {
        ExportFormat::Csv => Box::new(CsvSink::new(export.columns.clone())),
        ExportFormat::Json => Box::new(JsonSink),
        ExportFormat::Html => Box::new(HtmlReportSink::new(
            export.columns.clone(),
            categories.colors.clone(),
        )),
    }
}

/// `<output_dir>/<base_name>[_YYYYMMDD_HHMMSS].<ext>`
pub fn output_path(export: &ExportConfig, format: ExportFormat, now: DateTime<Local>) -> PathBuf {
    let stem = if export.versioned {
        format!("{}_{}", export.base_name, now.format("%Y%m%d_%H%M%S"))
    } else {
        export.base_name.clone()
    };
    Path::new(&export.output_dir).join(format!("{}.{}", stem, format.extension()))
}

/// 写出一个导出文件，返回其路径
pub fn export(
    output: &PipelineOutput,
    export: &ExportConfig,
    format: ExportFormat,
    categories: &CategoryConfig,
) -> Result<PathBuf> {
    std::fs::create_dir_all(&export.output_dir)
        .with_context(|| format!("无法创建输出目录 {}", export.output_dir))?;

    let path = output_path(export, format, Local::now());
    sink_for(format, export, categories)
        .write(output, &path)
        .with_context(|| format!("写入 {} 失败", path.display()))?;

    info!("已导出 {} 行 -> {}", output.rows.len(), path.display());
    Ok(path)
}

/// 优先列（仅限数据中出现过的）在前，其余字段按字母序
pub fn column_order(rows: &[NormalizedRow], preferred: &[String]) -> Vec<String> {
    let present: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.iter().map(|(field, _)| field.as_str()))
        .collect();

    let mut columns: Vec<String> = preferred
        .iter()
        .filter(|c| present.contains(c.as_str()))
        .cloned()
        .collect();
    columns.extend(
        present
            .iter()
            .filter(|c| !preferred.iter().any(|p| p.as_str() == **c))
            .map(|c| c.to_string()),
    );
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Field;
    use chrono::TimeZone;

    #[test]
    fn versioned_names_carry_a_timestamp() {
        let mut export = crate::config::AppConfig::default().export;
        export.output_dir = "out".to_string();
        let now = Local.with_ymd_and_hms(2026, 3, 1, 9, 5, 7).unwrap();

        let path = output_path(&export, ExportFormat::Csv, now);
        assert_eq!(path, Path::new("out").join("value_list_20260301_090507.csv"));

        export.versioned = false;
        let path = output_path(&export, ExportFormat::Html, now);
        assert_eq!(path, Path::new("out").join("value_list.html"));
    }

    #[test]
    fn preferred_columns_come_first_then_the_rest_sorted() {
        let mut row = NormalizedRow::new();
        row.insert(Field::Other("Zeta".to_string()), "1");
        row.insert(Field::Other("Alpha".to_string()), "2");
        row.insert(Field::CharacterName, "Goku");
        row.insert(Field::Category, "S Tier");

        let preferred = vec![
            "Category".to_string(),
            "Section".to_string(),
            "Character Name".to_string(),
        ];
        assert_eq!(
            column_order(&[row], &preferred),
            vec!["Category", "Character Name", "Alpha", "Zeta"]
        );
    }
}
