pub mod classifier;
pub mod document;
pub mod header_normalizer;
pub mod table_extractor;
pub mod text_cleaner;

pub use classifier::{Classification, RowClassifier};
pub use document::Document;
pub use header_normalizer::{HeaderNormalizer, HeaderTarget};
pub use table_extractor::{Rows, TableExtractor};
pub use text_cleaner::{NameCell, TextCleaner};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

use crate::config::{CategoryConfig, ExtractConfig, HeaderConfig};
use crate::utils::{ScrapeError, ScrapeResult};

/// 规范字段名。未在映射表中出现的表头原样保留为 `Other`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    CharacterName,
    FileName,
    Rarity,
    Tier,
    Status,
    Value,
    Quantity,
    Category,
    Section,
    Other(String),
}

impl Field {
    pub fn as_str(&self) -> &str {
        match self {
            Field::CharacterName => "Character Name",
            Field::FileName => "File Name",
            Field::Rarity => "Rarity",
            Field::Tier => "Tier",
            Field::Status => "Status",
            Field::Value => "Value",
            Field::Quantity => "Quantity",
            Field::Category => "Category",
            Field::Section => "Section",
            Field::Other(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Character Name" => Field::CharacterName,
            "File Name" => Field::FileName,
            "Rarity" => Field::Rarity,
            "Tier" => Field::Tier,
            "Status" => Field::Status,
            "Value" => Field::Value,
            "Quantity" => Field::Quantity,
            "Category" => Field::Category,
            "Section" => Field::Section,
            other => Field::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 表格中的一行原始数据，按表头顺序保存 (表头, 单元格文本)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub section: String,
    /// 表格在文档中的序号，从 1 开始
    pub table_index: usize,
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// 同名表头取最后一个
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .rev()
            .find(|(header, _)| header == label)
            .map(|(_, text)| text.as_str())
    }
}

/// 清洗后的一行：规范字段 → 文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    fields: BTreeMap<Field, String>,
}

impl NormalizedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &Field) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// 字段存在且非空
    pub fn has(&self, field: &Field) -> bool {
        self.get(field).is_some_and(|v| !v.is_empty())
    }

    /// 合并写入：非空值覆盖旧值，空值只在字段缺失时占位
    pub fn merge(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() && self.fields.contains_key(&field) {
            return;
        }
        self.fields.insert(field, value);
    }

    pub fn insert(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &str)> {
        self.fields.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn section(&self) -> &str {
        self.get(&Field::Section).unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        self.get(&Field::Category).unwrap_or_default()
    }
}

impl Serialize for NormalizedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// 表格不足两行，没有数据行
    EmptyTable,
    /// 单元格数量与表头不一致，整行丢弃
    StructuralMismatch,
    /// 同一表格内出现重复表头
    DuplicateHeader,
}

/// 被跳过的内容及原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub table_index: usize,
    pub section: String,
    pub detail: String,
}

pub type CategorySummary = BTreeMap<String, usize>;

pub fn summarize(rows: &[NormalizedRow]) -> CategorySummary {
    let mut summary = CategorySummary::new();
    for row in rows {
        *summary.entry(row.category().to_string()).or_insert(0) += 1;
    }
    summary
}

/// 一次完整运行的结果
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub rows: Vec<NormalizedRow>,
    pub summary: CategorySummary,
    pub diagnostics: Vec<Diagnostic>,
    /// 提取阶段保留下来的原始行数，应与 `rows.len()` 相同
    pub raw_count: usize,
}

/// 统一提取管道：提取 → 清洗 → 分类
pub struct ExtractionPipeline {
    extractor: TableExtractor,
    cleaner: TextCleaner,
    classifier: RowClassifier,
}

impl ExtractionPipeline {
    pub fn new(
        extract: &ExtractConfig,
        headers: &HeaderConfig,
        categories: &CategoryConfig,
    ) -> ScrapeResult<Self> {
        Ok(Self {
            extractor: TableExtractor::new(extract)?,
            cleaner: TextCleaner::new(HeaderNormalizer::new(headers)),
            classifier: RowClassifier::new(categories)?,
        })
    }

    /// 对整个文档跑一遍，至少要产出一行，否则报 `NoDataExtracted`
    pub fn process(&self, doc: &Document) -> ScrapeResult<PipelineOutput> {
        info!("开始提取管道");

        let mut raw_rows = self.extractor.extract(doc);
        let mut rows = Vec::new();
        let mut raw_count = 0;

        for raw in raw_rows.by_ref() {
            raw_count += 1;
            let cleaned = self.cleaner.clean(&raw);
            rows.push(self.classifier.apply(cleaned));
        }

        let diagnostics = raw_rows.into_diagnostics();
        if !diagnostics.is_empty() {
            info!("跳过 {} 处不合规的表格或行", diagnostics.len());
        }

        if rows.is_empty() {
            warn!("未提取到任何数据，页面结构可能已变化，或表格由脚本动态生成");
            return Err(ScrapeError::NoDataExtracted);
        }

        let summary = summarize(&rows);
        for (category, count) in &summary {
            info!("  {}: {} 行", category, count);
        }
        info!("提取完成，共 {} 行", rows.len());

        Ok(PipelineOutput {
            rows,
            summary,
            diagnostics,
            raw_count,
        })
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self {
            extractor: TableExtractor::default(),
            cleaner: TextCleaner::new(HeaderNormalizer::default()),
            classifier: RowClassifier::default(),
        }
    }
}
