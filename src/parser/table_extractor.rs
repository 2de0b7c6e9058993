use scraper::{ElementRef, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::document::{image_label, visible_text};
use super::text_cleaner::strip_markup;
use super::{Diagnostic, DiagnosticKind, Document, RawRow};
use crate::config::ExtractConfig;
use crate::utils::{ScrapeError, ScrapeResult};

/// 文档中定位到的一个表格及其所属章节
struct TableRegion<'a> {
    index: usize,
    section: String,
    element: ElementRef<'a>,
}

struct CurrentTable<'a> {
    index: usize,
    section: String,
    headers: Vec<String>,
    rows: std::vec::IntoIter<ElementRef<'a>>,
    row_number: usize,
}

pub struct TableExtractor {
    table_selector: Selector,
    sections: Vec<String>,
    tab_attributes: Vec<String>,
}

impl TableExtractor {
    pub fn new(config: &ExtractConfig) -> ScrapeResult<Self> {
        let table_selector = Selector::parse(&config.table_selector)
            .map_err(|_| ScrapeError::Selector(config.table_selector.clone()))?;

        Ok(Self {
            table_selector,
            sections: config.sections.clone(),
            tab_attributes: config.tab_attributes.clone(),
        })
    }

    /// 按文档顺序逐行产出表格数据，表格本身在调用时一次定位完
    pub fn extract<'a>(&self, doc: &'a Document) -> Rows<'a> {
        let tables = self.locate(doc);
        info!("定位到 {} 个表格", tables.len());

        Rows {
            tables: tables.into_iter(),
            current: None,
            diagnostics: Vec::new(),
        }
    }

    fn locate<'a>(&self, doc: &'a Document) -> Vec<TableRegion<'a>> {
        let mut tables = Vec::new();
        let mut last_heading: Option<String> = None;

        for node in doc.root().descendants() {
            let Some(el) = ElementRef::wrap(node) else {
                continue;
            };

            if is_heading(el) {
                let label = self.heading_label(el);
                if !label.is_empty() {
                    last_heading = Some(label);
                }
                continue;
            }

            if !self.table_selector.matches(&el) {
                continue;
            }

            let index = tables.len() + 1;
            let section = self
                .tab_label(el)
                .or_else(|| last_heading.clone())
                .unwrap_or_else(|| format!("Table {}", index));

            debug!("表格 {} 归属章节: {}", index, section);
            tables.push(TableRegion {
                index,
                section,
                element: el,
            });
        }

        tables
    }

    /// 祖先容器上的标签页标记，只信任白名单内的名称
    fn tab_label(&self, table: ElementRef<'_>) -> Option<String> {
        table
            .ancestors()
            .filter_map(ElementRef::wrap)
            .flat_map(|a| {
                self.tab_attributes
                    .iter()
                    .filter_map(move |attr| a.value().attr(attr))
            })
            .map(str::trim)
            .find(|name| self.sections.iter().any(|s| s.as_str() == *name))
            .map(str::to_string)
    }

    /// 标题文本；若标题带有白名单章节的锚点 id（空格写作下划线），以锚点为准
    fn heading_label(&self, heading: ElementRef<'_>) -> String {
        let anchor = heading
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter_map(|el| el.value().id())
            .find_map(|id| {
                let name = id.replace('_', " ");
                self.sections.iter().find(|s| **s == name).cloned()
            });

        anchor.unwrap_or_else(|| strip_markup(&visible_text(heading)))
    }
}

impl Default for TableExtractor {
    fn default() -> Self {
        Self {
            table_selector: Selector::parse("table").unwrap(),
            sections: Vec::new(),
            tab_attributes: vec!["data-subtab".to_string(), "data-tab".to_string()],
        }
    }
}

fn is_heading(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// 只属于本表格的行，嵌套表格的行不算
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .filter(|tr| {
            tr.ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name() == "table")
                .is_some_and(|t| t.id() == table.id())
        })
        .collect()
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .map(|cell| {
            let text = visible_text(cell);
            if text.is_empty() {
                image_label(cell).unwrap_or_default()
            } else {
                text
            }
        })
        .collect()
}

fn header_labels(row: ElementRef<'_>) -> Vec<String> {
    cell_texts(row)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if text.is_empty() {
                format!("Column{}", i + 1)
            } else {
                text
            }
        })
        .collect()
}

/// 表格行迭代器，跳过的表格和行记录在 `diagnostics` 中
pub struct Rows<'a> {
    tables: std::vec::IntoIter<TableRegion<'a>>,
    current: Option<CurrentTable<'a>>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Rows<'a> {
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn open(&mut self, table: TableRegion<'a>) -> Option<CurrentTable<'a>> {
        let rows = own_rows(table.element);
        if rows.len() < 2 {
            debug!("表格 {} ({}) 没有数据行，跳过", table.index, table.section);
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::EmptyTable,
                table_index: table.index,
                section: table.section,
                detail: format!("仅有 {} 行", rows.len()),
            });
            return None;
        }

        let mut rows = rows.into_iter();
        let headers = rows.next().map(header_labels).unwrap_or_default();

        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = headers
            .iter()
            .filter(|h| !seen.insert(h.as_str()))
            .map(String::as_str)
            .collect();
        if !duplicates.is_empty() {
            warn!(
                "表格 {} ({}) 存在重复表头 {:?}，同名列取最后一个非空值",
                table.index, table.section, duplicates
            );
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::DuplicateHeader,
                table_index: table.index,
                section: table.section.clone(),
                detail: duplicates.join(", "),
            });
        }

        Some(CurrentTable {
            index: table.index,
            section: table.section,
            headers,
            rows,
            row_number: 1,
        })
    }
}

impl Iterator for Rows<'_> {
    type Item = RawRow;

    fn next(&mut self) -> Option<RawRow> {
        loop {
            if let Some(current) = self.current.as_mut() {
                for tr in current.rows.by_ref() {
                    current.row_number += 1;
                    let cells = cell_texts(tr);

                    // Merged or split cells are dropped, never reconstructed
                    if cells.len() != current.headers.len() {
                        debug!(
                            "表格 {} 第 {} 行有 {} 个单元格，表头 {} 列，丢弃",
                            current.index,
                            current.row_number,
                            cells.len(),
                            current.headers.len()
                        );
                        self.diagnostics.push(Diagnostic {
                            kind: DiagnosticKind::StructuralMismatch,
                            table_index: current.index,
                            section: current.section.clone(),
                            detail: format!(
                                "第 {} 行: {} 个单元格 / {} 列表头",
                                current.row_number,
                                cells.len(),
                                current.headers.len()
                            ),
                        });
                        continue;
                    }

                    return Some(RawRow {
                        section: current.section.clone(),
                        table_index: current.index,
                        cells: current.headers.iter().cloned().zip(cells).collect(),
                    });
                }
                self.current = None;
            }

            let table = self.tables.next()?;
            self.current = self.open(table);
        }
    }
}
