use anyhow::Result;
use chrono::Local;
use std::collections::BTreeMap;
use std::path::Path;

use super::{column_order, RowSink};
use crate::parser::{Field, PipelineOutput};

const DEFAULT_ROW_COLOR: &str = "#ffffff";

/// 按分类着色的HTML报告
pub struct HtmlReportSink {
    preferred: Vec<String>,
    colors: BTreeMap<String, String>,
}

impl HtmlReportSink {
    pub fn new(preferred: Vec<String>, colors: BTreeMap<String, String>) -> Self {
        Self { preferred, colors }
    }

    fn color(&self, category: &str) -> &str {
        self.colors
            .get(category)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ROW_COLOR)
    }

    pub fn render(&self, date: &str, output: &PipelineOutput) -> String {
        let mut html = format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Value List - {date}</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f5f5f5; color: #333; line-height: 1.6; }}
.container {{ max-width: 1300px; margin: 0 auto; padding: 20px; }}
header {{ background: linear-gradient(135deg, #1a237e 0%, #283593 100%); color: white; padding: 30px; border-radius: 12px; margin-bottom: 24px; }}
header h1 {{ font-size: 26px; margin-bottom: 8px; }}
header .meta {{ opacity: 0.85; font-size: 14px; }}
.stats {{ display: flex; gap: 12px; margin-bottom: 24px; flex-wrap: wrap; }}
.stat {{ padding: 8px 16px; border-radius: 8px; font-size: 14px; border: 1px solid #ddd; }}
.stat b {{ color: #1a237e; }}
h3 {{ font-size: 17px; color: #283593; margin: 24px 0 12px 0; padding-left: 12px; border-left: 4px solid #5c6bc0; }}
table.data-table {{ width: 100%; border-collapse: collapse; margin-bottom: 12px; font-size: 14px; background: white; }}
table.data-table th {{ background: #e8eaf6; padding: 8px 12px; text-align: left; border: 1px solid #c5cae9; position: sticky; top: 0; }}
table.data-table td {{ padding: 6px 12px; border: 1px solid #e0e0e0; }}
.skipped {{ font-size: 13px; color: #888; }}
</style>
</head>
<body>
<div class="container">
<header>
  <h1>Value List</h1>
  <div class="meta">{date} &nbsp;|&nbsp; {count} rows &nbsp;|&nbsp; {categories} categories</div>
</header>
"#, date = html_escape(date), count = output.rows.len(), categories = output.summary.len());

        // Per-category counts
        html.push_str(r#"<div class="stats">"#);
        for (category, count) in &output.summary {
            html.push_str(&format!(
                r#"<div class="stat" style="background:{color}"><b>{count}</b> {category}</div>"#,
                color = html_escape(self.color(category)),
                count = count,
                category = html_escape(category),
            ));
        }
        html.push_str("</div>\n");

        let columns = column_order(&output.rows, &self.preferred);
        let fields: Vec<Field> = columns.iter().map(|c| Field::from_label(c)).collect();

        html.push_str("<h3>Rows</h3>\n");
        html.push_str(r#"<table class="data-table"><thead><tr>"#);
        for c in &columns {
            html.push_str(&format!("<th>{}</th>", html_escape(c)));
        }
        html.push_str("</tr></thead><tbody>\n");
        for row in &output.rows {
            html.push_str(&format!(
                r#"<tr style="background:{}">"#,
                html_escape(self.color(row.category()))
            ));
            for f in &fields {
                html.push_str(&format!("<td>{}</td>", html_escape(row.get(f).unwrap_or_default())));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody></table>\n");

        if !output.diagnostics.is_empty() {
            html.push_str(&format!(
                r#"<div class="skipped">Skipped {} tables/rows during extraction</div>"#,
                output.diagnostics.len()
            ));
            html.push('\n');
        }

        html.push_str("</div>\n</body>\n</html>");
        html
    }
}

impl RowSink for HtmlReportSink {
    fn write(&self, output: &PipelineOutput, path: &Path) -> Result<()> {
        let date = Local::now().format("%Y-%m-%d %H:%M").to_string();
        std::fs::write(path, self.render(&date, output))?;
        Ok(())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, CategoryConfig};
    use crate::parser::{summarize, NormalizedRow};

    fn output() -> PipelineOutput {
        let mut goku = NormalizedRow::new();
        goku.insert(Field::CharacterName, "Goku <SSJ>");
        goku.insert(Field::Category, "S Tier");
        let mut orb = NormalizedRow::new();
        orb.insert(Field::CharacterName, "Dragon Orb");
        orb.insert(Field::Category, "Uncoloured");
        let rows = vec![goku, orb];
        PipelineOutput {
            summary: summarize(&rows),
            rows,
            diagnostics: Vec::new(),
            raw_count: 2,
        }
    }

    #[test]
    fn rows_are_tinted_by_category() {
        let sink = HtmlReportSink::new(
            AppConfig::default().export.columns,
            CategoryConfig::default().colors,
        );
        let html = sink.render("2026-01-01", &output());

        assert!(html.contains(r#"<tr style="background:#ffd966">"#));
        assert!(html.contains(r#"<tr style="background:#ffffff">"#));
        assert!(html.contains("Goku &lt;SSJ&gt;"));
        assert!(html.contains("2 rows"));
    }
}
