use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{column_order, RowSink};
use crate::parser::{Field, NormalizedRow, PipelineOutput};

/// 表头 + 每行一条记录，缺失字段写成空单元格
pub fn write_rows<W: Write>(w: W, rows: &[NormalizedRow], columns: &[String]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(w);
    writer.write_record(columns).context("写入CSV表头失败")?;

    let fields: Vec<Field> = columns.iter().map(|c| Field::from_label(c)).collect();
    for row in rows {
        writer
            .write_record(fields.iter().map(|f| row.get(f).unwrap_or_default()))
            .context("写入CSV行失败")?;
    }

    writer.flush().context("刷新CSV输出失败")?;
    Ok(())
}

pub struct CsvSink {
    preferred: Vec<String>,
}

impl CsvSink {
    pub fn new(preferred: Vec<String>) -> Self {
        Self { preferred }
    }
}

impl RowSink for CsvSink {
    fn write(&self, output: &PipelineOutput, path: &Path) -> Result<()> {
        let columns = column_order(&output.rows, &self.preferred);
        let file = BufWriter::new(File::create(path)?);
        write_rows(file, &output.rows, &columns)
    }
}
