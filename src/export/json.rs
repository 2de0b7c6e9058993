use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::RowSink;
use crate::parser::{CategorySummary, Diagnostic, NormalizedRow, PipelineOutput};

#[derive(Serialize)]
struct JsonExport<'a> {
    generated_at: String,
    total: usize,
    summary: &'a CategorySummary,
    rows: &'a [NormalizedRow],
    skipped: &'a [Diagnostic],
}

pub struct JsonSink;

impl RowSink for JsonSink {
    fn write(&self, output: &PipelineOutput, path: &Path) -> Result<()> {
        let export = JsonExport {
            generated_at: Local::now().to_rfc3339(),
            total: output.rows.len(),
            summary: &output.summary,
            rows: &output.rows,
            skipped: &output.diagnostics,
        };

        let mut w = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut w, &export)?;
        w.flush()?;
        Ok(())
    }
}
