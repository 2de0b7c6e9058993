// tests/pipeline.rs
use std::fs;
use std::path::{Path, PathBuf};

use valuelist::config::{AppConfig, CategoryConfig, ExportFormat, HeaderConfig};
use valuelist::export;
use valuelist::parser::{DiagnosticKind, TableExtractor, TextCleaner};
use valuelist::{run, Document, ExtractionPipeline, Field, ScrapeError};

const VALUE_LIST_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Value List</title></head>
<body>
  <h2><span class="mw-headline" id="Overview">Overview</span><span class="mw-editsection">[edit]</span></h2>
  <p>Values are updated weekly.</p>

  <div class="cfx-tab cfx-tab-content" data-subtab="S Tier">
    <table class="wikitable">
      <tr><th>e</th><th>f</th><th>h</th><th>l</th><th>j</th></tr>
      <tr><td><a href="/wiki/File:Naruto.png">File:Naruto.png</a>NarutoNaruto</td><td></td><td>S</td><td>450</td><td>Stable</td></tr>
      <tr><td>Goku (Secret)</td><td>Mythic</td><td>S</td><td>900</td><td>Rising</td></tr>
      <tr><td colspan="3">Merged note row</td><td>x</td></tr>
    </table>
  </div>

  <div class="cfx-tab cfx-tab-content" data-subtab="Relics">
    <table class="wikitable">
      <tr><th>Name</th><th>Value</th></tr>
      <tr><td>Dragon Orb</td><td>30 (stable)</td></tr>
      <tr><td>Star Fragment</td><td>12</td></tr>
    </table>
  </div>

  <h3>Game Pass</h3>
  <table class="wikitable">
    <tr><th>Name</th><th>Value</th><th>a</th></tr>
  </table>
  <table class="wikitable">
    <tr><th>Name</th><th>Value</th><th>a</th></tr>
    <tr><td>2x Speed Gamepass</td><td>200</td><td>1</td></tr>
  </table>
</body></html>"#;

fn pipeline() -> ExtractionPipeline {
    let app = AppConfig::default();
    ExtractionPipeline::new(&app.extract, &HeaderConfig::default(), &CategoryConfig::default())
        .unwrap()
}

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("valuelist_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

#[test]
fn scenario_a_section_default_category() {
    let doc = Document::parse(
        r#"<h2>S Tier</h2>
           <table><tr><th>Name</th><th>Value</th></tr>
           <tr><td>Goku</td><td>100</td></tr>
           <tr><td>Luffy</td><td>50</td></tr></table>"#,
    )
    .unwrap();

    let out = pipeline().process(&doc).unwrap();
    assert_eq!(out.rows.len(), 2);
    assert!(out.rows.iter().all(|r| r.category() == "S Tier"));
    assert_eq!(out.rows[0].get(&Field::CharacterName), Some("Goku"));
    assert_eq!(out.rows[1].get(&Field::CharacterName), Some("Luffy"));
    assert_eq!(out.rows[0].get(&Field::Value), Some("100"));
    assert_eq!(out.rows[1].get(&Field::Value), Some("50"));
}

#[test]
fn scenario_b_file_token_and_duplicate_collapse() {
    let doc = Document::parse(
        r#"<table><tr><th>e</th></tr><tr><td>File:Naruto.pngNarutoNaruto</td></tr></table>"#,
    )
    .unwrap();

    let out = pipeline().process(&doc).unwrap();
    assert_eq!(out.rows[0].get(&Field::FileName), Some("Naruto"));
    assert_eq!(out.rows[0].get(&Field::CharacterName), Some("Naruto"));
}

#[test]
fn scenario_c_short_rows_are_dropped() {
    let doc = Document::parse(
        r#"<table><tr><th>Name</th><th>Value</th><th>a</th></tr>
           <tr><td>Goku</td><td>100</td><td>1</td></tr>
           <tr><td>Vegeta</td><td>80</td></tr>
           <tr><td>Luffy</td><td>50</td><td>2</td></tr></table>"#,
    )
    .unwrap();

    let out = pipeline().process(&doc).unwrap();
    let names: Vec<_> = out
        .rows
        .iter()
        .filter_map(|r| r.get(&Field::CharacterName))
        .collect();
    assert_eq!(names, vec!["Goku", "Luffy"]);
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].kind, DiagnosticKind::StructuralMismatch);
}

#[test]
fn scenario_d_tier_backfills_rarity_and_overrides_section() {
    let doc = Document::parse(
        r#"<h2>Skins</h2>
           <table><tr><th>Name</th><th>h</th></tr><tr><td>Goku</td><td>S</td></tr></table>"#,
    )
    .unwrap();

    let out = pipeline().process(&doc).unwrap();
    let row = &out.rows[0];
    assert_eq!(row.get(&Field::Rarity), Some("Legendary"));
    assert_eq!(row.category(), "S Tier");
    assert_eq!(row.section(), "Skins");
}

fn settings_writing_to(dir: &Path) -> AppConfig {
    let mut app = AppConfig::default();
    app.export.output_dir = dir.to_string_lossy().to_string();
    app.export.versioned = false;
    app
}

#[test]
fn scenario_e_no_tables_means_no_data_and_no_artifact() {
    let doc = Document::parse("<html><body><p>Nothing to see here.</p></body></html>").unwrap();
    let result = pipeline().process(&doc);
    assert!(matches!(result, Err(ScrapeError::NoDataExtracted)));

    for (name, page) in [
        ("scenario_e_text", "<html><body><p>Nothing to see here.</p></body></html>"),
        ("scenario_e_empty", "<html><head></head><body></body></html>"),
    ] {
        let dir = tmp_dir(name);
        let err = run(
            page,
            &settings_writing_to(&dir),
            &HeaderConfig::default(),
            &CategoryConfig::default(),
            ExportFormat::Csv,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScrapeError>(),
            Some(ScrapeError::NoDataExtracted)
        ));
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0, "{name}");
    }
}

#[test]
fn run_writes_one_artifact_into_the_output_dir() {
    let dir = tmp_dir("run_json");
    let path = run(
        VALUE_LIST_PAGE,
        &settings_writing_to(&dir),
        &HeaderConfig::default(),
        &CategoryConfig::default(),
        ExportFormat::Json,
    )
    .unwrap();

    assert_eq!(path, dir.join("value_list.json"));
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);
}

#[test]
fn full_page_is_sectioned_cleaned_and_classified() {
    let doc = Document::parse(VALUE_LIST_PAGE).unwrap();
    let out = pipeline().process(&doc).unwrap();

    assert_eq!(out.rows.len(), 5);

    let naruto = &out.rows[0];
    assert_eq!(naruto.section(), "S Tier");
    assert_eq!(naruto.get(&Field::FileName), Some("Naruto"));
    assert_eq!(naruto.get(&Field::CharacterName), Some("Naruto"));
    assert_eq!(naruto.get(&Field::Rarity), Some("Legendary"));
    assert_eq!(naruto.get(&Field::Status), Some("Stable"));
    assert_eq!(naruto.category(), "S Tier");

    let goku = &out.rows[1];
    assert_eq!(goku.category(), "Secret Units");
    assert_eq!(goku.get(&Field::Rarity), Some("Mythic"));

    let orb = &out.rows[2];
    assert_eq!(orb.section(), "Relics");
    assert_eq!(orb.category(), "Relics");
    assert_eq!(orb.get(&Field::Status), Some("Stable"));

    assert_eq!(out.rows[3].category(), "Star Units");

    let pass = &out.rows[4];
    assert_eq!(pass.section(), "Game Pass");
    assert_eq!(pass.category(), "Game Pass");
    assert_eq!(pass.get(&Field::Quantity), Some("1"));

    assert_eq!(out.summary.get("S Tier"), Some(&1));
    assert_eq!(out.summary.values().sum::<usize>(), out.rows.len());

    let kinds: Vec<_> = out.diagnostics.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::StructuralMismatch));
    assert!(kinds.contains(&DiagnosticKind::EmptyTable));
}

#[test]
fn retained_rows_match_header_width_and_survive_one_to_one() {
    let doc = Document::parse(VALUE_LIST_PAGE).unwrap();
    let extractor = TableExtractor::new(&AppConfig::default().extract).unwrap();
    let raw: Vec<_> = extractor.extract(&doc).collect();

    let widths = [5, 5, 2, 2, 3];
    assert_eq!(raw.len(), widths.len());
    for (row, width) in raw.iter().zip(widths) {
        assert_eq!(row.len(), width);
    }

    let cleaner = TextCleaner::new(Default::default());
    assert_eq!(raw.iter().map(|r| cleaner.clean(r)).count(), raw.len());

    let out = pipeline().process(&doc).unwrap();
    assert_eq!(out.raw_count, out.rows.len());
    assert_eq!(out.raw_count, raw.len());
}

#[test]
fn every_row_carries_section_and_category() {
    let doc = Document::parse(VALUE_LIST_PAGE).unwrap();
    let out = pipeline().process(&doc).unwrap();
    assert!(out
        .rows
        .iter()
        .all(|r| r.has(&Field::Section) && r.has(&Field::Category)));
}

#[test]
fn export_writes_csv_with_preferred_columns_first() {
    let doc = Document::parse(VALUE_LIST_PAGE).unwrap();
    let out = pipeline().process(&doc).unwrap();

    let dir = tmp_dir("csv_export");
    let mut export_config = AppConfig::default().export;
    export_config.output_dir = dir.to_string_lossy().to_string();
    export_config.versioned = false;

    let path = export::export(&out, &export_config, ExportFormat::Csv, &CategoryConfig::default())
        .unwrap();
    assert!(path.ends_with("value_list.csv"));

    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("Category,Section,Character Name,File Name,Rarity,Tier,Status,Value,Quantity")
    );
    assert_eq!(lines.count(), out.rows.len());
}

#[test]
fn malformed_input_is_rejected_before_extraction() {
    assert!(matches!(
        Document::parse(""),
        Err(ScrapeError::MalformedDocument(_))
    ));
}
