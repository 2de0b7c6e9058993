pub mod config;
pub mod crawler;
pub mod export;
pub mod parser;
pub mod runner;
pub mod utils;

pub use parser::{Document, ExtractionPipeline, Field, NormalizedRow, PipelineOutput, RawRow};
pub use runner::run;
pub use utils::{ScrapeError, ScrapeResult};
