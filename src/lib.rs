pub mod config;
pub mod error;
pub mod output;
pub mod process;
pub mod report;
pub mod schema;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use process::{run_pipeline, PipelineOutput, PipelineStats, RawTable};
pub use schema::{CleanedRecord, OutputRow, StagingRecord};
