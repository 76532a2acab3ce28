use thiserror::Error;

/// Fatal conditions that abort a run before any row is written.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no date column found in source headers {headers:?}")]
    MissingDateColumn { headers: Vec<String> },

    #[error("source table has no header row")]
    EmptyInput,
}
