use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum EbdError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("unknown phylogenetic metric: {0}")]
    UnknownPhylogeneticMetric(String),

    #[error("the provided table is empty")]
    EmptyInput,

    #[error("invalid abundance table: {0}")]
    InvalidTable(String),

    #[error("invalid newick tree: {0}")]
    InvalidNewick(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("{tool} exited with status {status}: {stderr}")]
    ExternalTool {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("failed to parse engine output: {0}")]
    OutputParse(String),

    #[error("invalid distance matrix: {0}")]
    InvalidMatrix(String),

    #[error("sample orderings differ across distance matrices")]
    SampleOrderMismatch,

    #[error("invalid distance matrix artifact {path}: {message}")]
    Artifact { path: PathBuf, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("ordination failed: {0}")]
    Ordination(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
