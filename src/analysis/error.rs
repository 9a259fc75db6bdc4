use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no input file selected")]
    NoInput,

    #[error("input file not found: {}", .0.display())]
    InputMissing(PathBuf),

    #[error("request to analysis backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("analysis backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// Input errors are caught before anything is sent and leave the
    /// analyze trigger untouched.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AnalysisError::NoInput | AnalysisError::InputMissing(_))
    }
}
