pub mod client;
pub mod error;
pub mod result;
pub mod saved;

use std::path::Path;

use error::AnalysisError;
use result::AnalysisResult;

/// Anything that can turn an input file into an analysis result.
pub trait Analyzer {
    fn analyze(&self, file: &Path) -> Result<AnalysisResult, AnalysisError>;
}
