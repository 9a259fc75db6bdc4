use std::path::Path;

use super::error::AnalysisError;
use super::result::{parse_response, AnalysisResult};
use super::Analyzer;

/// Plays a response body saved earlier with `--save-json` instead of
/// contacting the backend.
pub struct SavedResult;

impl Analyzer for SavedResult {
    fn analyze(&self, file: &Path) -> Result<AnalysisResult, AnalysisError> {
        if !file.exists() {
            return Err(AnalysisError::InputMissing(file.to_path_buf()));
        }
        let body = std::fs::read_to_string(file).map_err(|source| AnalysisError::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let result = parse_response(&body)?;
        log::info!("Loaded saved analysis from {}", file.display());
        Ok(result)
    }
}

/// Write a result back out in the wire format.
pub fn save_result(result: &AnalysisResult, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let json = serde_json::to_string(&result.to_response())?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_result_plays_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last.json");
        let result = AnalysisResult::new(vec![0.2, -0.4, 0.6, 0.0], 2)
            .with_duration(3.0)
            .with_labels([Some("Happy"), Some("Sad")])
            .with_confidences([Some(0.7), None]);

        save_result(&result, &path).unwrap();
        assert_eq!(SavedResult.analyze(&path).unwrap(), result);
    }

    #[test]
    fn corrupt_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"data\": [1, 2").unwrap();
        assert!(matches!(
            SavedResult.analyze(&path),
            Err(AnalysisError::Malformed(_))
        ));
    }
}
