use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;

use super::error::AnalysisError;
use super::result::{parse_response, AnalysisResult};
use super::Analyzer;

/// Summary of the most recent analysis, as served by `GET /latest`.
#[derive(Clone, Debug, Deserialize)]
pub struct LatestSummary {
    #[serde(default = "default_latest_label")]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub confidences: Vec<f64>,
}

fn default_latest_label() -> String {
    crate::emotion::PLACEHOLDER.to_string()
}

#[derive(Debug, Deserialize)]
struct HealthStatus {
    status: String,
}

/// Blocking HTTP client for the analysis backend. Every call is a single
/// attempt; failures go straight back to the caller.
pub struct AnalysisClient {
    base_url: String,
    http: Client,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn latest(&self) -> Result<LatestSummary, AnalysisError> {
        let body = self.get_text("latest")?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn health(&self) -> Result<bool, AnalysisError> {
        let body = self.get_text("health")?;
        let status: HealthStatus = serde_json::from_str(&body)?;
        Ok(status.status == "ok")
    }

    fn get_text(&self, path: &str) -> Result<String, AnalysisError> {
        let resp = self.http.get(self.endpoint(path)).send()?;
        read_success_body(resp)
    }
}

impl Analyzer for AnalysisClient {
    fn analyze(&self, file: &Path) -> Result<AnalysisResult, AnalysisError> {
        if !file.exists() {
            return Err(AnalysisError::InputMissing(file.to_path_buf()));
        }

        let form = multipart::Form::new()
            .file("file", file)
            .map_err(|source| AnalysisError::Io {
                path: file.to_path_buf(),
                source,
            })?;

        log::info!("Uploading {} to {}", file.display(), self.endpoint("analyze"));
        let resp = self.http.post(self.endpoint("analyze")).multipart(form).send()?;
        let body = read_success_body(resp)?;
        let result = parse_response(&body)?;

        log::info!(
            "Analysis received: {} samples, {} frames, {:.1}s",
            result.samples.len(),
            result.frame_count,
            result.duration_secs
        );
        Ok(result)
    }
}

fn read_success_body(resp: reqwest::blocking::Response) -> Result<String, AnalysisError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(AnalysisError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
