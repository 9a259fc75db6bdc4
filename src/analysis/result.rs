use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_SECS: f64 = 12.0;

/// Response body of `POST /analyze`, exactly as it travels on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub data: Vec<f32>,
    pub frames: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_len: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
    #[serde(default)]
    pub labels: Vec<Option<String>>,
    #[serde(default)]
    pub confidences: Vec<Option<f64>>,
}

/// A finished emotion analysis, ready to be played back.
///
/// Never mutated after construction; playback only reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub samples: Vec<f32>,
    /// Zero when the backend reported no usable frames.
    pub frame_count: usize,
    pub frame_length: usize,
    pub duration_secs: f64,
    pub labels: Vec<Option<String>>,
    pub confidences: Vec<Option<f64>>,
}

impl AnalysisResult {
    pub fn new(samples: Vec<f32>, frame_count: usize) -> Self {
        let frame_length = default_frame_length(samples.len(), frame_count);
        Self {
            samples,
            frame_count,
            frame_length,
            duration_secs: DEFAULT_DURATION_SECS,
            labels: Vec::new(),
            confidences: Vec::new(),
        }
    }

    pub fn with_frame_length(mut self, frame_length: usize) -> Self {
        self.frame_length = frame_length.max(1);
        self
    }

    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        if duration_secs > 0.0 {
            self.duration_secs = duration_secs;
        }
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.labels = labels
            .into_iter()
            .map(|l| l.map(Into::into).filter(|s: &String| !s.is_empty()))
            .collect();
        self
    }

    /// Zero and NaN confidences count as missing, like empty labels.
    pub fn with_confidences<I>(mut self, confidences: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        self.confidences = confidences
            .into_iter()
            .map(|c| c.filter(|&v| v != 0.0 && !v.is_nan()))
            .collect();
        self
    }

    /// A run over this result would produce at least one frame.
    pub fn is_playable(&self) -> bool {
        self.frame_count >= 1 && !self.samples.is_empty()
    }

    pub fn label(&self, frame: usize) -> Option<&str> {
        self.labels.get(frame).and_then(|l| l.as_deref())
    }

    pub fn confidence(&self, frame: usize) -> Option<f64> {
        self.confidences.get(frame).copied().flatten()
    }

    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            data: self.samples.clone(),
            frames: self.frame_count as i64,
            frame_len: Some(self.frame_length as i64),
            duration_sec: Some(self.duration_secs),
            labels: self.labels.clone(),
            confidences: self.confidences.clone(),
        }
    }
}

impl From<AnalysisResponse> for AnalysisResult {
    fn from(resp: AnalysisResponse) -> Self {
        let frame_count = usize::try_from(resp.frames).unwrap_or(0);
        let mut result = AnalysisResult::new(resp.data, frame_count)
            .with_labels(resp.labels)
            .with_confidences(resp.confidences);
        if let Some(len) = resp.frame_len.filter(|&l| l > 0) {
            result = result.with_frame_length(len as usize);
        }
        if let Some(secs) = resp.duration_sec {
            result = result.with_duration(secs);
        }
        result
    }
}

/// `ceil(samples / frames)`, never below one.
pub fn default_frame_length(samples: usize, frames: usize) -> usize {
    if frames == 0 {
        return 1;
    }
    samples.div_ceil(frames).max(1)
}

/// Parse a response body; bodies missing `data` or `frames` are rejected.
pub fn parse_response(body: &str) -> Result<AnalysisResult, serde_json::Error> {
    let resp: AnalysisResponse = serde_json::from_str(body)?;
    Ok(resp.into())
}
