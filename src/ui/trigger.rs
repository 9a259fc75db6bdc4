pub const ANALYZE_CAPTION: &str = "Analyze & Stream";
pub const UPLOADING_CAPTION: &str = "Uploading...";

/// Enabled state of the two user triggers. Keeping both disabled while a
/// run is active is what prevents overlapping runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerSurface {
    pub analyze_enabled: bool,
    pub analyze_caption: &'static str,
    pub replay_enabled: bool,
}

impl Default for TriggerSurface {
    fn default() -> Self {
        Self {
            analyze_enabled: true,
            analyze_caption: ANALYZE_CAPTION,
            replay_enabled: false,
        }
    }
}

impl TriggerSurface {
    pub fn begin_upload(&mut self) {
        self.analyze_enabled = false;
        self.analyze_caption = UPLOADING_CAPTION;
    }

    pub fn upload_failed(&mut self) {
        self.analyze_enabled = true;
        self.analyze_caption = ANALYZE_CAPTION;
    }

    pub fn begin_run(&mut self) {
        self.analyze_enabled = false;
        self.replay_enabled = false;
    }

    pub fn end_run(&mut self) {
        self.analyze_enabled = true;
        self.analyze_caption = ANALYZE_CAPTION;
        self.replay_enabled = true;
    }
}
