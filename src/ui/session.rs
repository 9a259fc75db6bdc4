use std::path::Path;
use std::sync::Arc;

use super::trigger::TriggerSurface;
use crate::analysis::error::AnalysisError;
use crate::analysis::result::AnalysisResult;
use crate::analysis::Analyzer;
use crate::playback::player::Player;
use crate::playback::scheduler::RunOutcome;
use crate::playback::Stage;

/// User-visible notice for any failed upload.
pub const UPLOAD_FAILED: &str = "Upload failed";

/// Ties the analyzer, the player and the trigger surface together.
pub struct Session<A: Analyzer> {
    analyzer: A,
    player: Player,
    triggers: TriggerSurface,
}

impl<A: Analyzer> Session<A> {
    pub fn new(analyzer: A, player: Player) -> Self {
        Self {
            analyzer,
            player,
            triggers: TriggerSurface::default(),
        }
    }

    pub fn triggers(&self) -> &TriggerSurface {
        &self.triggers
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Upload `file` and cache the result, without playing it yet.
    ///
    /// Without a file nothing is sent and the analyze trigger stays
    /// enabled. A failed request re-enables it; nothing is cached.
    pub fn analyze(&mut self, file: Option<&Path>) -> Result<Arc<AnalysisResult>, AnalysisError> {
        let file = file.ok_or(AnalysisError::NoInput)?;

        self.triggers.begin_upload();
        match self.analyzer.analyze(file) {
            Ok(result) => Ok(self.player.load(result)),
            Err(err) => {
                self.triggers.upload_failed();
                Err(err)
            }
        }
    }

    /// Play the freshly analyzed result. Both triggers stay disabled
    /// until the run has drained.
    pub fn stream(&mut self, stage: &mut Stage<'_>) -> RunOutcome {
        self.triggers.begin_run();
        let outcome = self.player.replay(stage);
        self.triggers.end_run();
        outcome
    }

    pub fn analyze_and_stream(
        &mut self,
        file: Option<&Path>,
        stage: &mut Stage<'_>,
    ) -> Result<RunOutcome, AnalysisError> {
        self.analyze(file)?;
        Ok(self.stream(stage))
    }

    /// Re-run the cached result. Ignored while the replay trigger is
    /// disabled or a run is active.
    pub fn replay(&mut self, stage: &mut Stage<'_>) -> RunOutcome {
        if !self.triggers.replay_enabled || self.player.is_running() {
            log::debug!("Replay ignored: trigger disabled");
            return RunOutcome::Skipped;
        }
        log::info!("Replaying cached analysis");
        self.stream(stage)
    }
}
