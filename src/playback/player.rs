use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::cache::PlaybackCache;
use super::scheduler::{CancelToken, FrameScheduler, RunOutcome};
use super::Stage;
use crate::analysis::result::AnalysisResult;

/// Shared "run in progress" flag. Clones observe the same state, so a
/// trigger surface can check it without holding the player.
#[derive(Clone, Debug, Default)]
pub struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, running: bool) {
        self.0.store(running, Ordering::SeqCst);
    }
}

/// Clears the flag even if a collaborator panics mid-run.
struct RunningGuard<'a>(&'a RunningFlag);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Playback cache plus the engine. The player does not refuse a second
/// run while one is active; callers check [`Player::is_running`].
#[derive(Default)]
pub struct Player {
    cache: PlaybackCache,
    running: RunningFlag,
    cancel: Option<CancelToken>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check this token at every suspension point of later runs.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn running_flag(&self) -> RunningFlag {
        self.running.clone()
    }

    pub fn cache(&self) -> &PlaybackCache {
        &self.cache
    }

    /// Remember a freshly received result, replacing the previous one.
    pub fn load(&mut self, result: AnalysisResult) -> Arc<AnalysisResult> {
        self.cache.store(result)
    }

    /// Remember a freshly received result and play it.
    pub fn play(&mut self, result: AnalysisResult, stage: &mut Stage<'_>) -> RunOutcome {
        let result = self.load(result);
        self.run(&result, stage)
    }

    /// Play the cached result again. No-op when nothing has been cached.
    pub fn replay(&mut self, stage: &mut Stage<'_>) -> RunOutcome {
        let Some(result) = self.cache.current() else {
            log::debug!("Replay requested with an empty cache");
            return RunOutcome::Skipped;
        };
        self.run(&result, stage)
    }

    fn run(&self, result: &AnalysisResult, stage: &mut Stage<'_>) -> RunOutcome {
        self.running.set(true);
        let _guard = RunningGuard(&self.running);
        FrameScheduler::new(stage).run(result, self.cancel.as_ref())
    }
}
