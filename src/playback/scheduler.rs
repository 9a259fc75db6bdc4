use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::schedule::FramePlan;
use super::Stage;
use crate::analysis::result::AnalysisResult;
use crate::emotion::Emotion;

/// Requests that a run stop at its next suspension point.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to play: no frames or no samples.
    Skipped,
    Completed { frames: usize },
    Cancelled { frames: usize },
}

/// Plays one result through a stage, frame by frame.
pub struct FrameScheduler<'s, 'a> {
    stage: &'s mut Stage<'a>,
}

impl<'s, 'a> FrameScheduler<'s, 'a> {
    pub fn new(stage: &'s mut Stage<'a>) -> Self {
        Self { stage }
    }

    pub fn run(&mut self, result: &AnalysisResult, cancel: Option<&CancelToken>) -> RunOutcome {
        let plan = FramePlan::new(result);
        let frame_count = plan.frame_count();
        if frame_count == 0 {
            log::warn!(
                "Skipping playback: {} frames, {} samples",
                result.frame_count,
                result.samples.len()
            );
            return RunOutcome::Skipped;
        }

        let delay = plan.delay();
        log::info!(
            "Playing {} frames at {}ms per frame",
            frame_count,
            delay.as_millis()
        );

        let stage = &mut *self.stage;
        stage.display.begin_run(frame_count);

        let mut played = 0;
        for step in plan {
            stage.waveform.draw(&result.samples[..step.upto]);

            stage.display.show_label(step.label, &step.confidence);
            if let Some(emotion) = Emotion::from_label(step.label) {
                let asset = format!(
                    "{}/{}",
                    stage.asset_base.trim_end_matches('/'),
                    emotion.asset_file()
                );
                stage.display.show_emoji(&asset);
            }

            stage.tones.play(step.label, step.at);
            stage.display.show_progress(step.progress);

            log::debug!(
                "Frame {}/{}: {} samples, label={}, confidence={}",
                step.index + 1,
                frame_count,
                step.upto,
                step.label,
                step.confidence
            );

            stage.clock.sleep(delay);
            played += 1;

            if cancel.is_some_and(CancelToken::is_cancelled) {
                log::info!("Playback cancelled after {} of {} frames", played, frame_count);
                stage.display.end_run();
                return RunOutcome::Cancelled { frames: played };
            }
        }

        stage.display.show_progress(100);
        stage.display.end_run();
        RunOutcome::Completed { frames: played }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::playback::testing::{Event, Fakes, Recorder};

    fn scenario() -> AnalysisResult {
        AnalysisResult::new(vec![0.0, 0.5, -0.5, 0.25, -0.25, 0.1], 3)
            .with_frame_length(2)
            .with_duration(6.0)
            .with_labels([Some("Happy"), Some("Neutral"), Some("Sad")])
            .with_confidences([Some(0.9), Some(0.5), Some(0.8)])
    }

    #[test]
    fn five_frames_over_ten_seconds() {
        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);
        let result = AnalysisResult::new(vec![0.1; 50], 5).with_duration(10.0);

        let mut stage = fakes.stage();
        let outcome = FrameScheduler::new(&mut stage).run(&result, None);

        assert_eq!(outcome, RunOutcome::Completed { frames: 5 });
        assert_eq!(recorder.progress(), vec![20, 40, 60, 80, 100, 100]);
        assert_eq!(recorder.draws(), vec![10, 20, 30, 40, 50]);
        assert_eq!(recorder.tones().len(), 5);
        assert_eq!(recorder.sleeps(), vec![Duration::from_millis(2000); 5]);
    }

    #[test]
    fn per_frame_effects_happen_in_order_before_the_wait() {
        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);
        let result = AnalysisResult::new(vec![0.3, 0.6], 1)
            .with_duration(1.0)
            .with_labels([Some("Happy")])
            .with_confidences([Some(0.75)]);

        let mut stage = fakes.stage();
        FrameScheduler::new(&mut stage).run(&result, None);

        assert_eq!(
            recorder.events(),
            vec![
                Event::Begin(1),
                Event::Draw(2),
                Event::Label("Happy".into(), "0.75".into()),
                Event::Emoji("/static/images/happy.svg".into()),
                Event::Tone("Happy".into(), Duration::ZERO),
                Event::Progress(100),
                Event::Sleep(Duration::from_millis(1000)),
                Event::Progress(100),
                Event::End,
            ]
        );
    }

    #[test]
    fn end_to_end_scenario() {
        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);

        let mut stage = fakes.stage();
        let outcome = FrameScheduler::new(&mut stage).run(&scenario(), None);

        assert_eq!(outcome, RunOutcome::Completed { frames: 3 });
        assert_eq!(recorder.draws(), vec![2, 4, 6]);
        assert_eq!(recorder.progress(), vec![33, 67, 100, 100]);
        assert_eq!(recorder.sleeps(), vec![Duration::from_millis(2000); 3]);
        assert_eq!(
            recorder.emojis(),
            vec![
                "/static/images/happy.svg",
                "/static/images/neutral.svg",
                "/static/images/sad.svg"
            ]
        );
        assert_eq!(recorder.tones(), vec!["Happy", "Neutral", "Sad"]);
    }

    #[test]
    fn unknown_and_missing_labels_leave_emoji_alone() {
        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);
        let result = AnalysisResult::new(vec![0.0; 8], 4)
            .with_labels([Some("Sad"), Some("Surprised"), None, Some("Happy")]);

        let mut stage = fakes.stage();
        FrameScheduler::new(&mut stage).run(&result, None);

        assert_eq!(
            recorder.emojis(),
            vec!["/static/images/sad.svg", "/static/images/happy.svg"]
        );
        // Every frame still gets a label and a tone.
        assert_eq!(recorder.tones(), vec!["Sad", "Surprised", "-", "Happy"]);
        let labels: Vec<Event> = recorder
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Label(..)))
            .collect();
        assert_eq!(labels[2], Event::Label("-".into(), "-".into()));
    }

    #[test]
    fn degenerate_results_touch_nothing() {
        for result in [
            AnalysisResult::new(vec![0.5; 10], 0),
            AnalysisResult::new(Vec::new(), 4),
        ] {
            let recorder = Recorder::new();
            let mut fakes = Fakes::new(&recorder);
            let mut stage = fakes.stage();
            let outcome = FrameScheduler::new(&mut stage).run(&result, None);
            assert_eq!(outcome, RunOutcome::Skipped);
            assert!(recorder.events().is_empty());
        }
    }

    #[test]
    fn cancellation_stops_at_the_suspension_point() {
        struct CancellingClock {
            token: CancelToken,
            sleeps: usize,
        }
        impl crate::playback::Clock for CancellingClock {
            fn sleep(&mut self, _duration: Duration) {
                self.sleeps += 1;
                if self.sleeps == 2 {
                    self.token.cancel();
                }
            }
        }

        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);
        let token = CancelToken::new();
        let mut clock = CancellingClock {
            token: token.clone(),
            sleeps: 0,
        };
        let mut stage = Stage {
            waveform: &mut fakes.waveform,
            tones: &mut fakes.tones,
            display: &mut fakes.display,
            clock: &mut clock,
            asset_base: "img",
        };
        let result = AnalysisResult::new(vec![0.0; 10], 5);
        let outcome = FrameScheduler::new(&mut stage).run(&result, Some(&token));

        assert_eq!(outcome, RunOutcome::Cancelled { frames: 2 });
        assert_eq!(recorder.draws(), vec![2, 4]);
        // No forced 100% for an unfinished run.
        assert_eq!(recorder.progress(), vec![20, 40]);
    }

    #[test]
    fn tones_overlap_when_frames_are_shorter_than_the_tone() {
        // 60 frames over 12 s gives 200 ms frames; each tone rings for 700 ms.
        let recorder = Recorder::new();
        let mut fakes = Fakes::new(&recorder);
        let result = AnalysisResult::new(vec![0.0; 120], 60);
        let mut stage = fakes.stage();
        FrameScheduler::new(&mut stage).run(&result, None);

        let offsets: Vec<Duration> = recorder
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Tone(_, at) => Some(at),
                _ => None,
            })
            .collect();
        assert_eq!(offsets.len(), 60);
        assert!(offsets[1] - offsets[0] < crate::audio::tone::TONE_STOP);
    }
}
