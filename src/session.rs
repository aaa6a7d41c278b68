// Session - Cooperative event-loop glue around the timing core
//
// Three re-armable callbacks: the coarse scheduler timer, the per-frame
// phase update and the fade wind-down. All run on the host's single loop;
// stop cancels them synchronously.

use crate::audio::sink::ToneSink;
use crate::config::SessionConfig;
use crate::messaging::beat_events::BeatChange;
use crate::sequencer::scheduler::SCHEDULE_INTERVAL_SECS;
use crate::sequencer::timeline::Tempo;
use crate::sequencer::transport::{TimingCore, TransportState};
use crate::visual::phase::PhaseEngine;
use log::debug;

/// Pending callback registrations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HostTimers {
    /// Coarse-clock deadline of the next scheduler wake
    pub scheduler: Option<f64>,
    pub frame: bool,
    pub fade: bool,
}

impl HostTimers {
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_none() && !self.frame && !self.fade
    }
}

/// What the renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    pub phase: f64,
    pub fade_alpha: f32,
    pub bpm: u16,
}

pub struct Session<S: ToneSink> {
    core: TimingCore,
    phase: PhaseEngine,
    sink: Option<S>,
    timers: HostTimers,
}

impl<S: ToneSink> Session<S> {
    /// `sink` is None when no audio output could be opened; scheduling is
    /// then a no-op.
    pub fn new(config: SessionConfig, sink: Option<S>) -> Self {
        let phase = PhaseEngine::new(config.units_per_cycle);
        Self {
            core: TimingCore::new(config),
            phase,
            sink,
            timers: HostTimers::default(),
        }
    }

    /// Start at the configured tempo; first wake is due immediately
    pub fn start(&mut self, coarse_now: f64, audio_now: f64) -> bool {
        let start = Tempo::new(self.core.config().start_bpm);
        if !self.core.start(start, audio_now) {
            return false;
        }

        self.phase.start();
        self.timers = HostTimers {
            scheduler: Some(coarse_now),
            frame: true,
            fade: false,
        };
        true
    }

    pub fn pause(&mut self, audio_now: f64) -> bool {
        if !self.core.pause(audio_now) {
            return false;
        }

        self.phase.pause();
        self.timers.scheduler = None;
        true
    }

    pub fn resume(&mut self, coarse_now: f64, audio_now: f64) -> bool {
        if !self.core.resume(audio_now) {
            return false;
        }

        self.phase.resume();
        self.timers.scheduler = Some(coarse_now);
        true
    }

    /// Cancel the scheduler and frame callbacks and begin the fade
    pub fn stop(&mut self) -> bool {
        if !self.core.stop() {
            return false;
        }

        self.phase.stop();
        self.timers = HostTimers {
            scheduler: None,
            frame: false,
            fade: self.phase.is_fading(),
        };
        true
    }

    /// Run the scheduler if its timer is due, then return the beat changes
    /// whose audio time has arrived
    pub fn poll(&mut self, coarse_now: f64, audio_now: f64) -> Vec<BeatChange> {
        if let Some(deadline) = self.timers.scheduler
            && coarse_now >= deadline
        {
            if let Some(sink) = self.sink.as_mut() {
                let scheduled = self.core.wake(audio_now, sink);
                if scheduled > 0 {
                    debug!("Wake at {:.3}s scheduled {} clicks", audio_now, scheduled);
                }
            }
            self.timers.scheduler = Some(coarse_now + SCHEDULE_INTERVAL_SECS);
        }

        self.core.drain_beat_changes(audio_now)
    }

    /// Per-frame callback: advance the phase or the fade
    pub fn frame(&mut self, frame_delta_ms: f64) -> FrameState {
        let tempo = self.core.current_tempo();

        if self.timers.frame {
            self.phase.advance(frame_delta_ms, tempo);
        }

        if self.timers.fade {
            self.phase.fade_advance();
            if !self.phase.is_fading() {
                self.timers.fade = false;
            }
        }

        FrameState {
            phase: self.phase.phase(),
            fade_alpha: self.phase.fade_alpha(),
            bpm: tempo.bpm(),
        }
    }

    /// Seconds until the scheduler wants to run again
    pub fn next_wake_in(&self, coarse_now: f64) -> Option<f64> {
        self.timers
            .scheduler
            .map(|deadline| (deadline - coarse_now).max(0.0))
    }

    pub fn state(&self) -> TransportState {
        self.core.state()
    }

    pub fn timers(&self) -> HostTimers {
        self.timers
    }

    pub fn core(&self) -> &TimingCore {
        &self.core
    }

    pub fn phase(&self) -> &PhaseEngine {
        &self.phase
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.sink.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sink::RecordingSink;

    fn session() -> Session<RecordingSink> {
        Session::new(SessionConfig::default(), Some(RecordingSink::new()))
    }

    #[test]
    fn test_start_arms_timers() {
        let mut session = session();
        assert!(session.timers().is_idle());

        assert!(session.start(0.0, 0.0));
        assert_eq!(session.timers().scheduler, Some(0.0));
        assert!(session.timers().frame);
        assert!(!session.timers().fade);
    }

    #[test]
    fn test_poll_rearms_scheduler() {
        let mut session = session();
        session.start(0.0, 0.0);

        session.poll(0.0, 0.0);
        assert_eq!(session.next_wake_in(0.0), Some(SCHEDULE_INTERVAL_SECS));

        // Not due yet: the sink sees nothing new
        session.poll(0.01, 0.01);
        assert_eq!(session.sink().map(|s| s.clicks.len()), Some(1));
    }

    #[test]
    fn test_stop_cancels_and_fades() {
        let mut session = session();
        session.start(0.0, 0.0);
        session.frame(16.0);
        assert!(session.stop());

        let timers = session.timers();
        assert_eq!(timers.scheduler, None);
        assert!(!timers.frame);
        assert!(timers.fade);

        let mut last = session.frame(16.0).fade_alpha;
        while session.timers().fade {
            let alpha = session.frame(16.0).fade_alpha;
            assert!(alpha < last);
            last = alpha;
        }
        assert_eq!(last, 0.0);
        assert!(session.timers().is_idle());
    }

    #[test]
    fn test_redundant_commands_are_noops() {
        let mut session = session();
        assert!(!session.pause(0.0));
        assert!(!session.stop());

        session.start(0.0, 0.0);
        assert!(session.pause(1.0));
        let timers = session.timers();
        assert!(!session.pause(2.0));
        assert_eq!(session.timers(), timers);
    }

    #[test]
    fn test_without_audio_nothing_is_scheduled() {
        let mut session: Session<RecordingSink> = Session::new(SessionConfig::default(), None);
        assert!(!session.has_audio());
        session.start(0.0, 0.0);

        for i in 0..100 {
            let now = i as f64 * 0.025;
            assert!(session.poll(now, now).is_empty());
        }
        assert_eq!(session.core().bars_elapsed(), 0);
        // The visual side still runs
        assert!(session.frame(16.0).phase > 0.0);
    }
}
