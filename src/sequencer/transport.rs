// Transport - Start/pause/resume/stop around the timing core
// One owner for all mutable timing state; redundant commands are no-ops

use super::pause::PauseAccountant;
use super::scheduler::{LookaheadScheduler, SchedulerConfig};
use super::timeline::Tempo;
use crate::audio::sink::ToneSink;
use crate::config::SessionConfig;
use crate::messaging::beat_events::BeatChange;
use log::info;

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn is_playing(&self) -> bool {
        matches!(self, TransportState::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, TransportState::Paused)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, TransportState::Stopped)
    }
}

/// The timing core: transport state, scheduler and pause accounting.
///
/// Session state (tempo, counter, cursor, progression clock) exists only
/// between `start` and `stop` and is rebuilt from the config on every start.
#[derive(Debug)]
pub struct TimingCore {
    config: SessionConfig,
    scheduler_config: SchedulerConfig,
    state: TransportState,
    scheduler: Option<LookaheadScheduler>,
    pause: PauseAccountant,
}

impl TimingCore {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_scheduler_config(config, SchedulerConfig::default())
    }

    pub fn with_scheduler_config(config: SessionConfig, scheduler_config: SchedulerConfig) -> Self {
        Self {
            config,
            scheduler_config,
            state: TransportState::Stopped,
            scheduler: None,
            pause: PauseAccountant::new(),
        }
    }

    /// Stopped -> Playing. Returns false (and does nothing) in any other state.
    pub fn start(&mut self, start: Tempo, now: f64) -> bool {
        if !self.state.is_stopped() {
            return false;
        }

        self.scheduler = Some(LookaheadScheduler::with_config(
            &self.config,
            start,
            self.scheduler_config,
            now,
        ));
        self.pause.clear();
        self.state = TransportState::Playing;
        info!(
            "Transport started at {} in {} ({:?})",
            start, self.config.time_signature, self.config.subdivision
        );
        true
    }

    /// Playing -> Paused
    pub fn pause(&mut self, now: f64) -> bool {
        if !self.state.is_playing() {
            return false;
        }

        self.pause.on_pause(now);
        self.state = TransportState::Paused;
        info!("Transport paused at {:.3}s", now);
        true
    }

    /// Paused -> Playing, crediting the pause and re-anchoring the cursor
    pub fn resume(&mut self, now: f64) -> bool {
        if !self.state.is_paused() {
            return false;
        }

        let paused_for = self.pause.on_resume(now).unwrap_or(0.0);
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.add_paused(paused_for);
            scheduler.reanchor(now);
        }
        self.state = TransportState::Playing;
        info!("Transport resumed after {:.3}s paused", paused_for);
        true
    }

    /// Playing/Paused -> Stopped, discarding all session state
    pub fn stop(&mut self) -> bool {
        if self.state.is_stopped() {
            return false;
        }

        self.scheduler = None;
        self.pause.clear();
        self.state = TransportState::Stopped;
        info!("Transport stopped");
        true
    }

    /// Coarse-timer wake: fill the lookahead window. No-op unless playing.
    pub fn wake<S: ToneSink + ?Sized>(&mut self, now: f64, sink: &mut S) -> usize {
        if !self.state.is_playing() {
            return 0;
        }

        match self.scheduler.as_mut() {
            Some(scheduler) => scheduler.fill(now, sink),
            None => 0,
        }
    }

    /// Deferred beat changes whose audio time has arrived
    pub fn drain_beat_changes(&mut self, now: f64) -> Vec<BeatChange> {
        self.scheduler
            .as_mut()
            .map(|scheduler| scheduler.drain_beat_changes(now))
            .unwrap_or_default()
    }

    /// Current tempo; the configured start tempo while stopped
    pub fn current_tempo(&self) -> Tempo {
        self.scheduler
            .as_ref()
            .map(|scheduler| scheduler.tempo())
            .unwrap_or_else(|| Tempo::new(self.config.start_bpm))
    }

    pub fn bars_elapsed(&self) -> u64 {
        self.scheduler
            .as_ref()
            .map(|scheduler| scheduler.counter().bars_elapsed())
            .unwrap_or(0)
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the config. Only allowed while stopped.
    pub fn set_config(&mut self, config: SessionConfig) -> bool {
        if !self.state.is_stopped() {
            return false;
        }
        self.config = config;
        true
    }

    pub fn scheduler(&self) -> Option<&LookaheadScheduler> {
        self.scheduler.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::sink::RecordingSink;

    fn core() -> TimingCore {
        TimingCore::new(SessionConfig::default())
    }

    #[test]
    fn test_transport_state() {
        assert!(TransportState::Playing.is_playing());
        assert!(TransportState::Paused.is_paused());
        assert!(TransportState::default().is_stopped());
    }

    #[test]
    fn test_state_machine() {
        let mut core = core();
        assert!(!core.pause(0.0));
        assert!(!core.resume(0.0));
        assert!(!core.stop());

        assert!(core.start(Tempo::new(60), 0.0));
        assert!(!core.start(Tempo::new(90), 0.0));
        assert!(!core.resume(0.5));
        assert!(core.pause(1.0));
        assert!(!core.pause(2.0));
        assert!(core.resume(3.0));
        assert!(core.stop());
        assert!(!core.stop());
        assert_eq!(core.state(), TransportState::Stopped);
    }

    #[test]
    fn test_wake_is_noop_unless_playing() {
        let mut core = core();
        let mut sink = RecordingSink::new();

        assert_eq!(core.wake(0.0, &mut sink), 0);

        core.start(Tempo::new(60), 0.0);
        assert_eq!(core.wake(0.0, &mut sink), 1);

        core.pause(0.05);
        assert_eq!(core.wake(2.0, &mut sink), 0);
        assert_eq!(sink.clicks.len(), 1);
    }

    #[test]
    fn test_resume_reanchors_cursor() {
        let mut core = core();
        let mut sink = RecordingSink::new();
        core.start(Tempo::new(60), 0.0);
        core.wake(0.0, &mut sink);

        core.pause(0.5);
        core.resume(7.25);
        core.wake(7.25, &mut sink);
        assert_eq!(sink.clicks.last().map(|c| c.0), Some(7.25));

        let paused = core.scheduler().map(|s| s.controller().clock().accumulated_paused());
        assert_eq!(paused, Some(6.75));
    }

    #[test]
    fn test_stop_resets_tempo_and_config_lock() {
        let config = SessionConfig {
            start_bpm: 100,
            ..SessionConfig::default()
        };
        let mut core = TimingCore::new(config.clone());
        let mut sink = RecordingSink::new();

        core.start(Tempo::new(100), 0.0);
        // 4 bars of 4/4 at 100 BPM = 9.6s; run a bit past the first cycle
        let mut now = 0.0;
        while now < 10.0 {
            core.wake(now, &mut sink);
            now += 0.025;
        }
        assert_eq!(core.current_tempo().bpm(), 105);
        assert!(!core.set_config(SessionConfig::default()));

        core.stop();
        assert_eq!(core.current_tempo().bpm(), 100);
        assert_eq!(core.bars_elapsed(), 0);
        assert!(core.set_config(SessionConfig::default()));
        assert_eq!(core.current_tempo().bpm(), 60);
    }
}
