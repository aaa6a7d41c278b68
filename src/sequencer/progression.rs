// Tempo progression - Decides when the tempo steps up
// Two policies share one capability: "should this tick bump the tempo?"

use super::counter::Tick;
use super::timeline::{Tempo, TempoIncrement};
use crate::config::ProgressionSettings;
use log::debug;
use std::fmt;

/// Audio-clock bookkeeping for the time-based policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressionClock {
    last_bump: f64,
    accumulated_paused: f64,
}

impl ProgressionClock {
    pub fn new(start: f64) -> Self {
        Self {
            last_bump: start,
            accumulated_paused: 0.0,
        }
    }

    /// Non-paused seconds since the last bump (or since start)
    pub fn active_elapsed(&self, now: f64) -> f64 {
        now - self.last_bump - self.accumulated_paused
    }

    /// Record a finished pause; negative durations are ignored
    pub fn add_paused(&mut self, duration: f64) {
        if duration > 0.0 {
            self.accumulated_paused += duration;
        }
    }

    /// Restart the interval at `now`
    pub fn reset(&mut self, now: f64) {
        self.last_bump = now;
        self.accumulated_paused = 0.0;
    }

    pub fn last_bump(&self) -> f64 {
        self.last_bump
    }

    pub fn accumulated_paused(&self) -> f64 {
        self.accumulated_paused
    }
}

/// A tempo progression policy
pub trait Progression: fmt::Debug + Send {
    /// Called for every tick about to be scheduled, in order.
    /// `now` is the audio clock at the scheduler wake.
    fn should_bump(&mut self, tick: &Tick, clock: &ProgressionClock, now: f64) -> bool;

    /// Forget any per-session state
    fn reset(&mut self) {}
}

/// Bump at every cycle start except the very first one
#[derive(Debug, Clone, Copy, Default)]
pub struct BarCountProgression;

impl Progression for BarCountProgression {
    fn should_bump(&mut self, tick: &Tick, _clock: &ProgressionClock, _now: f64) -> bool {
        tick.is_cycle_start() && tick.bars_elapsed > 0
    }
}

/// Arm once the interval of active time has passed, fire on the next cycle start
#[derive(Debug, Clone, Copy)]
pub struct TimedProgression {
    interval: f64,
    armed: bool,
}

impl TimedProgression {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval: interval_secs,
            armed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

impl Progression for TimedProgression {
    fn should_bump(&mut self, tick: &Tick, clock: &ProgressionClock, now: f64) -> bool {
        if !self.armed && clock.active_elapsed(now) >= self.interval {
            debug!(
                "Tempo bump armed after {:.2}s of active play",
                clock.active_elapsed(now)
            );
            self.armed = true;
        }

        if self.armed && tick.is_cycle_start() && tick.bars_elapsed > 0 {
            self.armed = false;
            return true;
        }

        false
    }

    fn reset(&mut self) {
        self.armed = false;
    }
}

/// Build the policy selected in the session config
pub fn progression_for(settings: &ProgressionSettings) -> Box<dyn Progression> {
    match settings {
        ProgressionSettings::Bars { .. } => Box::new(BarCountProgression),
        ProgressionSettings::Timed { interval_secs } => {
            Box::new(TimedProgression::new(*interval_secs as f64))
        }
    }
}

/// Current, start and step tempo values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoState {
    pub current: Tempo,
    pub start: Tempo,
    pub increment: TempoIncrement,
}

impl TempoState {
    pub fn new(start: Tempo, increment: TempoIncrement) -> Self {
        Self {
            current: start,
            start,
            increment,
        }
    }
}

/// A tempo change applied by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoChange {
    pub from: Tempo,
    pub to: Tempo,
}

/// Owns the tempo state and applies the policy's decisions to it
#[derive(Debug)]
pub struct ProgressionController {
    tempo: TempoState,
    policy: Box<dyn Progression>,
    clock: ProgressionClock,
}

impl ProgressionController {
    pub fn new(tempo: TempoState, policy: Box<dyn Progression>, now: f64) -> Self {
        Self {
            tempo,
            policy,
            clock: ProgressionClock::new(now),
        }
    }

    /// Ask the policy about `tick` and apply a bump if it fires.
    /// Returns the change, or None when nothing fired or the tempo is already at max.
    pub fn evaluate(&mut self, tick: &Tick, now: f64) -> Option<TempoChange> {
        if !self.policy.should_bump(tick, &self.clock, now) {
            return None;
        }

        self.clock.reset(now);

        let from = self.tempo.current;
        let to = from.bumped(self.tempo.increment);
        if to == from {
            return None;
        }

        self.tempo.current = to;
        debug!("Tempo {} -> {} at bar {}", from, to, tick.bars_elapsed);
        Some(TempoChange { from, to })
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo.current
    }

    pub fn tempo_state(&self) -> &TempoState {
        &self.tempo
    }

    pub fn clock(&self) -> &ProgressionClock {
        &self.clock
    }

    /// Credit a finished pause so it does not count as active time
    pub fn add_paused(&mut self, duration: f64) {
        self.clock.add_paused(duration);
    }

    /// Back to the start tempo with a fresh interval beginning at `now`
    pub fn reset(&mut self, now: f64) {
        self.tempo.current = self.tempo.start;
        self.clock.reset(now);
        self.policy.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::counter::BeatCounter;

    fn controller(settings: ProgressionSettings, start: u16) -> ProgressionController {
        ProgressionController::new(
            TempoState::new(Tempo::new(start), TempoIncrement::Five),
            progression_for(&settings),
            0.0,
        )
    }

    #[test]
    fn test_clock_active_elapsed() {
        let mut clock = ProgressionClock::new(2.0);
        clock.add_paused(3.0);
        clock.add_paused(-1.0);
        assert_eq!(clock.active_elapsed(10.0), 5.0);

        clock.reset(10.0);
        assert_eq!(clock.accumulated_paused(), 0.0);
        assert_eq!(clock.active_elapsed(12.0), 2.0);
    }

    #[test]
    fn test_bar_count_skips_first_cycle() {
        let mut policy = BarCountProgression;
        let clock = ProgressionClock::new(0.0);
        let mut counter = BeatCounter::new(4, 1, 4);

        let fired: Vec<u64> = (0..64)
            .map(|_| counter.advance())
            .filter(|tick| policy.should_bump(tick, &clock, 0.0))
            .map(|tick| tick.bars_elapsed)
            .collect();

        assert_eq!(fired, vec![4, 8, 12]);
    }

    #[test]
    fn test_timed_arms_but_waits_for_cycle_start() {
        let mut policy = TimedProgression::new(10.0);
        let clock = ProgressionClock::new(0.0);
        let mut counter = BeatCounter::new(4, 1, 4);

        // Move into bar 5, beat 2 (mid-cycle)
        for _ in 0..17 {
            counter.advance();
        }
        let mid = counter.advance();
        assert!(!policy.should_bump(&mid, &clock, 11.0));
        assert!(policy.is_armed());

        // Advance to the next cycle start (bar 8)
        let mut tick = counter.advance();
        while !tick.is_cycle_start() {
            assert!(!policy.should_bump(&tick, &clock, 11.5));
            tick = counter.advance();
        }
        assert!(policy.should_bump(&tick, &clock, 12.0));
        assert!(!policy.is_armed());
    }

    #[test]
    fn test_timed_not_armed_before_interval() {
        let mut policy = TimedProgression::new(10.0);
        let mut clock = ProgressionClock::new(0.0);
        clock.add_paused(3.0);
        let tick = BeatCounter::new(4, 1, 4).peek();

        policy.should_bump(&tick, &clock, 12.9);
        assert!(!policy.is_armed());
        policy.should_bump(&tick, &clock, 13.0);
        assert!(policy.is_armed());
    }

    #[test]
    fn test_controller_applies_increment_and_resets_clock() {
        let mut ctl = controller(ProgressionSettings::default(), 60);
        let mut counter = BeatCounter::new(4, 1, 4);

        let mut changes = Vec::new();
        for i in 0..48 {
            let tick = counter.advance();
            if let Some(change) = ctl.evaluate(&tick, i as f64) {
                changes.push((change.from.bpm(), change.to.bpm()));
                assert_eq!(ctl.clock().last_bump(), i as f64);
            }
        }
        assert_eq!(changes, vec![(60, 65), (65, 70)]);
        assert_eq!(ctl.tempo().bpm(), 70);
    }

    #[test]
    fn test_controller_clamps_at_max() {
        let mut ctl = controller(ProgressionSettings::default(), 295);
        let mut counter = BeatCounter::new(1, 1, 4);

        for _ in 0..40 {
            let tick = counter.advance();
            let _ = ctl.evaluate(&tick, 0.0);
            assert!(ctl.tempo().bpm() <= Tempo::MAX_BPM);
        }
        assert_eq!(ctl.tempo().bpm(), 300);
    }

    #[test]
    fn test_controller_reset() {
        let mut ctl = controller(ProgressionSettings::Timed { interval_secs: 10 }, 80);
        let mut counter = BeatCounter::new(1, 1, 4);
        for _ in 0..5 {
            let tick = counter.advance();
            let _ = ctl.evaluate(&tick, 20.0);
        }
        assert_eq!(ctl.tempo().bpm(), 85);

        ctl.add_paused(2.0);
        ctl.reset(30.0);
        assert_eq!(ctl.tempo().bpm(), 80);
        assert_eq!(ctl.clock().last_bump(), 30.0);
        assert_eq!(ctl.clock().accumulated_paused(), 0.0);
    }
}
