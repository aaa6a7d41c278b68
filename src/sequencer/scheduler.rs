// Lookahead scheduler - Turns a coarse timer into sample-accurate clicks
//
// Each wake fills the window [now, now + lookahead) with clicks stamped on
// the audio clock. The coarse timer only decides when to look ahead; it is
// never used for a click timestamp.

use super::counter::BeatCounter;
use super::metronome::ClickRole;
use super::progression::{ProgressionController, TempoState, progression_for};
use super::timeline::{Subdivision, Tempo};
use crate::audio::sink::ToneSink;
use crate::config::SessionConfig;
use crate::messaging::beat_events::{BeatChange, DeferredQueue};
use log::{trace, warn};

/// How far ahead of the audio clock clicks are queued
pub const LOOKAHEAD_SECS: f64 = 0.1;

/// Coarse timer period between wakes
pub const SCHEDULE_INTERVAL_SECS: f64 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub lookahead: f64,
    pub interval: f64,
    /// A cursor further than this behind the audio clock is re-anchored to it
    pub stall_tolerance: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead: LOOKAHEAD_SECS,
            interval: SCHEDULE_INTERVAL_SECS,
            stall_tolerance: SCHEDULE_INTERVAL_SECS,
        }
    }
}

/// Owns the counter, the tempo controller and the schedule cursor
#[derive(Debug)]
pub struct LookaheadScheduler {
    config: SchedulerConfig,
    counter: BeatCounter,
    controller: ProgressionController,
    subdivision: Subdivision,
    /// Audio time of the next unscheduled tick
    cursor: f64,
    beat_events: DeferredQueue<BeatChange>,
}

impl LookaheadScheduler {
    /// Fresh session state with the first tick due at `now`
    pub fn new(session: &SessionConfig, start: Tempo, now: f64) -> Self {
        Self::with_config(session, start, SchedulerConfig::default(), now)
    }

    pub fn with_config(
        session: &SessionConfig,
        start: Tempo,
        config: SchedulerConfig,
        now: f64,
    ) -> Self {
        let counter = BeatCounter::new(
            session.time_signature.beats_per_bar(),
            session.subdivision.ticks_per_beat(),
            session.progression.bars_per_cycle(),
        );
        let controller = ProgressionController::new(
            TempoState::new(start, session.increment),
            progression_for(&session.progression),
            now,
        );

        Self {
            config,
            counter,
            controller,
            subdivision: session.subdivision,
            cursor: now,
            beat_events: DeferredQueue::new(),
        }
    }

    /// Schedule every tick that falls inside the lookahead window.
    /// Returns the number of clicks emitted.
    pub fn fill<S: ToneSink + ?Sized>(&mut self, now: f64, sink: &mut S) -> usize {
        if now - self.cursor > self.config.stall_tolerance {
            warn!(
                "Scheduler fell {:.3}s behind the audio clock, re-anchoring",
                now - self.cursor
            );
            self.cursor = now;
        }

        let horizon = now + self.config.lookahead;
        let mut scheduled = 0;

        while self.cursor < horizon {
            let tick = self.counter.peek();
            let _ = self.controller.evaluate(&tick, now);

            let role = ClickRole::for_tick(&tick);
            sink.emit(self.cursor, role);

            if tick.is_beat_start() {
                self.beat_events.push(
                    self.cursor,
                    BeatChange {
                        beat: tick.beat,
                        bpm: self.controller.tempo().bpm(),
                        bars_elapsed: tick.bars_elapsed,
                    },
                );
            }

            self.counter.advance();
            // Spacing after this tick follows the tempo just decided for it
            self.cursor += self.controller.tempo().tick_duration_seconds(self.subdivision);
            scheduled += 1;
        }

        trace!("Scheduled {} ticks, cursor at {:.4}s", scheduled, self.cursor);
        scheduled
    }

    /// Move a stale cursor up to `now`; a cursor already ahead is kept
    pub fn reanchor(&mut self, now: f64) {
        if self.cursor < now {
            self.cursor = now;
        }
    }

    /// Credit a finished pause to the progression clock
    pub fn add_paused(&mut self, duration: f64) {
        self.controller.add_paused(duration);
    }

    /// Beat changes whose audible moment has arrived
    pub fn drain_beat_changes(&mut self, now: f64) -> Vec<BeatChange> {
        self.beat_events.drain_due(now)
    }

    pub fn next_beat_change_at(&self) -> Option<f64> {
        self.beat_events.next_deadline()
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn tempo(&self) -> Tempo {
        self.controller.tempo()
    }

    pub fn controller(&self) -> &ProgressionController {
        &self.controller
    }

    pub fn counter(&self) -> &BeatCounter {
        &self.counter
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
