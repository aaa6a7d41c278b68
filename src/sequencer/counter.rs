// Beat counter - Position within bar, cycle and beat
// Pure state machine, advanced once per scheduled tick

/// Snapshot of one tick, taken before the counter moved past it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub beat: u32,          // Beat within bar (0-based)
    pub sub_beat: u32,      // Tick within beat (0-based)
    pub bar_in_cycle: u32,  // Bar within progression cycle (0-based)
    pub bars_elapsed: u64,  // Completed bars since start
    pub beats_per_bar: u32, // Meter the tick was counted in
}

impl Tick {
    /// First tick of a beat (sub-beat 0)
    pub fn is_beat_start(&self) -> bool {
        self.sub_beat == 0
    }

    /// First tick of a bar
    pub fn is_bar_start(&self) -> bool {
        self.beat == 0 && self.sub_beat == 0
    }

    /// First tick of a progression cycle
    pub fn is_cycle_start(&self) -> bool {
        self.bar_in_cycle == 0 && self.is_bar_start()
    }
}

/// Beat/subdivision counter
///
/// Wraps sub-beat into beat, beat into bar and bar into cycle. All sizes are
/// at least 1; they come from the enumerated meter configuration.
#[derive(Debug, Clone)]
pub struct BeatCounter {
    beats_per_bar: u32,
    ticks_per_beat: u32,
    bars_per_cycle: u32,

    beat: u32,
    sub_beat: u32,
    bar_in_cycle: u32,
    bars_elapsed: u64,
}

impl BeatCounter {
    /// Create a counter positioned on the first tick of the first bar
    pub fn new(beats_per_bar: u32, ticks_per_beat: u32, bars_per_cycle: u32) -> Self {
        debug_assert!(beats_per_bar >= 1 && ticks_per_beat >= 1 && bars_per_cycle >= 1);
        Self {
            beats_per_bar: beats_per_bar.max(1),
            ticks_per_beat: ticks_per_beat.max(1),
            bars_per_cycle: bars_per_cycle.max(1),
            beat: 0,
            sub_beat: 0,
            bar_in_cycle: 0,
            bars_elapsed: 0,
        }
    }

    /// The tick that the next `advance` will consume
    pub fn peek(&self) -> Tick {
        Tick {
            beat: self.beat,
            sub_beat: self.sub_beat,
            bar_in_cycle: self.bar_in_cycle,
            bars_elapsed: self.bars_elapsed,
            beats_per_bar: self.beats_per_bar,
        }
    }

    /// Consume the current tick and move to the next one
    pub fn advance(&mut self) -> Tick {
        let tick = self.peek();

        self.sub_beat += 1;
        if self.sub_beat == self.ticks_per_beat {
            self.sub_beat = 0;
            self.beat += 1;
            if self.beat == self.beats_per_bar {
                self.beat = 0;
                self.bars_elapsed += 1;
                self.bar_in_cycle = (self.bar_in_cycle + 1) % self.bars_per_cycle;
            }
        }

        tick
    }

    /// Back to bar 0, beat 0, sub-beat 0
    pub fn reset(&mut self) {
        self.beat = 0;
        self.sub_beat = 0;
        self.bar_in_cycle = 0;
        self.bars_elapsed = 0;
    }

    pub fn bars_elapsed(&self) -> u64 {
        self.bars_elapsed
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn ticks_per_beat(&self) -> u32 {
        self.ticks_per_beat
    }

    pub fn bars_per_cycle(&self) -> u32 {
        self.bars_per_cycle
    }
}
