// Tone sinks - Where scheduled clicks go

use crate::audio::timing::AudioTiming;
use crate::sequencer::metronome::ClickRole;
use log::warn;
use ringbuf::traits::{Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

/// Receives clicks at exact audio-clock timestamps
pub trait ToneSink {
    fn emit(&mut self, at: f64, role: ClickRole);
}

impl<T: ToneSink + ?Sized> ToneSink for Box<T> {
    fn emit(&mut self, at: f64, role: ClickRole) {
        (**self).emit(at, role);
    }
}

/// Click addressed to an absolute sample of the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledClick {
    pub at_sample: u64,
    pub role: ClickRole,
}

pub type ClickConsumer = HeapCons<ScheduledClick>;

/// Lock-free queue feeding the audio callback
pub struct ClickQueue {
    producer: HeapProd<ScheduledClick>,
    timing: AudioTiming,
    dropped: u64,
}

impl ClickQueue {
    /// Create the queue; the consumer half belongs to the audio callback
    pub fn new(capacity: usize, timing: AudioTiming) -> (Self, ClickConsumer) {
        let (producer, consumer) = HeapRb::<ScheduledClick>::new(capacity).split();
        (
            Self {
                producer,
                timing,
                dropped: 0,
            },
            consumer,
        )
    }

    /// Clicks lost because the callback fell behind
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl ToneSink for ClickQueue {
    fn emit(&mut self, at: f64, role: ClickRole) {
        let click = ScheduledClick {
            at_sample: self.timing.seconds_to_samples(at),
            role,
        };
        if self.producer.try_push(click).is_err() {
            self.dropped += 1;
            warn!("Click queue full, dropped {:?} click at {:.3}s", role, at);
        }
    }
}

/// Keeps every emitted click; used by tests and offline tools
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub clicks: Vec<(f64, ClickRole)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamps(&self) -> Vec<f64> {
        self.clicks.iter().map(|(at, _)| *at).collect()
    }
}

impl ToneSink for RecordingSink {
    fn emit(&mut self, at: f64, role: ClickRole) {
        self.clicks.push((at, role));
    }
}
