// Beat events - Deferred UI updates keyed to audio-clock time
//
// The scheduler queues an update when it schedules a beat; the host drains
// it once the audio clock reaches the beat, so the UI follows what is heard.

use std::collections::VecDeque;

/// Visible state at an audible main beat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatChange {
    pub beat: u32,
    pub bpm: u16,
    pub bars_elapsed: u64,
}

/// Payloads ordered by the audio time they become due
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    pending: VecDeque<(f64, T)>,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, fire_at: f64, payload: T) {
        let index = self.pending.partition_point(|(at, _)| *at <= fire_at);
        self.pending.insert(index, (fire_at, payload));
    }

    /// Remove and return everything due at or before `now`, oldest first
    pub fn drain_due(&mut self, now: f64) -> Vec<T> {
        let due = self.pending.partition_point(|(at, _)| *at <= now);
        self.pending.drain(..due).map(|(_, payload)| payload).collect()
    }

    /// Audio time of the earliest pending payload
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending.front().map(|(at, _)| *at)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
