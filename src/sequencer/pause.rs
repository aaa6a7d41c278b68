// Pause accounting - Measures paused time on the audio clock

/// Tracks an open pause and reports its length on resume
#[derive(Debug, Clone, Copy, Default)]
pub struct PauseAccountant {
    pause_started: Option<f64>,
}

impl PauseAccountant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pause at `audio_now`. Ignored while already paused.
    pub fn on_pause(&mut self, audio_now: f64) {
        if self.pause_started.is_none() {
            self.pause_started = Some(audio_now);
        }
    }

    /// Close the open pause and return its duration (never negative).
    /// Returns None when no pause was open.
    pub fn on_resume(&mut self, audio_now: f64) -> Option<f64> {
        self.pause_started
            .take()
            .map(|started| (audio_now - started).max(0.0))
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started.is_some()
    }

    pub fn clear(&mut self) {
        self.pause_started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_resume_duration() {
        let mut accountant = PauseAccountant::new();
        accountant.on_pause(4.0);
        assert!(accountant.is_paused());
        assert_eq!(accountant.on_resume(7.5), Some(3.5));
        assert!(!accountant.is_paused());
    }

    #[test]
    fn test_second_pause_keeps_first_start() {
        let mut accountant = PauseAccountant::new();
        accountant.on_pause(1.0);
        accountant.on_pause(2.0);
        assert_eq!(accountant.on_resume(3.0), Some(2.0));
    }

    #[test]
    fn test_resume_without_pause() {
        let mut accountant = PauseAccountant::new();
        assert_eq!(accountant.on_resume(3.0), None);
    }

    #[test]
    fn test_clock_going_backwards_is_clamped() {
        let mut accountant = PauseAccountant::new();
        accountant.on_pause(5.0);
        assert_eq!(accountant.on_resume(4.0), Some(0.0));
    }
}
