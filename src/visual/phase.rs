// Phase engine - Visual sweep position driven by tempo
//
// Advanced once per render frame with the frame delta and a BPM snapshot.
// Never reads the audio clock.

use crate::sequencer::timeline::Tempo;

/// Frames of wind-down after stop (~400ms at 60 fps)
pub const FADE_FRAMES: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseState {
    Idle,
    Running,
    Frozen,
}

#[derive(Debug, Clone)]
pub struct PhaseEngine {
    units_per_cycle: f64,
    phase: f64,
    state: PhaseState,
    fade_frames_left: u32,
}

impl PhaseEngine {
    pub fn new(units_per_cycle: f64) -> Self {
        Self {
            units_per_cycle,
            phase: 0.0,
            state: PhaseState::Idle,
            fade_frames_left: 0,
        }
    }

    /// Phase units covered in `frame_delta_ms` at `tempo`
    pub fn phase_delta(&self, frame_delta_ms: f64, tempo: Tempo) -> f64 {
        if !frame_delta_ms.is_finite() || frame_delta_ms <= 0.0 {
            return 0.0;
        }
        frame_delta_ms * self.units_per_cycle * tempo.bpm() as f64 / 60_000.0
    }

    /// Advance by one frame; returns the delta applied (0 unless running)
    pub fn tick(&mut self, frame_delta_ms: f64, tempo: Tempo) -> f64 {
        if self.state != PhaseState::Running {
            return 0.0;
        }
        let delta = self.phase_delta(frame_delta_ms, tempo);
        self.phase += delta;
        delta
    }

    /// Advance by one frame and return the running phase
    pub fn advance(&mut self, frame_delta_ms: f64, tempo: Tempo) -> f64 {
        self.tick(frame_delta_ms, tempo);
        self.phase
    }

    /// Step the wind-down by one frame and return the alpha to draw with
    pub fn fade_advance(&mut self) -> f32 {
        if self.fade_frames_left > 0 {
            self.fade_frames_left -= 1;
            if self.fade_frames_left == 0 {
                self.phase = 0.0;
            }
        }
        self.fade_alpha()
    }

    pub fn start(&mut self) {
        self.phase = 0.0;
        self.state = PhaseState::Running;
        self.fade_frames_left = 0;
    }

    pub fn pause(&mut self) {
        if self.state == PhaseState::Running {
            self.state = PhaseState::Frozen;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PhaseState::Frozen {
            self.state = PhaseState::Running;
        }
    }

    /// Stop advancing and begin the wind-down. The phase is kept for
    /// drawing until the fade reaches zero.
    pub fn stop(&mut self) {
        if self.state == PhaseState::Idle {
            return;
        }
        self.state = PhaseState::Idle;
        self.fade_frames_left = FADE_FRAMES;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// 1.0 while started, then ramps to 0.0 over the wind-down
    pub fn fade_alpha(&self) -> f32 {
        match self.state {
            PhaseState::Running | PhaseState::Frozen => 1.0,
            PhaseState::Idle => self.fade_frames_left as f32 / FADE_FRAMES as f32,
        }
    }

    pub fn is_fading(&self) -> bool {
        self.fade_frames_left > 0
    }

    pub fn is_running(&self) -> bool {
        self.state == PhaseState::Running
    }

    pub fn units_per_cycle(&self) -> f64 {
        self.units_per_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_formula() {
        let engine = PhaseEngine::new(400.0);
        // 1s at 60 BPM = one beat = one cycle
        assert_eq!(engine.phase_delta(1000.0, Tempo::new(60)), 400.0);
        assert_eq!(engine.phase_delta(500.0, Tempo::new(120)), 400.0);
        assert_eq!(engine.phase_delta(-16.0, Tempo::new(120)), 0.0);
    }

    #[test]
    fn test_idle_engine_does_not_move() {
        let mut engine = PhaseEngine::new(400.0);
        assert_eq!(engine.advance(16.0, Tempo::new(120)), 0.0);
    }

    #[test]
    fn test_pause_freezes_phase() {
        let mut engine = PhaseEngine::new(100.0);
        engine.start();
        engine.advance(600.0, Tempo::new(100));
        assert_eq!(engine.phase(), 100.0);

        engine.pause();
        assert_eq!(engine.tick(600.0, Tempo::new(100)), 0.0);
        assert_eq!(engine.phase(), 100.0);

        engine.resume();
        assert_eq!(engine.advance(600.0, Tempo::new(100)), 200.0);
    }

    #[test]
    fn test_phase_is_monotonic_across_tempo_changes() {
        let mut engine = PhaseEngine::new(400.0);
        engine.start();
        let mut last = 0.0;
        for bpm in (60..=300).step_by(5) {
            let phase = engine.advance(16.7, Tempo::new(bpm));
            assert!(phase > last);
            last = phase;
        }
    }

    #[test]
    fn test_fade_after_stop() {
        let mut engine = PhaseEngine::new(400.0);
        engine.start();
        engine.advance(100.0, Tempo::new(120));
        engine.stop();
        assert!(engine.is_fading());

        let alphas: Vec<f32> = (0..FADE_FRAMES).map(|_| engine.fade_advance()).collect();
        assert!(alphas.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(*alphas.last().unwrap(), 0.0);
        assert!(!engine.is_fading());
        assert_eq!(engine.phase(), 0.0);

        // Further calls stay at zero
        assert_eq!(engine.fade_advance(), 0.0);
    }

    #[test]
    fn test_restart_cancels_fade() {
        let mut engine = PhaseEngine::new(400.0);
        engine.start();
        engine.stop();
        engine.fade_advance();
        engine.start();
        assert!(!engine.is_fading());
        assert_eq!(engine.fade_alpha(), 1.0);
        assert_eq!(engine.phase(), 0.0);
    }
}
