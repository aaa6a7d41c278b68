// Metronome - Click roles and click sound playback
// Pre-generated clicks rendered sample by sample in the audio callback

use super::counter::Tick;
use std::f32::consts::PI;

/// Audible role of a scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRole {
    /// First tick of a bar (accent)
    Downbeat,
    /// First tick of any other beat
    Beat,
    /// Any tick inside a beat
    Subdivision,
}

impl ClickRole {
    /// Role of a tick. In a one-beat bar every beat is a plain `Beat`.
    pub fn for_tick(tick: &Tick) -> Self {
        if !tick.is_beat_start() {
            ClickRole::Subdivision
        } else if tick.beat == 0 && tick.beats_per_bar > 1 {
            ClickRole::Downbeat
        } else {
            ClickRole::Beat
        }
    }

    /// (frequency Hz, amplitude)
    pub fn tone(self) -> (f32, f32) {
        match self {
            ClickRole::Downbeat => (1200.0, 0.6),
            ClickRole::Beat => (800.0, 0.4),
            ClickRole::Subdivision => (600.0, 0.25),
        }
    }
}

/// Metronome click sound generator
/// Pre-generates short click samples for low CPU overhead
#[derive(Debug, Clone)]
pub struct MetronomeSound {
    downbeat_samples: Vec<f32>,
    beat_samples: Vec<f32>,
    subdivision_samples: Vec<f32>,
}

impl MetronomeSound {
    /// Duration of click
    const CLICK_DURATION_MS: f32 = 10.0;

    /// Create new metronome sound generator
    pub fn new(sample_rate: f32) -> Self {
        let click_samples = ((Self::CLICK_DURATION_MS / 1000.0) * sample_rate) as usize;
        let render = |role: ClickRole| {
            let (frequency, amplitude) = role.tone();
            Self::generate_click(sample_rate, click_samples, frequency, amplitude)
        };

        Self {
            downbeat_samples: render(ClickRole::Downbeat),
            beat_samples: render(ClickRole::Beat),
            subdivision_samples: render(ClickRole::Subdivision),
        }
    }

    /// Generate a short click sound using sine wave with envelope
    fn generate_click(
        sample_rate: f32,
        num_samples: usize,
        frequency: f32,
        amplitude: f32,
    ) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / sample_rate;

        (0..num_samples)
            .map(|i| {
                // Exponential decay envelope
                let t = i as f32 / num_samples as f32;
                let envelope = (-t * 8.0).exp();
                (i as f32 * phase_increment).sin() * envelope * amplitude
            })
            .collect()
    }

    /// Get click samples for given role
    pub fn get_click(&self, role: ClickRole) -> &[f32] {
        match role {
            ClickRole::Downbeat => &self.downbeat_samples,
            ClickRole::Beat => &self.beat_samples,
            ClickRole::Subdivision => &self.subdivision_samples,
        }
    }

    /// Get duration of click in samples
    pub fn click_duration(&self) -> usize {
        self.downbeat_samples.len()
    }
}

/// Active click playback state
#[derive(Debug, Clone, Copy)]
struct ClickPlayback {
    role: ClickRole,
    position: usize, // Current position in click buffer
}

/// Click voice used by the audio callback.
/// A new trigger replaces the click that is still sounding.
#[derive(Debug, Clone)]
pub struct Metronome {
    sound: MetronomeSound,
    volume: f32,
    current_click: Option<ClickPlayback>,
}

impl Metronome {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sound: MetronomeSound::new(sample_rate),
            volume: 0.5,
            current_click: None,
        }
    }

    /// Set volume (0.0 to 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Start a click from its first sample
    pub fn trigger_click(&mut self, role: ClickRole) {
        self.current_click = Some(ClickPlayback { role, position: 0 });
    }

    /// Process one sample of metronome output
    /// Returns the click sample (0.0 if no click active)
    pub fn process_sample(&mut self) -> f32 {
        if let Some(ref mut playback) = self.current_click {
            let click_samples = self.sound.get_click(playback.role);

            if playback.position < click_samples.len() {
                let sample = click_samples[playback.position] * self.volume;
                playback.position += 1;
                return sample;
            }

            // Click finished
            self.current_click = None;
        }

        0.0
    }

    pub fn is_sounding(&self) -> bool {
        self.current_click.is_some()
    }

    pub fn reset(&mut self) {
        self.current_click = None;
    }
}
