// Timeline - Musical value types shared by the timing core
// Tempo, meter (time signature + subdivision) and the tempo step size

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time signature (numerator/denominator)
/// Example: 4/4 time = TimeSignature { numerator: 4, denominator: 4 }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,   // Beats per bar
    pub denominator: u8, // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Time signatures offered by the practice metronome
    pub const SUPPORTED: [TimeSignature; 7] = [
        TimeSignature::const_new(2, 4),
        TimeSignature::const_new(3, 4),
        TimeSignature::const_new(4, 4),
        TimeSignature::const_new(5, 4),
        TimeSignature::const_new(6, 8),
        TimeSignature::const_new(7, 8),
        TimeSignature::const_new(12, 8),
    ];

    const fn const_new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Creates a new time signature
    pub fn new(numerator: u8, denominator: u8) -> Self {
        assert!(numerator > 0, "Time signature numerator must be > 0");
        assert!(
            denominator.is_power_of_two(),
            "Time signature denominator must be power of 2"
        );
        Self::const_new(numerator, denominator)
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// Common 3/4 time signature (waltz)
    pub fn three_four() -> Self {
        Self::new(3, 4)
    }

    /// Common 6/8 time signature
    pub fn six_eight() -> Self {
        Self::new(6, 8)
    }

    /// Number of counted beats per bar
    pub fn beats_per_bar(&self) -> u32 {
        self.numerator as u32
    }

    /// Whether this signature belongs to the offered set
    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Number of ticks each counted beat is split into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Subdivision {
    #[default]
    Quarter,
    Eighth,
    Triplet,
    Sixteenth,
}

impl Subdivision {
    pub const ALL: [Subdivision; 4] = [
        Subdivision::Quarter,
        Subdivision::Eighth,
        Subdivision::Triplet,
        Subdivision::Sixteenth,
    ];

    /// Ticks per beat (always >= 1)
    pub fn ticks_per_beat(self) -> u32 {
        match self {
            Subdivision::Quarter => 1,
            Subdivision::Eighth => 2,
            Subdivision::Triplet => 3,
            Subdivision::Sixteenth => 4,
        }
    }
}

/// Tempo step applied on each progression bump.
/// Serialized as its plain BPM value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TempoIncrement {
    One,
    Two,
    Three,
    Four,
    #[default]
    Five,
    Ten,
}

impl TempoIncrement {
    pub fn bpm(self) -> u16 {
        match self {
            TempoIncrement::One => 1,
            TempoIncrement::Two => 2,
            TempoIncrement::Three => 3,
            TempoIncrement::Four => 4,
            TempoIncrement::Five => 5,
            TempoIncrement::Ten => 10,
        }
    }
}

impl TryFrom<u16> for TempoIncrement {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TempoIncrement::One),
            2 => Ok(TempoIncrement::Two),
            3 => Ok(TempoIncrement::Three),
            4 => Ok(TempoIncrement::Four),
            5 => Ok(TempoIncrement::Five),
            10 => Ok(TempoIncrement::Ten),
            other => Err(format!(
                "unsupported tempo increment {other} (expected 1, 2, 3, 4, 5 or 10)"
            )),
        }
    }
}

impl From<TempoIncrement> for u16 {
    fn from(increment: TempoIncrement) -> Self {
        increment.bpm()
    }
}

/// Tempo in whole BPM (Beats Per Minute)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tempo {
    bpm: u16,
}

impl Tempo {
    pub const MIN_BPM: u16 = 1;
    pub const MAX_BPM: u16 = 300;

    /// Creates a new tempo
    /// BPM must be in range [1, 300]
    pub fn new(bpm: u16) -> Self {
        assert!(
            (Self::MIN_BPM..=Self::MAX_BPM).contains(&bpm),
            "BPM must be between 1 and 300"
        );
        Self { bpm }
    }

    /// Get BPM value
    pub fn bpm(&self) -> u16 {
        self.bpm
    }

    /// Duration of one beat in seconds
    pub fn beat_duration_seconds(&self) -> f64 {
        60.0 / self.bpm as f64
    }

    /// Duration of one tick (beat / subdivision) in seconds
    pub fn tick_duration_seconds(&self, subdivision: Subdivision) -> f64 {
        self.beat_duration_seconds() / subdivision.ticks_per_beat() as f64
    }

    /// Tempo one progression step higher, saturating at MAX_BPM
    pub fn bumped(&self, increment: TempoIncrement) -> Self {
        Self {
            bpm: self.bpm.saturating_add(increment.bpm()).min(Self::MAX_BPM),
        }
    }

    pub fn is_max(&self) -> bool {
        self.bpm == Self::MAX_BPM
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self::new(120)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}
