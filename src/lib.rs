// Tempo Ramp - Library exports for the binary, tests and benchmarks

pub mod audio;
pub mod config;
pub mod logging;
pub mod messaging;
pub mod sequencer;
pub mod session;
pub mod visual;

// Re-export commonly used types for convenience
pub use audio::engine::{AudioEngine, AudioError};
pub use audio::sink::{ClickQueue, RecordingSink, ToneSink};
pub use audio::timing::{AudioClock, AudioTiming, ManualClock};
pub use config::{ConfigError, ProgressionSettings, SessionConfig};
pub use messaging::beat_events::BeatChange;
pub use messaging::channels::create_command_channel;
pub use sequencer::{
    ClickRole, LookaheadScheduler, Subdivision, Tempo, TempoIncrement, TimeSignature, TimingCore,
    TransportState,
};
pub use session::{FrameState, Session};
pub use visual::PhaseEngine;
