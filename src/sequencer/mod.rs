// Sequencer module
// Beat counting, tempo progression, lookahead scheduling and transport

pub mod counter;
pub mod metronome;
pub mod pause;
pub mod progression;
pub mod scheduler;
pub mod timeline;
pub mod transport;

pub use counter::{BeatCounter, Tick};
pub use metronome::{ClickRole, Metronome, MetronomeSound};
pub use pause::PauseAccountant;
pub use progression::{
    BarCountProgression, Progression, ProgressionClock, ProgressionController, TempoChange,
    TempoState, TimedProgression,
};
pub use scheduler::{LOOKAHEAD_SECS, LookaheadScheduler, SCHEDULE_INTERVAL_SECS, SchedulerConfig};
pub use timeline::{Subdivision, Tempo, TempoIncrement, TimeSignature};
pub use transport::{TimingCore, TransportState};
