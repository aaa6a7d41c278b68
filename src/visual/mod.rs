// Visual module - Render-side timing (no drawing)

pub mod phase;

pub use phase::{FADE_FRAMES, PhaseEngine};
