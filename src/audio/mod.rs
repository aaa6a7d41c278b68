// Module audio - Audio clock, click sinks and the CPAL output stream

pub mod engine;
pub mod sink;
pub mod timing;
