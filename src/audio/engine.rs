// Audio engine - CPAL output stream rendering scheduled clicks
//
// The callback is the audio clock: it advances `AudioTiming` by the number of
// frames written, and starts each click on the exact frame it was scheduled
// for. Supports F32, I16 and U16 device formats; everything is rendered in
// f32 and converted when written to the interleaved output.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::{error, info};
use ringbuf::traits::Consumer;

use crate::audio::sink::{ClickConsumer, ClickQueue, ScheduledClick};
use crate::audio::timing::AudioTiming;
use crate::sequencer::metronome::Metronome;

/// Clicks that can be queued between the scheduler and the callback
const CLICK_QUEUE_CAPACITY: usize = 256;

/// Clicks held inside the callback waiting for their frame
const PENDING_CAPACITY: usize = 64;

/// Audio engine error types
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,

    #[error("Default output config unavailable: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Stream creation failed: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Stream start failed: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
}

/// Callback-side state: pulls scheduled clicks and renders them on time
pub struct ClickRenderer {
    consumer: ClickConsumer,
    pending: Vec<ScheduledClick>,
    metronome: Metronome,
    timing: AudioTiming,
}

impl ClickRenderer {
    pub fn new(consumer: ClickConsumer, timing: AudioTiming, volume: f32) -> Self {
        let mut metronome = Metronome::new(timing.sample_rate() as f32);
        metronome.set_volume(volume);

        Self {
            consumer,
            pending: Vec::with_capacity(PENDING_CAPACITY),
            metronome,
            timing,
        }
    }

    /// Render one interleaved buffer and advance the audio clock.
    /// No allocation, no locks.
    pub fn render<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: Sample + FromSample<f32>,
    {
        while self.pending.len() < PENDING_CAPACITY {
            match self.consumer.try_pop() {
                Some(click) => self.pending.push(click),
                None => break,
            }
        }

        let channels = channels.max(1);
        let start = self.timing.current_sample();
        let mut frames = 0usize;

        for (offset, frame) in data.chunks_mut(channels).enumerate() {
            let position = start + offset as u64;

            // Late clicks start immediately; the latest due one wins
            let mut due = None;
            let mut i = 0;
            while i < self.pending.len() {
                if self.pending[i].at_sample <= position {
                    let click = self.pending.swap_remove(i);
                    if due.is_none_or(|d: ScheduledClick| click.at_sample >= d.at_sample) {
                        due = Some(click);
                    }
                } else {
                    i += 1;
                }
            }
            if let Some(click) = due {
                self.metronome.trigger_click(click.role);
            }

            let sample = self.metronome.process_sample();
            for channel_sample in frame.iter_mut() {
                *channel_sample = Sample::from_sample::<f32>(sample);
            }
            frames += 1;
        }

        self.timing.advance(frames);
    }
}

pub struct AudioEngine {
    _device: Device,
    _stream: Stream,
    timing: AudioTiming,
    sample_rate: f32,
}

impl AudioEngine {
    /// Open the default output device and start the click stream.
    /// Returns the engine and the sink the scheduler writes to.
    pub fn new(click_volume: f32) -> Result<(Self, ClickQueue), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        info!(
            "Audio device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        info!("Audio config: {:?}", supported_config);

        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        let timing = AudioTiming::new(sample_rate);
        let (queue, consumer) = ClickQueue::new(CLICK_QUEUE_CAPACITY, timing.clone());
        let renderer = ClickRenderer::new(consumer, timing.clone(), click_volume);

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, channels, renderer),
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, channels, renderer),
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, channels, renderer),
            other => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "{:?}. Supported formats: F32, I16, U16",
                    other
                )));
            }
        }?;

        stream.play()?;

        Ok((
            Self {
                _device: device,
                _stream: stream,
                timing,
                sample_rate,
            },
            queue,
        ))
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        mut renderer: ClickRenderer,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                renderer.render(data, channels);
            },
            move |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )?;

        Ok(stream)
    }

    /// Audio clock shared with the callback
    pub fn timing(&self) -> AudioTiming {
        self.timing.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}
