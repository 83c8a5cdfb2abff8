//! Audio device lifecycle: opening the output stream and driving the mix
//! callback.

use crate::config::EngineConfig;
use crate::error::{EmberSonicError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Callback invoked on the audio thread to fill each output block.
///
/// Receives the interleaved f32 buffer, the engine sample rate, and the
/// channel count; returns the number of frames filled.
pub type AudioFillCallback = dyn FnMut(&mut [f32], u32, u16) -> usize + Send;

/// Owns the cpal stream. Construction is cheap; `start` opens the default
/// output device and begins ticking the fill callback. Dropping the engine
/// (or calling `stop`) tears the stream down, which blocks until the audio
/// thread has quiesced, so buffers released afterwards are never touched by
/// an in-flight tick.
pub struct EmberSonicEngine {
    config: EngineConfig,
    stream: Option<cpal::Stream>,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
}

impl EmberSonicEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stream: None,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Opens the default output device and starts the stream, feeding every
    /// block through `fill`. Device failure here is the engine's one fatal
    /// error path.
    pub fn start<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnMut(&mut [f32], u32, u16) -> usize + Send + 'static,
    {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| {
            EmberSonicError::AudioDevice("No default output device available".into())
        })?;

        let stream_config = cpal::StreamConfig {
            channels: self.config.channels,
            sample_rate: cpal::SampleRate(self.config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(self.config.block_size as u32),
        };

        let default_config = device.default_output_config().map_err(|e| {
            EmberSonicError::AudioDevice(format!("Failed to get default config: {}", e))
        })?;

        let fill: Box<AudioFillCallback> = Box::new(fill);
        let stream = match default_config.sample_format() {
            cpal::SampleFormat::F32 => self.create_stream::<f32>(&device, &stream_config, fill)?,
            cpal::SampleFormat::I16 => self.create_stream::<i16>(&device, &stream_config, fill)?,
            cpal::SampleFormat::U16 => self.create_stream::<u16>(&device, &stream_config, fill)?,
            other => {
                return Err(EmberSonicError::AudioFormat(format!(
                    "Unsupported sample format {:?}",
                    other
                )));
            }
        };

        stream
            .play()
            .map_err(|e| EmberSonicError::AudioDevice(format!("Failed to start stream: {}", e)))?;

        log::info!(
            "Audio engine started: {} Hz, {} channels, {}-frame blocks",
            self.config.sample_rate,
            self.config.channels,
            self.config.block_size
        );

        self.stream = Some(stream);
        self.is_running.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stops the stream. Synchronous with respect to the caller: once this
    /// returns, no further mix tick will run.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.is_running.store(false, Ordering::Relaxed);
            drop(stream);
            log::info!("Audio engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Frames rendered since start. Cheap liveness probe for callers.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn create_stream<T>(
        &self,
        device: &cpal::Device,
        stream_config: &cpal::StreamConfig,
        mut fill: Box<AudioFillCallback>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();
        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        // Conversion scratch, sized for the configured block; grows only if
        // the device asks for a larger one.
        let mut scratch = vec![0.0f32; self.config.block_size * channels as usize];

        let stream = device
            .build_output_stream(
                stream_config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    if !is_running.load(Ordering::Relaxed) {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0.0);
                    }
                    let block = &mut scratch[..data.len()];

                    let frames_filled = fill(block, sample_rate, channels);

                    for (out, sample) in data.iter_mut().zip(block.iter()) {
                        *out = T::from_sample(*sample);
                    }

                    frames_processed.fetch_add(frames_filled, Ordering::Relaxed);
                },
                move |err| {
                    log::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| EmberSonicError::AudioDevice(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }
}

impl Drop for EmberSonicEngine {
    fn drop(&mut self) {
        self.stop();
    }
}
