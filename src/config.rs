//! Engine configuration

/// Configuration for an EmberSonic engine instance.
///
/// The defaults match a typical game SFX setup: 44.1 kHz stereo output with a
/// 512-frame block and room for 64 simultaneous voices. Every loaded sound is
/// resampled to `sample_rate` at load time so the mix path never resamples.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Number of output channels. The mixer renders stereo; only 2 is accepted.
    pub channels: u16,
    /// Frames requested per audio callback.
    pub block_size: usize,
    /// Total voice slots shared by all sounds.
    pub max_voices: usize,
    /// Length of the fade applied by an explicit stop, in frames.
    pub stop_fade_frames: u32,
    /// Capacity of the control-to-audio command queue.
    pub command_queue_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 2,
            block_size: 512,
            max_voices: 64,
            stop_fade_frames: 256,
            command_queue_size: 256,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }

    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size;
        self
    }

    pub fn max_voices(mut self, max: usize) -> Self {
        self.max_voices = max;
        self
    }

    pub fn stop_fade_frames(mut self, frames: u32) -> Self {
        self.stop_fade_frames = frames;
        self
    }

    pub fn command_queue_size(mut self, size: usize) -> Self {
        self.command_queue_size = size;
        self
    }

    pub(crate) fn validate(&self) -> crate::error::Result<()> {
        use crate::error::EmberSonicError;

        if self.sample_rate == 0 {
            return Err(EmberSonicError::Configuration(
                "Sample rate must be greater than 0".to_string(),
            ));
        }
        if self.channels != 2 {
            return Err(EmberSonicError::Configuration(format!(
                "Only stereo output is supported, got {} channels",
                self.channels
            )));
        }
        if self.block_size == 0 {
            return Err(EmberSonicError::Configuration(
                "Block size must be greater than 0".to_string(),
            ));
        }
        if self.max_voices == 0 || self.max_voices > u16::MAX as usize {
            return Err(EmberSonicError::Configuration(format!(
                "Voice slot count must be in 1..={}, got {}",
                u16::MAX,
                self.max_voices
            )));
        }
        if self.command_queue_size == 0 {
            return Err(EmberSonicError::Configuration(
                "Command queue size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
