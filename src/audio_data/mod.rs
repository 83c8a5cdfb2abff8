mod default_loader;
mod loader;
mod resampler;

use crate::error::{EmberSonicError, Result};
pub use default_loader::DefaultAudioLoader;
pub use loader::AudioDataLoader;
pub use resampler::AudioResampler;
use std::time::Duration;

/// Decoded audio asset.
///
/// Samples are stored as interleaved f32 frames (`[L0, R0, L1, R1, ...]` for
/// stereo, `[M0, M1, ...]` for mono). The buffer is immutable once created;
/// the engine shares it with the mix thread behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AudioData {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
    total_frames: usize,
}

impl AudioData {
    /// Wraps raw interleaved samples. `samples.len()` must be a multiple of
    /// `channels`; trailing partial frames are truncated.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let channels = channels.max(1);
        let total_frames = samples.len() / channels as usize;
        samples.truncate(total_frames * channels as usize);
        let duration = Duration::from_secs_f64(total_frames as f64 / sample_rate.max(1) as f64);
        Self {
            samples,
            sample_rate,
            channels,
            duration,
            total_frames,
        }
    }

    /// A mono run of silence. Used as the placeholder of last resort when the
    /// first catalog load fails.
    pub fn silent(duration: Duration, sample_rate: u32) -> Self {
        let frames = (duration.as_secs_f64() * sample_rate as f64).ceil() as usize;
        Self::new(vec![0.0; frames.max(1)], sample_rate, 1)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Downmixes all channels into one by averaging each frame.
    pub fn to_mono(&self) -> Self {
        if self.channels == 1 {
            return self.clone();
        }

        let mono: Vec<f32> = self
            .samples
            .chunks(self.channels as usize)
            .map(|frame| frame.iter().sum::<f32>() / self.channels as f32)
            .collect();

        Self::new(mono, self.sample_rate, 1)
    }

    /// Resamples to `target_sample_rate`, returning a new buffer.
    pub fn resample(&self, target_sample_rate: u32) -> Result<Self> {
        if target_sample_rate == self.sample_rate {
            return Ok(self.clone());
        }
        if target_sample_rate == 0 {
            return Err(EmberSonicError::AudioFormat(
                "Target sample rate must be greater than 0".to_string(),
            ));
        }

        let resampler =
            AudioResampler::new(self.sample_rate, target_sample_rate, self.channels, None)?;
        let resampled = resampler.resample_interleaved(&self.samples)?;
        Ok(Self::new(resampled, target_sample_rate, self.channels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_partial_frames() {
        let data = AudioData::new(vec![0.1, 0.2, 0.3, 0.4, 0.5], 44100, 2);
        assert_eq!(data.total_frames(), 2);
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn downmix_averages_frames() {
        let data = AudioData::new(vec![1.0, 0.0, 0.5, 0.5], 44100, 2);
        let mono = data.to_mono();
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.samples(), &[0.5, 0.5]);
    }

    #[test]
    fn silent_placeholder_has_frames() {
        let data = AudioData::silent(Duration::from_millis(100), 44100);
        assert_eq!(data.channels(), 1);
        assert_eq!(data.total_frames(), 4410);
        assert!(data.samples().iter().all(|s| *s == 0.0));
    }
}
