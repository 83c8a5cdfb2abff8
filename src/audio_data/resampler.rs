use crate::error::{EmberSonicError, Result};

/// Offline sample-rate converter used at load time.
///
/// Conversion happens once per asset when the catalog ingests it, so the mix
/// path always reads buffers already at the engine rate.
pub struct AudioResampler {
    source_sample_rate: u32,
    target_sample_rate: u32,
    channels: u16,
    chunk_size: usize,
}

impl AudioResampler {
    pub fn new(
        source_sample_rate: u32,
        target_sample_rate: u32,
        channels: u16,
        chunk_size: Option<usize>,
    ) -> Result<Self> {
        if source_sample_rate == 0 || target_sample_rate == 0 {
            return Err(EmberSonicError::AudioFormat(
                "Sample rates must be greater than 0".to_string(),
            ));
        }
        if channels == 0 {
            return Err(EmberSonicError::AudioFormat(
                "Channel count must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            source_sample_rate,
            target_sample_rate,
            channels,
            chunk_size: chunk_size.unwrap_or(1024),
        })
    }

    /// Resamples one planar channel.
    pub fn resample_channel(&self, channel_samples: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(channel_samples.to_vec());
        }

        use rubato::{FftFixedIn, Resampler};

        let mut resampler = FftFixedIn::new(
            self.source_sample_rate as usize,
            self.target_sample_rate as usize,
            self.chunk_size,
            2, // sub_chunks
            1, // single channel
        )
        .map_err(|e| EmberSonicError::AudioLoading(format!("Failed to create resampler: {}", e)))?;

        let mut output = Vec::new();
        let mut input_index = 0;

        while input_index < channel_samples.len() {
            let remaining = channel_samples.len() - input_index;
            let to_process = remaining.min(self.chunk_size);
            if to_process == 0 {
                break;
            }

            // Pad the final chunk to chunk_size
            let mut input_chunk = vec![0.0f32; self.chunk_size];
            input_chunk[..to_process]
                .copy_from_slice(&channel_samples[input_index..input_index + to_process]);

            let waves_in = vec![input_chunk];
            let waves_out = resampler
                .process(&waves_in, None)
                .map_err(|e| EmberSonicError::AudioLoading(format!("Resampling error: {}", e)))?;

            if let Some(first_channel) = waves_out.first() {
                output.extend_from_slice(first_channel);
            }

            input_index += to_process;
        }

        Ok(output)
    }

    /// Resamples an interleaved buffer, preserving the channel count.
    pub fn resample_interleaved(&self, interleaved: &[f32]) -> Result<Vec<f32>> {
        if self.source_sample_rate == self.target_sample_rate {
            return Ok(interleaved.to_vec());
        }

        let channels = self.channels as usize;
        let mut resampled_channels = Vec::with_capacity(channels);
        for ch in 0..channels {
            let channel_data: Vec<f32> = interleaved
                .chunks(channels)
                .map(|frame| frame.get(ch).copied().unwrap_or(0.0))
                .collect();
            resampled_channels.push(self.resample_channel(&channel_data)?);
        }

        let new_frames = resampled_channels.first().map_or(0, |c| c.len());
        let mut out = Vec::with_capacity(new_frames * channels);
        for frame_idx in 0..new_frames {
            for channel in &resampled_channels {
                out.push(channel.get(frame_idx).copied().unwrap_or(0.0));
            }
        }

        Ok(out)
    }

    pub fn resample_ratio(&self) -> f64 {
        self.target_sample_rate as f64 / self.source_sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_when_rates_match() {
        let resampler = AudioResampler::new(44100, 44100, 2, None).unwrap();
        let input = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resampler.resample_interleaved(&input).unwrap(), input);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(AudioResampler::new(0, 44100, 2, None).is_err());
        assert!(AudioResampler::new(44100, 0, 2, None).is_err());
        assert!(AudioResampler::new(44100, 48000, 0, None).is_err());
    }

    #[test]
    fn output_length_tracks_ratio() {
        let resampler = AudioResampler::new(22050, 44100, 1, None).unwrap();
        let input = vec![0.5f32; 22050];
        let output = resampler.resample_channel(&input).unwrap();
        // FFT chunking pads the tail, so allow one chunk of slack.
        let expected = (input.len() as f64 * resampler.resample_ratio()) as usize;
        assert!(output.len() >= expected);
        assert!(output.len() <= expected + 4096);
    }
}
