use crate::audio_data::{AudioData, AudioDataLoader};
use crate::error::{EmberSonicError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Default audio loader backed by the Symphonia decoder library.
///
/// Decodes WAV, OGG, MP3, FLAC and friends into interleaved f32 PCM. Format
/// and codec are probed from the container, with the file extension as a hint.
pub struct DefaultAudioLoader;

impl AudioDataLoader for DefaultAudioLoader {
    fn load(&self, path: &str) -> Result<Arc<AudioData>> {
        let file = File::open(path).map_err(|e| {
            EmberSonicError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, e))
        })?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| {
                EmberSonicError::AudioLoading(format!("Failed to probe audio format: {:?}", e))
            })?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| EmberSonicError::AudioLoading("No default audio track".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| EmberSonicError::AudioLoading("Sample rate not found".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| EmberSonicError::AudioLoading("Channel count not found".to_string()))?
            .count() as u16;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| {
                EmberSonicError::AudioLoading(format!("Failed to create decoder: {:?}", e))
            })?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(EmberSonicError::AudioLoading(format!(
                        "Error reading packet: {:?}",
                        e
                    )));
                }
            };

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break, // also EOF in some formats
                Err(Error::DecodeError(_)) => continue, // recoverable corruption
                Err(e) => {
                    return Err(EmberSonicError::AudioLoading(format!(
                        "Error decoding packet: {:?}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let capacity = decoded.capacity();

            let mut tmp = SampleBuffer::<f32>::new(capacity as u64, spec);
            tmp.copy_interleaved_ref(decoded);
            samples.extend_from_slice(tmp.samples());
        }

        if samples.is_empty() {
            return Err(EmberSonicError::AudioLoading(format!(
                "No decodable audio in {}",
                path
            )));
        }

        Ok(Arc::new(AudioData::new(samples, sample_rate, channels)))
    }
}
