use crate::audio_data::AudioData;
use crate::error::Result;
use std::sync::Arc;

/// Decode seam for the sound catalog.
///
/// The catalog calls this once per `load`; implementations may block on disk
/// and decode work since loading never runs on the audio thread. The built-in
/// [`DefaultAudioLoader`](crate::audio_data::DefaultAudioLoader) decodes via
/// Symphonia; tests and tools can substitute generated buffers.
pub trait AudioDataLoader {
    fn load(&self, path: &str) -> Result<Arc<AudioData>>;
}
