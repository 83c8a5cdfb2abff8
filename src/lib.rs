pub mod audio_data;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod mixer;
pub(crate) mod playback;
pub mod spatial;
pub mod voice;
pub mod world;

pub use audio_data::{AudioData, AudioDataLoader, DefaultAudioLoader};
pub use catalog::{SoundCatalog, SoundId, SoundPolicy};
pub use config::EngineConfig;
pub use engine::{AudioFillCallback, EmberSonicEngine};
pub use error::EmberSonicError;
pub use math::Vec3;
pub use mixer::Renderer;
pub use spatial::Listener;
pub use voice::VoiceId;
pub use world::EmberSonicWorld;
