//! Sound catalog: loaded assets plus their playback policy.
//!
//! The catalog lives on the control thread. Buffers and policy are immutable
//! after load; the mix thread only ever sees them through `Arc<Sound>` handles
//! carried inside spawn commands, so no lock guards the catalog itself.

use crate::audio_data::{AudioData, AudioDataLoader};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::time::Duration;

/// Stable handle to a loaded sound. Index into the catalog arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(pub(crate) u32);

impl SoundId {
    /// The designated placeholder slot: the first sound ever loaded.
    pub(crate) const PLACEHOLDER: SoundId = SoundId(0);
}

/// Per-sound playback policy, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundPolicy {
    /// Maximum simultaneous voices of this sound (>= 1).
    pub polyphony: u8,
    /// Whether voices of this sound loop until explicitly stopped.
    pub looping: bool,
    /// Distance attenuation coefficient; 0 disables attenuation.
    pub rolloff: f32,
}

/// A loaded asset plus policy and live-voice accounting.
///
/// `live_voices` is incremented by the control thread on admission and
/// decremented by the mix thread on retirement; it is the polyphony cap's
/// source of truth. `next_instance` numbers spawns for diagnostics.
#[derive(Debug)]
pub(crate) struct Sound {
    pub data: Arc<AudioData>,
    pub policy: SoundPolicy,
    pub name: String,
    pub live_voices: AtomicU32,
    pub next_instance: AtomicU32,
}

pub struct SoundCatalog {
    sounds: Vec<Arc<Sound>>,
    by_name: HashMap<String, SoundId>,
    sample_rate: u32,
}

impl SoundCatalog {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sounds: Vec::new(),
            by_name: HashMap::new(),
            sample_rate,
        }
    }

    /// Decodes the asset at `path` and registers it under its file name.
    ///
    /// A failed decode never surfaces as an error: the placeholder sound's id
    /// is returned instead so callers holding the result can always play
    /// *something*. The first successfully loaded sound is the placeholder;
    /// if the very first load fails, a built-in run of silence takes that
    /// slot so the guarantee holds unconditionally.
    pub fn load(
        &mut self,
        loader: &dyn AudioDataLoader,
        path: &str,
        polyphony: u8,
        looping: bool,
        rolloff: f32,
    ) -> SoundId {
        let polyphony = polyphony.max(1);
        let rolloff = if rolloff.is_finite() {
            rolloff.max(0.0)
        } else {
            0.0
        };

        log::info!("Loading sound at {}", path);

        let data = match loader.load(path) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to load {}: {}, substituting placeholder", path, e);
                return self.placeholder();
            }
        };

        // Positional voices are panned per tick from a single channel, so
        // assets are stored mono at the engine rate.
        let data = match self.conform(&data) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Failed to conform {}: {}, substituting placeholder", path, e);
                return self.placeholder();
            }
        };

        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path)
            .to_string();

        let id = self.register(Sound {
            data,
            policy: SoundPolicy {
                polyphony,
                looping,
                rolloff,
            },
            name: name.clone(),
            live_voices: AtomicU32::new(0),
            next_instance: AtomicU32::new(0),
        });

        if let Some(previous) = self.by_name.insert(name, id) {
            log::debug!("Sound name re-registered, was {:?}", previous);
        }

        id
    }

    /// Resolves a previously loaded sound by file name. Unknown names resolve
    /// to the placeholder; this must not be called once playback is hot
    /// enough that string hashing matters, and never from the mix thread.
    pub fn lookup(&mut self, name: &str) -> SoundId {
        match self.by_name.get(name) {
            Some(id) => *id,
            None => {
                log::warn!("Unknown sound name {:?}, substituting placeholder", name);
                self.placeholder()
            }
        }
    }

    pub fn policy(&self, id: SoundId) -> Option<SoundPolicy> {
        self.sounds.get(id.0 as usize).map(|s| s.policy)
    }

    pub fn is_looping(&self, id: SoundId) -> bool {
        self.policy(id).is_some_and(|p| p.looping)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    pub(crate) fn get(&self, id: SoundId) -> Option<&Arc<Sound>> {
        self.sounds.get(id.0 as usize)
    }

    /// Id of the placeholder sound, installing the built-in silent one when
    /// nothing has loaded successfully yet.
    pub(crate) fn placeholder(&mut self) -> SoundId {
        if self.sounds.is_empty() {
            log::warn!("No sound loaded yet, installing built-in silent placeholder");
            self.register(Sound {
                data: Arc::new(AudioData::silent(
                    Duration::from_millis(100),
                    self.sample_rate,
                )),
                policy: SoundPolicy {
                    polyphony: 1,
                    looping: false,
                    rolloff: 0.0,
                },
                name: String::new(),
                live_voices: AtomicU32::new(0),
                next_instance: AtomicU32::new(0),
            });
        }
        SoundId::PLACEHOLDER
    }

    fn register(&mut self, sound: Sound) -> SoundId {
        let id = SoundId(self.sounds.len() as u32);
        self.sounds.push(Arc::new(sound));
        id
    }

    fn conform(&self, data: &Arc<AudioData>) -> crate::error::Result<Arc<AudioData>> {
        let mono = data.to_mono();
        let conformed = if mono.sample_rate() != self.sample_rate {
            mono.resample(self.sample_rate)?
        } else {
            mono
        };
        Ok(Arc::new(conformed))
    }
}
