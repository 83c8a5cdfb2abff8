//! The control-thread surface of the engine.
//!
//! `EmberSonicWorld` owns the sound catalog and the control side of the voice
//! pool, and forwards playback requests to the mix thread. It is built for a
//! game loop: every method is cheap, nothing blocks on the audio thread, and
//! operations on handles that have gone stale are silent no-ops.

use crate::audio_data::{AudioDataLoader, DefaultAudioLoader};
use crate::catalog::{SoundCatalog, SoundId};
use crate::config::EngineConfig;
use crate::engine::EmberSonicEngine;
use crate::error::Result;
use crate::math::Vec3;
use crate::mixer::{Renderer, SfxVolume};
use crate::playback::Command;
use crate::spatial::ListenerCell;
use crate::voice::{VoiceId, VoicePool};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// Main handle to the audio engine.
///
/// # Architecture
///
/// - **Control thread**: owns the `EmberSonicWorld`, loads sounds, issues
///   play/stop/position/listener updates once per frame.
/// - **Audio thread**: the device callback drives a [`Renderer`] that applies
///   queued commands and mixes every live voice each tick.
///
/// Admission control happens here, synchronously: `play` claims a voice slot
/// and bumps the sound's live-voice count before the spawn command is queued,
/// so a sound's polyphony cap holds at every instant and `is_playing` is true
/// the moment `play` returns.
pub struct EmberSonicWorld {
    engine: Option<EmberSonicEngine>,
    config: EngineConfig,
    catalog: SoundCatalog,
    pool: Arc<VoicePool>,
    commands: Sender<Command>,
    listener: Arc<ListenerCell>,
    volume: Arc<SfxVolume>,
}

impl EmberSonicWorld {
    /// Opens the default output device and starts mixing. This is the one
    /// place a fatal error can surface; everything after init degrades
    /// gracefully instead of failing.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let (mut world, mut renderer) = Self::offline(config.clone())?;
        let mut engine = EmberSonicEngine::new(config)?;
        engine.start(move |block, _sample_rate, _channels| renderer.render(block))?;
        world.engine = Some(engine);
        Ok(world)
    }

    /// Builds the world without opening a device, handing back the renderer
    /// so the caller drives mix ticks directly. Used for offline rendering
    /// and headless tests.
    pub fn offline(config: EngineConfig) -> Result<(Self, Renderer)> {
        config.validate()?;

        let (sender, receiver) = crossbeam_channel::bounded(config.command_queue_size);
        let pool = Arc::new(VoicePool::new(config.max_voices));
        let listener = Arc::new(ListenerCell::default());
        let volume = Arc::new(SfxVolume::new(1.0));

        let renderer = Renderer::new(
            Arc::clone(&pool),
            receiver,
            Arc::clone(&listener),
            Arc::clone(&volume),
            config.stop_fade_frames,
        );

        let world = Self {
            engine: None,
            catalog: SoundCatalog::new(config.sample_rate),
            config,
            pool,
            commands: sender,
            listener,
            volume,
        };

        Ok((world, renderer))
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Decodes and registers a sound. Never fails: a broken or missing asset
    /// resolves to the placeholder sound (the first one loaded) so callers
    /// can treat the returned id as always playable.
    pub fn load_sound(&mut self, path: &str, polyphony: u8, looping: bool, rolloff: f32) -> SoundId {
        self.load_sound_with(&DefaultAudioLoader, path, polyphony, looping, rolloff)
    }

    /// `load_sound` with a custom decoder implementation.
    pub fn load_sound_with(
        &mut self,
        loader: &dyn AudioDataLoader,
        path: &str,
        polyphony: u8,
        looping: bool,
        rolloff: f32,
    ) -> SoundId {
        self.catalog.load(loader, path, polyphony, looping, rolloff)
    }

    /// Resolves a loaded sound by file name (including extension). Unknown
    /// names resolve to the placeholder. Control-thread only; do not call
    /// from anything time-critical.
    pub fn lookup(&mut self, name: &str) -> SoundId {
        self.catalog.lookup(name)
    }

    /// Starts an unattenuated voice (UI and other non-diegetic sounds).
    /// Returns [`VoiceId::NONE`] when the sound is at its polyphony cap.
    pub fn play(&self, sound: SoundId) -> VoiceId {
        self.spawn(sound, None)
    }

    /// Starts a voice positioned in the world, attenuated and panned against
    /// the listener every tick. Returns [`VoiceId::NONE`] at the cap.
    pub fn play_at(&self, sound: SoundId, position: Vec3) -> VoiceId {
        self.spawn(sound, Some(position))
    }

    /// Fades the voice out and retires it by the next tick. No-op for
    /// stale handles and the sentinel.
    pub fn stop(&self, voice: VoiceId) {
        if voice.is_none() {
            return;
        }
        let _ = self.pool.begin_stop(voice);
    }

    /// Moves a live positional voice. No-op for stale handles, the sentinel,
    /// and voices started without a position.
    pub fn set_voice_position(&self, voice: VoiceId, position: Vec3) {
        if voice.is_none() || !self.pool.is_live(voice) {
            return;
        }
        if self
            .commands
            .try_send(Command::SetPosition { voice, position })
            .is_err()
        {
            log::warn!("Command queue full, dropping position update");
        }
    }

    /// True while the voice is playing or fading out. Always false for the
    /// sentinel and for handles whose voice has retired.
    pub fn is_playing(&self, voice: VoiceId) -> bool {
        !voice.is_none() && self.pool.is_live(voice)
    }

    pub fn is_looping(&self, sound: SoundId) -> bool {
        self.catalog.is_looping(sound)
    }

    /// Updates the listener pose read by the spatializer each tick. The
    /// direction need not be normalized; a zero vector means
    /// "no orientation" and centers all panning.
    pub fn set_listener(&self, position: Vec3, forward: Vec3) {
        self.listener.set(position, forward);
    }

    /// Global sfx volume multiplier. Values round-trip exactly through
    /// [`sfx_volume`](Self::sfx_volume); the useful range is `[0, 1]`.
    pub fn set_sfx_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    pub fn sfx_volume(&self) -> f32 {
        self.volume.get()
    }

    pub fn engine(&self) -> Option<&EmberSonicEngine> {
        self.engine.as_ref()
    }

    /// Stops the audio thread and releases the device. Blocks until the
    /// in-flight tick (if any) has finished, so every buffer freed afterwards
    /// is unreachable from the mix path. Safe to call twice, and safe after
    /// a partial init.
    pub fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
    }

    fn spawn(&self, id: SoundId, position: Option<Vec3>) -> VoiceId {
        let Some(sound) = self.catalog.get(id) else {
            log::warn!("Play requested for unknown sound {:?}", id);
            return VoiceId::NONE;
        };

        // Drop-new conflict policy: a sound at its cap refuses the request
        // and keeps every already-audible voice.
        let cap = sound.policy.polyphony as u32;
        if sound.live_voices.load(Ordering::Acquire) >= cap {
            return VoiceId::NONE;
        }
        sound.live_voices.fetch_add(1, Ordering::AcqRel);

        let Some(voice) = self.pool.claim() else {
            sound.live_voices.fetch_sub(1, Ordering::AcqRel);
            log::warn!("Voice pool exhausted, dropping play of {:?}", sound.name);
            return VoiceId::NONE;
        };

        let command = Command::Spawn {
            voice,
            sound: Arc::clone(sound),
            position,
        };
        if self.commands.try_send(command).is_err() {
            self.pool.release(voice);
            sound.live_voices.fetch_sub(1, Ordering::AcqRel);
            log::warn!("Command queue full, dropping play of {:?}", sound.name);
            return VoiceId::NONE;
        }

        voice
    }
}

impl Drop for EmberSonicWorld {
    fn drop(&mut self) {
        self.shutdown();
    }
}
