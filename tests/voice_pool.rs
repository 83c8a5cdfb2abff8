//! Polyphony and handle-lifecycle behavior, driven headlessly through the
//! offline world/renderer pair.

use embersonic::error::Result;
use embersonic::{AudioData, AudioDataLoader, EmberSonicWorld, EngineConfig, Vec3, VoiceId};
use std::sync::Arc;

/// Loader that fabricates a constant-value mono buffer, so tests need no
/// asset files on disk.
struct ToneLoader {
    frames: usize,
    value: f32,
}

impl AudioDataLoader for ToneLoader {
    fn load(&self, _path: &str) -> Result<Arc<AudioData>> {
        Ok(Arc::new(AudioData::new(
            vec![self.value; self.frames],
            44100,
            1,
        )))
    }
}

fn tone(frames: usize) -> ToneLoader {
    ToneLoader { frames, value: 0.5 }
}

const BLOCK: usize = 512;

#[test]
fn polyphony_one_drops_second_play_until_first_stops() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&tone(44100), "one_shot.wav", 1, false, 1.0);

    let first = world.play(sound);
    assert!(!first.is_none());
    assert!(world.is_playing(first));

    // At the cap: the new request is refused, the audible voice survives.
    let rejected = world.play(sound);
    assert!(rejected.is_none());
    assert!(world.is_playing(first));

    world.stop(first);
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);
    assert!(!world.is_playing(first));

    let second = world.play(sound);
    assert!(!second.is_none());
    assert_ne!(second, first);
}

#[test]
fn polyphony_four_frees_exactly_one_slot_per_stop() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&tone(44100), "quad_looped.wav", 4, true, 0.0);

    let voices: Vec<VoiceId> = (0..4).map(|_| world.play(sound)).collect();
    for voice in &voices {
        assert!(!voice.is_none());
    }
    let distinct: std::collections::HashSet<_> = voices.iter().collect();
    assert_eq!(distinct.len(), 4);

    assert!(world.play(sound).is_none());

    world.stop(voices[2]);
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);

    // Exactly one slot came back.
    assert!(!world.play(sound).is_none());
    assert!(world.play(sound).is_none());
}

#[test]
fn rejected_plays_do_not_leak_capacity() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&tone(44100), "solo_looped.wav", 1, true, 0.0);

    let voice = world.play(sound);
    for _ in 0..32 {
        assert!(world.play(sound).is_none());
    }

    world.stop(voice);
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);

    assert!(!world.play(sound).is_none());
}

#[test]
fn sentinel_is_never_playing() {
    let (mut world, _renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&tone(256), "blip.wav", 2, false, 0.0);

    assert!(!world.is_playing(VoiceId::NONE));
    let _ = world.play(sound);
    assert!(!world.is_playing(VoiceId::NONE));
}

#[test]
fn stale_handle_operations_are_silent_noops() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let short = world.load_sound_with(&tone(64), "short.wav", 2, false, 0.0);
    let looped = world.load_sound_with(&tone(64), "long_looped.wav", 2, true, 0.0);

    let finished = world.play(short);
    let survivor = world.play(looped);

    // 64 frames fit inside one block, so the one-shot retires immediately.
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);
    assert!(!world.is_playing(finished));
    assert!(world.is_playing(survivor));

    // The handle is stale now; nothing below may error or disturb the
    // surviving voice.
    world.stop(finished);
    world.set_voice_position(finished, Vec3::new(1.0, 2.0, 3.0));
    renderer.render(&mut out);
    assert!(world.is_playing(survivor));
}

#[test]
fn voice_ids_are_not_reused_while_handle_is_held() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&tone(32), "tick.wav", 1, false, 0.0);

    let first = world.play(sound);
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);
    assert!(!world.is_playing(first));

    // The slot is recycled but the generation moved on, so the old handle
    // can never alias the new voice.
    let second = world.play(sound);
    assert_ne!(first, second);
    assert!(world.is_playing(second));
    assert!(!world.is_playing(first));
}

#[test]
fn sfx_volume_round_trips() {
    let (world, _renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    for volume in [0.0, 0.25, 0.4, 0.75, 1.0] {
        world.set_sfx_volume(volume);
        assert_eq!(world.sfx_volume(), volume);
    }
}

#[test]
fn failed_load_resolves_to_playable_placeholder() {
    struct BrokenLoader;
    impl AudioDataLoader for BrokenLoader {
        fn load(&self, path: &str) -> Result<Arc<AudioData>> {
            Err(embersonic::EmberSonicError::AudioLoading(format!(
                "corrupt: {}",
                path
            )))
        }
    }

    let (mut world, _renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let good = world.load_sound_with(&tone(128), "error.wav", 1, false, 0.0);
    let bad = world.load_sound_with(&BrokenLoader, "ghost.wav", 4, true, 1.0);

    // The broken asset fell back to the first-loaded sound.
    assert_eq!(bad, good);
    assert!(!world.play(bad).is_none());
}
