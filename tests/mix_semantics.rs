//! Mix-tick semantics: retirement timing, loop wrap, attenuation, volume and
//! stop fades, observed from rendered output blocks.

use embersonic::error::Result;
use embersonic::{AudioData, AudioDataLoader, EmberSonicWorld, EngineConfig, Vec3};
use std::f32::consts::FRAC_1_SQRT_2;
use std::sync::Arc;

struct ConstLoader {
    frames: usize,
    value: f32,
}

impl AudioDataLoader for ConstLoader {
    fn load(&self, _path: &str) -> Result<Arc<AudioData>> {
        Ok(Arc::new(AudioData::new(
            vec![self.value; self.frames],
            44100,
            1,
        )))
    }
}

/// Mono ramp where each sample equals its frame index, for cursor tracking.
struct RampLoader {
    frames: usize,
}

impl AudioDataLoader for RampLoader {
    fn load(&self, _path: &str) -> Result<Arc<AudioData>> {
        let samples: Vec<f32> = (0..self.frames).map(|i| i as f32).collect();
        Ok(Arc::new(AudioData::new(samples, 44100, 1)))
    }
}

const BLOCK: usize = 512;

fn render_block(renderer: &mut embersonic::Renderer) -> Vec<f32> {
    let mut out = vec![0.0f32; BLOCK * 2];
    renderer.render(&mut out);
    out
}

#[test]
fn one_shot_retires_after_exactly_its_buffer_length() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: BLOCK * 2,
            value: 0.5,
        },
        "two_blocks.wav",
        1,
        false,
        0.0,
    );

    let voice = world.play(sound);
    assert!(world.is_playing(voice));

    let first = render_block(&mut renderer);
    assert!(first.iter().all(|s| *s == 0.5));
    assert!(world.is_playing(voice));

    // The buffer runs out on the last frame of this block; the voice retires
    // in the same tick.
    let second = render_block(&mut renderer);
    assert!(second.iter().all(|s| *s == 0.5));
    assert!(!world.is_playing(voice));
    assert!(!renderer.has_active_lanes());

    // Nothing audible afterwards.
    let third = render_block(&mut renderer);
    assert!(third.iter().all(|s| *s == 0.0));
}

#[test]
fn looping_voice_wraps_without_gap_and_never_self_retires() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(&RampLoader { frames: 600 }, "ramp_looped.wav", 1, true, 0.0);

    let voice = world.play_at(sound, Vec3::ZERO);
    // No listener orientation, rolloff 0: gain 1, centered pan.
    let scale = FRAC_1_SQRT_2;

    let first = render_block(&mut renderer);
    assert!((first[0] - 0.0).abs() < 1e-4);
    assert!((first[2 * 511] - 511.0 * scale).abs() < 1e-2);

    // 600 - 512 = 88 frames remain, then the wrap lands mid-block.
    let second = render_block(&mut renderer);
    assert!((second[2 * 87] - 599.0 * scale).abs() < 1e-2);
    assert!((second[2 * 88] - 0.0 * scale).abs() < 1e-4);
    assert!((second[2 * 89] - 1.0 * scale).abs() < 1e-4);

    for _ in 0..50 {
        render_block(&mut renderer);
    }
    assert!(world.is_playing(voice));

    world.stop(voice);
    render_block(&mut renderer);
    assert!(!world.is_playing(voice));
}

#[test]
fn distance_attenuation_follows_documented_curve() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "steady_looped.wav",
        1,
        true,
        1.0,
    );

    let _voice = world.play_at(sound, Vec3::ZERO);

    // Listener on top of the source: unity gain, centered constant-power pan.
    let out = render_block(&mut renderer);
    assert!((out[0] - FRAC_1_SQRT_2).abs() < 1e-5);
    assert!((out[1] - FRAC_1_SQRT_2).abs() < 1e-5);

    // Distance 5 with rolloff 1: gain 1/6.
    world.set_listener(Vec3::new(3.0, 0.0, 4.0), Vec3::ZERO);
    let out = render_block(&mut renderer);
    let expected = FRAC_1_SQRT_2 / 6.0;
    assert!((out[0] - expected).abs() < 1e-5);

    // Further away is never louder.
    world.set_listener(Vec3::new(30.0, 0.0, 40.0), Vec3::ZERO);
    let far = render_block(&mut renderer);
    assert!(far[0] < out[0]);
    assert!(far[0] > 0.0);
}

#[test]
fn moving_a_voice_changes_its_attenuation() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "mover_looped.wav",
        1,
        true,
        1.0,
    );

    let voice = world.play_at(sound, Vec3::ZERO);
    let near = render_block(&mut renderer);

    world.set_voice_position(voice, Vec3::new(100.0, 0.0, 0.0));
    let far = render_block(&mut renderer);

    assert!((near[0] - FRAC_1_SQRT_2).abs() < 1e-5);
    assert!(far[0] < near[0] / 50.0);
}

#[test]
fn orientation_pans_sources_across_the_stereo_field() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "pan_looped.wav",
        2,
        true,
        0.0,
    );

    // Facing -Z with Y up puts +X on the listener's right.
    world.set_listener(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
    let _voice = world.play_at(sound, Vec3::new(10.0, 0.0, 0.0));

    let out = render_block(&mut renderer);
    let (left, right) = (out[0], out[1]);
    assert!(right > 0.99);
    assert!(left < 0.01);
}

#[test]
fn unattenuated_voices_ignore_listener_and_play_at_reference_gain() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "ui_looped.wav",
        1,
        true,
        1.0,
    );

    let _voice = world.play(sound);
    world.set_listener(Vec3::new(1000.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));

    let out = render_block(&mut renderer);
    assert!((out[0] - 1.0).abs() < 1e-6);
    assert!((out[1] - 1.0).abs() < 1e-6);
}

#[test]
fn sfx_volume_scales_every_voice() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "steady_looped.wav",
        1,
        true,
        0.0,
    );

    let _voice = world.play(sound);
    world.set_sfx_volume(0.5);
    let out = render_block(&mut renderer);
    assert!((out[0] - 0.5).abs() < 1e-6);

    world.set_sfx_volume(0.0);
    let out = render_block(&mut renderer);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn stop_fades_out_instead_of_clicking() {
    let config = EngineConfig::default().stop_fade_frames(4);
    let (mut world, mut renderer) = EmberSonicWorld::offline(config).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 1.0,
        },
        "fade_looped.wav",
        1,
        true,
        0.0,
    );

    let voice = world.play(sound);
    render_block(&mut renderer);

    world.stop(voice);
    let mut out = vec![0.0f32; 8 * 2];
    renderer.render(&mut out);

    // Linear ramp over the 4-frame fade, then silence.
    assert_eq!(&out[..8], &[1.0, 1.0, 0.75, 0.75, 0.5, 0.5, 0.25, 0.25]);
    assert!(out[8..].iter().all(|s| *s == 0.0));
    assert!(!world.is_playing(voice));
}

#[test]
fn concurrent_voices_sum_into_the_mix() {
    let (mut world, mut renderer) =
        EmberSonicWorld::offline(EngineConfig::default()).expect("offline world");
    let sound = world.load_sound_with(
        &ConstLoader {
            frames: 44100,
            value: 0.25,
        },
        "layer_looped.wav",
        4,
        true,
        0.0,
    );

    for _ in 0..3 {
        assert!(!world.play(sound).is_none());
    }
    let out = render_block(&mut renderer);
    assert!((out[0] - 0.75).abs() < 1e-6);
}
