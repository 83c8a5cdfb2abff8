// Demo program for the audio engine. Loads every file under assets/sounds
// (the first one, error.wav, doubles as the placeholder for broken assets),
// then orbits a looping positional sound around the listener while firing the
// one-shots in turn. Files named *_looped.wav are registered as looping; the
// engine itself takes the flag explicitly and knows nothing about the naming
// convention.

use anyhow::Result;
use embersonic::{EmberSonicWorld, EngineConfig, SoundId, Vec3, VoiceId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut world = EmberSonicWorld::new(EngineConfig::default())?;

    let load_start = Instant::now();

    // The first sound loaded acts as the placeholder in case of errors.
    world.load_sound("assets/sounds/error.wav", 1, false, 0.0);

    let mut files = Vec::new();
    collect_files(Path::new("assets/sounds"), &mut files)?;
    files.sort();

    let mut sounds: HashMap<String, SoundId> = HashMap::new();
    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let looping = name.ends_with("_looped.wav");
        let Some(path) = path.to_str() else { continue };
        sounds.insert(name.to_string(), world.load_sound(path, 4, looping, 0.05));
    }

    println!(
        "Loaded {} sounds in {} ms",
        sounds.len(),
        load_start.elapsed().as_millis()
    );

    // Start the looping sounds orbiting the listener; play everything else as
    // positioned one-shots along the way.
    let mut orbit_voice = VoiceId::NONE;
    let one_shots: Vec<SoundId> = sounds
        .iter()
        .filter(|(name, id)| *name != "error.wav" && !world.is_looping(**id))
        .map(|(_, id)| *id)
        .collect();

    if let Some(looped) = sounds
        .iter()
        .find(|(_, id)| world.is_looping(**id))
        .map(|(_, id)| *id)
    {
        orbit_voice = world.play_at(looped, Vec3::new(20.0, 0.0, 0.0));
    }

    world.set_listener(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

    let frame = Duration::from_millis(16);
    for step in 0..600 {
        let t = step as f32 * 0.016;

        if world.is_playing(orbit_voice) {
            let angle = t * 0.8;
            world.set_voice_position(
                orbit_voice,
                Vec3::new(20.0 * angle.cos(), 0.0, 20.0 * angle.sin()),
            );
        }

        // A new one-shot every second, stepping outward so attenuation is
        // audible.
        if step % 60 == 0 && !one_shots.is_empty() {
            let index = (step / 60) as usize % one_shots.len();
            let distance = 5.0 + (step / 60) as f32 * 5.0;
            world.play_at(one_shots[index], Vec3::new(0.0, 0.0, -distance));
        }

        std::thread::sleep(frame);
    }

    if world.is_playing(orbit_voice) {
        world.stop(orbit_voice);
    }

    if let Some(engine) = world.engine() {
        println!("Frames processed: {}", engine.frames_processed());
    }

    world.shutdown();
    Ok(())
}
