//! Mix engine: the per-tick routine that sums live voices into the output
//! block.
//!
//! Runs on the audio thread inside the device callback. Each tick drains the
//! bounded command queue, snapshots listener pose and sfx volume from their
//! atomic cells, then advances every lane. Nothing on this path allocates,
//! blocks, or takes a lock.

use crate::playback::{Command, LaneStatus, VoiceLane};
use crate::spatial::{ListenerCell, spatial_gains};
use crate::voice::{VoicePool, VoiceState};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global sfx volume multiplier shared as f32 bits.
#[derive(Debug)]
pub(crate) struct SfxVolume(AtomicU32);

impl SfxVolume {
    pub fn new(volume: f32) -> Self {
        Self(AtomicU32::new(volume.to_bits()))
    }

    pub fn set(&self, volume: f32) {
        self.0.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Audio-thread half of the engine.
///
/// Owns one lane slot per voice slot in the pool. `render` is the mix tick;
/// the device callback calls it directly, and offline callers (tests, tools)
/// may drive it by hand instead of opening a device.
pub struct Renderer {
    pool: Arc<VoicePool>,
    lanes: Box<[Option<VoiceLane>]>,
    commands: Receiver<Command>,
    listener: Arc<ListenerCell>,
    volume: Arc<SfxVolume>,
    fade_frames: u32,
}

impl Renderer {
    pub(crate) fn new(
        pool: Arc<VoicePool>,
        commands: Receiver<Command>,
        listener: Arc<ListenerCell>,
        volume: Arc<SfxVolume>,
        fade_frames: u32,
    ) -> Self {
        let mut lanes = Vec::with_capacity(pool.capacity());
        lanes.resize_with(pool.capacity(), || None);
        Self {
            pool,
            lanes: lanes.into_boxed_slice(),
            commands,
            listener,
            volume,
            fade_frames,
        }
    }

    /// One mix tick: fills `out` (interleaved stereo) with the sum of all
    /// live voices and returns the number of frames written.
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        out.fill(0.0);
        self.drain_commands();

        let listener = self.listener.load();
        let volume = self.volume.get();

        for index in 0..self.lanes.len() {
            let Some(lane) = self.lanes[index].as_mut() else {
                continue;
            };

            let status = match self.pool.state_of(lane.voice) {
                Some(state) => {
                    let (gain_left, gain_right) = match lane.position {
                        Some(position) => spatial_gains(&listener, position, lane.rolloff),
                        // Positionless voices play at reference gain, both
                        // channels.
                        None => (1.0, 1.0),
                    };
                    lane.mix_into(
                        out,
                        gain_left * volume,
                        gain_right * volume,
                        state == VoiceState::Stopping,
                    )
                }
                None => LaneStatus::Finished,
            };

            if status == LaneStatus::Finished {
                self.finish_lane(index);
            }
        }

        out.len() / 2
    }

    /// True while any lane is still mixing. Offline callers use this to know
    /// when a scene has gone quiet.
    pub fn has_active_lanes(&self) -> bool {
        self.lanes.iter().any(|lane| lane.is_some())
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Spawn {
                    voice,
                    sound,
                    position,
                } => {
                    let instance = sound.next_instance.fetch_add(1, Ordering::Relaxed);
                    log::debug!(
                        "Spawning voice {}.{} of {:?} (instance {})",
                        voice.slot,
                        voice.generation,
                        sound.name,
                        instance
                    );
                    let slot = voice.slot as usize;
                    if self.lanes[slot].is_some() {
                        log::warn!("Voice slot {} respawned before its lane cleared", slot);
                        self.finish_lane(slot);
                    }
                    self.lanes[slot] = Some(VoiceLane::new(voice, sound, position, self.fade_frames));
                }
                Command::SetPosition { voice, position } => {
                    let slot = voice.slot as usize;
                    if let Some(lane) = self.lanes.get_mut(slot).and_then(|l| l.as_mut()) {
                        // Stale handles and unattenuated voices are no-ops.
                        if lane.voice == voice && lane.position.is_some() {
                            lane.position = Some(position);
                        }
                    }
                }
            }
        }
    }

    fn finish_lane(&mut self, index: usize) {
        if let Some(lane) = self.lanes[index].take() {
            self.pool.retire(lane.voice);
            lane.sound.live_voices.fetch_sub(1, Ordering::AcqRel);
        }
    }
}
