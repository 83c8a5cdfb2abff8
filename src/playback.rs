//! Commands crossing the control/audio boundary, and the per-voice playback
//! lane advanced by the mixer.

use crate::catalog::Sound;
use crate::math::Vec3;
use crate::voice::VoiceId;
use std::sync::Arc;

/// Control-thread requests applied by the mixer at the top of each tick.
///
/// Stops are not commands: an explicit stop flips the voice's slot state
/// atomically and the mixer notices on its next tick. Only requests that
/// carry a payload ride the queue.
#[derive(Debug)]
pub(crate) enum Command {
    Spawn {
        voice: VoiceId,
        sound: Arc<Sound>,
        position: Option<Vec3>,
    },
    SetPosition {
        voice: VoiceId,
        position: Vec3,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaneStatus {
    Active,
    Finished,
}

/// Mix-thread playback state for one live voice.
///
/// The lane borrows the sound's buffer through the `Arc` carried by its spawn
/// command and owns the playback cursor. Loop and rolloff flags are copied
/// from the sound's policy at spawn so the lane never reads the catalog.
#[derive(Debug)]
pub(crate) struct VoiceLane {
    pub voice: VoiceId,
    pub sound: Arc<Sound>,
    pub position: Option<Vec3>,
    pub rolloff: f32,
    looping: bool,
    cursor: usize,
    fade_remaining: u32,
    fade_total: u32,
}

impl VoiceLane {
    pub fn new(voice: VoiceId, sound: Arc<Sound>, position: Option<Vec3>, fade_frames: u32) -> Self {
        let policy = sound.policy;
        let fade_total = fade_frames.max(1);
        Self {
            voice,
            sound,
            position,
            rolloff: policy.rolloff,
            looping: policy.looping,
            cursor: 0,
            fade_remaining: fade_total,
            fade_total,
        }
    }

    /// Accumulates this voice into an interleaved stereo block.
    ///
    /// Advances the cursor one source frame per output frame, wrapping for
    /// looping voices. When `stopping` is set the fade ramp is consumed; the
    /// lane finishes once the ramp (or, for one-shot voices, the buffer) is
    /// exhausted, on the exact frame it happens.
    pub fn mix_into(
        &mut self,
        out: &mut [f32],
        gain_left: f32,
        gain_right: f32,
        stopping: bool,
    ) -> LaneStatus {
        let samples = self.sound.data.samples();
        if samples.is_empty() {
            return LaneStatus::Finished;
        }

        let frames = out.len() / 2;
        for frame in 0..frames {
            if self.cursor >= samples.len() {
                if !self.looping {
                    return LaneStatus::Finished;
                }
                self.cursor = 0;
            }

            let mut sample = samples[self.cursor];
            self.cursor += 1;

            if stopping {
                if self.fade_remaining == 0 {
                    return LaneStatus::Finished;
                }
                sample *= self.fade_remaining as f32 / self.fade_total as f32;
                self.fade_remaining -= 1;
            }

            out[frame * 2] += sample * gain_left;
            out[frame * 2 + 1] += sample * gain_right;
        }

        if !self.looping && self.cursor >= samples.len() {
            return LaneStatus::Finished;
        }
        LaneStatus::Active
    }
}
