//! Spatializer: listener pose and per-voice gain computation.
//!
//! The attenuation curve is inverse-distance, `g(d) = 1 / (1 + rolloff * d)`,
//! clamped to `[0, 1]`. A rolloff of 0 yields constant unity gain. Listener
//! orientation contributes no gain term; it only steers constant-power stereo
//! panning, with the right axis taken as `forward x world-up`. A zero forward
//! vector means "no orientation": panning stays centered.

use crate::math::{Vec3, normalize_direction};
use std::f32::consts::FRAC_PI_4;
use std::sync::atomic::{AtomicU32, Ordering};

/// Snapshot of the listener taken once per mix tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    pub position: Vec3,
    /// Unit forward vector, or `None` for an omnidirectional listener.
    pub forward: Option<Vec3>,
}

impl Default for Listener {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: None,
        }
    }
}

/// Listener pose shared between the control and mix threads as f32 bit cells.
///
/// Written once per frame by the control thread, read once per tick by the
/// mixer. The six components are independent loads; a tick that interleaves
/// with an update sees a pose at most one frame stale per component.
#[derive(Debug, Default)]
pub(crate) struct ListenerCell {
    cells: [AtomicU32; 6],
}

impl ListenerCell {
    pub fn set(&self, position: Vec3, forward: Vec3) {
        let values = [
            position.x, position.y, position.z, forward.x, forward.y, forward.z,
        ];
        for (cell, value) in self.cells.iter().zip(values) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn load(&self) -> Listener {
        let get = |i: usize| f32::from_bits(self.cells[i].load(Ordering::Relaxed));
        Listener {
            position: Vec3::new(get(0), get(1), get(2)),
            forward: normalize_direction(Vec3::new(get(3), get(4), get(5))),
        }
    }
}

/// Distance attenuation. Monotonically non-increasing in `distance` for
/// positive rolloff, exactly 1.0 when rolloff is 0.
pub fn distance_gain(distance: f32, rolloff: f32) -> f32 {
    if rolloff <= 0.0 {
        return 1.0;
    }
    (1.0 / (1.0 + rolloff * distance.max(0.0))).clamp(0.0, 1.0)
}

/// Constant-power stereo weights for a pan position in [-1, 1].
pub fn pan_weights(pan: f32) -> (f32, f32) {
    let theta = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (theta.cos(), theta.sin())
}

/// Per-channel gains for a positional voice: distance attenuation times the
/// pan weights derived from the listener's right axis.
pub fn spatial_gains(listener: &Listener, source: Vec3, rolloff: f32) -> (f32, f32) {
    let offset = source - listener.position;
    let gain = distance_gain(offset.length(), rolloff);

    let pan = match (listener.forward, normalize_direction(offset)) {
        (Some(forward), Some(direction)) => {
            match normalize_direction(forward.cross(Vec3::Y)) {
                Some(right) => direction.dot(right),
                // Looking straight up or down leaves no horizontal plane to
                // pan in.
                None => 0.0,
            }
        }
        _ => 0.0,
    };

    let (left, right) = pan_weights(pan);
    (gain * left, gain * right)
}
