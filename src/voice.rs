//! Voice pool: fixed slot arena with generation-tagged handles.
//!
//! Each slot's control-visible state is a single `AtomicU64` packing
//! `(generation, state)`. The control thread is the only writer of
//! `Free -> Playing` (admission) and `Playing -> Stopping` (explicit stop);
//! the mix thread is the only writer of `Playing/Stopping -> Free`
//! (retirement). A handle whose generation no longer matches its slot is
//! stale and every operation on it is a silent no-op.

use std::sync::atomic::{AtomicU64, Ordering};

const STATE_FREE: u64 = 0;
const STATE_PLAYING: u64 = 1;
const STATE_STOPPING: u64 = 2;

fn pack(generation: u32, state: u64) -> u64 {
    ((generation as u64) << 32) | state
}

fn unpack(word: u64) -> (u32, u64) {
    ((word >> 32) as u32, word & 0xFFFF_FFFF)
}

/// Handle to one live playback instance.
///
/// The all-zero value is the reserved sentinel: generations start at 1, so no
/// successful `play` can ever return it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VoiceId {
    pub(crate) slot: u16,
    pub(crate) generation: u32,
}

impl VoiceId {
    /// The "nothing is playing" sentinel returned by a rejected `play`.
    pub const NONE: VoiceId = VoiceId {
        slot: 0,
        generation: 0,
    };

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VoiceState {
    Playing,
    Stopping,
}

pub(crate) struct VoicePool {
    slots: Box<[AtomicU64]>,
}

impl VoicePool {
    pub(crate) fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || AtomicU64::new(pack(0, STATE_FREE)));
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Claims a free slot for a new voice, bumping its generation.
    /// Returns `None` when every slot is occupied.
    pub(crate) fn claim(&self) -> Option<VoiceId> {
        for (index, slot) in self.slots.iter().enumerate() {
            let current = slot.load(Ordering::Acquire);
            let (generation, state) = unpack(current);
            if state != STATE_FREE {
                continue;
            }
            let next = pack(generation.wrapping_add(1).max(1), STATE_PLAYING);
            if slot
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(VoiceId {
                    slot: index as u16,
                    generation: unpack(next).0,
                });
            }
        }
        None
    }

    /// Rolls back a claim that never reached the mix thread (command queue
    /// full). The generation stays bumped; the slot is simply free again.
    pub(crate) fn release(&self, id: VoiceId) {
        let _ = self.transition(id, STATE_PLAYING, STATE_FREE);
    }

    /// Requests a fade-out. Returns false for stale, already-stopping or
    /// free handles, which makes `stop` idempotent.
    pub(crate) fn begin_stop(&self, id: VoiceId) -> bool {
        self.transition(id, STATE_PLAYING, STATE_STOPPING)
    }

    /// Retires a voice from the mix thread after end-of-buffer or a finished
    /// fade. Accepts both `Playing` and `Stopping`.
    pub(crate) fn retire(&self, id: VoiceId) {
        if !self.transition(id, STATE_STOPPING, STATE_FREE) {
            let _ = self.transition(id, STATE_PLAYING, STATE_FREE);
        }
    }

    /// Current state of the voice behind `id`, or `None` when the handle is
    /// stale, free, or the sentinel.
    pub(crate) fn state_of(&self, id: VoiceId) -> Option<VoiceState> {
        let slot = self.slots.get(id.slot as usize)?;
        let (generation, state) = unpack(slot.load(Ordering::Acquire));
        if generation != id.generation {
            return None;
        }
        match state {
            STATE_PLAYING => Some(VoiceState::Playing),
            STATE_STOPPING => Some(VoiceState::Stopping),
            _ => None,
        }
    }

    /// True while the voice is audible (playing or fading out).
    pub(crate) fn is_live(&self, id: VoiceId) -> bool {
        self.state_of(id).is_some()
    }

    fn transition(&self, id: VoiceId, from: u64, to: u64) -> bool {
        let Some(slot) = self.slots.get(id.slot as usize) else {
            return false;
        };
        slot.compare_exchange(
            pack(id.generation, from),
            pack(id.generation, to),
            Ordering::AcqRel,
            Ordering::Acquire,
        )
        .is_ok()
    }
}
