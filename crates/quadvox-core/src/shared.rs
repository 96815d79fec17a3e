//! State shared between the control context and the audio context.

use crate::param::ParamStore;
use crate::profile::TimingProfile;
use crate::status::Status;
use crate::voice::{NUM_VOICES, VoiceControl};

/// Everything both contexts touch: live parameters, voice pitch/gate slots and
/// the timing profile.
///
/// Every field is an independent atomic scalar with exactly one writer:
/// parameters and voice slots are written by the [`Controller`](crate::Controller),
/// the timing profile by the [`Engine`](crate::Engine). There are no locks and
/// no multi-field transactions; the audio context may observe a preset load
/// half-applied for one tick.
///
/// `new` is `const`, so firmware can place the shared state in a `static`:
///
/// ```rust
/// use quadvox_core::SynthShared;
///
/// static SYNTH: SynthShared = SynthShared::new();
/// assert!(!SYNTH.voice(0).gate());
/// ```
#[derive(Debug)]
pub struct SynthShared {
    params: ParamStore,
    voices: [VoiceControl; NUM_VOICES],
    profile: TimingProfile,
}

impl SynthShared {
    /// Power-on state: default parameters, all voices at pitch 0 with gate off.
    pub const fn new() -> Self {
        Self {
            params: ParamStore::new(),
            voices: [
                VoiceControl::new(),
                VoiceControl::new(),
                VoiceControl::new(),
                VoiceControl::new(),
            ],
            profile: TimingProfile::new(),
        }
    }

    /// Live parameter set.
    #[inline]
    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    /// Voice slot `id`. Panics if `id >= NUM_VOICES`.
    #[inline]
    pub fn voice(&self, id: usize) -> &VoiceControl {
        &self.voices[id]
    }

    /// All voice slots.
    #[inline]
    pub fn voices(&self) -> &[VoiceControl; NUM_VOICES] {
        &self.voices
    }

    /// Interrupt timing profile.
    #[inline]
    pub fn profile(&self) -> &TimingProfile {
        &self.profile
    }

    /// Snapshot of voices, parameters and timing for diagnostics.
    pub fn status(&self) -> Status {
        Status {
            pitches: core::array::from_fn(|id| self.voices[id].pitch()),
            gates: core::array::from_fn(|id| self.voices[id].gate()),
            params: self.params.snapshot(),
            timing: self.profile.snapshot(),
        }
    }
}

impl Default for SynthShared {
    fn default() -> Self {
        Self::new()
    }
}
