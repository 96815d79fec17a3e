//! Voice slots: the shared pitch/gate pair and the per-voice signal chain.
//!
//! The synth has exactly [`NUM_VOICES`] slots. Each slot has two halves:
//!
//! - [`VoiceControl`]: pitch and gate, written by the control context and
//!   read by the audio context every tick.
//! - [`Voice`]: the retained state of the five stages, owned by the
//!   [`Engine`](crate::Engine) and touched only by the audio context.
//!
//! Slot `id` adds `(id - 1) << 8` to every phase increment, so the four voices
//! drift against each other slightly even when playing the same pitch.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::amp::amplify;
use crate::envelope::Envelope;
use crate::filter::Filter;
use crate::fixed::Q28;
use crate::lfo::Lfo;
use crate::oscillator::Oscillator;
use crate::param::Preset;
use crate::tables::Tables;

/// Number of voice slots.
pub const NUM_VOICES: usize = 4;

/// Pitch and gate of one voice slot, shared between contexts.
///
/// The gate is published with release ordering after the pitch is stored, so
/// an audio tick that observes a new gate also observes its pitch.
#[derive(Debug)]
pub struct VoiceControl {
    pitch: AtomicU8,
    gate: AtomicBool,
}

impl VoiceControl {
    /// Slot at pitch 0, gate off.
    pub const fn new() -> Self {
        Self {
            pitch: AtomicU8::new(0),
            gate: AtomicBool::new(false),
        }
    }

    /// Current pitch (key after octave shift).
    #[inline]
    pub fn pitch(&self) -> u8 {
        self.pitch.load(Ordering::Relaxed)
    }

    /// Current gate.
    #[inline]
    pub fn gate(&self) -> bool {
        self.gate.load(Ordering::Acquire)
    }

    /// Store a new pitch without touching the gate.
    #[inline]
    pub fn set_pitch(&self, pitch: u8) {
        self.pitch.store(pitch, Ordering::Relaxed);
    }

    /// Store a new gate.
    #[inline]
    pub fn set_gate(&self, gate: bool) {
        self.gate.store(gate, Ordering::Release);
    }
}

impl Default for VoiceControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Retained signal-chain state of one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voice {
    id: u8,
    lfo: Lfo,
    envelope: Envelope,
    oscillator: Oscillator,
    filter: Filter,
}

impl Voice {
    /// Voice for slot `id` with all stages at rest.
    pub const fn new(id: u8) -> Self {
        Self {
            id,
            lfo: Lfo::new(),
            envelope: Envelope::new(),
            oscillator: Oscillator::new(),
            filter: Filter::new(),
        }
    }

    /// Slot index.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Offset added to every phase increment of this voice.
    #[inline]
    pub fn phase_offset(&self) -> i32 {
        (i32::from(self.id) - 1) << 8
    }

    /// Return every stage to rest.
    pub fn reset(&mut self) {
        *self = Self::new(self.id);
    }

    /// Envelope state.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Filter state.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Oscillator phases.
    pub fn oscillator(&self) -> &Oscillator {
        &self.oscillator
    }

    /// LFO phase.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }

    /// Run LFO, envelope, oscillator, filter and amplifier for one sample.
    #[inline]
    pub fn process(&mut self, pitch: u8, gate: bool, params: &Preset, tables: &Tables) -> Q28 {
        let offset = self.phase_offset();
        let lfo_out = self.lfo.process(offset, params, tables);
        let eg_out = self.envelope.process(gate, params, tables);
        let osc_out = self
            .oscillator
            .process(i32::from(pitch) << 8, lfo_out, offset, params, tables);
        let filter_out = self.filter.process(osc_out, eg_out, params, tables);
        amplify(filter_out, eg_out)
    }
}
