//! Control-context API: note events, parameter changes and preset recall.
//!
//! A [`Controller`] is the single writer of the parameter store and the voice
//! slots. None of its operations fail: out-of-range values are dropped,
//! bound-hitting steps and unmatched note-offs are no-ops.
//!
//! # Voice allocation
//!
//! - [`note_on`](Controller::note_on) steals round-robin: slot 0, 1, 2, 3, 0, ...
//!   regardless of what the slot is playing.
//! - [`note_toggle`](Controller::note_toggle) flips the gate of the lowest slot
//!   already holding the pitch; otherwise it takes the lowest slot whose gate is
//!   off, falling back to slot 3.
//! - [`note_off`](Controller::note_off) releases every slot holding the pitch.
//!
//! Keys are transposed by the octave shift at event time, so a note-off sent
//! after an octave change does not match the note-on it was meant for.

use crate::factory_presets::factory_preset;
use crate::param::{ControlMessage, Param, Preset};
use crate::shared::SynthShared;
use crate::status::Status;
use crate::voice::NUM_VOICES;

/// Keys of the power-on chord (C major seventh).
pub const STARTUP_CHORD: [u8; NUM_VOICES] = [60, 64, 67, 71];

/// Handle the control context uses to drive a [`SynthShared`].
#[derive(Debug)]
pub struct Controller<'a> {
    shared: &'a SynthShared,
    cursor: usize,
}

impl<'a> Controller<'a> {
    /// Controller over `shared`, with the round-robin cursor at slot 0.
    pub fn new(shared: &'a SynthShared) -> Self {
        Self { shared, cursor: 0 }
    }

    /// The shared state this controller writes.
    pub fn shared(&self) -> &'a SynthShared {
        self.shared
    }

    /// Slot the next [`note_on`](Self::note_on) will take.
    pub fn next_voice(&self) -> usize {
        self.cursor
    }

    /// Current octave shift.
    pub fn octave_shift(&self) -> i8 {
        self.shared.params().get(Param::OctaveShift)
    }

    /// Voice pitch for `key` under the current octave shift (wrapping).
    pub fn key_to_pitch(&self, key: u8) -> u8 {
        key.wrapping_add((self.octave_shift() * 12) as u8)
    }

    /// Start `key` on the next round-robin slot.
    pub fn note_on(&mut self, key: u8) {
        let pitch = self.key_to_pitch(key);
        let slot = self.shared.voice(self.cursor);
        slot.set_pitch(pitch);
        slot.set_gate(true);
        self.cursor = (self.cursor + 1) % NUM_VOICES;
    }

    /// Release every slot playing `key`.
    pub fn note_off(&mut self, key: u8) {
        let pitch = self.key_to_pitch(key);
        for slot in self.shared.voices() {
            if slot.pitch() == pitch {
                slot.set_gate(false);
            }
        }
    }

    /// Toggle `key`: release it if a slot holds it, otherwise start it.
    pub fn note_toggle(&mut self, key: u8) {
        let pitch = self.key_to_pitch(key);
        let voices = self.shared.voices();

        if let Some(slot) = voices.iter().find(|slot| slot.pitch() == pitch) {
            slot.set_gate(!slot.gate());
            return;
        }

        let slot = voices
            .iter()
            .find(|slot| !slot.gate())
            .unwrap_or(&voices[NUM_VOICES - 1]);
        slot.set_pitch(pitch);
        slot.set_gate(true);
    }

    /// Release every slot.
    pub fn all_notes_off(&mut self) {
        for slot in self.shared.voices() {
            slot.set_gate(false);
        }
    }

    /// Set every slot to pitch 60, then play the C major seventh chord.
    pub fn startup_chord(&mut self) {
        for slot in self.shared.voices() {
            slot.set_pitch(STARTUP_CHORD[0]);
        }
        for key in STARTUP_CHORD {
            self.note_on(key);
        }
    }

    /// Write one parameter if `value` is in range. Returns whether it was applied.
    pub fn set_parameter(&mut self, param: Param, value: i8) -> bool {
        let applied = self.shared.params().set(param, value);
        #[cfg(feature = "tracing")]
        if !applied {
            tracing::debug!(param = param.name(), value, "dropped out-of-range parameter write");
        }
        applied
    }

    /// Write a parameter addressed by numeric id. Unknown ids are ignored.
    pub fn set_parameter_by_id(&mut self, id: u8, value: i8) -> bool {
        match Param::from_index(usize::from(id)) {
            Some(param) => self.set_parameter(param, value),
            None => false,
        }
    }

    /// Apply all twelve fields of `preset`, field by field.
    ///
    /// Each field goes through [`set_parameter`](Self::set_parameter), so an
    /// out-of-range field keeps its previous value while the others apply.
    /// Returns the number of fields applied.
    pub fn load_preset(&mut self, preset: &Preset) -> usize {
        let applied = Param::ALL
            .into_iter()
            .filter(|&param| self.set_parameter(param, preset.get(param)))
            .count();
        #[cfg(feature = "tracing")]
        tracing::debug!(applied, "preset loaded");
        applied
    }

    /// Recall factory preset `index`. Returns `false` for an unknown index.
    pub fn load_factory_preset(&mut self, index: usize) -> bool {
        let Some(factory) = factory_preset(index) else {
            return false;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(index, name = factory.name, "factory preset recalled");
        self.load_preset(&factory.preset);
        true
    }

    /// Apply one control-surface message.
    pub fn control_message(&mut self, message: ControlMessage) {
        #[cfg(feature = "tracing")]
        tracing::debug!(?message, "control message");
        match message {
            ControlMessage::Increment(param) => {
                self.shared.params().step(param, true);
            }
            ControlMessage::Decrement(param) => {
                self.shared.params().step(param, false);
            }
            ControlMessage::AllNotesOff => self.all_notes_off(),
            ControlMessage::FactoryPreset(index) => {
                self.load_factory_preset(usize::from(index));
            }
        }
    }

    /// Apply a numeric control code. Unknown codes are ignored.
    pub fn control_code(&mut self, code: u8) {
        if let Some(message) = ControlMessage::from_code(code) {
            self.control_message(message);
        }
    }

    /// Diagnostic snapshot.
    pub fn status(&self) -> Status {
        self.shared.status()
    }
}
