//! The real-time sample pipeline.
//!
//! [`Engine`] owns the retained state of all four voices and reads everything
//! else from a [`SynthShared`] and a [`Tables`]. It runs in the audio context:
//! a PWM wrap interrupt calling [`Engine::tick`] once per sample, or a timer
//! calling [`Engine::service_buffer`] once per I2S buffer. Neither path
//! allocates, locks or logs.
//!
//! Each tick takes one snapshot of the twelve parameters, then runs every
//! voice through LFO, envelope, oscillator, filter and amplifier and averages
//! the four outputs.

use crate::fixed::Q28;
use crate::output::{pwm_level, write_stereo_frame};
use crate::profile::PeriodCounter;
use crate::shared::SynthShared;
use crate::tables::Tables;
use crate::voice::{NUM_VOICES, Voice};

/// Audio-context half of the synth.
#[derive(Debug)]
pub struct Engine<'a> {
    shared: &'a SynthShared,
    tables: &'a Tables,
    voices: [Voice; NUM_VOICES],
    last_buffer: Option<usize>,
}

impl<'a> Engine<'a> {
    /// Engine reading `shared` and `tables`, with every voice at rest.
    pub fn new(shared: &'a SynthShared, tables: &'a Tables) -> Self {
        Self {
            shared,
            tables,
            voices: core::array::from_fn(|id| Voice::new(id as u8)),
            last_buffer: None,
        }
    }

    /// Shared state this engine reads.
    pub fn shared(&self) -> &'a SynthShared {
        self.shared
    }

    /// Lookup tables in use.
    pub fn tables(&self) -> &'a Tables {
        self.tables
    }

    /// Retained state of voice `id`. Panics if `id >= NUM_VOICES`.
    pub fn voice(&self, id: usize) -> &Voice {
        &self.voices[id]
    }

    /// Return every voice to rest and forget the last serviced buffer.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.reset();
        }
        self.last_buffer = None;
    }

    /// Compute one sample: the average of the four voices.
    #[inline]
    pub fn tick(&mut self) -> Q28 {
        let params = self.shared.params().snapshot();
        let mut sum = 0i64;
        for (voice, slot) in self.voices.iter_mut().zip(self.shared.voices()) {
            // Gate first: its acquire load orders the pitch read after it.
            let gate = slot.gate();
            let pitch = slot.pitch();
            sum += i64::from(voice.process(pitch, gate, &params, self.tables));
        }
        (sum >> 2) as Q28
    }

    /// [`tick`](Self::tick), recording entry and processing time from `counter`.
    #[inline]
    pub fn tick_profiled<C: PeriodCounter + ?Sized>(&mut self, counter: &C) -> Q28 {
        let entry = counter.ticks();
        let mix = self.tick();
        self.shared.profile().record(entry, counter.ticks());
        mix
    }

    /// One sample mapped to a PWM compare level for wrap value `cycle`.
    #[inline]
    pub fn tick_pwm(&mut self, cycle: u32) -> u16 {
        pwm_level(self.tick(), cycle)
    }

    /// Fill `out` with consecutive mono samples.
    pub fn render(&mut self, out: &mut [Q28]) {
        for sample in out {
            *sample = self.tick();
        }
    }

    /// Fill an interleaved stereo `i16` buffer, one tick per frame.
    ///
    /// A trailing odd sample is left untouched.
    pub fn fill_stereo(&mut self, buffer: &mut [i16]) {
        for frame in buffer.chunks_exact_mut(2) {
            write_stereo_frame(frame, self.tick());
        }
    }

    /// Buffer-mode callback body.
    ///
    /// `buffer` is the transport's next free buffer, or `None` if it has none.
    /// A buffer is filled only if it is not the one filled by the previous
    /// call, identified by its address. Always returns `true` so the caller
    /// keeps its timer armed.
    pub fn service_buffer(&mut self, buffer: Option<&mut [i16]>) -> bool {
        let Some(buffer) = buffer else {
            return true;
        };
        let id = buffer.as_ptr() as usize;
        if self.last_buffer != Some(id) {
            self.last_buffer = Some(id);
            self.fill_stereo(buffer);
        }
        true
    }

    /// [`service_buffer`](Self::service_buffer), recording its timing.
    pub fn service_buffer_profiled<C: PeriodCounter + ?Sized>(
        &mut self,
        buffer: Option<&mut [i16]>,
        counter: &C,
    ) -> bool {
        let entry = counter.ticks();
        let keep_armed = self.service_buffer(buffer);
        self.shared.profile().record(entry, counter.ticks());
        keep_armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Controller;
    use core::cell::Cell;

    #[test]
    fn silent_until_a_note_is_played() {
        let shared = SynthShared::new();
        let mut engine = Engine::new(&shared, Tables::shared());
        for _ in 0..1_000 {
            assert_eq!(engine.tick(), 0);
        }
    }

    #[test]
    fn mix_is_average_of_voices() {
        let shared = SynthShared::new();
        let tables = Tables::shared();
        let mut ctl = Controller::new(&shared);
        ctl.startup_chord();

        let mut engine = Engine::new(&shared, tables);
        let mut solo: [Voice; NUM_VOICES] = core::array::from_fn(|id| Voice::new(id as u8));
        let params = shared.params().snapshot();
        for _ in 0..2_000 {
            let expected: i64 = solo
                .iter_mut()
                .enumerate()
                .map(|(id, v)| {
                    i64::from(v.process(shared.voice(id).pitch(), true, &params, tables))
                })
                .sum();
            assert_eq!(i64::from(engine.tick()), expected >> 2);
        }
    }

    #[test]
    fn same_buffer_is_not_refilled() {
        let shared = SynthShared::new();
        let mut ctl = Controller::new(&shared);
        ctl.startup_chord();
        let mut engine = Engine::new(&shared, Tables::shared());

        let mut a = [0i16; 882];
        let mut b = [0i16; 882];
        assert!(engine.service_buffer(Some(&mut a[..])));
        let first = a;
        a.fill(0);
        assert!(engine.service_buffer(Some(&mut a[..])));
        assert_eq!(a, [0; 882], "repeated buffer was refilled");

        assert!(engine.service_buffer(Some(&mut b[..])));
        assert_ne!(b, [0; 882]);
        assert_ne!(first, [0; 882]);
    }

    #[test]
    fn missing_buffer_keeps_timer_armed() {
        let shared = SynthShared::new();
        let mut engine = Engine::new(&shared, Tables::shared());
        assert!(engine.service_buffer(None));
    }

    #[test]
    fn stereo_frames_carry_identical_channels() {
        let shared = SynthShared::new();
        Controller::new(&shared).startup_chord();
        let mut engine = Engine::new(&shared, Tables::shared());
        let mut buf = [0i16; 882];
        engine.fill_stereo(&mut buf);
        for frame in buf.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn profiled_tick_records_timing() {
        let shared = SynthShared::new();
        let mut engine = Engine::new(&shared, Tables::shared());
        let clock = Cell::new(100u32);
        let counter = || {
            let now = clock.get();
            clock.set(now + 250);
            now
        };
        engine.tick_profiled(&counter);
        let timing = shared.profile().snapshot();
        assert_eq!(timing.entry, 100);
        assert_eq!(timing.processing, 250);
        assert_eq!(timing.max_entry, 100);
    }

    #[test]
    fn idle_pwm_level_is_mid_scale() {
        let shared = SynthShared::new();
        let mut engine = Engine::new(&shared, Tables::shared());
        assert_eq!(engine.tick_pwm(crate::output::PWM_CYCLE), 1360);
    }
}
