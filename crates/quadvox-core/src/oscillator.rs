//! Dual wavetable oscillator with per-voice detune.
//!
//! Pitch is carried as a 16-bit "full pitch": semitones in the high byte and
//! 1/256 semitone in the low byte. Each of the two oscillators rounds its full
//! pitch to the nearest semitone for the frequency table and applies the
//! remaining fraction through the fine-tune table. Phases are 32-bit wrapping
//! accumulators; the top 9 bits index the 512-sample wavetable and the next 14
//! bits interpolate linearly between neighbours.

use crate::fixed::{Q14, Q28, clamp};
use crate::param::Preset;
use crate::tables::{PITCH_MAX, Tables, WAVE_LEN};

/// Highest full pitch (`PITCH_MAX` semitones, zero fraction).
pub const FULL_PITCH_MAX: i32 = (PITCH_MAX as i32) << 8;

/// Phase state of one voice's oscillator pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Oscillator {
    phase1: u32,
    phase2: u32,
}

impl Oscillator {
    /// Oscillator pair with both phases at zero.
    pub const fn new() -> Self {
        Self {
            phase1: 0,
            phase2: 0,
        }
    }

    /// Zero both phases.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current phase of oscillator 1 and 2.
    pub fn phases(&self) -> (u32, u32) {
        (self.phase1, self.phase2)
    }

    /// Advance both oscillators one sample and return their mix.
    ///
    /// `full_pitch` is `pitch << 8`; `pitch_mod` is the LFO output, where
    /// `ONE_Q14` shifts pitch by one semitone. `phase_offset` is the voice's
    /// detune added to every phase increment.
    #[inline]
    pub fn process(
        &mut self,
        full_pitch: i32,
        pitch_mod: Q14,
        phase_offset: i32,
        params: &Preset,
        tables: &Tables,
    ) -> Q28 {
        let fp1 = clamp(
            full_pitch + ((256 * i32::from(pitch_mod)) >> 14),
            0,
            FULL_PITCH_MAX,
        );
        let pitch1 = advance_phase(&mut self.phase1, fp1, phase_offset, tables);

        let detune =
            (i32::from(params.osc2_coarse_pitch) << 8) + (i32::from(params.osc2_fine_pitch) << 2);
        let fp2 = clamp(fp1 + detune, 0, FULL_PITCH_MAX);
        let pitch2 = advance_phase(&mut self.phase2, fp2, phase_offset, tables);

        let waveform = params.osc_waveform as u8;
        let mix = params.osc_mix as usize;
        let out1 = phase_to_audio(self.phase1, tables.wave(waveform, pitch1));
        let out2 = phase_to_audio(self.phase2, tables.wave(waveform, pitch2));

        (out1 >> 14) * i32::from(tables.osc_mix[mix])
            + (out2 >> 14) * i32::from(tables.osc_mix[64 - mix])
    }
}

/// Advance `phase` by the increment for `full_pitch` and return the rounded pitch.
#[inline(always)]
fn advance_phase(phase: &mut u32, full_pitch: i32, phase_offset: i32, tables: &Tables) -> u8 {
    let rounded = full_pitch + 128;
    let pitch = (rounded >> 8) as u8;
    let tune = (rounded & 0xFF) as usize;

    let freq = tables.osc_freq[pitch as usize];
    *phase = phase.wrapping_add(freq).wrapping_add_signed(phase_offset);
    let fine = ((freq >> 8) as i32 * i32::from(tables.osc_tune[tune])) >> 6;
    *phase = phase.wrapping_add_signed(fine);
    pitch
}

/// Linearly interpolated wavetable read at `phase`.
#[inline(always)]
pub fn phase_to_audio(phase: u32, wave: &[Q14; WAVE_LEN]) -> Q28 {
    let index = (phase >> 23) as usize;
    let next = (index + 1) & (WAVE_LEN - 1);
    let weight = ((phase >> 9) & 0x3FFF) as i32;
    let current = i32::from(wave[index]);
    let upcoming = i32::from(wave[next]);
    (current << 14) + (upcoming - current) * weight
}
