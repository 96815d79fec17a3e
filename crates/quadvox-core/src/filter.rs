//! Envelope-modulated resonant low-pass filter.
//!
//! A Direct Form I biquad evaluated in [`Q28`] with coefficients read from
//! [`Tables::filter_coefs`]. The low-pass feed-forward section is
//! `b0 * (x0 + 2*x1 + x2)`, so only `b0/a0` is multiplied. Each product keeps
//! the high word of a 32x32 multiply and is shifted left by 4 to restore the
//! Q28 scale.
//!
//! Cutoff is addressed in quarter-semitone steps `0..=480`. The effective step
//! slews toward its target by at most one step per sample, which keeps the
//! coefficient changes small enough to avoid zipper noise.

use crate::fixed::{Q14, Q28, clamp, mul_s32_s32_h32};
use crate::param::Preset;
use crate::tables::{CUTOFF_STEP_MAX, Tables};

/// Per-voice filter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filter {
    cutoff: u16,
    x1: Q28,
    x2: Q28,
    y1: Q28,
    y2: Q28,
}

impl Filter {
    /// Filter with empty history and the cutoff step at 0.
    pub const fn new() -> Self {
        Self {
            cutoff: 0,
            x1: 0,
            x2: 0,
            y1: 0,
            y2: 0,
        }
    }

    /// Clear history and return the cutoff step to 0.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current (slewed) cutoff step.
    pub fn cutoff_step(&self) -> u16 {
        self.cutoff
    }

    /// Force the slewed cutoff step, bypassing the one-step-per-sample slew.
    pub fn set_cutoff_step(&mut self, step: u16) {
        self.cutoff = step.min(CUTOFF_STEP_MAX);
    }

    /// Cutoff step the filter is slewing toward for the given modulation.
    #[inline]
    pub fn target_step(params: &Preset, cutoff_mod: Q14) -> u16 {
        let target = (i32::from(params.filter_cutoff) << 2)
            + ((i32::from(params.filter_mod_amount) * i32::from(cutoff_mod)) >> 12);
        clamp(target, 0, i32::from(CUTOFF_STEP_MAX)) as u16
    }

    /// Filter one sample. `cutoff_mod` is the envelope output.
    #[inline]
    pub fn process(
        &mut self,
        input: Q28,
        cutoff_mod: Q14,
        params: &Preset,
        tables: &Tables,
    ) -> Q28 {
        let target = Self::target_step(params, cutoff_mod);
        self.cutoff += u16::from(self.cutoff < target);
        self.cutoff -= u16::from(self.cutoff > target);

        let coefs = tables.filter_coefs(params.filter_resonance as u8, self.cutoff);

        let x0 = input;
        let x3 = x0.wrapping_add(self.x1 << 1).wrapping_add(self.x2);
        let y0 = (mul_s32_s32_h32(coefs.b0_a0, x3) << 4)
            .wrapping_sub(mul_s32_s32_h32(coefs.a1_a0, self.y1) << 4)
            .wrapping_sub(mul_s32_s32_h32(coefs.a2_a0, self.y2) << 4);

        self.x2 = self.x1;
        self.y2 = self.y1;
        self.x1 = x0;
        self.y1 = y0;
        y0
    }
}
