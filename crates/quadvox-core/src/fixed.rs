//! Fixed-point formats and the integer primitives the signal path is built on.
//!
//! Two formats are in use:
//!
//! - [`Q28`]: 32-bit signed, 28 fractional bits. Audio-path signal. `1.0` is
//!   [`ONE_Q28`], so the representable range is roughly `[-8.0, 8.0)`.
//! - [`Q14`]: 16-bit signed, 14 fractional bits. Control-path modulation
//!   (LFO, envelope). `1.0` is [`ONE_Q14`], range `[-2.0, 2.0)`.
//!
//! Everything on the per-sample path is shifts, adds and 32-bit multiplies. The
//! filter needs the high word of a 32x32 product, which [`mul_s32_s32_h32`]
//! computes from 16-bit halves so that cores without a widening multiply
//! (Cortex-M0+) stay on single-cycle instructions.

/// Signed fixed-point number with a 28-bit fractional part.
pub type Q28 = i32;

/// Signed fixed-point number with a 14-bit fractional part.
pub type Q14 = i16;

/// `1.0` in [`Q28`].
pub const ONE_Q28: Q28 = 1 << 28;

/// `1.0` in [`Q14`].
pub const ONE_Q14: Q14 = 1 << 14;

/// Bound `x` to `[lo, hi]` without branching.
///
/// Written as arithmetic on comparison results so the compiler emits no
/// conditional jump; real-time code paths get the same instruction count
/// whichever side of the range the value falls on.
///
/// ```rust
/// use quadvox_core::fixed::clamp;
///
/// assert_eq!(clamp(-3, 0, 10), 0);
/// assert_eq!(clamp(4, 0, 10), 4);
/// assert_eq!(clamp(12, 0, 10), 10);
/// ```
#[inline(always)]
pub const fn clamp(x: i32, lo: i32, hi: i32) -> i32 {
    let mut x = x;
    x += (x < lo) as i32 * (lo - x);
    x -= (x > hi) as i32 * (x - hi);
    x
}

/// High 32 bits of the signed 64-bit product `x * y`.
///
/// Equivalent to `((x as i64 * y as i64) >> 32) as i32` (floor rounding) for
/// operands whose 16-bit high halves stay within `i16` range of each other's
/// product, which covers every filter coefficient and signal in this crate
/// (`|x|, |y| < 2^30`). Only 32-bit multiplies are used.
///
/// ```rust
/// use quadvox_core::fixed::mul_s32_s32_h32;
///
/// assert_eq!(mul_s32_s32_h32(1 << 30, 1 << 30), 1 << 28);
/// assert_eq!(mul_s32_s32_h32(-(1 << 30), 1 << 30), -(1 << 28));
/// ```
#[inline(always)]
pub fn mul_s32_s32_h32(x: i32, y: i32) -> i32 {
    let x1 = x >> 16;
    let x0 = (x & 0xFFFF) as u32;
    let y1 = y >> 16;
    let y0 = (y & 0xFFFF) as u32;
    let x0_y1 = (x0 as i32).wrapping_mul(y1);
    let z = (((x0 * y0) >> 16) as i32)
        .wrapping_add(x1.wrapping_mul(y0 as i32))
        .wrapping_add(x0_y1 & 0xFFFF);
    (z >> 16)
        .wrapping_add(x0_y1 >> 16)
        .wrapping_add(x1.wrapping_mul(y1))
}

/// Convert a [`Q28`] sample to `f32` (`ONE_Q28` maps to `1.0`).
#[inline]
pub fn q28_to_f32(x: Q28) -> f32 {
    x as f32 / ONE_Q28 as f32
}

/// Convert a [`Q14`] value to `f32` (`ONE_Q14` maps to `1.0`).
#[inline]
pub fn q14_to_f32(x: Q14) -> f32 {
    f32::from(x) / f32::from(ONE_Q14)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_h32(x: i32, y: i32) -> i32 {
        ((i64::from(x) * i64::from(y)) >> 32) as i32
    }

    #[test]
    fn clamp_passes_values_inside_range() {
        for x in -5..=4 {
            assert_eq!(clamp(x, -5, 4), x);
        }
    }

    #[test]
    fn clamp_pins_values_outside_range() {
        assert_eq!(clamp(-1000, 0, 120 << 8), 0);
        assert_eq!(clamp(40_000, 0, 120 << 8), 120 << 8);
        assert_eq!(clamp(481, 0, 480), 480);
    }

    #[test]
    fn mul_h32_matches_wide_multiply_on_signal_range() {
        let samples = [
            0,
            1,
            -1,
            0xFFFF,
            -0xFFFF,
            1 << 16,
            (1 << 28) + 12345,
            -(1 << 28) - 777,
            (1 << 30) - 1,
            -(1 << 30),
            536_870_911,
            -123_456_789,
        ];
        for &x in &samples {
            for &y in &samples {
                assert_eq!(
                    mul_s32_s32_h32(x, y),
                    reference_h32(x, y),
                    "mismatch for {x} * {y}"
                );
            }
        }
    }

    #[test]
    fn mul_h32_rounds_toward_negative_infinity() {
        // -1 * 1 = -1, whose high word is -1 (floor), not 0.
        assert_eq!(mul_s32_s32_h32(-1, 1), -1);
        assert_eq!(mul_s32_s32_h32(1, 1), 0);
    }

    #[test]
    fn float_conversions() {
        assert_eq!(q28_to_f32(ONE_Q28), 1.0);
        assert_eq!(q28_to_f32(-ONE_Q28 / 2), -0.5);
        assert_eq!(q14_to_f32(ONE_Q14), 1.0);
        assert_eq!(q14_to_f32(-8192), -0.5);
    }
}
