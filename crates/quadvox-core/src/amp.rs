//! Voltage-controlled amplifier stage.

use crate::fixed::{Q14, Q28};

/// Scale `input` by `gain` (the envelope output, `ONE_Q14` is unity).
///
/// The input is shifted down to Q14 before the multiply so the product stays in
/// 32 bits; the lower 14 bits of the signal are discarded.
#[inline(always)]
pub fn amplify(input: Q28, gain: Q14) -> Q28 {
    (input >> 14).wrapping_mul(i32::from(gain))
}
