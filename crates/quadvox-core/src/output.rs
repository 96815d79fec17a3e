//! Mapping of the mixed signal onto the two hardware transports.
//!
//! - PWM: the [`Q28`] mix becomes a duty-cycle compare level around the
//!   midpoint of the PWM wrap value.
//! - I2S: the mix becomes a 16-bit PCM sample, written to both channels of an
//!   interleaved stereo frame.

use crate::fixed::Q28;
use crate::tables::SAMPLE_RATE;

/// Default system clock of the reference board (RP2040 at 120 MHz).
pub const DEFAULT_SYS_CLOCK_HZ: u32 = 120_000_000;

/// PWM wrap value for one sample period at `sys_clock_hz`.
pub const fn pwm_cycle(sys_clock_hz: u32) -> u32 {
    sys_clock_hz / SAMPLE_RATE
}

/// PWM wrap value at [`DEFAULT_SYS_CLOCK_HZ`] (2721).
pub const PWM_CYCLE: u32 = pwm_cycle(DEFAULT_SYS_CLOCK_HZ);

/// Duty-cycle compare level for `mix`, centered on `cycle / 2` and floored at 0.
#[inline]
pub fn pwm_level(mix: Q28, cycle: u32) -> u16 {
    let level = (mix >> 18) + (cycle / 2) as i32;
    (i32::from(level > 0) * level) as u16
}

/// 16-bit PCM sample for `mix`, saturated at the `i16` bounds.
#[inline]
pub fn pcm_sample(mix: Q28) -> i16 {
    (mix >> 14).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Write `mix` to both channels of one interleaved stereo frame.
#[inline]
pub fn write_stereo_frame(frame: &mut [i16], mix: Q28) {
    let sample = pcm_sample(mix);
    for slot in frame.iter_mut().take(2) {
        *slot = sample;
    }
}
