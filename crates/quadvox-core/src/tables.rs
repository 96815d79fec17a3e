//! Precomputed lookup tables consumed by the signal path.
//!
//! The engine never evaluates a transcendental function per sample. Every
//! nonlinear mapping (pitch to phase increment, fine tuning, band-limited
//! waveforms, filter coefficients, decay time, LFO rate, oscillator mix curve)
//! is read from a [`Tables`] instance.
//!
//! [`Tables`] is plain data with public fields: firmware can fill it from a
//! flash image, and hosts can build it once with [`Tables::generate`]. The
//! generator uses `libm` so it also runs on `no_std` targets at boot.
//!
//! | Table | Shape | Format |
//! |---|---|---|
//! | `osc_freq` | 121 semitones | `u32` phase increment per sample |
//! | `osc_tune` | 256 sub-semitone steps | `i16`, `(ratio - 1) * 2^14` |
//! | `osc_waves` | 2 waveforms x 31 bands x 512 | [`Q14`] |
//! | `osc_mix` | 65 steps | [`Q14`] gain |
//! | `filter_coefs` | 6 resonances x 481 cutoff steps | [`FilterCoefs`] in [`Q28`] |
//! | `eg_decay` | 65 steps | `u32` counter threshold |
//! | `lfo_rate` | 65 steps | `u32` phase increment per sample |

use alloc::boxed::Box;
use core::f64::consts::PI;

use crate::fixed::{ONE_Q14, Q14, Q28};

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Reference tuning: A4 (key 69) in Hz.
pub const A4_FREQ: f64 = 440.0;

/// Highest playable pitch in semitones.
pub const PITCH_MAX: u8 = 120;

/// Entries in the frequency table (pitches `0..=PITCH_MAX`).
pub const FREQ_TABLE_LEN: usize = PITCH_MAX as usize + 1;

/// Entries in the fine-tune table.
pub const TUNE_TABLE_LEN: usize = 256;

/// Number of selectable oscillator waveforms.
pub const WAVEFORM_COUNT: usize = 2;

/// Number of pitch bands per waveform. Band `b` serves pitches `4b - 3..=4b`.
pub const WAVE_BANDS: usize = 31;

/// Samples per single-cycle wavetable.
pub const WAVE_LEN: usize = 512;

/// Highest filter cutoff step (quarter-semitone steps).
pub const CUTOFF_STEP_MAX: u16 = 480;

/// Entries per resonance row of the filter coefficient table.
pub const CUTOFF_STEPS: usize = CUTOFF_STEP_MAX as usize + 1;

/// Number of resonance settings.
pub const RESONANCE_STEPS: usize = 6;

/// Entries in the 0..=64 control tables (mix, decay, LFO rate).
pub const CONTROL_STEPS: usize = 65;

/// Harmonic cap for the band-limited wavetables (below the table's own Nyquist).
const MAX_HARMONICS: usize = 127;

/// Wavetable amplitude relative to full scale, leaving room for Gibbs overshoot.
const WAVE_GAIN: f64 = 0.5;

/// Highest filter cutoff in Hz; keeps the bilinear mapping away from Nyquist.
const MAX_CUTOFF_HZ: f64 = 0.45 * SAMPLE_RATE as f64;

/// Oscillator waveform index: band-limited sawtooth.
pub const WAVEFORM_SAW: u8 = 0;

/// Oscillator waveform index: band-limited square.
pub const WAVEFORM_SQUARE: u8 = 1;

/// Normalized biquad coefficients for one (resonance, cutoff) cell.
///
/// All values are divided by `a0` and stored in [`Q28`]. The feed-forward
/// terms of the low-pass section are `b0, 2*b0, b0`, so only `b0/a0` is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCoefs {
    /// `b0 / a0`
    pub b0_a0: Q28,
    /// `a1 / a0`
    pub a1_a0: Q28,
    /// `a2 / a0`
    pub a2_a0: Q28,
}

impl FilterCoefs {
    const ZERO: Self = Self {
        b0_a0: 0,
        a1_a0: 0,
        a2_a0: 0,
    };
}

/// Every lookup table the engine reads.
#[derive(Debug, Clone)]
pub struct Tables {
    /// Phase increment per sample for each integer pitch.
    pub osc_freq: [u32; FREQ_TABLE_LEN],
    /// Fine-tune correction, indexed by `tune` where 128 is "on pitch".
    pub osc_tune: [i16; TUNE_TABLE_LEN],
    /// Band-limited single-cycle waveforms.
    pub osc_waves: [[[Q14; WAVE_LEN]; WAVE_BANDS]; WAVEFORM_COUNT],
    /// Oscillator cross-fade curve; `osc_mix[i] + osc_mix[64 - i] == ONE_Q14`.
    pub osc_mix: [Q14; CONTROL_STEPS],
    /// Low-pass biquad coefficients.
    pub filter_coefs: [[FilterCoefs; CUTOFF_STEPS]; RESONANCE_STEPS],
    /// Samples between decay steps for each decay-time setting.
    pub eg_decay: [u32; CONTROL_STEPS],
    /// LFO phase increment per sample for each rate setting.
    pub lfo_rate: [u32; CONTROL_STEPS],
}

impl Tables {
    /// All-zero tables, to be filled in place.
    pub const EMPTY: Self = Self {
        osc_freq: [0; FREQ_TABLE_LEN],
        osc_tune: [0; TUNE_TABLE_LEN],
        osc_waves: [[[0; WAVE_LEN]; WAVE_BANDS]; WAVEFORM_COUNT],
        osc_mix: [0; CONTROL_STEPS],
        filter_coefs: [[FilterCoefs::ZERO; CUTOFF_STEPS]; RESONANCE_STEPS],
        eg_decay: [0; CONTROL_STEPS],
        lfo_rate: [0; CONTROL_STEPS],
    };

    /// Build every table on the heap.
    pub fn generate() -> Box<Self> {
        let mut tables = Box::new(Self::EMPTY);
        tables.fill();
        tables
    }

    /// Process-wide tables, generated on first use.
    #[cfg(feature = "std")]
    pub fn shared() -> &'static Self {
        static SHARED: std::sync::OnceLock<Box<Tables>> = std::sync::OnceLock::new();
        SHARED.get_or_init(Self::generate)
    }

    /// Overwrite every table in place with the generated contents.
    ///
    /// Useful on targets that keep the tables in a `static` buffer instead of
    /// the heap.
    pub fn fill(&mut self) {
        self.fill_osc_freq();
        self.fill_osc_tune();
        self.fill_osc_waves();
        self.fill_osc_mix();
        self.fill_filter_coefs();
        self.fill_eg_decay();
        self.fill_lfo_rate();
    }

    /// Wavetable for `waveform`, banked by `pitch` to keep harmonics below Nyquist.
    #[inline(always)]
    pub fn wave(&self, waveform: u8, pitch: u8) -> &[Q14; WAVE_LEN] {
        &self.osc_waves[waveform as usize][(pitch as usize + 3) >> 2]
    }

    /// Coefficients for a resonance setting and cutoff step.
    #[inline(always)]
    pub fn filter_coefs(&self, resonance: u8, cutoff: u16) -> &FilterCoefs {
        &self.filter_coefs[resonance as usize][cutoff as usize]
    }

    fn fill_osc_freq(&mut self) {
        for (pitch, inc) in self.osc_freq.iter_mut().enumerate() {
            *inc = hz_to_phase_inc(pitch_to_hz(pitch as f64));
        }
    }

    fn fill_osc_tune(&mut self) {
        for (tune, entry) in self.osc_tune.iter_mut().enumerate() {
            let ratio = libm::exp2((tune as f64 - 128.0) / (12.0 * 256.0));
            *entry = libm::round((ratio - 1.0) * f64::from(ONE_Q14)) as i16;
        }
    }

    fn fill_osc_waves(&mut self) {
        let mut sine = [0.0_f64; WAVE_LEN];
        for (i, s) in sine.iter_mut().enumerate() {
            *s = libm::sin(2.0 * PI * i as f64 / WAVE_LEN as f64);
        }

        for band in 0..WAVE_BANDS {
            // Highest pitch served by this band, plus the rounding half-step.
            let top_hz = pitch_to_hz(4.0 * band as f64 + 0.5);
            let harmonics =
                ((f64::from(SAMPLE_RATE) / 2.0 / top_hz) as usize).clamp(1, MAX_HARMONICS);

            for i in 0..WAVE_LEN {
                let mut saw = 0.0;
                let mut square = 0.0;
                for k in 1..=harmonics {
                    // sin(k * x) read back from the fundamental table
                    let partial = sine[(k * i) % WAVE_LEN] / k as f64;
                    saw += if k % 2 == 1 { partial } else { -partial };
                    if k % 2 == 1 {
                        square += partial;
                    }
                }
                saw *= 2.0 / PI;
                square *= 4.0 / PI;

                self.osc_waves[WAVEFORM_SAW as usize][band][i] = to_q14(saw * WAVE_GAIN);
                self.osc_waves[WAVEFORM_SQUARE as usize][band][i] = to_q14(square * WAVE_GAIN);
            }
        }
    }

    fn fill_osc_mix(&mut self) {
        let one = i32::from(ONE_Q14);
        for i in 0..=32 {
            let x = i as f64 / 64.0;
            let rising = libm::round(f64::from(ONE_Q14) * x * x * (3.0 - 2.0 * x)) as i32;
            let gain = one - rising;
            self.osc_mix[i] = gain as Q14;
            self.osc_mix[64 - i] = (one - gain) as Q14;
        }
    }

    fn fill_filter_coefs(&mut self) {
        for (resonance, row) in self.filter_coefs.iter_mut().enumerate() {
            let q = libm::exp2((resonance as f64 - 1.0) / 2.0);
            for (step, coefs) in row.iter_mut().enumerate() {
                let hz = pitch_to_hz(step as f64 / 4.0).min(MAX_CUTOFF_HZ);
                let omega = 2.0 * PI * hz / f64::from(SAMPLE_RATE);
                let cos_omega = libm::cos(omega);
                let alpha = libm::sin(omega) / (2.0 * q);
                let a0 = 1.0 + alpha;

                *coefs = FilterCoefs {
                    b0_a0: to_q28((1.0 - cos_omega) / 2.0 / a0),
                    a1_a0: to_q28(-2.0 * cos_omega / a0),
                    a2_a0: to_q28((1.0 - alpha) / a0),
                };
            }
        }
    }

    fn fill_eg_decay(&mut self) {
        for (time, threshold) in self.eg_decay.iter_mut().enumerate() {
            *threshold = (libm::round(libm::exp2(time as f64 / 6.0)) as u32).max(1);
        }
    }

    fn fill_lfo_rate(&mut self) {
        for (rate, inc) in self.lfo_rate.iter_mut().enumerate() {
            let hz = 0.2 * libm::pow(10.0, rate as f64 / 32.0);
            *inc = hz_to_phase_inc(hz);
        }
    }
}

/// Frequency in Hz of a (possibly fractional) pitch, with A4 = 69.
pub fn pitch_to_hz(pitch: f64) -> f64 {
    A4_FREQ * libm::exp2((pitch - 69.0) / 12.0)
}

fn hz_to_phase_inc(hz: f64) -> u32 {
    libm::round(hz / f64::from(SAMPLE_RATE) * 4_294_967_296.0) as u32
}

fn to_q14(x: f64) -> Q14 {
    libm::round(x * f64::from(ONE_Q14)) as Q14
}

fn to_q28(x: f64) -> Q28 {
    libm::round(x * f64::from(crate::fixed::ONE_Q28)) as Q28
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> &'static Tables {
        Tables::shared()
    }

    #[test]
    fn a4_phase_increment_is_440_hz() {
        let inc = tables().osc_freq[69];
        let hz = f64::from(inc) * f64::from(SAMPLE_RATE) / 4_294_967_296.0;
        assert!((hz - 440.0).abs() < 0.001, "A4 increment maps to {hz} Hz");
    }

    #[test]
    fn frequency_table_doubles_per_octave() {
        let t = tables();
        for pitch in 12..FREQ_TABLE_LEN {
            let ratio = f64::from(t.osc_freq[pitch]) / f64::from(t.osc_freq[pitch - 12]);
            assert!((ratio - 2.0).abs() < 1e-3, "pitch {pitch}: ratio {ratio}");
        }
    }

    #[test]
    fn tune_table_is_centered_and_monotonic() {
        let t = tables();
        assert_eq!(t.osc_tune[128], 0);
        assert!(t.osc_tune[0] < 0);
        assert!(t.osc_tune[255] > 0);
        for w in t.osc_tune.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    #[test]
    fn mix_curve_is_monotonic_and_sum_normalized() {
        let t = tables();
        assert_eq!(t.osc_mix[0], ONE_Q14);
        assert_eq!(t.osc_mix[64], 0);
        for i in 0..CONTROL_STEPS {
            assert_eq!(
                i32::from(t.osc_mix[i]) + i32::from(t.osc_mix[64 - i]),
                i32::from(ONE_Q14),
                "mix step {i} is not sum-normalized"
            );
        }
        for w in t.osc_mix.windows(2) {
            assert!(w[0] >= w[1], "mix curve must be monotonic");
        }
    }

    #[test]
    fn wavetables_stay_within_headroom() {
        let t = tables();
        for waveform in &t.osc_waves {
            for band in waveform {
                let peak = band.iter().map(|s| i32::from(*s).abs()).max().unwrap_or(0);
                assert!(peak > 0, "empty wavetable band");
                assert!(peak < i32::from(ONE_Q14), "band peak {peak} exceeds full scale");
            }
        }
    }

    #[test]
    fn top_band_is_nearly_sinusoidal() {
        // Two harmonics at most near the top of the range.
        let t = tables();
        let top = &t.osc_waves[WAVEFORM_SQUARE as usize][WAVE_BANDS - 1];
        let quarter = top[WAVE_LEN / 4];
        let expected = to_q14(4.0 / PI * WAVE_GAIN);
        assert_eq!(quarter, expected);
    }

    #[test]
    fn filter_poles_inside_unit_circle() {
        // Jury criterion for z^2 + a1 z + a2: |a2| < 1 and |a1| < 1 + a2.
        let one = i64::from(crate::fixed::ONE_Q28);
        for (resonance, row) in tables().filter_coefs.iter().enumerate() {
            for (step, c) in row.iter().enumerate() {
                let a1 = i64::from(c.a1_a0);
                let a2 = i64::from(c.a2_a0);
                assert!(a2.abs() < one, "res {resonance} step {step}: |a2| >= 1");
                assert!(a1.abs() < one + a2, "res {resonance} step {step}: |a1| >= 1 + a2");
                assert!(c.b0_a0 > 0, "res {resonance} step {step}: zero gain");
            }
        }
    }

    #[test]
    fn control_tables_are_monotonic() {
        let t = tables();
        assert_eq!(t.eg_decay[0], 1);
        for w in t.eg_decay.windows(2) {
            assert!(w[0] <= w[1]);
        }
        for w in t.lfo_rate.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn wave_lookup_selects_band_by_pitch() {
        let t = tables();
        assert!(core::ptr::eq(t.wave(0, 0), &t.osc_waves[0][0]));
        assert!(core::ptr::eq(t.wave(1, 1), &t.osc_waves[1][1]));
        assert!(core::ptr::eq(t.wave(0, 120), &t.osc_waves[0][30]));
    }
}
