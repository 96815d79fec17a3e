//! Triangle LFO for pitch vibrato.

use crate::fixed::Q14;
use crate::param::Preset;
use crate::tables::Tables;

/// Per-voice LFO phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lfo {
    phase: u32,
}

impl Lfo {
    /// LFO at phase zero.
    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    /// Return to phase zero.
    pub fn reset(&mut self) {
        self.phase = 0;
    }

    /// Current phase accumulator.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Advance one sample and return the scaled triangle.
    ///
    /// The triangle spans `[-16384, 16384]` before depth scaling; at full
    /// depth (64) the output reaches `±ONE_Q14 / 2`, i.e. half a semitone of
    /// pitch modulation.
    #[inline]
    pub fn process(&mut self, phase_offset: i32, params: &Preset, tables: &Tables) -> Q14 {
        let inc = tables.lfo_rate[params.lfo_rate as usize];
        self.phase = self.phase.wrapping_add(inc).wrapping_add_signed(phase_offset);

        let tri = triangle(self.phase);
        (((tri - 16384) * i32::from(params.lfo_depth)) >> 7) as Q14
    }
}

/// Unscaled triangle value (`0..=32768`) for a phase.
#[inline]
pub fn triangle(phase: u32) -> i32 {
    let h = (phase >> 16) as i32;
    h + i32::from(h >= 32768) * (65536 - (h << 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_shape() {
        assert_eq!(triangle(0), 0);
        assert_eq!(triangle(0x4000_0000), 16384);
        assert_eq!(triangle(0x8000_0000), 32768);
        assert_eq!(triangle(0xC000_0000), 16384);
        assert_eq!(triangle(0xFFFF_0000), 1);
    }

    #[test]
    fn zero_depth_is_silent() {
        let t = Tables::shared();
        let params = Preset {
            lfo_depth: 0,
            ..Preset::DEFAULT
        };
        let mut lfo = Lfo::new();
        for _ in 0..10_000 {
            assert_eq!(lfo.process(0, &params, t), 0);
        }
    }

    #[test]
    fn full_depth_stays_within_half_semitone() {
        let t = Tables::shared();
        let params = Preset {
            lfo_depth: 64,
            lfo_rate: 64,
            ..Preset::DEFAULT
        };
        let mut lfo = Lfo::new();
        let mut lo = i16::MAX;
        let mut hi = i16::MIN;
        // 20 Hz: one cycle in ~2205 samples.
        for _ in 0..5_000 {
            let v = lfo.process(0, &params, t);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        assert!(lo >= -8192 && lo < -8000, "min {lo}");
        assert!(hi <= 8192 && hi > 8000, "max {hi}");
    }

    #[test]
    fn phase_offset_detunes_rate() {
        let t = Tables::shared();
        let mut a = Lfo::new();
        let mut b = Lfo::new();
        a.process(-256, &Preset::DEFAULT, t);
        b.process(512, &Preset::DEFAULT, t);
        let inc = t.lfo_rate[48];
        assert_eq!(a.phase(), inc.wrapping_sub(256));
        assert_eq!(b.phase(), inc + 512);
    }
}
