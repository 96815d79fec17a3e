//! Attack/decay/sustain envelope generator.
//!
//! The level is a 25-bit integer where `1 << 24` is full scale. A rising gate
//! starts the attack, which approaches 1.5x full scale exponentially and ends
//! as soon as the level crosses full scale. From then on the level decays
//! exponentially toward the sustain level while the gate is held, or toward
//! zero once it is released. Decay and release share one rate: a step is taken
//! only every `eg_decay[decay_time]` samples.
//!
//! ```text
//! level
//!  1.0 |   /\
//!      |  /  `-.__
//!  sus | /        `-------.
//!      |/                  `-.__
//!    0 +---------------------------> t
//!       gate on           gate off
//! ```

use crate::fixed::Q14;
use crate::param::Preset;
use crate::tables::Tables;

/// Full-scale envelope level.
pub const LEVEL_MAX: i32 = 1 << 24;

/// Level the attack curve aims at; overshooting full scale keeps the attack short.
const ATTACK_TARGET: i32 = (1 << 24) + (1 << 23);

/// Sustain parameter to level: `64 << 18 == LEVEL_MAX`.
const SUSTAIN_SHIFT: u32 = 18;

/// Which segment the envelope is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    /// Rising toward full scale.
    Attack,
    /// Gate held after the attack: decaying to (or holding at) sustain.
    Decay,
    /// Gate released: decaying to zero.
    Release,
}

/// Per-voice envelope state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Envelope {
    level: i32,
    gate: bool,
    attack: bool,
    counter: u32,
}

impl Envelope {
    /// Envelope at rest: level 0, gate low.
    pub const fn new() -> Self {
        Self {
            level: 0,
            gate: false,
            attack: false,
            counter: 0,
        }
    }

    /// Return to rest.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Raw level (`LEVEL_MAX` is full scale).
    pub fn level(&self) -> i32 {
        self.level
    }

    /// Current output without advancing.
    pub fn output(&self) -> Q14 {
        (self.level >> 10) as Q14
    }

    /// Current segment.
    pub fn stage(&self) -> EnvelopeStage {
        match (self.attack, self.gate) {
            (true, _) => EnvelopeStage::Attack,
            (false, true) => EnvelopeStage::Decay,
            (false, false) => EnvelopeStage::Release,
        }
    }

    /// Advance one sample with the live gate and return the level in Q14.
    #[inline]
    pub fn process(&mut self, gate: bool, params: &Preset, tables: &Tables) -> Q14 {
        self.attack |= !self.gate & gate;
        self.attack &= (self.level < LEVEL_MAX) & gate;
        self.gate = gate;

        if self.attack {
            self.level += (ATTACK_TARGET - self.level) >> 5;
        } else {
            self.counter += 1;
            let period = tables.eg_decay[params.eg_decay_time as usize];
            self.counter *= u32::from(self.counter < period);

            let target =
                (i32::from(params.eg_sustain_level) << SUSTAIN_SHIFT) * i32::from(self.gate);
            if self.level > target && self.counter == 0 {
                self.level += (target - self.level) >> 5;
            }
        }

        self.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(env: &mut Envelope, gate: bool, params: &Preset, samples: usize) -> Q14 {
        let t = Tables::shared();
        let mut out = 0;
        for _ in 0..samples {
            out = env.process(gate, params, t);
        }
        out
    }

    #[test]
    fn attack_is_monotonic_and_ends_at_full_scale() {
        let t = Tables::shared();
        let mut env = Envelope::new();
        let mut prev = 0;
        let mut samples = 0;
        while env.level() < LEVEL_MAX {
            let out = env.process(true, &Preset::DEFAULT, t);
            assert!(out >= prev, "attack must rise");
            prev = out;
            samples += 1;
            assert!(samples < 100, "attack did not finish");
        }
        // (31/32)^n <= 1/3
        assert_eq!(samples, 35);
        env.process(true, &Preset::DEFAULT, t);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn zero_sustain_decays_to_silence_with_gate_held() {
        let params = Preset {
            eg_decay_time: 0,
            eg_sustain_level: 0,
            ..Preset::DEFAULT
        };
        let mut env = Envelope::new();
        let out = run(&mut env, true, &params, 2_000);
        assert_eq!(out, 0);
        assert_eq!(env.level(), 0);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn decay_settles_exactly_on_sustain() {
        let params = Preset {
            eg_decay_time: 0,
            eg_sustain_level: 32,
            ..Preset::DEFAULT
        };
        let mut env = Envelope::new();
        run(&mut env, true, &params, 5_000);
        assert_eq!(env.level(), 32 << 18);
        assert_eq!(env.output(), 8192);
    }

    #[test]
    fn release_falls_to_zero() {
        let params = Preset {
            eg_decay_time: 0,
            eg_sustain_level: 64,
            ..Preset::DEFAULT
        };
        let mut env = Envelope::new();
        run(&mut env, true, &params, 200);
        assert!(env.level() >= 64 << 18);
        let out = run(&mut env, false, &params, 2_000);
        assert_eq!(out, 0);
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn longer_decay_time_is_slower() {
        let fast = Preset {
            eg_decay_time: 10,
            ..Preset::DEFAULT
        };
        let slow = Preset {
            eg_decay_time: 40,
            ..Preset::DEFAULT
        };
        let mut a = Envelope::new();
        let mut b = Envelope::new();
        run(&mut a, true, &fast, 3_000);
        run(&mut b, true, &slow, 3_000);
        assert!(a.level() < b.level());
    }

    #[test]
    fn releasing_during_attack_stops_the_attack() {
        let t = Tables::shared();
        let mut env = Envelope::new();
        for _ in 0..10 {
            env.process(true, &Preset::DEFAULT, t);
        }
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        env.process(false, &Preset::DEFAULT, t);
        assert_eq!(env.stage(), EnvelopeStage::Release);
    }

    #[test]
    fn held_gate_does_not_retrigger() {
        let params = Preset {
            eg_decay_time: 0,
            eg_sustain_level: 0,
            ..Preset::DEFAULT
        };
        let mut env = Envelope::new();
        run(&mut env, true, &params, 2_000);
        run(&mut env, true, &params, 100);
        assert_eq!(env.level(), 0, "attack restarted without a new gate edge");
        // A fresh edge retriggers.
        run(&mut env, false, &params, 1);
        run(&mut env, true, &params, 1);
        assert_eq!(env.stage(), EnvelopeStage::Attack);
    }
}
