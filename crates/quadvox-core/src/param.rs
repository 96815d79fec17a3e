//! The twelve live synthesizer parameters, presets, and control messages.
//!
//! Every parameter is a small signed integer with a closed range. The live set
//! is held in a [`ParamStore`] of per-parameter atomics: the control context is
//! the only writer, the audio context reads a [`Preset`]-shaped snapshot once
//! per tick. Fields are independent, so a reader racing a preset load may see
//! a mix of old and new values for one tick.

use core::fmt;
use core::str::FromStr;
use core::sync::atomic::{AtomicI8, Ordering};

/// Number of factory presets addressable by control messages.
pub const FACTORY_PRESET_COUNT: usize = 10;

/// A live synthesizer parameter.
///
/// Discriminants are the stable parameter ids used by
/// [`Controller::set_parameter`](crate::Controller::set_parameter) callers that
/// address parameters numerically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Param {
    /// Key transposition in octaves, `-5..=4`.
    OctaveShift = 0,
    /// Oscillator waveform: 0 saw, 1 square.
    OscWaveform = 1,
    /// Oscillator 2 coarse detune in semitones, `0..=24`.
    Osc2CoarsePitch = 2,
    /// Oscillator 2 fine detune in 1/64 semitones, `0..=32`.
    Osc2FinePitch = 3,
    /// Oscillator 1/2 balance, `0..=64` (0 is oscillator 1 only).
    OscMix = 4,
    /// Envelope sustain level, `0..=64`.
    EgSustainLevel = 5,
    /// Envelope decay/release time, `0..=64`.
    EgDecayTime = 6,
    /// Filter cutoff in semitones, `0..=120`.
    FilterCutoff = 7,
    /// Filter resonance, `0..=5`.
    FilterResonance = 8,
    /// Envelope-to-cutoff modulation amount, `0..=60`.
    FilterModAmount = 9,
    /// LFO pitch-modulation depth, `0..=64`.
    LfoDepth = 10,
    /// LFO rate, `0..=64`.
    LfoRate = 11,
}

impl Param {
    /// Number of parameters.
    pub const COUNT: usize = 12;

    /// All parameters in id order.
    pub const ALL: [Param; Self::COUNT] = [
        Param::OctaveShift,
        Param::OscWaveform,
        Param::Osc2CoarsePitch,
        Param::Osc2FinePitch,
        Param::OscMix,
        Param::EgSustainLevel,
        Param::EgDecayTime,
        Param::FilterCutoff,
        Param::FilterResonance,
        Param::FilterModAmount,
        Param::LfoDepth,
        Param::LfoRate,
    ];

    /// Numeric id (`0..COUNT`).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parameter with the given numeric id.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Smallest accepted value.
    pub const fn min(self) -> i8 {
        match self {
            Param::OctaveShift => -5,
            _ => 0,
        }
    }

    /// Largest accepted value.
    pub const fn max(self) -> i8 {
        match self {
            Param::OctaveShift => 4,
            Param::OscWaveform => 1,
            Param::Osc2CoarsePitch => 24,
            Param::Osc2FinePitch => 32,
            Param::FilterCutoff => 120,
            Param::FilterResonance => 5,
            Param::FilterModAmount => 60,
            Param::OscMix
            | Param::EgSustainLevel
            | Param::EgDecayTime
            | Param::LfoDepth
            | Param::LfoRate => 64,
        }
    }

    /// Power-on value.
    pub const fn default_value(self) -> i8 {
        Preset::DEFAULT.get(self)
    }

    /// Whether `value` lies inside `min()..=max()`.
    #[inline]
    pub const fn contains(self, value: i8) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// snake_case name, as used in preset files.
    pub const fn name(self) -> &'static str {
        match self {
            Param::OctaveShift => "octave_shift",
            Param::OscWaveform => "osc_waveform",
            Param::Osc2CoarsePitch => "osc2_coarse_pitch",
            Param::Osc2FinePitch => "osc2_fine_pitch",
            Param::OscMix => "osc_mix",
            Param::EgSustainLevel => "eg_sustain_level",
            Param::EgDecayTime => "eg_decay_time",
            Param::FilterCutoff => "filter_cutoff",
            Param::FilterResonance => "filter_resonance",
            Param::FilterModAmount => "filter_mod_amount",
            Param::LfoDepth => "lfo_depth",
            Param::LfoRate => "lfo_rate",
        }
    }

    /// Human-readable label for status output.
    pub const fn label(self) -> &'static str {
        match self {
            Param::OctaveShift => "Octave Shift",
            Param::OscWaveform => "Osc Waveform",
            Param::Osc2CoarsePitch => "Osc 2 Coarse Pitch",
            Param::Osc2FinePitch => "Osc 2 Fine Pitch",
            Param::OscMix => "Osc 1/2 Mix",
            Param::EgSustainLevel => "EG Sustain Level",
            Param::EgDecayTime => "EG Decay Time",
            Param::FilterCutoff => "Filter Cutoff",
            Param::FilterResonance => "Filter Resonance",
            Param::FilterModAmount => "Filter EG Amount",
            Param::LfoDepth => "LFO Depth",
            Param::LfoRate => "LFO Rate",
        }
    }

    /// Whether status output prints the value with an explicit sign.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Param::OctaveShift
                | Param::Osc2CoarsePitch
                | Param::Osc2FinePitch
                | Param::FilterModAmount
        )
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownParam;

impl fmt::Display for UnknownParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown synth parameter")
    }
}

impl FromStr for Param {
    type Err = UnknownParam;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Param::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or(UnknownParam)
    }
}

/// A complete snapshot of all twelve parameter values.
///
/// Used for factory and user presets and for the per-tick snapshot the engine
/// reads. Values are not validated on construction; [`Preset::first_invalid`]
/// reports the first field outside its range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Preset {
    /// See [`Param::OctaveShift`].
    pub octave_shift: i8,
    /// See [`Param::OscWaveform`].
    pub osc_waveform: i8,
    /// See [`Param::Osc2CoarsePitch`].
    pub osc2_coarse_pitch: i8,
    /// See [`Param::Osc2FinePitch`].
    pub osc2_fine_pitch: i8,
    /// See [`Param::OscMix`].
    pub osc_mix: i8,
    /// See [`Param::FilterCutoff`].
    pub filter_cutoff: i8,
    /// See [`Param::FilterResonance`].
    pub filter_resonance: i8,
    /// See [`Param::FilterModAmount`].
    pub filter_mod_amount: i8,
    /// See [`Param::EgDecayTime`].
    pub eg_decay_time: i8,
    /// See [`Param::EgSustainLevel`].
    pub eg_sustain_level: i8,
    /// See [`Param::LfoDepth`].
    pub lfo_depth: i8,
    /// See [`Param::LfoRate`].
    pub lfo_rate: i8,
}

impl Preset {
    /// Power-on parameter values.
    pub const DEFAULT: Self = Self {
        octave_shift: 0,
        osc_waveform: 0,
        osc2_coarse_pitch: 0,
        osc2_fine_pitch: 4,
        osc_mix: 16,
        filter_cutoff: 60,
        filter_resonance: 3,
        filter_mod_amount: 60,
        eg_decay_time: 40,
        eg_sustain_level: 0,
        lfo_depth: 16,
        lfo_rate: 48,
    };

    /// Value of one parameter.
    pub const fn get(&self, param: Param) -> i8 {
        match param {
            Param::OctaveShift => self.octave_shift,
            Param::OscWaveform => self.osc_waveform,
            Param::Osc2CoarsePitch => self.osc2_coarse_pitch,
            Param::Osc2FinePitch => self.osc2_fine_pitch,
            Param::OscMix => self.osc_mix,
            Param::EgSustainLevel => self.eg_sustain_level,
            Param::EgDecayTime => self.eg_decay_time,
            Param::FilterCutoff => self.filter_cutoff,
            Param::FilterResonance => self.filter_resonance,
            Param::FilterModAmount => self.filter_mod_amount,
            Param::LfoDepth => self.lfo_depth,
            Param::LfoRate => self.lfo_rate,
        }
    }

    /// Overwrite one parameter, unchecked.
    pub fn set(&mut self, param: Param, value: i8) {
        let slot = match param {
            Param::OctaveShift => &mut self.octave_shift,
            Param::OscWaveform => &mut self.osc_waveform,
            Param::Osc2CoarsePitch => &mut self.osc2_coarse_pitch,
            Param::Osc2FinePitch => &mut self.osc2_fine_pitch,
            Param::OscMix => &mut self.osc_mix,
            Param::EgSustainLevel => &mut self.eg_sustain_level,
            Param::EgDecayTime => &mut self.eg_decay_time,
            Param::FilterCutoff => &mut self.filter_cutoff,
            Param::FilterResonance => &mut self.filter_resonance,
            Param::FilterModAmount => &mut self.filter_mod_amount,
            Param::LfoDepth => &mut self.lfo_depth,
            Param::LfoRate => &mut self.lfo_rate,
        };
        *slot = value;
    }

    /// Values in parameter id order.
    pub const fn to_array(&self) -> [i8; Param::COUNT] {
        let mut out = [0; Param::COUNT];
        let mut i = 0;
        while i < Param::COUNT {
            out[i] = self.get(Param::ALL[i]);
            i += 1;
        }
        out
    }

    /// First parameter whose value lies outside its range.
    pub fn first_invalid(&self) -> Option<Param> {
        Param::ALL.into_iter().find(|&p| !p.contains(self.get(p)))
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A relative or recall command from a control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMessage {
    /// Step a parameter up by one, saturating at its maximum.
    Increment(Param),
    /// Step a parameter down by one, saturating at its minimum.
    Decrement(Param),
    /// Release every voice.
    AllNotesOff,
    /// Recall factory preset `0..FACTORY_PRESET_COUNT`.
    FactoryPreset(u8),
}

/// Wire order of the step messages: codes `2k` and `2k + 1`.
const STEP_CODES: [(Param, bool); 24] = [
    (Param::OctaveShift, true),
    (Param::OctaveShift, false),
    (Param::EgSustainLevel, true),
    (Param::EgSustainLevel, false),
    (Param::OscWaveform, false),
    (Param::OscWaveform, true),
    (Param::Osc2CoarsePitch, true),
    (Param::Osc2CoarsePitch, false),
    (Param::Osc2FinePitch, true),
    (Param::Osc2FinePitch, false),
    (Param::OscMix, true),
    (Param::OscMix, false),
    (Param::EgDecayTime, true),
    (Param::EgDecayTime, false),
    (Param::FilterCutoff, true),
    (Param::FilterCutoff, false),
    (Param::FilterResonance, true),
    (Param::FilterResonance, false),
    (Param::FilterModAmount, true),
    (Param::FilterModAmount, false),
    (Param::LfoDepth, true),
    (Param::LfoDepth, false),
    (Param::LfoRate, true),
    (Param::LfoRate, false),
];

const ALL_NOTES_OFF_CODE: u8 = 24;
const FIRST_PRESET_CODE: u8 = 25;

impl ControlMessage {
    /// Highest valid numeric code.
    pub const MAX_CODE: u8 = FIRST_PRESET_CODE + FACTORY_PRESET_COUNT as u8 - 1;

    /// Decode a numeric control code (`0..=34`) from a serial front-end.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            c if (c as usize) < STEP_CODES.len() => {
                let (param, up) = STEP_CODES[c as usize];
                Some(if up {
                    ControlMessage::Increment(param)
                } else {
                    ControlMessage::Decrement(param)
                })
            }
            ALL_NOTES_OFF_CODE => Some(ControlMessage::AllNotesOff),
            c if c <= Self::MAX_CODE => Some(ControlMessage::FactoryPreset(c - FIRST_PRESET_CODE)),
            _ => None,
        }
    }

    /// Numeric code of this message. Out-of-range preset indices have no code.
    pub fn code(self) -> Option<u8> {
        match self {
            ControlMessage::Increment(param) => STEP_CODES
                .iter()
                .position(|&entry| entry == (param, true))
                .map(|i| i as u8),
            ControlMessage::Decrement(param) => STEP_CODES
                .iter()
                .position(|&entry| entry == (param, false))
                .map(|i| i as u8),
            ControlMessage::AllNotesOff => Some(ALL_NOTES_OFF_CODE),
            ControlMessage::FactoryPreset(i) if (i as usize) < FACTORY_PRESET_COUNT => {
                Some(FIRST_PRESET_CODE + i)
            }
            ControlMessage::FactoryPreset(_) => None,
        }
    }
}

/// Live parameter set shared between the control and audio contexts.
///
/// One atomic per parameter. Writes come from a single control context, so
/// read-modify-write steps are a plain load followed by a store; no
/// compare-and-swap is needed, which keeps the store usable on cores without
/// atomic RMW instructions.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicI8; Param::COUNT],
}

impl ParamStore {
    /// Store holding the power-on defaults.
    pub const fn new() -> Self {
        Self::with_preset(&Preset::DEFAULT)
    }

    /// Store initialized from `preset`, unchecked.
    pub const fn with_preset(preset: &Preset) -> Self {
        let v = preset.to_array();
        Self {
            values: [
                AtomicI8::new(v[0]),
                AtomicI8::new(v[1]),
                AtomicI8::new(v[2]),
                AtomicI8::new(v[3]),
                AtomicI8::new(v[4]),
                AtomicI8::new(v[5]),
                AtomicI8::new(v[6]),
                AtomicI8::new(v[7]),
                AtomicI8::new(v[8]),
                AtomicI8::new(v[9]),
                AtomicI8::new(v[10]),
                AtomicI8::new(v[11]),
            ],
        }
    }

    /// Current value of `param`.
    #[inline]
    pub fn get(&self, param: Param) -> i8 {
        self.values[param.index()].load(Ordering::Relaxed)
    }

    /// Write `value` if it is inside the parameter's range.
    ///
    /// Returns `false` and leaves the store untouched otherwise.
    pub fn set(&self, param: Param, value: i8) -> bool {
        if !param.contains(value) {
            return false;
        }
        self.values[param.index()].store(value, Ordering::Relaxed);
        true
    }

    /// Step `param` by one toward `max()` (`up`) or `min()`. Pinned at the bound.
    ///
    /// Returns whether the value changed.
    pub fn step(&self, param: Param, up: bool) -> bool {
        let current = self.get(param);
        let next = if up {
            if current >= param.max() {
                return false;
            }
            current + 1
        } else {
            if current <= param.min() {
                return false;
            }
            current - 1
        };
        self.values[param.index()].store(next, Ordering::Relaxed);
        true
    }

    /// Copy of every value. Each field is loaded independently.
    pub fn snapshot(&self) -> Preset {
        let mut out = Preset::DEFAULT;
        for p in Param::ALL {
            out.set(p, self.get(p));
        }
        out
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}
