//! Built-in presets recalled by `PRESET_0..PRESET_9` control messages.

use crate::param::{FACTORY_PRESET_COUNT, Preset};

/// A factory preset with its display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FactoryPreset {
    /// Short display name.
    pub name: &'static str,
    /// Parameter values.
    pub preset: Preset,
}

#[allow(clippy::too_many_arguments)]
const fn preset(
    octave_shift: i8,
    osc_waveform: i8,
    osc2_coarse_pitch: i8,
    osc2_fine_pitch: i8,
    osc_mix: i8,
    filter_cutoff: i8,
    filter_resonance: i8,
    filter_mod_amount: i8,
    eg_decay_time: i8,
    eg_sustain_level: i8,
    lfo_depth: i8,
    lfo_rate: i8,
) -> Preset {
    Preset {
        octave_shift,
        osc_waveform,
        osc2_coarse_pitch,
        osc2_fine_pitch,
        osc_mix,
        filter_cutoff,
        filter_resonance,
        filter_mod_amount,
        eg_decay_time,
        eg_sustain_level,
        lfo_depth,
        lfo_rate,
    }
}

/// The factory bank, indexed by preset number.
pub const FACTORY_PRESETS: [FactoryPreset; FACTORY_PRESET_COUNT] = [
    FactoryPreset {
        name: "Init Saw",
        preset: Preset::DEFAULT,
    },
    FactoryPreset {
        name: "Square Lead",
        preset: preset(0, 1, 0, 4, 16, 72, 2, 40, 48, 48, 24, 40),
    },
    FactoryPreset {
        name: "Fifth Brass",
        preset: preset(0, 0, 7, 3, 24, 54, 1, 56, 44, 40, 8, 44),
    },
    FactoryPreset {
        name: "Octave Organ",
        preset: preset(0, 1, 12, 0, 32, 96, 0, 0, 36, 64, 0, 0),
    },
    FactoryPreset {
        name: "Reso Pluck",
        preset: preset(0, 0, 0, 8, 16, 36, 5, 60, 34, 0, 0, 32),
    },
    FactoryPreset {
        name: "Soft Keys",
        preset: preset(0, 0, 12, 2, 12, 48, 2, 48, 42, 32, 10, 20),
    },
    FactoryPreset {
        name: "Sub Bass",
        preset: preset(-2, 1, 0, 2, 8, 40, 3, 30, 30, 48, 0, 0),
    },
    FactoryPreset {
        name: "Wide Pad",
        preset: preset(0, 0, 0, 16, 32, 66, 1, 20, 56, 56, 32, 16),
    },
    FactoryPreset {
        name: "Chime",
        preset: preset(1, 1, 24, 4, 40, 90, 4, 30, 50, 0, 4, 56),
    },
    FactoryPreset {
        name: "Sweep",
        preset: preset(0, 0, 7, 6, 20, 30, 4, 60, 46, 24, 16, 36),
    },
];

/// Factory preset `index`, if it exists.
pub fn factory_preset(index: usize) -> Option<&'static FactoryPreset> {
    FACTORY_PRESETS.get(index)
}
