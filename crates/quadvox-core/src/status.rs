//! Diagnostic status report.

use core::fmt;

use crate::param::{Param, Preset};
use crate::profile::TimingSnapshot;
use crate::voice::NUM_VOICES;

/// Point-in-time view of the synth for a status printout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    /// Pitch of each voice slot.
    pub pitches: [u8; NUM_VOICES],
    /// Gate of each voice slot.
    pub gates: [bool; NUM_VOICES],
    /// The twelve live parameters.
    pub params: Preset,
    /// Entry and processing times of the audio callback.
    pub timing: TimingSnapshot,
}

/// Status order of the parameter lines.
const DISPLAY_ORDER: [Param; Param::COUNT] = [
    Param::OctaveShift,
    Param::OscWaveform,
    Param::Osc2CoarsePitch,
    Param::Osc2FinePitch,
    Param::OscMix,
    Param::FilterCutoff,
    Param::FilterResonance,
    Param::FilterModAmount,
    Param::EgDecayTime,
    Param::EgSustainLevel,
    Param::LfoDepth,
    Param::LfoRate,
];

const LABEL_WIDTH: usize = 18;

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [p0, p1, p2, p3] = self.pitches;
        let [g0, g1, g2, g3] = self.gates.map(u8::from);
        writeln!(f, "{:<LABEL_WIDTH$}: [ {p0:3}, {p1:3}, {p2:3}, {p3:3} ]", "Pitch")?;
        writeln!(f, "{:<LABEL_WIDTH$}: [ {g0:3}, {g1:3}, {g2:3}, {g3:3} ]", "Gate")?;
        for param in DISPLAY_ORDER {
            let value = self.params.get(param);
            if param.is_signed() {
                writeln!(f, "{:<LABEL_WIDTH$}: {value:+3}", param.label())?;
            } else {
                writeln!(f, "{:<LABEL_WIDTH$}: {value:3}", param.label())?;
            }
        }
        let t = self.timing;
        writeln!(f, "{:<LABEL_WIDTH$}: {:4}/{:4}", "Start Time", t.entry, t.max_entry)?;
        writeln!(
            f,
            "{:<LABEL_WIDTH$}: {:4}/{:4}",
            "Processing Time", t.processing, t.max_processing
        )
    }
}
