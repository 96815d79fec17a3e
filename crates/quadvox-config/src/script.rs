//! Timed event scripts.
//!
//! A script is a list of control-context events stamped in milliseconds. It is
//! compiled once into [`TimedCommand`]s (sample-stamped, fully validated) and
//! then replayed by a [`Sequencer`], either against a sample counter for
//! offline rendering or against wall-clock time for live playback.
//!
//! ```toml
//! duration_ms = 4000
//!
//! [[events]]
//! at_ms = 0
//! action = "factory_preset"
//! index = 5
//!
//! [[events]]
//! at_ms = 0
//! action = "note_on"
//! key = 68
//!
//! [[events]]
//! at_ms = 500
//! action = "control"
//! message = "filter_cutoff_inc"
//!
//! [[events]]
//! at_ms = 1500
//! action = "note_off"
//! key = 68
//! ```

use quadvox_core::{ControlMessage, Controller, FACTORY_PRESET_COUNT, Param, Preset, SAMPLE_RATE};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::preset::{PresetParams, write_toml_file};

/// Time appended after the last event when a script sets no duration.
pub const DEFAULT_TAIL_MS: u64 = 2_000;

/// Latest event time and longest explicit duration a script may use (one hour).
pub const MAX_SCRIPT_MS: u64 = 60 * 60 * 1000;

/// One action a script can perform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Start a key on the next voice.
    NoteOn {
        /// MIDI-style key number.
        key: u8,
    },
    /// Release a key.
    NoteOff {
        /// MIDI-style key number.
        key: u8,
    },
    /// Toggle a key.
    NoteToggle {
        /// MIDI-style key number.
        key: u8,
    },
    /// Release every voice.
    AllNotesOff,
    /// Play the power-on chord.
    StartupChord,
    /// A named control message such as `octave_shift_inc` or `preset_3`.
    Control {
        /// Message name, see [`control_message_name`].
        message: String,
    },
    /// Write one parameter.
    SetParameter {
        /// snake_case parameter name.
        param: String,
        /// New value.
        value: i64,
    },
    /// Load a complete preset.
    LoadPreset {
        /// Parameter values; omitted fields take the engine defaults.
        #[serde(default)]
        params: PresetParams,
    },
    /// Recall a factory preset.
    FactoryPreset {
        /// Factory preset index.
        index: u8,
    },
}

/// An action stamped with its time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptEvent {
    /// Milliseconds from the start of the script.
    pub at_ms: u64,
    /// What happens.
    #[serde(flatten)]
    pub action: Action,
}

impl ScriptEvent {
    /// Event performing `action` at `at_ms`.
    pub fn new(at_ms: u64, action: Action) -> Self {
        Self { at_ms, action }
    }
}

/// A validated control-context operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// [`Controller::note_on`]
    NoteOn(u8),
    /// [`Controller::note_off`]
    NoteOff(u8),
    /// [`Controller::note_toggle`]
    NoteToggle(u8),
    /// [`Controller::startup_chord`]
    StartupChord,
    /// [`Controller::control_message`]
    Message(ControlMessage),
    /// [`Controller::set_parameter`]
    SetParameter(Param, i8),
    /// [`Controller::load_preset`]
    LoadPreset(Preset),
}

impl Command {
    /// Perform the command.
    pub fn apply(&self, controller: &mut Controller<'_>) {
        match *self {
            Command::NoteOn(key) => controller.note_on(key),
            Command::NoteOff(key) => controller.note_off(key),
            Command::NoteToggle(key) => controller.note_toggle(key),
            Command::StartupChord => controller.startup_chord(),
            Command::Message(message) => controller.control_message(message),
            Command::SetParameter(param, value) => {
                controller.set_parameter(param, value);
            }
            Command::LoadPreset(ref preset) => {
                controller.load_preset(preset);
            }
        }
    }
}

/// A command stamped with the sample it is due at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedCommand {
    /// Sample index at 44.1 kHz.
    pub at_sample: u64,
    /// Command to run.
    pub command: Command,
}

/// Convert milliseconds to samples at the engine rate, rounding down.
///
/// Saturates at `u64::MAX` instead of overflowing.
pub fn ms_to_samples(ms: u64) -> u64 {
    ms.checked_mul(u64::from(SAMPLE_RATE))
        .map_or(u64::MAX, |scaled| scaled / 1000)
}

/// Name of a control message as written in scripts.
pub fn control_message_name(message: ControlMessage) -> String {
    match message {
        ControlMessage::Increment(param) => format!("{}_inc", param.name()),
        ControlMessage::Decrement(param) => format!("{}_dec", param.name()),
        ControlMessage::AllNotesOff => "all_notes_off".to_string(),
        ControlMessage::FactoryPreset(index) => format!("preset_{index}"),
    }
}

/// Parse a control message name produced by [`control_message_name`].
pub fn parse_control_message(name: &str) -> Option<ControlMessage> {
    if name == "all_notes_off" {
        return Some(ControlMessage::AllNotesOff);
    }
    if let Some(index) = name.strip_prefix("preset_") {
        let index: u8 = index.parse().ok()?;
        return (usize::from(index) < FACTORY_PRESET_COUNT)
            .then_some(ControlMessage::FactoryPreset(index));
    }
    if let Some(param) = name.strip_suffix("_inc") {
        return param.parse().ok().map(ControlMessage::Increment);
    }
    if let Some(param) = name.strip_suffix("_dec") {
        return param.parse().ok().map(ControlMessage::Decrement);
    }
    None
}

/// A timed event script.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Script {
    /// Total length; defaults to the last event plus [`DEFAULT_TAIL_MS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Events in time order.
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Script {
    /// Script with no events.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn with_event(mut self, at_ms: u64, action: Action) -> Self {
        self.events.push(ScriptEvent::new(at_ms, action));
        self
    }

    /// Set an explicit duration.
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// The built-in demonstration sequence.
    ///
    /// Factory preset 5 with a held note, a quick toggle pair, a custom
    /// preset, an octave shift, then factory preset 9 with a stepped filter
    /// envelope sweep.
    pub fn demo() -> Self {
        let custom = Preset {
            octave_shift: 0,
            osc_waveform: 0,
            osc2_coarse_pitch: 12,
            osc2_fine_pitch: 2,
            osc_mix: 9,
            filter_cutoff: 44,
            filter_resonance: 3,
            filter_mod_amount: 59,
            eg_decay_time: 42,
            eg_sustain_level: 32,
            lfo_depth: 10,
            lfo_rate: 9,
        };
        let control = |message: &str| Action::Control {
            message: message.to_string(),
        };
        let mod_amount = |value: i64| Action::SetParameter {
            param: Param::FilterModAmount.name().to_string(),
            value,
        };

        let mut script = Self::new()
            .with_event(0, control("preset_5"))
            .with_event(0, Action::NoteOn { key: 68 })
            .with_event(500, Action::NoteOff { key: 68 })
            .with_event(1_500, Action::NoteToggle { key: 70 })
            .with_event(1_520, Action::NoteToggle { key: 70 })
            .with_event(
                3_520,
                Action::LoadPreset {
                    params: custom.into(),
                },
            )
            .with_event(3_520, Action::NoteOn { key: 72 })
            .with_event(5_520, Action::NoteOff { key: 72 })
            .with_event(6_520, control("octave_shift_inc"))
            .with_event(6_520, Action::NoteOn { key: 72 })
            .with_event(8_520, Action::NoteOff { key: 72 })
            .with_event(9_520, control("preset_9"))
            .with_event(9_520, Action::NoteOn { key: 74 })
            .with_event(9_520, mod_amount(60));
        let mut at = 9_520;
        for value in [50, 40, 30, 20, 10] {
            at += 500;
            script = script.with_event(at, mod_amount(value));
        }
        script
            .with_event(at + 500, Action::NoteOff { key: 74 })
            .with_duration(at + 500 + DEFAULT_TAIL_MS)
    }

    /// Total length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.unwrap_or_else(|| {
            self.events
                .last()
                .map_or(0, |e| e.at_ms)
                .saturating_add(DEFAULT_TAIL_MS)
        })
    }

    /// Total length in samples.
    pub fn duration_samples(&self) -> u64 {
        ms_to_samples(self.duration_ms())
    }

    /// Validate every event and convert to sample-stamped commands.
    pub fn compile(&self) -> Result<Vec<TimedCommand>, ConfigError> {
        let mut last_ms = 0;
        self.events
            .iter()
            .enumerate()
            .map(|(index, event)| {
                if event.at_ms < last_ms {
                    return Err(ConfigError::invalid_script(
                        index,
                        format!("at_ms {} is before previous event at {last_ms}", event.at_ms),
                    ));
                }
                if event.at_ms > MAX_SCRIPT_MS {
                    return Err(ConfigError::invalid_script(
                        index,
                        format!("at_ms {} is past the {MAX_SCRIPT_MS} ms limit", event.at_ms),
                    ));
                }
                last_ms = event.at_ms;
                Ok(TimedCommand {
                    at_sample: ms_to_samples(event.at_ms),
                    command: resolve(index, &event.action)?,
                })
            })
            .collect()
    }

    /// Check the script compiles and its duration is within [`MAX_SCRIPT_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ms) = self.duration_ms
            && ms > MAX_SCRIPT_MS
        {
            return Err(ConfigError::InvalidConfig {
                field: "duration_ms",
                reason: format!("{ms} ms is past the {MAX_SCRIPT_MS} ms limit"),
            });
        }
        self.compile().map(|_| ())
    }

    /// Load and validate a script file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a script string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let script: Self = toml::from_str(toml_str)?;
        script.validate()?;
        Ok(script)
    }

    /// Save the script, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_toml_file(path.as_ref(), &self.to_toml()?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn resolve(index: usize, action: &Action) -> Result<Command, ConfigError> {
    let command = match action {
        Action::NoteOn { key } => Command::NoteOn(*key),
        Action::NoteOff { key } => Command::NoteOff(*key),
        Action::NoteToggle { key } => Command::NoteToggle(*key),
        Action::AllNotesOff => Command::Message(ControlMessage::AllNotesOff),
        Action::StartupChord => Command::StartupChord,
        Action::Control { message } => parse_control_message(message)
            .map(Command::Message)
            .ok_or_else(|| {
                ConfigError::invalid_script(index, format!("unknown control message '{message}'"))
            })?,
        Action::SetParameter { param, value } => {
            let param: Param = param.parse().map_err(|_| {
                ConfigError::invalid_script(index, format!("unknown parameter '{param}'"))
            })?;
            let checked = i8::try_from(*value)
                .ok()
                .filter(|&v| param.contains(v))
                .ok_or_else(|| {
                    ConfigError::invalid_script(
                        index,
                        format!(
                            "{param} = {value} outside {}..={}",
                            param.min(),
                            param.max()
                        ),
                    )
                })?;
            Command::SetParameter(param, checked)
        }
        Action::LoadPreset { params } => Command::LoadPreset(
            params
                .to_preset()
                .map_err(|e| ConfigError::invalid_script(index, e.to_string()))?,
        ),
        Action::FactoryPreset { index: preset } => {
            if usize::from(*preset) >= FACTORY_PRESET_COUNT {
                return Err(ConfigError::invalid_script(
                    index,
                    format!("factory preset {preset} does not exist"),
                ));
            }
            Command::Message(ControlMessage::FactoryPreset(*preset))
        }
    };
    Ok(command)
}

/// Replays compiled commands in time order.
#[derive(Debug, Clone)]
pub struct Sequencer {
    commands: Vec<TimedCommand>,
    next: usize,
}

impl Sequencer {
    /// Sequencer over `commands`, which must be sorted by time.
    pub fn new(commands: Vec<TimedCommand>) -> Self {
        Self { commands, next: 0 }
    }

    /// Compile `script` and wrap it.
    pub fn from_script(script: &Script) -> Result<Self, ConfigError> {
        Ok(Self::new(script.compile()?))
    }

    /// Sample the next pending command is due at.
    pub fn next_due(&self) -> Option<u64> {
        self.commands.get(self.next).map(|c| c.at_sample)
    }

    /// Whether every command has run.
    pub fn is_finished(&self) -> bool {
        self.next >= self.commands.len()
    }

    /// Run every pending command due at or before `now`. Returns how many ran.
    pub fn run_due(&mut self, now: u64, controller: &mut Controller<'_>) -> usize {
        let start = self.next;
        while let Some(timed) = self.commands.get(self.next) {
            if timed.at_sample > now {
                break;
            }
            tracing::trace!(
                at_sample = timed.at_sample,
                command = ?timed.command,
                "script command"
            );
            timed.command.apply(controller);
            self.next += 1;
        }
        self.next - start
    }

    /// Rewind to the first command.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}
