//! quadvox core - a four-voice fixed-point synthesizer engine
//!
//! This crate is the complete signal path of a small polyphonic synth meant to
//! run inside a per-sample interrupt on a microcontroller without an FPU
//! (the reference target is an RP2040 at 120 MHz producing 44.1 kHz audio).
//! Everything on the audio path is integer arithmetic.
//!
//! # Architecture
//!
//! The synth is split along its two execution contexts:
//!
//! - [`SynthShared`] - atomics both contexts touch: the twelve live parameters,
//!   four voice pitch/gate slots, and the interrupt timing profile.
//! - [`Controller`] - the control context: note on/off/toggle, parameter
//!   steps and writes, preset recall, status.
//! - [`Engine`] - the audio context: owns per-voice stage state and produces
//!   one sample per [`Engine::tick`] or one I2S buffer per
//!   [`Engine::service_buffer`].
//! - [`Tables`] - immutable lookup tables, generated once at startup.
//!
//! Each voice runs five stages per sample:
//!
//! ```text
//! LFO --pitch mod--> Oscillator x2 --> Filter --> Amp --> mix / 4
//!                                        ^         ^
//! gate --> Envelope ---- cutoff mod -----'--gain---'
//! ```
//!
//! # Example
//!
//! ```rust
//! use quadvox_core::{Controller, Engine, SynthShared, Tables};
//!
//! let shared = SynthShared::new();
//! let mut control = Controller::new(&shared);
//! let mut engine = Engine::new(&shared, Tables::shared());
//!
//! control.load_factory_preset(5);
//! control.note_on(68);
//!
//! let mut buffer = [0i16; 882];
//! engine.service_buffer(Some(&mut buffer[..]));
//! control.note_off(68);
//! ```
//!
//! # Concurrency
//!
//! The control and audio contexts share no locks. Every shared field is an
//! independent atomic with a single writer, so the audio path never waits;
//! the price is that a tick may see a multi-field update (a preset load)
//! partially applied. Only load/store atomics are used, which the Cortex-M0+
//! supports without compare-and-swap.
//!
//! # no_std Support
//!
//! Disable default features for embedded targets. [`Tables::generate`] needs a
//! global allocator; firmware without one can fill a `static` [`Tables`] with
//! [`Tables::fill`].
//!
//! # Features
//!
//! - `std` (default): [`Tables::shared`], a lazily generated process-wide table set.
//! - `tracing`: `tracing::debug!` events from control operations.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod amp;
pub mod control;
pub mod engine;
pub mod envelope;
pub mod factory_presets;
pub mod filter;
pub mod fixed;
pub mod lfo;
pub mod oscillator;
pub mod output;
pub mod param;
pub mod profile;
pub mod shared;
pub mod status;
pub mod tables;
pub mod voice;

pub use control::{Controller, STARTUP_CHORD};
pub use engine::Engine;
pub use envelope::{Envelope, EnvelopeStage};
pub use factory_presets::{FACTORY_PRESETS, FactoryPreset, factory_preset};
pub use filter::Filter;
pub use fixed::{ONE_Q14, ONE_Q28, Q14, Q28};
pub use lfo::Lfo;
pub use oscillator::Oscillator;
pub use output::{PWM_CYCLE, pcm_sample, pwm_cycle, pwm_level};
pub use param::{ControlMessage, FACTORY_PRESET_COUNT, Param, ParamStore, Preset, UnknownParam};
pub use profile::{PeriodCounter, TimingProfile, TimingSnapshot};
pub use shared::SynthShared;
pub use status::Status;
pub use tables::{SAMPLE_RATE, Tables};
pub use voice::{NUM_VOICES, Voice, VoiceControl};
