//! Integration tests for the quadvox engine.
//!
//! Drives the public control API and the audio pipeline together: parameter
//! saturation, preset read-back through the status report, voice allocation,
//! envelope behavior observed through a running engine, oscillator phase
//! wrap, the buffer-mode callback contract, and a control thread writing
//! while an audio thread renders.

use quadvox_core::oscillator::phase_to_audio;
use quadvox_core::{
    ControlMessage, Controller, Engine, EnvelopeStage, FACTORY_PRESETS, NUM_VOICES, ONE_Q28,
    Oscillator, Param, Preset, SynthShared, Tables, pcm_sample,
};
use std::sync::atomic::{AtomicBool, Ordering};

fn gates(shared: &SynthShared) -> [bool; NUM_VOICES] {
    core::array::from_fn(|id| shared.voice(id).gate())
}

// ============================================================================
// 1. Parameters and presets
// ============================================================================

#[test]
fn steps_past_either_bound_stay_pinned() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    for param in Param::ALL {
        for _ in 0..300 {
            ctl.control_message(ControlMessage::Increment(param));
        }
        assert_eq!(shared.params().get(param), param.max(), "{param} not pinned at max");
        for _ in 0..300 {
            ctl.control_message(ControlMessage::Decrement(param));
        }
        assert_eq!(shared.params().get(param), param.min(), "{param} not pinned at min");
    }
}

#[test]
fn loaded_preset_reads_back_through_status() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
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
    assert_eq!(ctl.load_preset(&custom), Param::COUNT);
    let status = ctl.status();
    assert_eq!(status.params, custom);
    let text = status.to_string();
    assert!(text.contains("Osc 2 Coarse Pitch: +12"), "{text}");
    assert!(text.contains("Filter Cutoff     :  44"), "{text}");
}

#[test]
fn every_factory_preset_recalls_exactly() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    for (i, factory) in FACTORY_PRESETS.iter().enumerate() {
        ctl.control_code(25 + i as u8);
        assert_eq!(shared.params().snapshot(), factory.preset, "preset {i}");
    }
}

// ============================================================================
// 2. Voice allocation
// ============================================================================

#[test]
fn fifth_note_on_steals_voice_zero() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    for key in [48, 52, 55, 59, 62] {
        ctl.note_on(key);
    }
    assert_eq!(shared.voice(0).pitch(), 62);
    assert_eq!(gates(&shared), [true; NUM_VOICES]);
}

#[test]
fn note_off_without_match_is_a_no_op() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    ctl.note_on(60);
    ctl.note_on(64);
    let before = ctl.status();
    ctl.note_off(61);
    assert_eq!(ctl.status(), before);
    ctl.note_off(64);
    assert_eq!(gates(&shared), [true, false, false, false]);
}

#[test]
fn double_toggle_restores_gate() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    ctl.startup_chord();
    for key in [60, 64, 67, 71] {
        let before = gates(&shared);
        ctl.note_toggle(key);
        assert_ne!(gates(&shared), before);
        ctl.note_toggle(key);
        assert_eq!(gates(&shared), before, "toggle pair on {key} changed gates");
    }
}

// ============================================================================
// 3. Envelope through the running engine
// ============================================================================

#[test]
fn zero_sustain_settles_to_silence_while_held() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    ctl.set_parameter(Param::EgSustainLevel, 0);
    ctl.set_parameter(Param::EgDecayTime, 8);
    ctl.note_on(60);

    let mut engine = Engine::new(&shared, Tables::shared());
    for _ in 0..44_100 {
        engine.tick();
    }
    assert!(shared.voice(0).gate());
    assert_eq!(engine.voice(0).envelope().output(), 0);
    assert_eq!(engine.tick(), 0);
}

#[test]
fn factory_preset_five_attack_then_decay_then_release() {
    let shared = SynthShared::new();
    let tables = Tables::shared();
    let mut ctl = Controller::new(&shared);
    ctl.control_message(ControlMessage::FactoryPreset(5));
    let preset = FACTORY_PRESETS[5].preset;
    let sustain = i16::from(preset.eg_sustain_level) << 8;
    let step_period = tables.eg_decay[preset.eg_decay_time as usize] as usize;

    ctl.note_on(68);
    let mut engine = Engine::new(&shared, tables);

    // Attack: strictly rising until full scale.
    let mut prev = 0;
    let mut attack_samples = 0;
    loop {
        engine.tick();
        let eg = engine.voice(0).envelope();
        if eg.stage() != EnvelopeStage::Attack {
            break;
        }
        assert!(eg.output() > prev, "attack not rising at sample {attack_samples}");
        prev = eg.output();
        attack_samples += 1;
        assert!(attack_samples < 100);
    }
    assert_eq!(attack_samples, 35);

    // Decay: never rising, changes only every `step_period` samples, ends on sustain.
    let mut last_change = 0usize;
    for n in 1..=88_200usize {
        engine.tick();
        let out = engine.voice(0).envelope().output();
        assert!(out <= prev, "decay rose at sample {n}");
        assert!(out >= sustain, "decay undershot sustain at sample {n}");
        if out != prev {
            if last_change != 0 {
                assert!(n - last_change >= step_period, "decay stepped too fast at {n}");
            }
            last_change = n;
        }
        prev = out;
    }
    assert_eq!(prev, sustain);

    // Release: never rising, reaches zero.
    ctl.note_off(68);
    assert_eq!(gates(&shared), [false; NUM_VOICES]);
    for n in 0..88_200usize {
        engine.tick();
        let eg = engine.voice(0).envelope();
        assert_eq!(eg.stage(), EnvelopeStage::Release);
        assert!(eg.output() <= prev, "release rose at sample {n}");
        prev = eg.output();
    }
    assert_eq!(prev, 0);
}

// ============================================================================
// 4. Oscillator phase
// ============================================================================

#[test]
fn phase_wraps_within_one_increment() {
    let tables = Tables::shared();
    for pitch in [0u8, 21, 60, 69, 96, 120] {
        let inc = tables.osc_freq[pitch as usize];
        let advances = (1u64 << 32).div_ceil(u64::from(inc));
        let mut osc = Oscillator::new();
        for _ in 0..advances {
            osc.process(i32::from(pitch) << 8, 0, 0, &Preset::DEFAULT, tables);
        }
        let (phase, _) = osc.phases();
        assert!(phase < inc, "pitch {pitch}: phase {phase} not within increment {inc}");
    }
}

#[test]
fn oscillator_output_follows_wavetable() {
    let tables = Tables::shared();
    let mut osc = Oscillator::new();
    let solo = Preset {
        osc_mix: 0,
        ..Preset::DEFAULT
    };
    for _ in 0..1_000 {
        let out = osc.process(45 << 8, 0, 0, &solo, tables);
        let (phase, _) = osc.phases();
        assert_eq!(out, (phase_to_audio(phase, tables.wave(0, 45)) >> 14) << 14);
    }
}

// ============================================================================
// 5. Output path
// ============================================================================

#[test]
fn resonant_chord_output_stays_bounded() {
    let shared = SynthShared::new();
    let mut ctl = Controller::new(&shared);
    ctl.set_parameter(Param::FilterResonance, 5);
    ctl.set_parameter(Param::EgSustainLevel, 64);
    ctl.startup_chord();

    let mut engine = Engine::new(&shared, Tables::shared());
    for cutoff in [0, 30, 60, 90, 120] {
        ctl.set_parameter(Param::FilterCutoff, cutoff);
        for _ in 0..4_410 {
            let mix = engine.tick();
            assert!(mix.unsigned_abs() < 4 * ONE_Q28 as u32, "cutoff {cutoff}: mix {mix}");
        }
    }
}

#[test]
fn buffer_service_matches_tick_stream() {
    let shared_a = SynthShared::new();
    let shared_b = SynthShared::new();
    Controller::new(&shared_a).startup_chord();
    Controller::new(&shared_b).startup_chord();
    let tables = Tables::shared();

    let mut by_buffer = Engine::new(&shared_a, tables);
    let mut by_tick = Engine::new(&shared_b, tables);

    let mut buffers = vec![vec![0i16; 2 * 441]; 3];
    for buffer in &mut buffers {
        assert!(by_buffer.service_buffer(Some(buffer.as_mut_slice())));
    }
    for buffer in &buffers {
        for frame in buffer.chunks_exact(2) {
            let expected = pcm_sample(by_tick.tick());
            assert_eq!(frame, [expected, expected]);
        }
    }
}

#[test]
fn engines_are_independent_instances() {
    let shared = SynthShared::new();
    Controller::new(&shared).startup_chord();
    let tables = Tables::shared();
    let mut a = Engine::new(&shared, tables);
    let mut b = Engine::new(&shared, tables);
    for _ in 0..100 {
        a.tick();
    }
    b.tick();
    assert_ne!(a.voice(0), b.voice(0));
    a.reset();
    b.reset();
    assert_eq!(a.voice(0), b.voice(0));
}

// ============================================================================
// 6. Concurrency
// ============================================================================

#[test]
fn audio_thread_sees_only_written_field_values() {
    static SHARED: SynthShared = SynthShared::new();
    let lead = FACTORY_PRESETS[1].preset;
    let chime = FACTORY_PRESETS[8].preset;
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            let mut ctl = Controller::new(&SHARED);
            for i in 0..2_000u32 {
                let preset = if i % 2 == 0 { &lead } else { &chime };
                assert_eq!(ctl.load_preset(preset), Param::COUNT);
                let key = 48 + (i % 24) as u8;
                match i % 3 {
                    0 => ctl.note_on(key),
                    1 => ctl.note_toggle(key),
                    _ => ctl.note_off(key.wrapping_sub(1)),
                }
                std::thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        s.spawn(|| {
            let mut engine = Engine::new(&SHARED, Tables::shared());
            let mut ticks = 0u64;
            loop {
                let finished = done.load(Ordering::Acquire);
                engine.tick();
                ticks += 1;
                let seen = SHARED.params().snapshot();
                assert_eq!(seen.first_invalid(), None);
                for param in Param::ALL {
                    let value = seen.get(param);
                    assert!(
                        value == lead.get(param) || value == chime.get(param),
                        "{param} = {value} after {ticks} ticks"
                    );
                }
                if finished {
                    break;
                }
            }
            assert!(ticks > 0);
        });
    });

    assert_eq!(SHARED.params().snapshot(), chime);
}

#[test]
fn engine_renders_partially_applied_preset() {
    let lead = FACTORY_PRESETS[1].preset;
    let chime = FACTORY_PRESETS[8].preset;

    let mut mixed = lead;
    for &param in &Param::ALL[..Param::COUNT / 2] {
        mixed.set(param, chime.get(param));
    }
    assert_ne!(mixed, lead);
    assert_ne!(mixed, chime);

    // Stopped halfway through a field-by-field load.
    let partial = SynthShared::new();
    let mut ctl = Controller::new(&partial);
    ctl.load_preset(&lead);
    for &param in &Param::ALL[..Param::COUNT / 2] {
        assert!(ctl.set_parameter(param, chime.get(param)));
    }
    assert_eq!(partial.params().snapshot(), mixed);
    ctl.startup_chord();

    let whole = SynthShared::new();
    let mut whole_ctl = Controller::new(&whole);
    whole_ctl.load_preset(&mixed);
    whole_ctl.startup_chord();

    let target = SynthShared::new();
    let mut target_ctl = Controller::new(&target);
    target_ctl.load_preset(&chime);
    target_ctl.startup_chord();

    let tables = Tables::shared();
    let mut engine = Engine::new(&partial, tables);
    let mut reference = Engine::new(&whole, tables);
    let mut finished = Engine::new(&target, tables);
    let mut differs = false;
    for n in 0..4_410 {
        let sample = engine.tick();
        assert_eq!(sample, reference.tick(), "sample {n}");
        differs |= sample != finished.tick();
    }
    assert!(differs, "half-loaded preset rendered like the full one");
}
