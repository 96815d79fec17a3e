//! Offline rendering: a script played against a sample counter.

use quadvox_config::{EngineConfig, OutputMode, Sequencer};
use quadvox_core::{Controller, Engine, SAMPLE_RATE, Tables};

/// Most samples reserved up front; longer renders grow as they go.
const PREALLOC_SAMPLES: usize = 60 * SAMPLE_RATE as usize;

/// PWM compare level re-centered to a PCM sample.
///
/// A level of `cycle / 2` is silence; the result keeps the coarse step size
/// of the PWM path.
pub fn pwm_to_pcm(level: u16, cycle: u32) -> i16 {
    let half = (cycle / 2).max(1) as i32;
    let centered = i32::from(level) - half;
    (centered * i32::from(i16::MAX) / half).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// PWM compare level as a float sample in `[-1, 1]`.
pub fn pwm_to_unit(level: u16, cycle: u32) -> f32 {
    let half = (cycle / 2).max(1) as f32;
    ((f32::from(level) - half) / half).clamp(-1.0, 1.0)
}

/// Render `total` mono samples, running due script commands as time passes.
///
/// PWM mode ticks once per sample and runs the script before every tick. I2S
/// mode services alternating stereo buffers of `buffer_frames` and runs the
/// script only at buffer boundaries, as the timer-driven path does.
pub fn render(
    control: &mut Controller<'_>,
    sequencer: &mut Sequencer,
    config: &EngineConfig,
    total: u64,
) -> Vec<i16> {
    let shared = control.shared();
    let mut engine = Engine::new(shared, Tables::shared());
    let total = usize::try_from(total).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(total.min(PREALLOC_SAMPLES));

    match config.mode {
        OutputMode::Pwm => {
            let cycle = config.pwm_cycle();
            for n in 0..total {
                sequencer.run_due(n as u64, control);
                out.push(pwm_to_pcm(engine.tick_pwm(cycle), cycle));
            }
        }
        OutputMode::I2s => {
            let mut buffers = [vec![0i16; config.buffer_len()], vec![0i16; config.buffer_len()]];
            let mut next = 0;
            while out.len() < total {
                sequencer.run_due(out.len() as u64, control);
                let buffer = &mut buffers[next];
                engine.service_buffer(Some(buffer.as_mut_slice()));
                let wanted = total - out.len();
                out.extend(buffer.chunks_exact(2).take(wanted).map(|frame| frame[0]));
                next ^= 1;
            }
        }
    }
    tracing::debug!(samples = out.len(), mode = %config.mode, "render finished");
    out
}
