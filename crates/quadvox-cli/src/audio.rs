//! Real-time output through cpal.
//!
//! The stream callback stands in for the hardware interrupt: in PWM mode it
//! ticks the engine once per frame, in I2S mode it services alternating stereo
//! buffers through [`Engine::service_buffer_profiled`]. Either way the engine
//! is owned by the callback and the control thread only touches the shared
//! atomics.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use quadvox_config::{EngineConfig, OutputMode};
use quadvox_core::{Engine, PeriodCounter, SAMPLE_RATE};
use std::time::Instant;

use crate::render::pwm_to_unit;

/// Errors raised while opening the output device.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// The host has no default output device.
    #[error("no audio output device available")]
    NoDevice,

    /// No output device matched the requested name.
    #[error("no output device matching '{0}'")]
    DeviceNotFound(String),

    /// Device enumeration failed.
    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    /// The stream could not be built.
    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),

    /// The stream could not be started.
    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
}

/// Emulated period counter: system-clock cycles into the current period.
///
/// The desktop has no PWM slice counter, so this derives one from wall time
/// at the configured system clock. Entry values are positions within a
/// period of `period_cycles`.
#[derive(Debug, Clone, Copy)]
pub struct PeriodClock {
    origin: Instant,
    cycles_per_ns: f64,
    period_cycles: u64,
}

impl PeriodClock {
    /// Clock at `sys_clock_hz` with a period of `period_cycles` cycles.
    pub fn new(sys_clock_hz: u32, period_cycles: u64) -> Self {
        Self {
            origin: Instant::now(),
            cycles_per_ns: f64::from(sys_clock_hz) / 1e9,
            period_cycles: period_cycles.max(1),
        }
    }

    /// Clock whose period is one callback in `config`'s output mode.
    pub fn for_config(config: &EngineConfig) -> Self {
        let period = match config.mode {
            OutputMode::Pwm => u64::from(config.pwm_cycle()),
            OutputMode::I2s => u64::from(config.pwm_cycle()) * config.buffer_frames as u64,
        };
        Self::new(config.sys_clock_hz, period)
    }
}

impl PeriodCounter for PeriodClock {
    fn ticks(&self) -> u32 {
        let cycles = (self.origin.elapsed().as_nanos() as f64 * self.cycles_per_ns) as u64;
        (cycles % self.period_cycles) as u32
    }
}

/// Double-buffered I2S emulation.
#[derive(Debug)]
pub struct BufferPump {
    buffers: [Vec<i16>; 2],
    active: usize,
    pos: usize,
}

impl BufferPump {
    /// Two interleaved stereo buffers of `frames` frames each.
    pub fn new(frames: usize) -> Self {
        let len = frames.max(1) * 2;
        Self {
            buffers: [vec![0; len], vec![0; len]],
            active: 1,
            pos: len,
        }
    }

    /// Next sample, servicing the other buffer when the active one runs out.
    pub fn next_sample<C: PeriodCounter + ?Sized>(
        &mut self,
        engine: &mut Engine<'_>,
        clock: &C,
    ) -> i16 {
        if self.pos >= self.buffers[self.active].len() {
            self.active ^= 1;
            engine.service_buffer_profiled(Some(self.buffers[self.active].as_mut_slice()), clock);
            self.pos = 0;
        }
        let sample = self.buffers[self.active][self.pos];
        self.pos += 2;
        sample
    }
}

/// Produces float frames for the output stream.
#[derive(Debug)]
pub struct StreamRenderer<'a> {
    engine: Engine<'a>,
    clock: PeriodClock,
    mode: OutputMode,
    cycle: u32,
    pump: BufferPump,
}

impl<'a> StreamRenderer<'a> {
    /// Renderer for `engine` in `config`'s output mode.
    pub fn new(engine: Engine<'a>, config: &EngineConfig) -> Self {
        Self {
            engine,
            clock: PeriodClock::for_config(config),
            mode: config.mode,
            cycle: config.pwm_cycle(),
            pump: BufferPump::new(config.buffer_frames),
        }
    }

    /// Next mono sample in `[-1, 1]`.
    pub fn next_sample(&mut self) -> f32 {
        match self.mode {
            OutputMode::Pwm => {
                let mix = self.engine.tick_profiled(&self.clock);
                pwm_to_unit(quadvox_core::pwm_level(mix, self.cycle), self.cycle)
            }
            OutputMode::I2s => {
                f32::from(self.pump.next_sample(&mut self.engine, &self.clock)) / 32768.0
            }
        }
    }

    /// Fill an interleaved buffer, copying each sample to every channel.
    pub fn fill(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }
}

/// Names of the available output devices.
pub fn output_device_names() -> Result<Vec<String>, AudioError> {
    let host = cpal::default_host();
    Ok(host
        .output_devices()?
        .filter_map(|d| device_name(&d))
        .collect())
}

fn device_name(device: &cpal::Device) -> Option<String> {
    device.description().ok().map(|d| d.name().to_string())
}

fn find_output_device(name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            host.output_devices()?
                .find(|d| {
                    device_name(d).is_some_and(|n| n.to_lowercase().contains(&search_lower))
                })
                .ok_or_else(|| AudioError::DeviceNotFound(search.to_string()))
        }
        None => host.default_output_device().ok_or(AudioError::NoDevice),
    }
}

/// Open an output stream at the engine rate and start it.
///
/// The returned stream stops when dropped.
pub fn start_output(
    mut renderer: StreamRenderer<'static>,
    device: Option<&str>,
    channels: u16,
) -> Result<cpal::Stream, AudioError> {
    let device = find_output_device(device)?;
    let stream_config = cpal::StreamConfig {
        channels,
        sample_rate: SAMPLE_RATE,
        buffer_size: cpal::BufferSize::Default,
    };
    let frame_channels = usize::from(channels);
    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            renderer.fill(data, frame_channels);
        },
        |err| tracing::error!(error = %err, "output stream error"),
        None,
    )?;
    stream.play()?;
    let name = device_name(&device).unwrap_or_else(|| "unknown".to_string());
    tracing::info!(
        device = %name,
        sample_rate = SAMPLE_RATE,
        channels,
        "output stream started"
    );
    Ok(stream)
}
