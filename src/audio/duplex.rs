//! cpal-backed duplex stream
//!
//! cpal has no single duplex stream, so capture and playback are opened as
//! two streams on the default devices and joined by the lock-free frame
//! bridge. The output callback pulls captured frames and runs the
//! modulation engine over them, one `frames_per_buffer` block at a time.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;

use super::buffer::{frame_bridge, FrameConsumer, StreamCounters, StreamStats, CHANNELS};
use super::facility::{
    AudioError, AudioFacility, DeviceInventory, Direction, DuplexConfig, DuplexStream,
};
use crate::modulation::ModulationEngine;

/// The platform's default audio host
pub struct CpalFacility {
    host: cpal::Host,
}

impl CpalFacility {
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::debug!("Using audio host: {:?}", host.id());
        Self { host }
    }
}

impl Default for CpalFacility {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill one output buffer in blocks of at most `captured.len()` samples,
/// pulling input from the bridge and running the engine over it.
fn fill_output(
    data: &mut [f32],
    captured: &mut [f32],
    consumer: &mut FrameConsumer,
    engine: &mut ModulationEngine,
    counters: &StreamCounters,
) {
    for chunk in data.chunks_mut(captured.len()) {
        let input = &mut captured[..chunk.len()];
        consumer.pop_frames(input);
        engine.process(input, chunk);
        counters.add_processed(chunk.len() / CHANNELS);
    }
}

fn device_name(device: &cpal::Device) -> String {
    device.name().unwrap_or_else(|_| "Unknown".to_string())
}

impl AudioFacility for CpalFacility {
    type Stream = CpalDuplexStream;

    fn devices(&self) -> Result<DeviceInventory, AudioError> {
        let inputs = self
            .host
            .input_devices()?
            .filter_map(|d| d.name().ok())
            .collect();
        let outputs = self
            .host
            .output_devices()?
            .filter_map(|d| d.name().ok())
            .collect();

        Ok(DeviceInventory {
            inputs,
            outputs,
            default_input: self.host.default_input_device().map(|d| device_name(&d)),
            default_output: self.host.default_output_device().map(|d| device_name(&d)),
        })
    }

    fn open_duplex(
        &self,
        config: &DuplexConfig,
        mut engine: ModulationEngine,
    ) -> Result<CpalDuplexStream, AudioError> {
        let input_device = self
            .host
            .default_input_device()
            .ok_or(AudioError::DeviceUnavailable(Direction::Input))?;
        let output_device = self
            .host
            .default_output_device()
            .ok_or(AudioError::DeviceUnavailable(Direction::Output))?;

        log::info!("Using input device: {}", device_name(&input_device));
        log::info!("Using output device: {}", device_name(&output_device));

        let stream_config = cpal::StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.frames_per_buffer),
        };
        log::debug!("Stream config: {:?}", stream_config);

        let counters = Arc::new(StreamCounters::default());
        let (mut producer, mut consumer) = frame_bridge(
            config.bridge_capacity(),
            config.latency_frames as usize,
            Arc::clone(&counters),
        );

        let input = input_device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    producer.push_frames(data);
                },
                |err| log::error!("Audio input error: {}", err),
                None,
            )
            .map_err(|source| AudioError::BuildStream {
                direction: Direction::Input,
                source,
            })?;

        // Scratch space for captured frames, allocated here so the callback never does
        let block = config.frames_per_buffer.max(1) as usize * CHANNELS;
        let mut captured = vec![0.0f32; block];
        let output_counters = Arc::clone(&counters);

        let output = output_device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_output(
                        data,
                        &mut captured,
                        &mut consumer,
                        &mut engine,
                        &output_counters,
                    );
                },
                |err| log::error!("Audio output error: {}", err),
                None,
            )
            .map_err(|source| AudioError::BuildStream {
                direction: Direction::Output,
                source,
            })?;

        Ok(CpalDuplexStream {
            input,
            output,
            counters,
        })
    }
}

/// Capture and playback streams running as one unit
pub struct CpalDuplexStream {
    input: cpal::Stream,
    output: cpal::Stream,
    counters: Arc<StreamCounters>,
}

impl DuplexStream for CpalDuplexStream {
    fn start(&mut self) -> Result<(), AudioError> {
        self.input.play()?;
        self.output.play()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        // Pause both even if the first fails, then report the first failure
        let output = self.output.pause();
        let input = self.input.pause();
        output?;
        input?;
        Ok(())
    }

    fn stats(&self) -> StreamStats {
        self.counters.snapshot()
    }
}
