//! The audio facility seen by the rest of the program
//!
//! Everything hardware-specific sits behind `AudioFacility`: enumerating
//! devices and opening a stereo duplex stream that drives a
//! `ModulationEngine`. The cpal implementation lives in `duplex.rs`.

use std::fmt;

use thiserror::Error;

use super::buffer::StreamStats;
use crate::modulation::ModulationEngine;

/// Stream direction, used in error messages and device listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// Errors reported by the audio facility. All of them are fatal.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no default {0} device available")]
    DeviceUnavailable(Direction),

    #[error("failed to enumerate devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to open {direction} stream: {source}")]
    BuildStream {
        direction: Direction,
        #[source]
        source: cpal::BuildStreamError,
    },

    #[error("failed to start stream: {0}")]
    Start(#[from] cpal::PlayStreamError),

    #[error("failed to stop stream: {0}")]
    Stop(#[from] cpal::PauseStreamError),
}

/// Parameters for opening a duplex stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplexConfig {
    /// Sample rate for both directions (Hz)
    pub sample_rate: u32,
    /// Frames handed to the engine per callback
    pub frames_per_buffer: u32,
    /// Silence queued between capture and playback (frames)
    pub latency_frames: u32,
}

impl DuplexConfig {
    /// Capacity of the input-to-output bridge, in frames
    pub fn bridge_capacity(&self) -> usize {
        (self.latency_frames as usize + self.frames_per_buffer as usize) * 4
    }
}

/// Devices known to the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInventory {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub default_input: Option<String>,
    pub default_output: Option<String>,
}

impl DeviceInventory {
    pub fn device_count(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }
}

/// An open duplex stream. Dropping it closes the stream and releases the devices.
pub trait DuplexStream {
    /// Begin invoking the engine
    fn start(&mut self) -> Result<(), AudioError>;

    /// Ask the backend to stop invoking the engine.
    ///
    /// Some backends may still deliver a callback after this returns; only
    /// dropping the stream guarantees none run afterwards.
    fn stop(&mut self) -> Result<(), AudioError>;

    fn stats(&self) -> StreamStats;
}

/// Host audio system
pub trait AudioFacility {
    type Stream: DuplexStream;

    fn devices(&self) -> Result<DeviceInventory, AudioError>;

    /// Open (but do not start) a stereo f32 duplex stream on the default
    /// devices. The engine is moved onto the output callback's thread.
    fn open_duplex(
        &self,
        config: &DuplexConfig,
        engine: ModulationEngine,
    ) -> Result<Self::Stream, AudioError>;
}
