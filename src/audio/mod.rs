//! Audio module - handles the duplex stream around the modulation engine
//!
//! This module provides:
//! - The `AudioFacility` interface the session drives
//! - Lock-free frame bridge between capture and playback
//! - cpal implementation on the default devices

mod buffer;
mod duplex;
mod facility;

#[cfg(test)]
pub mod fake;

pub use buffer::StreamStats;
pub use duplex::CpalFacility;
pub use facility::{AudioError, AudioFacility, DeviceInventory, DuplexConfig, DuplexStream};
