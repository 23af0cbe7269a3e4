//! Sine lookup table for the ring-modulation carrier
//!
//! The table holds exactly one cycle of a sine wave at the modulation
//! frequency, sampled at the stream's sample rate. It is built once before
//! the stream opens and only read afterwards.

use std::f64::consts::PI;
use std::ops::Index;

use thiserror::Error;

/// Largest table we are willing to allocate (16M samples, 64 MiB).
pub const MAX_TABLE_LEN: usize = 1 << 24;

/// Errors raised while choosing or building a modulation frequency
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrequencyError {
    #[error("could not parse {0:?} as a frequency")]
    Unparseable(String),

    #[error("{freq_hz} Hz is not a usable modulation frequency at {sample_rate} Hz")]
    InvalidFrequency { freq_hz: f32, sample_rate: u32 },
}

/// One full sine cycle, evenly distributed over `len()` points
#[derive(Debug, Clone, PartialEq)]
pub struct ModulationTable {
    samples: Box<[f32]>,
    freq_hz: f32,
}

impl ModulationTable {
    /// Build the table for `freq_hz` at `sample_rate`.
    ///
    /// The length is `floor(sample_rate / freq_hz)`. A frequency that is not
    /// a finite positive number, or that yields an empty (or oversized)
    /// table, is rejected.
    pub fn build(sample_rate: u32, freq_hz: f32) -> Result<Self, FrequencyError> {
        let len = Self::length_for(sample_rate, freq_hz)?;

        let samples = (0..len)
            .map(|i| (i as f64 / len as f64 * PI * 2.0).sin() as f32)
            .collect();

        Ok(Self { samples, freq_hz })
    }

    /// Table length `build` would produce, without allocating it
    pub fn length_for(sample_rate: u32, freq_hz: f32) -> Result<usize, FrequencyError> {
        let invalid = FrequencyError::InvalidFrequency {
            freq_hz,
            sample_rate,
        };

        if !freq_hz.is_finite() || freq_hz <= 0.0 {
            return Err(invalid);
        }

        let len = (sample_rate as f64 / freq_hz as f64).floor();
        if len < 1.0 || len > MAX_TABLE_LEN as f64 {
            return Err(invalid);
        }

        Ok(len as usize)
    }

    /// Number of samples in one cycle
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; an empty table cannot be built.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Frequency the table was built for
    pub fn frequency(&self) -> f32 {
        self.freq_hz
    }
}

impl Index<usize> for ModulationTable {
    type Output = f32;

    #[inline]
    fn index(&self, index: usize) -> &f32 {
        &self.samples[index]
    }
}
