//! Modulation module - the signal-processing core
//!
//! This module provides:
//! - Sine lookup table construction
//! - The real-time ring-modulation engine
//! - Frequency selection from user input

mod engine;
mod frequency;
mod table;

pub use engine::ModulationEngine;
pub use frequency::{select_frequency, DEFAULT_FREQUENCY};
pub use table::{FrequencyError, ModulationTable};
