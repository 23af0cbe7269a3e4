//! Modulation frequency selection
//!
//! The frequency comes from the command line when it is usable, otherwise
//! from the configured default. A bad argument is never fatal.

use super::table::{FrequencyError, ModulationTable};

/// Frequency used when none (or an unusable one) is given
pub const DEFAULT_FREQUENCY: f32 = 30.0;

/// Parse a user-supplied frequency and check it yields a usable table
pub fn parse_frequency(text: &str, sample_rate: u32) -> Result<f32, FrequencyError> {
    let freq_hz: f32 = text
        .trim()
        .parse()
        .map_err(|_| FrequencyError::Unparseable(text.to_string()))?;

    ModulationTable::length_for(sample_rate, freq_hz)?;
    Ok(freq_hz)
}

/// Pick the modulation frequency for this run.
///
/// Falls back to `default` with a warning when `arg` does not parse, is
/// zero, or cannot produce a table at `sample_rate`.
pub fn select_frequency(arg: Option<&str>, sample_rate: u32, default: f32) -> f32 {
    let Some(text) = arg else {
        log::info!("No frequency given, using default of {} Hz", default);
        return default;
    };

    match parse_frequency(text, sample_rate) {
        Ok(freq_hz) => freq_hz,
        Err(e) => {
            log::warn!("{}; falling back to {} Hz", e, default);
            default
        }
    }
}
