//! Top-level error type

use thiserror::Error;

use crate::audio::AudioError;
use crate::modulation::FrequencyError;

/// Errors that end the program
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad command line (e.g. more than one frequency); clap renders the message
    #[error(transparent)]
    Usage(#[from] clap::Error),

    #[error("invalid modulation frequency: {0}")]
    Frequency(#[from] FrequencyError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
