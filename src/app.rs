//! Command-line front end
//!
//! Parses arguments, resolves them against the settings file and hands a
//! `SessionConfig` to the session. Usage errors are returned before any
//! audio resource is touched.

use std::ffi::OsString;
use std::time::Duration;

use clap::Parser;

use crate::audio::{AudioFacility, DeviceInventory, DuplexConfig, StreamStats};
use crate::error::AppError;
use crate::modulation::select_frequency;
use crate::session::{self, SessionConfig};
use crate::settings::{AppSettings, MAX_FRAMES_PER_BUFFER, MAX_SAMPLE_RATE};
use crate::shutdown::ShutdownFlag;

#[derive(Parser, Debug)]
#[command(
    name = "ringmod",
    author,
    version,
    about = "Real-time stereo ring modulator",
    allow_negative_numbers = true
)]
pub struct Cli {
    /// Modulation frequency in Hz (falls back to the default when missing or invalid)
    #[arg(allow_hyphen_values = true)]
    pub frequency: Option<String>,

    /// Sample rate for capture and playback, overriding the settings file
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_SAMPLE_RATE as i64))]
    pub sample_rate: Option<u32>,

    /// Frames processed per callback, overriding the settings file
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_FRAMES_PER_BUFFER as i64))]
    pub frames_per_buffer: Option<u32>,

    /// List audio devices and exit
    #[arg(long)]
    pub list_devices: bool,
}

impl Cli {
    /// Combine the command line with the settings file
    pub fn session_config(&self, settings: &AppSettings) -> SessionConfig {
        let sample_rate = self.sample_rate.unwrap_or(settings.sample_rate);
        let frames_per_buffer = self.frames_per_buffer.unwrap_or(settings.frames_per_buffer);

        SessionConfig {
            stream: DuplexConfig {
                sample_rate,
                frames_per_buffer,
                latency_frames: settings.latency_frames(sample_rate),
            },
            frequency_hz: select_frequency(
                self.frequency.as_deref(),
                sample_rate,
                settings.default_frequency,
            ),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }
}

/// How a successful invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Listed(DeviceInventory),
    Finished(StreamStats),
}

/// Parse `args` and run the requested action.
pub fn launch<I, T, F>(
    args: I,
    settings: &AppSettings,
    facility: &F,
    shutdown: &ShutdownFlag,
) -> Result<Outcome, AppError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: AudioFacility,
{
    let cli = Cli::try_parse_from(args)?;

    if cli.list_devices {
        return Ok(Outcome::Listed(facility.devices()?));
    }

    let config = cli.session_config(settings);
    session::run(facility, &config, shutdown).map(Outcome::Finished)
}

/// Print a device listing for `--list-devices`
pub fn print_devices(inventory: &DeviceInventory) {
    let marker = |name: &String, default: &Option<String>| {
        if default.as_ref() == Some(name) {
            " (default)"
        } else {
            ""
        }
    };

    println!("Input devices:");
    for name in &inventory.inputs {
        println!("  {}{}", name, marker(name, &inventory.default_input));
    }
    println!("Output devices:");
    for name in &inventory.outputs {
        println!("  {}{}", name, marker(name, &inventory.default_output));
    }
}
