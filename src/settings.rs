use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::modulation::DEFAULT_FREQUENCY;

/// Longest capture-to-playback cushion accepted from the settings file
pub const MAX_LATENCY_MS: f32 = 1000.0;
/// Highest sample rate accepted from the settings file or command line
pub const MAX_SAMPLE_RATE: u32 = 384_000;
/// Largest callback size accepted from the settings file or command line
pub const MAX_FRAMES_PER_BUFFER: u32 = 8192;

/// Returns the path to the settings file: `~/.config/ringmod-rs/settings.json`
fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ringmod-rs");
    path.push("settings.json");
    path
}

/// Audio settings read at startup.
///
/// Read as JSON from the platform config directory; the file is never
/// written by the program. Fields use `#[serde(default)]` so that a file
/// naming only some settings still loads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // Stream
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
    /// Capture-to-playback cushion in milliseconds
    pub latency_ms: f32,

    // Modulation
    pub default_frequency: f32,

    // Shutdown
    pub poll_interval_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frames_per_buffer: 64,
            latency_ms: 20.0,

            default_frequency: DEFAULT_FREQUENCY,

            poll_interval_ms: 100,
        }
    }
}

impl AppSettings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from(&settings_path())
    }

    /// Load settings from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::debug!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Replace values that cannot drive a stream with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            log::warn!(
                "sample_rate must be between 1 and {}, using {}",
                MAX_SAMPLE_RATE,
                defaults.sample_rate
            );
            self.sample_rate = defaults.sample_rate;
        }
        if self.frames_per_buffer == 0 || self.frames_per_buffer > MAX_FRAMES_PER_BUFFER {
            log::warn!(
                "frames_per_buffer must be between 1 and {}, using {}",
                MAX_FRAMES_PER_BUFFER,
                defaults.frames_per_buffer
            );
            self.frames_per_buffer = defaults.frames_per_buffer;
        }
        if !self.latency_ms.is_finite() || self.latency_ms < 0.0 {
            log::warn!("latency_ms must be >= 0, using {}", defaults.latency_ms);
            self.latency_ms = defaults.latency_ms;
        } else if self.latency_ms > MAX_LATENCY_MS {
            log::warn!(
                "latency_ms {} is above {}, using {}",
                self.latency_ms,
                MAX_LATENCY_MS,
                MAX_LATENCY_MS
            );
            self.latency_ms = MAX_LATENCY_MS;
        }
        if !self.default_frequency.is_finite() || self.default_frequency <= 0.0 {
            log::warn!(
                "default_frequency must be positive, using {} Hz",
                defaults.default_frequency
            );
            self.default_frequency = defaults.default_frequency;
        }
        if self.poll_interval_ms == 0 {
            self.poll_interval_ms = defaults.poll_interval_ms;
        }

        self
    }

    /// Latency expressed in frames at `sample_rate`
    pub fn latency_frames(&self, sample_rate: u32) -> u32 {
        (self.latency_ms as f64 * sample_rate as f64 / 1000.0).round() as u32
    }
}
