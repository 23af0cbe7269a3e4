//! ringmod - Real-time stereo ring modulator
//!
//! Captures the default input device, multiplies every sample by a sine
//! carrier read from a precomputed lookup table, and plays the result on the
//! default output device until interrupted with Ctrl+C.
//!
//! ```text
//! ringmod [FREQUENCY] [--sample-rate HZ] [--frames-per-buffer N] [--list-devices]
//! ```

use std::process::ExitCode;
use std::sync::Arc;

mod app;
mod audio;
mod error;
mod modulation;
mod session;
mod settings;
mod shutdown;

use app::Outcome;
use audio::CpalFacility;
use error::AppError;
use settings::AppSettings;
use shutdown::ShutdownFlag;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::Usage(e)) => {
            // Help and version requests also arrive here, with exit code 0
            let _ = e.print();
            ExitCode::from(e.exit_code() as u8)
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    log::info!("Starting ringmod");

    let settings = AppSettings::load();
    let shutdown = Arc::new(ShutdownFlag::new());
    shutdown::install_interrupt_handler(Arc::clone(&shutdown))?;

    let facility = CpalFacility::default();
    match app::launch(std::env::args_os(), &settings, &facility, &shutdown)? {
        Outcome::Listed(inventory) => app::print_devices(&inventory),
        Outcome::Finished(stats) => log::debug!("Final stream stats: {:?}", stats),
    }
    Ok(())
}
