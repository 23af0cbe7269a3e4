//! One modulation run, from table construction to stream teardown
//!
//! Setup failures propagate with `?`; any stream already opened is closed
//! by `Drop` on the way out.

use std::time::Duration;

use crate::audio::{AudioFacility, DuplexConfig, DuplexStream, StreamStats};
use crate::error::AppError;
use crate::modulation::{ModulationEngine, ModulationTable};
use crate::shutdown::ShutdownFlag;

/// Everything needed to run the modulator once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub stream: DuplexConfig,
    pub frequency_hz: f32,
    /// Upper bound on how long a raised shutdown flag can go unnoticed
    pub poll_interval: Duration,
}

/// Run until `shutdown` is raised, then stop and release the stream.
pub fn run<F: AudioFacility>(
    facility: &F,
    config: &SessionConfig,
    shutdown: &ShutdownFlag,
) -> Result<StreamStats, AppError> {
    let inventory = facility.devices()?;
    log::info!(
        "Found {} devices ({} input, {} output)",
        inventory.device_count(),
        inventory.inputs.len(),
        inventory.outputs.len()
    );

    let table = ModulationTable::build(config.stream.sample_rate, config.frequency_hz)?;
    log::info!(
        "Modulating at {} Hz ({} samples per cycle at {} Hz)",
        table.frequency(),
        table.len(),
        config.stream.sample_rate
    );
    let engine = ModulationEngine::new(table);

    log::info!(
        "Opening duplex stream ({} frames per buffer, {} frames latency)...",
        config.stream.frames_per_buffer,
        config.stream.latency_frames
    );
    let mut stream = facility.open_duplex(&config.stream, engine)?;
    log::info!("Opened stream");

    stream.start()?;
    log::info!("Stream running, press Ctrl+C to stop");

    shutdown.wait(config.poll_interval);

    log::info!("Stopping stream...");
    stream.stop()?;
    let stats = stream.stats();
    drop(stream);

    log::info!(
        "Stopped after {} frames ({} input underruns, {} dropped input frames)",
        stats.frames_processed,
        stats.input_underruns,
        stats.input_overflows
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{Failure, FakeFacility};
    use crate::audio::AudioError;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    fn config(frequency_hz: f32, poll_interval: Duration) -> SessionConfig {
        SessionConfig {
            stream: DuplexConfig {
                sample_rate: 44100,
                frames_per_buffer: 64,
                latency_frames: 882,
            },
            frequency_hz,
            poll_interval,
        }
    }

    #[test]
    fn test_stops_soon_after_interrupt() {
        let facility = FakeFacility::new();
        let shutdown = Arc::new(ShutdownFlag::new());
        let poll = Duration::from_millis(50);

        let interrupter = {
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(40));
                let raised_at = Instant::now();
                shutdown.request();
                raised_at
            })
        };

        let stats = run(&facility, &config(30.0, poll), &shutdown).unwrap();
        let raised_at = interrupter.join().unwrap();

        let recorder = &facility.recorder;
        let stopped_at = recorder.stopped_at.lock().unwrap().unwrap();
        assert!(stopped_at.duration_since(raised_at) < poll + Duration::from_millis(500));
        assert_eq!(recorder.opens.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.drops.load(Ordering::SeqCst), 1);

        let callbacks = recorder.callbacks.load(Ordering::SeqCst);
        assert!(callbacks > 0);
        assert_eq!(stats.frames_processed, callbacks as u64 * 64);

        // Nothing runs once stop has returned
        thread::sleep(Duration::from_millis(20));
        assert_eq!(recorder.callbacks.load(Ordering::SeqCst), callbacks);
    }

    #[test]
    fn test_engine_output_reaches_stream() {
        let facility = FakeFacility::new();
        let shutdown = Arc::new(ShutdownFlag::new());

        let interrupter = {
            let shutdown = Arc::clone(&shutdown);
            let recorder = Arc::clone(&facility.recorder);
            thread::spawn(move || {
                while recorder.callbacks.load(Ordering::SeqCst) == 0 {
                    thread::sleep(Duration::from_millis(1));
                }
                shutdown.request();
            })
        };

        run(&facility, &config(60.0, Duration::from_millis(10)), &shutdown).unwrap();
        interrupter.join().unwrap();

        // All-ones input through the engine yields a slice of the table,
        // starting where the previous callbacks left the phase
        let recorder = &facility.recorder;
        let output = recorder.last_output.lock().unwrap().clone();
        let callbacks = recorder.callbacks.load(Ordering::SeqCst);
        let table = ModulationTable::build(44100, 60.0).unwrap();
        let start = (callbacks - 1) * 64 % table.len();
        assert_eq!(output.len(), 128);
        for (i, frame) in output.chunks_exact(2).enumerate() {
            let expected = table[(start + i) % table.len()];
            assert_eq!(frame[0], expected);
            assert_eq!(frame[1], expected);
        }
    }

    #[test]
    fn test_already_requested_shutdown_stops_immediately() {
        let facility = FakeFacility::new();
        let shutdown = ShutdownFlag::new();
        shutdown.request();

        run(&facility, &config(30.0, Duration::from_secs(10)), &shutdown).unwrap();

        assert_eq!(facility.recorder.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let facility = FakeFacility::failing(Failure::NoInputDevice);
        let shutdown = ShutdownFlag::new();

        let err = run(&facility, &config(30.0, Duration::from_millis(10)), &shutdown).unwrap_err();
        assert!(matches!(
            err,
            AppError::Audio(AudioError::DeviceUnavailable(_))
        ));
    }

    #[test]
    fn test_start_failure_releases_stream() {
        let facility = FakeFacility::failing(Failure::Start);
        let shutdown = ShutdownFlag::new();

        let err = run(&facility, &config(30.0, Duration::from_millis(10)), &shutdown).unwrap_err();
        assert!(matches!(err, AppError::Audio(AudioError::Start(_))));

        let recorder = &facility.recorder;
        assert_eq!(recorder.drops.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unusable_frequency_opens_nothing() {
        let facility = FakeFacility::new();
        let shutdown = ShutdownFlag::new();
        shutdown.request();

        let err = run(&facility, &config(0.0, Duration::from_millis(10)), &shutdown).unwrap_err();
        assert!(matches!(err, AppError::Frequency(_)));
        assert_eq!(facility.recorder.opens.load(Ordering::SeqCst), 0);
    }
}
