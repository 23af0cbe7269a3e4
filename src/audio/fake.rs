//! In-memory audio facility for tests
//!
//! Stands in for the sound card: `start` spawns a thread that feeds an
//! all-ones buffer through the engine every millisecond, `stop` joins it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::buffer::{StreamCounters, StreamStats, CHANNELS};
use super::facility::{
    AudioError, AudioFacility, DeviceInventory, Direction, DuplexConfig, DuplexStream,
};
use crate::modulation::ModulationEngine;

/// What the fake should fail at, if anything
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Failure {
    #[default]
    Nothing,
    NoInputDevice,
    Start,
}

/// Observations shared between the facility, its streams and the test
#[derive(Debug, Default)]
pub struct Recorder {
    pub opens: AtomicUsize,
    pub callbacks: AtomicUsize,
    pub stops: AtomicUsize,
    pub drops: AtomicUsize,
    pub stopped_at: Mutex<Option<Instant>>,
    pub config: Mutex<Option<DuplexConfig>>,
    /// Last block the engine wrote, for checking its output
    pub last_output: Mutex<Vec<f32>>,
}

#[derive(Default)]
pub struct FakeFacility {
    pub recorder: Arc<Recorder>,
    pub failure: Failure,
}

impl FakeFacility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: Failure) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }
}

impl AudioFacility for FakeFacility {
    type Stream = FakeStream;

    fn devices(&self) -> Result<DeviceInventory, AudioError> {
        Ok(DeviceInventory {
            inputs: vec!["Fake Mic".to_string()],
            outputs: vec!["Fake Speakers".to_string()],
            default_input: Some("Fake Mic".to_string()),
            default_output: Some("Fake Speakers".to_string()),
        })
    }

    fn open_duplex(
        &self,
        config: &DuplexConfig,
        engine: ModulationEngine,
    ) -> Result<FakeStream, AudioError> {
        self.recorder.opens.fetch_add(1, Ordering::SeqCst);
        *self.recorder.config.lock().unwrap() = Some(*config);

        if self.failure == Failure::NoInputDevice {
            return Err(AudioError::DeviceUnavailable(Direction::Input));
        }

        Ok(FakeStream {
            engine: Some(engine),
            worker: None,
            running: Arc::new(AtomicBool::new(false)),
            frames_per_buffer: config.frames_per_buffer as usize,
            counters: Arc::new(StreamCounters::default()),
            recorder: Arc::clone(&self.recorder),
            fail_start: self.failure == Failure::Start,
        })
    }
}

pub struct FakeStream {
    engine: Option<ModulationEngine>,
    worker: Option<thread::JoinHandle<ModulationEngine>>,
    running: Arc<AtomicBool>,
    frames_per_buffer: usize,
    counters: Arc<StreamCounters>,
    recorder: Arc<Recorder>,
    fail_start: bool,
}

impl DuplexStream for FakeStream {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.fail_start {
            return Err(AudioError::Start(cpal::PlayStreamError::DeviceNotAvailable));
        }
        let Some(mut engine) = self.engine.take() else {
            return Ok(());
        };

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let counters = Arc::clone(&self.counters);
        let recorder = Arc::clone(&self.recorder);
        let block = self.frames_per_buffer * CHANNELS;

        self.worker = Some(thread::spawn(move || {
            let input = vec![1.0f32; block];
            let mut output = vec![0.0f32; block];
            while running.load(Ordering::SeqCst) {
                engine.process(&input, &mut output);
                counters.add_processed(block / CHANNELS);
                recorder.callbacks.fetch_add(1, Ordering::SeqCst);
                recorder.last_output.lock().unwrap().clone_from(&output);
                thread::sleep(Duration::from_millis(1));
            }
            engine
        }));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            self.engine = worker.join().ok();
        }
        self.recorder.stops.fetch_add(1, Ordering::SeqCst);
        *self.recorder.stopped_at.lock().unwrap() = Some(Instant::now());
        Ok(())
    }

    fn stats(&self) -> StreamStats {
        self.counters.snapshot()
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.recorder.drops.fetch_add(1, Ordering::SeqCst);
    }
}
