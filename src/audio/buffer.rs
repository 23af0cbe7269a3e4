//! Lock-free frame bridge between the input and output callbacks
//!
//! cpal delivers capture and playback through two separate streams, each on
//! its own real-time thread. Captured stereo frames travel to the output
//! callback through an SPSC ring buffer from the `ringbuf` crate, which only
//! uses atomics and never blocks either side.
//!
//! ## Design
//!
//! - Input callback is the single producer (pushes interleaved L/R samples)
//! - Output callback is the single consumer (pops a buffer's worth per call)
//!
//! The ring is pre-filled with silence so the output side starts with a
//! cushion of `latency_frames` and does not underrun on its first calls.
//! Frames are always pushed and popped as whole L/R pairs.

use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapRb,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Samples per frame; the bridge only carries stereo
pub const CHANNELS: usize = 2;

/// Counters updated from the audio threads
#[derive(Debug, Default)]
pub struct StreamCounters {
    frames_processed: AtomicU64,
    input_underruns: AtomicU64,
    input_overflows: AtomicU64,
}

impl StreamCounters {
    #[inline]
    pub fn add_processed(&self, frames: usize) {
        self.frames_processed
            .fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// Snapshot for reporting from the control thread
    pub fn snapshot(&self) -> StreamStats {
        StreamStats {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            input_underruns: self.input_underruns.load(Ordering::Relaxed),
            input_overflows: self.input_overflows.load(Ordering::Relaxed),
        }
    }
}

/// Totals for one run of a duplex stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames written to the output device
    pub frames_processed: u64,
    /// Output frames that had no captured input and were fed silence
    pub input_underruns: u64,
    /// Captured frames dropped because the bridge was full
    pub input_overflows: u64,
}

/// Producer half (owned by the input callback)
pub struct FrameProducer {
    producer: ringbuf::HeapProd<f32>,
    counters: Arc<StreamCounters>,
}

impl FrameProducer {
    /// Push interleaved stereo samples.
    ///
    /// Frames that do not fit are dropped and counted.
    #[inline]
    pub fn push_frames(&mut self, data: &[f32]) {
        let whole = data.len() - data.len() % CHANNELS;
        let room = self.producer.vacant_len() - self.producer.vacant_len() % CHANNELS;
        let accepted = whole.min(room);

        let pushed = self.producer.push_slice(&data[..accepted]);
        let dropped = (whole - pushed) / CHANNELS;
        if dropped > 0 {
            self.counters
                .input_overflows
                .fetch_add(dropped as u64, Ordering::Relaxed);
        }
    }
}

/// Consumer half (owned by the output callback)
pub struct FrameConsumer {
    consumer: ringbuf::HeapCons<f32>,
    counters: Arc<StreamCounters>,
}

impl FrameConsumer {
    /// Fill `out` with captured interleaved samples.
    ///
    /// Whatever the bridge cannot supply is filled with silence and counted
    /// as underrun frames.
    #[inline]
    pub fn pop_frames(&mut self, out: &mut [f32]) {
        let popped = self.consumer.pop_slice(out);
        if popped < out.len() {
            out[popped..].fill(0.0);
            let missing = (out.len() - popped) / CHANNELS;
            self.counters
                .input_underruns
                .fetch_add(missing as u64, Ordering::Relaxed);
        }
    }
}

/// Create a bridge holding up to `capacity_frames`, pre-filled with
/// `latency_frames` of silence.
pub fn frame_bridge(
    capacity_frames: usize,
    latency_frames: usize,
    counters: Arc<StreamCounters>,
) -> (FrameProducer, FrameConsumer) {
    let capacity_frames = capacity_frames.max(latency_frames).max(1);
    let rb = HeapRb::<f32>::new(capacity_frames * CHANNELS);
    let (mut prod, cons) = rb.split();

    let silence = vec![0.0f32; latency_frames * CHANNELS];
    prod.push_slice(&silence);

    (
        FrameProducer {
            producer: prod,
            counters: Arc::clone(&counters),
        },
        FrameConsumer {
            consumer: cons,
            counters,
        },
    )
}
