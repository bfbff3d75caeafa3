//! Denormal input detection.
//!
//! Subnormal floats can slow some FPUs down by orders of magnitude. The hook
//! looks at the first sample of each block and reports a counted event to a
//! registered sink. It never changes the samples.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Sender, TrySendError};

/// Monotonic event counter, shareable between filter instances
#[derive(Debug, Clone, Default)]
pub struct DenormalCounter(Arc<AtomicU64>);

impl DenormalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current count and advance it by one
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of events counted so far
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// One detected denormal block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagnosticEvent {
    /// Counter value at detection; the first event reports 0
    pub count: u64,
    /// The offending first sample
    pub sample: f64,
}

/// Receives diagnostic events from the audio path
///
/// Called on the audio thread; implementations must not block.
pub trait DiagnosticSink: Send {
    fn report(&mut self, event: DiagnosticEvent);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(DiagnosticEvent) + Send,
{
    fn report(&mut self, event: DiagnosticEvent) {
        self(event)
    }
}

/// Writes each event straight to the `log` facade
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, event: DiagnosticEvent) {
        log::warn!("saw denormal ({}): {:e}", event.count, event.sample);
    }
}

/// Forwards events to another thread without blocking
///
/// Events are dropped when the channel is full.
pub struct ChannelSink {
    tx: Sender<DiagnosticEvent>,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: Sender<DiagnosticEvent>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }

    /// True once the receiving side has gone away
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl DiagnosticSink for ChannelSink {
    fn report(&mut self, event: DiagnosticEvent) {
        if let Err(TrySendError::Disconnected(_)) = self.tx.try_send(event) {
            self.disconnected = true;
        }
    }
}

pub struct DiagnosticsHook {
    counter: DenormalCounter,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl DiagnosticsHook {
    pub fn new(counter: DenormalCounter) -> Self {
        Self {
            counter,
            sink: None,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.sink = Some(sink);
    }

    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    pub fn counter(&self) -> &DenormalCounter {
        &self.counter
    }

    /// Inspect the first sample of a block
    pub fn inspect(&mut self, block: &[f64]) -> Option<DiagnosticEvent> {
        let sample = *block.first()?;
        if !sample.is_subnormal() {
            return None;
        }

        let event = DiagnosticEvent {
            count: self.counter.next(),
            sample,
        };
        if let Some(sink) = self.sink.as_mut() {
            sink.report(event);
        }
        Some(event)
    }
}

impl Default for DiagnosticsHook {
    fn default() -> Self {
        Self::new(DenormalCounter::new())
    }
}
