//! Block FIR filter with tap history carried across calls.
//!
//! `FirFilter` is the whole core: a coefficient store, a history buffer, the
//! convolution loop and the denormal hook. Hosts drive it through
//! `set_bulk`/`set_scalar` (control rate) and `process_block` (audio rate).

pub mod coefficients;
pub mod convolution;
pub mod diagnostics;
pub mod history;
pub mod update;

pub use coefficients::{CoefficientStore, Coefficients};
pub use diagnostics::{
    ChannelSink, DenormalCounter, DiagnosticEvent, DiagnosticSink, DiagnosticsHook, LogSink,
};
pub use history::HistoryBuffer;
pub use update::{CoefficientPublisher, CoefficientReceiver, coefficient_channel};

use crate::constants::MAX_INPUT_LEN;
use crate::error::{FirError, Result};
use coefficients::warn_rejected;

/// Streaming FIR filter for one channel of f64 samples
///
/// Starts with the default 63-tap bandpass and zeroed history.
///
/// # Example
/// ```
/// use firtap::filter::FirFilter;
///
/// let mut filter = FirFilter::new();
/// filter.set_bulk(&[0.5, 0.5]).unwrap();
///
/// let mut output = [0.0; 3];
/// filter.process_block(&[2.0, 4.0, 6.0], &mut output).unwrap();
/// assert_eq!(output, [1.0, 3.0, 5.0]);
/// ```
pub struct FirFilter {
    coefficients: CoefficientStore,
    history: HistoryBuffer,
    diagnostics: DiagnosticsHook,
    updates: Option<CoefficientReceiver>,
}

impl FirFilter {
    pub fn new() -> Self {
        Self::with_counter(DenormalCounter::new())
    }

    /// Create a filter that reports denormals against a shared counter
    pub fn with_counter(counter: DenormalCounter) -> Self {
        Self {
            coefficients: CoefficientStore::new(),
            history: HistoryBuffer::new(),
            diagnostics: DiagnosticsHook::new(counter),
            updates: None,
        }
    }

    /// Create a filter with an initial coefficient list
    pub fn with_coefficients(taps: &[f64]) -> Result<Self> {
        let mut filter = Self::new();
        filter.set_bulk(taps)?;
        Ok(filter)
    }

    /// Create a filter together with a publisher for cross-thread updates
    pub fn with_publisher() -> (Self, CoefficientPublisher) {
        let (publisher, receiver) = coefficient_channel();
        let mut filter = Self::new();
        filter.attach_updates(receiver);
        (filter, publisher)
    }

    /// Replace all coefficients
    ///
    /// A rejected list is logged as a warning and the previous coefficients
    /// stay in effect.
    pub fn set_bulk(&mut self, values: &[f64]) -> Result<()> {
        self.coefficients
            .set_bulk(values)
            .inspect_err(warn_rejected)?;
        log::debug!("Coefficients replaced ({} taps)", values.len());
        Ok(())
    }

    /// Replace the filter with the single tap `[value]`
    pub fn set_scalar(&mut self, value: f64) {
        self.coefficients.set_scalar(value);
    }

    /// Take coefficient snapshots from `receiver` at the start of each block
    pub fn attach_updates(&mut self, receiver: CoefficientReceiver) {
        self.updates = Some(receiver);
    }

    /// Register where denormal events are reported
    pub fn set_diagnostic_sink(&mut self, sink: Box<dyn DiagnosticSink>) {
        self.diagnostics.set_sink(sink);
    }

    pub fn clear_diagnostic_sink(&mut self) {
        self.diagnostics.clear_sink();
    }

    /// Filter one block of at most `MAX_INPUT_LEN` samples
    ///
    /// # Errors
    /// `FirError::BufferMismatch` if `input` and `output` differ in length and
    /// `FirError::BlockTooLarge` for an oversized block. A rejected block
    /// leaves history untouched and zero fills `output`.
    pub fn process_block(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if let Err(e) = self.check_block(input, output) {
            output.fill(0.0);
            return Err(e);
        }

        if let Some(updates) = &self.updates {
            updates.apply_pending(&mut self.coefficients);
        }

        self.diagnostics.inspect(input);
        convolution::process(self.coefficients.taps(), &mut self.history, input, output)
    }

    /// Filter a buffer of any length by splitting it into blocks
    pub fn process_buffer(&mut self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if input.len() != output.len() {
            return Err(FirError::BufferMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        for (block_in, block_out) in input
            .chunks(MAX_INPUT_LEN)
            .zip(output.chunks_mut(MAX_INPUT_LEN))
        {
            self.process_block(block_in, block_out)?;
        }
        Ok(())
    }

    fn check_block(&self, input: &[f64], output: &[f64]) -> Result<()> {
        if input.len() != output.len() {
            return Err(FirError::BufferMismatch {
                input: input.len(),
                output: output.len(),
            });
        }
        if input.len() > MAX_INPUT_LEN {
            return Err(FirError::BlockTooLarge {
                len: input.len(),
                max: MAX_INPUT_LEN,
            });
        }
        Ok(())
    }

    /// Zero the history, as if no samples had been processed
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Get access to the tap coefficients
    pub fn coefficients(&self) -> &[f64] {
        self.coefficients.taps()
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.coefficients.len()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.coefficients.len() - 1) / 2
    }

    /// Denormal events seen by this filter's counter
    pub fn denormal_count(&self) -> u64 {
        self.diagnostics.counter().count()
    }
}

impl Default for FirFilter {
    fn default() -> Self {
        Self::new()
    }
}
