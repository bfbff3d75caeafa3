use crate::constants::{HISTORY_LEN, MAX_COEFFS_LEN, MAX_INPUT_LEN};
use crate::error::{FirError, Result};

/// Sliding window of input samples carried across blocks
///
/// Layout for a filter of length `L` processing a block of `N` samples:
///
/// ```text
/// [0, L-1)        retained history from previous blocks (oldest first)
/// [L-1, L-1+N)    the current input block
/// ```
///
/// After convolution, `shift` moves the last `L-1` samples of that window back
/// to the front. Changing `L` between blocks leaves the held samples where
/// they are; a longer filter reads whatever the front slots contain.
pub struct HistoryBuffer {
    samples: Vec<f64>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: vec![0.0; HISTORY_LEN],
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Write a new block immediately after the retained history region
    ///
    /// # Errors
    /// `FirError::BlockTooLarge` if `input` is longer than `MAX_INPUT_LEN`,
    /// `FirError::FilterTooLong` if `filter_len` exceeds `MAX_COEFFS_LEN`.
    pub fn append(&mut self, input: &[f64], filter_len: usize) -> Result<()> {
        check_bounds(input.len(), filter_len)?;
        let start = filter_len.saturating_sub(1);
        self.samples[start..start + input.len()].copy_from_slice(input);
        Ok(())
    }

    /// The samples a block of `n` outputs reads: `L - 1` history then `n` new
    ///
    /// # Errors
    /// The same bound errors as `append`.
    pub fn window(&self, filter_len: usize, n: usize) -> Result<&[f64]> {
        check_bounds(n, filter_len)?;
        Ok(&self.samples[..filter_len.saturating_sub(1) + n])
    }

    /// Slide forward by `sampleframes`, keeping the newest `filter_len - 1`
    /// samples at the start of the buffer.
    ///
    /// # Errors
    /// The same bound errors as `append`; the buffer is left unchanged.
    pub fn shift(&mut self, sampleframes: usize, filter_len: usize) -> Result<()> {
        check_bounds(sampleframes, filter_len)?;
        let keep = filter_len.saturating_sub(1);
        self.samples.copy_within(sampleframes..sampleframes + keep, 0);
        Ok(())
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_bounds(block_len: usize, filter_len: usize) -> Result<()> {
    if block_len > MAX_INPUT_LEN {
        return Err(FirError::BlockTooLarge {
            len: block_len,
            max: MAX_INPUT_LEN,
        });
    }
    if filter_len > MAX_COEFFS_LEN {
        return Err(FirError::FilterTooLong {
            len: filter_len,
            max: MAX_COEFFS_LEN,
        });
    }
    Ok(())
}
