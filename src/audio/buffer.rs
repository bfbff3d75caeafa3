/// Extract one channel of interleaved f32 audio as f64 samples
pub fn extract_channel(interleaved: &[f32], channels: usize, channel: usize) -> Vec<f64> {
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame[channel] as f64)
        .collect()
}

/// Regroups a mono sample stream into fixed-size processing blocks
///
/// Audio devices deliver callbacks of whatever size they like; the filter
/// takes at most `MAX_INPUT_LEN` samples per call.
pub struct BlockAssembler {
    pending: Vec<f64>,
    block_size: usize,
}

impl BlockAssembler {
    pub fn new(block_size: usize) -> Self {
        Self {
            pending: Vec::with_capacity(block_size * 4),
            block_size,
        }
    }

    pub fn push(&mut self, samples: &[f64]) {
        self.pending.extend_from_slice(samples);
    }

    /// Take the next complete block, oldest samples first
    pub fn pop_block(&mut self) -> Option<Vec<f64>> {
        if self.pending.len() < self.block_size {
            return None;
        }
        Some(self.pending.drain(..self.block_size).collect())
    }

    /// Take whatever is left, even if shorter than a block
    pub fn flush(&mut self) -> Option<Vec<f64>> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }

    /// Number of samples waiting for a full block
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
