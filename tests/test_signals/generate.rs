#![allow(dead_code)]

use std::f64::consts::PI;

use firtap::FirFilter;
use rand::SeedableRng;
use rand::distr::{Distribution, Uniform};
use rand_chacha::ChaCha8Rng;

/// Sine wave at `freq_hz`, unit amplitude
pub fn sine(num_samples: usize, freq_hz: f64, sample_rate: f64) -> Vec<f64> {
    (0..num_samples)
        .map(|i| (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
        .collect()
}

/// Unit impulse at index 0 followed by zeros
pub fn impulse(num_samples: usize) -> Vec<f64> {
    let mut samples = vec![0.0; num_samples];
    if let Some(first) = samples.first_mut() {
        *first = 1.0;
    }
    samples
}

/// Uniform white noise in [-1, 1), repeatable for a given seed
pub fn noise(num_samples: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let uniform = Uniform::new(-1.0, 1.0).unwrap();
    (0..num_samples).map(|_| uniform.sample(&mut rng)).collect()
}

/// Filter `signal` in blocks, cycling through the non-zero `block_sizes`
/// until the signal is consumed
pub fn split_and_filter(filter: &mut FirFilter, signal: &[f64], block_sizes: &[usize]) -> Vec<f64> {
    let mut output = vec![0.0; signal.len()];
    let mut pos = 0;
    let mut sizes = block_sizes.iter().cycle();
    while pos < signal.len() {
        let size = (*sizes.next().unwrap()).min(signal.len() - pos);
        filter
            .process_block(&signal[pos..pos + size], &mut output[pos..pos + size])
            .unwrap();
        pos += size;
    }
    output
}
