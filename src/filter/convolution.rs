//! Direct-form block convolution.
//!
//! Time-domain multiply-accumulate over the history window: `O(N * L)` per
//! block, which at these block and filter sizes (both <= 512) keeps latency
//! deterministic without the block delay of FFT convolution.

use super::history::HistoryBuffer;
use crate::error::{FirError, Result};

/// Filter one block of samples
///
/// Appends `input` to `history`, computes
/// `output[n] = sum(taps[k] * x[n - k])` for `k in 0..L`, then slides the
/// history forward by `input.len()` samples. `taps` is never modified.
///
/// # Errors
/// `FirError::BufferMismatch` if the slices differ in length, or any bound
/// error from `HistoryBuffer::append`. History is untouched on error.
pub fn process(
    taps: &[f64],
    history: &mut HistoryBuffer,
    input: &[f64],
    output: &mut [f64],
) -> Result<()> {
    if input.len() != output.len() {
        return Err(FirError::BufferMismatch {
            input: input.len(),
            output: output.len(),
        });
    }

    let n = input.len();
    if n == 0 {
        return Ok(());
    }

    let num_taps = taps.len();
    history.append(input, num_taps)?;

    let window = history.window(num_taps, n)?;
    for (i, out) in output.iter_mut().enumerate() {
        // window[i + L - 1] is the current sample; walk it backwards against
        // the taps in forward order.
        let span = &window[i..i + num_taps];
        *out = taps
            .iter()
            .zip(span.iter().rev())
            .fold(0.0f64, |acc, (&tap, &sample)| acc + tap * sample);
    }

    history.shift(n, num_taps)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn run(taps: &[f64], history: &mut HistoryBuffer, input: &[f64]) -> Vec<f64> {
        let mut output = vec![0.0; input.len()];
        process(taps, history, input, &mut output).unwrap();
        output
    }

    #[test]
    fn test_identity_tap_passes_signal() {
        let mut history = HistoryBuffer::new();
        let input = [0.5, -1.0, 2.0, 0.25];
        assert_eq!(run(&[1.0], &mut history, &input), input);
    }

    #[test]
    fn test_moving_sum_within_block() {
        let mut history = HistoryBuffer::new();
        let output = run(&[1.0, 1.0, 1.0], &mut history, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(output, vec![1.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_history_carries_into_next_block() {
        let mut history = HistoryBuffer::new();
        run(&[1.0, 1.0, 1.0], &mut history, &[1.0, 2.0]);
        let output = run(&[1.0, 1.0, 1.0], &mut history, &[3.0, 4.0]);
        assert_eq!(output, vec![6.0, 9.0]);
    }

    #[test]
    fn test_taps_applied_newest_first() {
        let mut history = HistoryBuffer::new();
        // y[n] = 2 x[n] - x[n-1]
        let output = run(&[2.0, -1.0], &mut history, &[1.0, 0.0, 0.0]);
        assert_eq!(output, vec![2.0, -1.0, 0.0]);
    }

    #[test]
    fn test_delay_line_shorter_than_filter() {
        let mut history = HistoryBuffer::new();
        let taps = [0.1, 0.2, 0.3, 0.4, 0.5];
        let mut collected = Vec::new();
        collected.extend(run(&taps, &mut history, &[1.0]));
        for _ in 0..6 {
            collected.extend(run(&taps, &mut history, &[0.0]));
        }
        for (i, &expected) in taps.iter().enumerate() {
            assert_abs_diff_eq!(collected[i], expected);
        }
        assert_eq!(collected[5], 0.0);
        assert_eq!(collected[6], 0.0);
    }

    #[test]
    fn test_empty_block_is_noop() {
        let mut history = HistoryBuffer::new();
        run(&[1.0, 1.0], &mut history, &[5.0]);
        assert!(run(&[1.0, 1.0], &mut history, &[]).is_empty());
        assert_eq!(run(&[1.0, 1.0], &mut history, &[0.0]), vec![5.0]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut history = HistoryBuffer::new();
        let mut output = [0.0; 2];
        assert!(matches!(
            process(&[1.0], &mut history, &[1.0, 2.0, 3.0], &mut output),
            Err(FirError::BufferMismatch {
                input: 3,
                output: 2
            })
        ));
    }
}
