mod test_signals;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use firtap::FirFilter;
use firtap::constants::MAX_COEFFS_LEN;
use firtap::error::FirError;
use firtap::filter::coefficient_channel;

const LAST_GAIN: u32 = 200;

#[test]
fn test_blocks_never_see_torn_coefficients() {
    let (mut filter, publisher) = FirFilter::with_publisher();
    filter.set_scalar(0.0);
    let done = Arc::new(AtomicBool::new(false));

    let control_done = Arc::clone(&done);
    let control = thread::spawn(move || {
        for gain in 1..=LAST_GAIN {
            // Each snapshot is a uniform 8-tap filter, so any block computed
            // against a single snapshot has constant output for constant input.
            let taps = vec![gain as f64; 8];
            loop {
                match publisher.publish_bulk(&taps) {
                    Ok(()) => break,
                    Err(FirError::UpdateQueueFull) => thread::yield_now(),
                    Err(e) => panic!("unexpected publish error: {}", e),
                }
            }
        }
        control_done.store(true, Ordering::Release);
        publisher
    });

    let input = vec![1.0; 64];
    let mut output = vec![0.0; 64];
    let mut blocks = 0u64;
    while !done.load(Ordering::Acquire) {
        filter.process_block(&input, &mut output).unwrap();
        blocks += 1;
        // History is all ones after the first block, so every output in a
        // block equals 8 * gain of the snapshot in effect.
        if blocks > 1 {
            assert!(
                output.iter().all(|&s| s == output[0]),
                "block {} mixed coefficient sets",
                blocks
            );
        }
    }

    let publisher = control.join().unwrap();
    filter.process_block(&input, &mut output).unwrap();
    assert!(output.iter().all(|&s| s == 8.0 * LAST_GAIN as f64));
    assert_eq!(filter.num_taps(), 8);

    // Everything the audio side swapped out has been handed back.
    publisher.reclaim();
    assert_eq!(publisher.reclaim(), 0);
}

#[test]
fn test_rejected_publish_leaves_filter_unchanged() {
    let (mut filter, publisher) = FirFilter::with_publisher();
    assert!(matches!(
        publisher.publish_bulk(&vec![0.0; MAX_COEFFS_LEN + 1]),
        Err(FirError::TooManyCoefficients { count: 513, .. })
    ));
    assert!(matches!(
        publisher.publish_bulk(&[]),
        Err(FirError::EmptyCoefficients)
    ));

    let mut out = [0.0; 4];
    filter.process_block(&[0.0; 4], &mut out).unwrap();
    assert_eq!(filter.num_taps(), 63);
}

#[test]
fn test_publisher_clones_share_one_filter() {
    let (publisher, receiver) = coefficient_channel();
    let mut filter = FirFilter::new();
    filter.attach_updates(receiver);

    let second = publisher.clone();
    publisher.publish_scalar(2.0).unwrap();
    second.publish_bulk(&[1.0, -1.0]).unwrap();

    let mut out = [0.0; 3];
    filter.process_block(&[1.0, 1.0, 1.0], &mut out).unwrap();
    assert_eq!(filter.coefficients(), &[1.0, -1.0]);
    assert_eq!(out, [1.0, 0.0, 0.0]);
}

#[test]
fn test_filters_on_separate_threads_are_independent() {
    let signal = test_signals::noise(2048, 99);
    let mut reference_filter = FirFilter::new();
    let mut reference = vec![0.0; signal.len()];
    reference_filter.process_buffer(&signal, &mut reference).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|block| {
            let signal = signal.clone();
            thread::spawn(move || {
                let mut filter = FirFilter::new();
                test_signals::split_and_filter(&mut filter, &signal, &[block * 37 + 1])
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), reference);
    }
}
