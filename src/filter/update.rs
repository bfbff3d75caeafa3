//! Lock-free coefficient publication from a control thread.
//!
//! The control side builds a complete `Coefficients` snapshot and sends it
//! through a bounded channel. The audio side picks snapshots up with
//! `try_recv` between blocks, so a block is always computed against exactly
//! one snapshot. Replaced snapshots travel back to the control side to be
//! freed there, keeping deallocation off the audio thread.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use super::coefficients::{CoefficientStore, Coefficients, warn_rejected};
use crate::constants::UPDATE_QUEUE_DEPTH;
use crate::error::{FirError, Result};

/// Create a connected publisher/receiver pair
pub fn coefficient_channel() -> (CoefficientPublisher, CoefficientReceiver) {
    let (update_tx, update_rx) = bounded(UPDATE_QUEUE_DEPTH);
    // A single publisher reclaims before every send, so it never has more
    // than a full update queue plus one snapshot outstanding.
    let (retired_tx, retired_rx) = bounded(UPDATE_QUEUE_DEPTH * 2);
    (
        CoefficientPublisher {
            updates: update_tx,
            retired: retired_rx,
        },
        CoefficientReceiver {
            updates: update_rx,
            retired: retired_tx,
        },
    )
}

/// Control-side handle for replacing a filter's coefficients
#[derive(Clone)]
pub struct CoefficientPublisher {
    updates: Sender<Coefficients>,
    retired: Receiver<Coefficients>,
}

impl CoefficientPublisher {
    /// Publish a full coefficient list
    ///
    /// # Errors
    /// Validation errors as for `CoefficientStore::set_bulk`, or
    /// `FirError::UpdateQueueFull` when the audio side has fallen behind.
    pub fn publish_bulk(&self, values: &[f64]) -> Result<()> {
        let snapshot = Coefficients::from_taps(values).inspect_err(warn_rejected)?;
        self.publish(snapshot)
    }

    /// Publish a single-tap filter
    pub fn publish_scalar(&self, value: f64) -> Result<()> {
        self.publish(Coefficients::scalar(value))
    }

    fn publish(&self, snapshot: Coefficients) -> Result<()> {
        self.reclaim();
        let len = snapshot.len();
        match self.updates.try_send(snapshot) {
            Ok(()) => {
                log::debug!("Published {} coefficient(s)", len);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(FirError::UpdateQueueFull),
            Err(TrySendError::Disconnected(_)) => Err(FirError::Config(
                "filter receiving coefficient updates has been dropped".into(),
            )),
        }
    }

    /// Free snapshots the audio side has swapped out; returns how many
    pub fn reclaim(&self) -> usize {
        self.retired.try_iter().count()
    }
}

/// Audio-side end of a coefficient channel
pub struct CoefficientReceiver {
    updates: Receiver<Coefficients>,
    retired: Sender<Coefficients>,
}

impl CoefficientReceiver {
    /// Apply every pending snapshot to `store`, newest last
    ///
    /// Never blocks. Returns true if the taps changed.
    pub fn apply_pending(&self, store: &mut CoefficientStore) -> bool {
        let mut applied = false;
        while let Ok(snapshot) = self.updates.try_recv() {
            let old = store.replace(snapshot);
            // Fails if every publisher is gone, or if cloned publishers have
            // let the retired queue fill without reclaiming. Either way the
            // old snapshot is dropped here on the audio thread.
            let _ = self.retired.try_send(old);
            applied = true;
        }
        applied
    }
}
