use crate::constants::{DEFAULT_BANDPASS_COEFFS, MAX_COEFFS_LEN};
use crate::error::{FirError, Result};

/// A complete set of filter taps in fixed storage
///
/// Storage is always `MAX_COEFFS_LEN` long; only the first `len` entries are
/// valid. Entries past `len` are stale and never read by convolution.
#[derive(Clone)]
pub struct Coefficients {
    taps: Box<[f64]>,
    len: usize,
}

impl Coefficients {
    /// Build a coefficient set from a list of taps
    ///
    /// # Errors
    /// `FirError::EmptyCoefficients` for an empty list and
    /// `FirError::TooManyCoefficients` for more than `MAX_COEFFS_LEN` taps.
    pub fn from_taps(values: &[f64]) -> Result<Self> {
        validate_len(values.len())?;
        let mut taps = vec![0.0; MAX_COEFFS_LEN].into_boxed_slice();
        taps[..values.len()].copy_from_slice(values);
        Ok(Self {
            taps,
            len: values.len(),
        })
    }

    /// Single-tap (pure gain) coefficient set
    pub fn scalar(value: f64) -> Self {
        let mut taps = vec![0.0; MAX_COEFFS_LEN].into_boxed_slice();
        taps[0] = value;
        Self { taps, len: 1 }
    }

    /// The valid taps
    pub fn taps(&self) -> &[f64] {
        &self.taps[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a coefficient set holds at least one tap
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        let mut taps = vec![0.0; MAX_COEFFS_LEN].into_boxed_slice();
        taps[..DEFAULT_BANDPASS_COEFFS.len()].copy_from_slice(&DEFAULT_BANDPASS_COEFFS);
        Self {
            taps,
            len: DEFAULT_BANDPASS_COEFFS.len(),
        }
    }
}

impl std::fmt::Debug for Coefficients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coefficients")
            .field("taps", &self.taps())
            .finish()
    }
}

pub(crate) fn validate_len(count: usize) -> Result<()> {
    if count == 0 {
        return Err(FirError::EmptyCoefficients);
    }
    if count > MAX_COEFFS_LEN {
        return Err(FirError::TooManyCoefficients {
            count,
            max: MAX_COEFFS_LEN,
        });
    }
    Ok(())
}

/// Operator-visible report for a rejected coefficient list
pub(crate) fn warn_rejected(err: &FirError) {
    log::warn!("Coefficient update rejected: {}", err);
}

/// Holds the taps currently used by a filter instance
///
/// Updates copy into storage that was allocated at construction, so
/// `set_bulk` and `set_scalar` are safe to call between audio blocks.
#[derive(Debug, Default)]
pub struct CoefficientStore {
    current: Coefficients,
}

impl CoefficientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all taps with `values`
    ///
    /// On error the previous taps are left untouched.
    pub fn set_bulk(&mut self, values: &[f64]) -> Result<()> {
        validate_len(values.len())?;
        self.current.taps[..values.len()].copy_from_slice(values);
        self.current.len = values.len();
        Ok(())
    }

    /// Degenerate the filter to the single tap `[value]`
    pub fn set_scalar(&mut self, value: f64) {
        self.current.taps[0] = value;
        self.current.len = 1;
    }

    /// Swap in a complete snapshot, returning the one it replaces
    pub fn replace(&mut self, snapshot: Coefficients) -> Coefficients {
        std::mem::replace(&mut self.current, snapshot)
    }

    pub fn taps(&self) -> &[f64] {
        self.current.taps()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_bandpass_table() {
        let store = CoefficientStore::new();
        assert_eq!(store.len(), 63);
        assert_eq!(store.taps(), &DEFAULT_BANDPASS_COEFFS[..]);
    }

    #[test]
    fn test_default_table_is_symmetric() {
        let n = DEFAULT_BANDPASS_COEFFS.len();
        for i in 0..n / 2 {
            assert_eq!(DEFAULT_BANDPASS_COEFFS[i], DEFAULT_BANDPASS_COEFFS[n - 1 - i]);
        }
    }

    #[test]
    fn test_set_bulk_replaces_taps() {
        let mut store = CoefficientStore::new();
        store.set_bulk(&[0.25, 0.5, 0.25]).unwrap();
        assert_eq!(store.taps(), &[0.25, 0.5, 0.25]);
    }

    #[test]
    fn test_set_bulk_accepts_maximum_length() {
        let mut store = CoefficientStore::new();
        let taps = vec![0.001; MAX_COEFFS_LEN];
        assert!(store.set_bulk(&taps).is_ok());
        assert_eq!(store.len(), MAX_COEFFS_LEN);
    }

    #[test]
    fn test_set_bulk_rejects_oversized_list() {
        let mut store = CoefficientStore::new();
        let taps = vec![1.0; MAX_COEFFS_LEN + 1];
        let err = store.set_bulk(&taps).unwrap_err();
        assert!(matches!(
            err,
            FirError::TooManyCoefficients { count: 513, max: 512 }
        ));
        assert_eq!(store.taps(), &DEFAULT_BANDPASS_COEFFS[..]);
    }

    #[test]
    fn test_set_bulk_rejects_empty_list() {
        let mut store = CoefficientStore::new();
        assert!(matches!(
            store.set_bulk(&[]),
            Err(FirError::EmptyCoefficients)
        ));
        assert_eq!(store.len(), 63);
    }

    #[test]
    fn test_set_scalar_makes_single_tap() {
        let mut store = CoefficientStore::new();
        store.set_scalar(0.5);
        assert_eq!(store.taps(), &[0.5]);
    }

    #[test]
    fn test_shorter_update_ignores_stale_entries() {
        let mut store = CoefficientStore::new();
        store.set_bulk(&[1.0, 2.0]).unwrap();
        assert_eq!(store.taps(), &[1.0, 2.0]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_returns_previous_snapshot() {
        let mut store = CoefficientStore::new();
        let old = store.replace(Coefficients::scalar(2.0));
        assert_eq!(old.len(), 63);
        assert_eq!(store.taps(), &[2.0]);
    }
}
