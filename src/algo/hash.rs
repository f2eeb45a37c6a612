//! Deterministic hashing for content fingerprints
//!
//! Fingerprints must compare equal across process restarts (a caller may
//! retain a snapshot built in an earlier run), so `std::hash` is not usable
//! here. blake3 gives a stable digest of whatever the caller feeds in.

use crate::id::Fingerprint;

// =============================================================================
// StableHasher - Builder Pattern
// =============================================================================

/// A deterministic hasher using blake3
///
/// Fields are length-prefixed so that `("ab", "c")` and `("a", "bc")` hash
/// differently.
///
/// ```
/// use tola_reconcile::algo::StableHasher;
///
/// let a = StableHasher::new().update_str("title").update_str("Milk").finish();
/// let b = StableHasher::new().update_str("title").update_str("Milk").finish();
/// assert_eq!(a, b);
/// ```
#[derive(Clone)]
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    /// Create a new StableHasher
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Update with raw bytes
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        self.inner.update(&(data.len() as u64).to_le_bytes());
        self.inner.update(data);
        self
    }

    /// Update with a string
    #[inline]
    pub fn update_str(self, s: &str) -> Self {
        self.update(s.as_bytes())
    }

    /// Update with an optional string; `None` and `Some("")` differ
    #[inline]
    pub fn update_opt_str(self, s: Option<&str>) -> Self {
        match s {
            Some(s) => self.update_bool(true).update_str(s),
            None => self.update_bool(false),
        }
    }

    /// Update with a u64 value (little-endian)
    #[inline]
    pub fn update_u64(self, v: u64) -> Self {
        self.update(&v.to_le_bytes())
    }

    /// Update with a bool
    #[inline]
    pub fn update_bool(self, v: bool) -> Self {
        self.update(&[v as u8])
    }

    /// Finish and return the raw hash
    ///
    /// Takes the first 8 bytes of blake3 output as little-endian u64.
    #[inline]
    pub fn finish(self) -> u64 {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Finish into a [`Fingerprint`]
    #[inline]
    pub fn fingerprint(self) -> Fingerprint {
        Fingerprint::from_raw(self.finish())
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}
