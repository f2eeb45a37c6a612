//! Content identity for reconciled items
//!
//! Two small value types sit next to an item's key:
//! - **Fingerprint**: summary of mutable content. Equal fingerprints mean no
//!   visual change, so a matched item can be skipped entirely.
//! - **ViewType**: which kind of view renders the item. When the fingerprint
//!   changes but the view type does not, the existing view is updated in
//!   place; a changed view type forces delete + insert.
//!
//! Neither participates in matching. Identity is the key alone.

use std::fmt;

use compact_str::CompactString;

use crate::algo::StableHasher;

// =============================================================================
// Fingerprint
// =============================================================================

/// Content fingerprint of an item
///
/// # Memory Layout
///
/// - 8 bytes (u64)
/// - Copy, no heap allocation
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Create a Fingerprint from a raw u64 value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 representation
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Fingerprint a single string
    pub fn of_str(content: &str) -> Self {
        StableHasher::new().update_str(content).fingerprint()
    }

    /// Fingerprint an ordered list of fields
    ///
    /// ```
    /// use tola_reconcile::Fingerprint;
    ///
    /// let a = Fingerprint::of_fields(["Buy milk", "done"]);
    /// let b = Fingerprint::of_fields(["Buy milk", "open"]);
    /// assert_ne!(a, b);
    /// ```
    pub fn of_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .fold(StableHasher::new(), |h, field| h.update_str(field.as_ref()))
            .fingerprint()
    }

    /// Fingerprint section chrome; an absent header differs from an empty one
    pub fn of_chrome(header: Option<&str>, footer: Option<&str>) -> Self {
        StableHasher::new()
            .update_opt_str(header)
            .update_opt_str(footer)
            .fingerprint()
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:016x})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

// =============================================================================
// ViewType
// =============================================================================

/// Identifier of the view kind that renders an item (its reuse identifier)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ViewType(CompactString);

impl ViewType {
    /// Create a view type from a name.
    pub fn new(name: &str) -> Self {
        Self(CompactString::new(name))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ViewType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
