//! Section - a keyed group of rows with optional header and footer

use crate::id::Fingerprint;

use super::{Keyed, KeyedItem, Rows};

/// A keyed section of rows
///
/// Header/footer *presence* is structural: if it differs between two
/// snapshots the section is replaced as a whole. Header/footer *content* is
/// summarized by `fingerprint` and can be updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<K, R = usize> {
    /// Identity key, unique among sections
    pub key: K,
    /// Ordering token
    pub rank: R,
    /// Whether a header is shown
    pub has_header: bool,
    /// Whether a footer is shown
    pub has_footer: bool,
    /// Header/footer content fingerprint
    pub fingerprint: Option<Fingerprint>,
    /// Rows in display order
    pub rows: Rows<K, R>,
}

impl<K, R> Section<K, R> {
    /// Create an empty section without header or footer.
    pub fn new(key: K, rank: R) -> Self {
        Self {
            key,
            rank,
            has_header: false,
            has_footer: false,
            fingerprint: None,
            rows: Rows::new(),
        }
    }

    /// Show a header.
    pub fn with_header(mut self) -> Self {
        self.has_header = true;
        self
    }

    /// Show a footer.
    pub fn with_footer(mut self) -> Self {
        self.has_footer = true;
        self
    }

    /// Set the header/footer content fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = Some(fingerprint);
        self
    }

    /// Show the given header and footer titles and fingerprint them.
    ///
    /// ```
    /// use tola_reconcile::Section;
    ///
    /// let old: Section<&str> = Section::new("inbox", 0).with_titles(Some("Inbox"), None);
    /// let new: Section<&str> = Section::new("inbox", 0).with_titles(Some("Inbox (2)"), None);
    /// assert!(old.same_chrome(&new));
    /// assert_ne!(old.fingerprint, new.fingerprint);
    /// ```
    pub fn with_titles(mut self, header: Option<&str>, footer: Option<&str>) -> Self {
        self.has_header = header.is_some();
        self.has_footer = footer.is_some();
        self.fingerprint = Some(Fingerprint::of_chrome(header, footer));
        self
    }

    /// Replace the rows.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = KeyedItem<K, R>>) -> Self {
        self.rows = rows.into_iter().collect();
        self
    }

    /// Append a row.
    pub fn push(&mut self, row: KeyedItem<K, R>) {
        self.rows.push(row);
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the section has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether header and footer presence match `other`.
    #[inline]
    pub fn same_chrome(&self, other: &Self) -> bool {
        self.has_header == other.has_header && self.has_footer == other.has_footer
    }
}

impl<K, R> Keyed for Section<K, R>
where
    K: Eq + std::hash::Hash + Clone + std::fmt::Debug,
    R: PartialEq,
{
    type Key = K;
    type Rank = R;

    #[inline]
    fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    fn rank(&self) -> &R {
        &self.rank
    }

    #[inline]
    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_builder() {
        let section = Section::new("fruit", 0)
            .with_header()
            .with_rows([KeyedItem::new("apple", 0), KeyedItem::new("pear", 1)]);
        assert!(section.has_header);
        assert!(!section.has_footer);
        assert_eq!(section.len(), 2);
        assert_eq!(section.rows[1].key, "pear");
    }

    #[test]
    fn test_same_chrome() {
        let plain: Section<&str> = Section::new("a", 0);
        let header: Section<&str> = Section::new("a", 0).with_header();
        let footer: Section<&str> = Section::new("a", 0).with_footer();
        assert!(plain.same_chrome(&plain.clone()));
        assert!(!plain.same_chrome(&header));
        assert!(!header.same_chrome(&footer));
    }

    #[test]
    fn test_with_titles() {
        let section: Section<&str> = Section::new("a", 0).with_titles(None, Some("3 items"));
        assert!(!section.has_header);
        assert!(section.has_footer);
        assert_eq!(
            section.fingerprint,
            Some(Fingerprint::of_chrome(None, Some("3 items")))
        );
    }
}
