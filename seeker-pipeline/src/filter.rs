//! Turns cumulative answer snapshots into append-only writes.
//!
//! The generator reports everything produced so far on every update, and now
//! and then an update arrives with a character missing. The filter keeps the
//! text it has already shown and only ever appends to it: an update is shown
//! once a Markdown heading exists, and only if it extends what is on screen.

/// Nothing is shown before the answer's first heading appears.
pub const HEADING_MARKER: &str = "###";

#[derive(Debug, Default, Clone)]
pub struct IncrementalFilter {
    emitted: String,
}

impl IncrementalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written so far.
    pub fn emitted(&self) -> &str {
        &self.emitted
    }

    /// Offer the next snapshot. Returns the part that should be written now,
    /// or `None` if the snapshot is dropped. An accepted snapshot identical
    /// to what was already shown yields an empty suffix.
    ///
    /// ```
    /// use seeker_pipeline::IncrementalFilter;
    ///
    /// let mut f = IncrementalFilter::new();
    /// assert_eq!(f.accept("thinking"), None);
    /// assert_eq!(f.accept("### Answer\nHi"), Some("### Answer\nHi"));
    /// assert_eq!(f.accept("### Answer\nHi there"), Some(" there"));
    /// assert_eq!(f.accept("### Answer\nH there"), None);
    /// ```
    pub fn accept<'c>(&mut self, chunk: &'c str) -> Option<&'c str> {
        if chunk.is_empty() || !chunk.contains(HEADING_MARKER) {
            return None;
        }
        // Must start with the shown text, not merely contain it.
        let suffix = chunk.strip_prefix(self.emitted.as_str())?;
        self.emitted.push_str(suffix);
        Some(suffix)
    }
}
