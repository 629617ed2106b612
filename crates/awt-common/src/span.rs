//! Source location spans.

use serde::Serialize;
use std::sync::Arc;

/// A source location span (byte offsets into a named file).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SourceSpan {
    /// File path or name
    pub file: Arc<str>,
    /// Start position (byte offset)
    pub start: u32,
    /// Length in bytes
    pub length: u32,
}

impl SourceSpan {
    pub fn new(file: impl Into<Arc<str>>, start: u32, length: u32) -> Self {
        SourceSpan {
            file: file.into(),
            start,
            length,
        }
    }

    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.length)
    }
}
