//! Shared byte buffer currency for filter stages
//!
//! Stages read from one [`FilterBuffer`] and write into another, and the
//! chain executor ping-pongs the two roles between stages. Every operation
//! that can allocate is fallible: allocation failure surfaces as an error at
//! the call site instead of a sticky out-of-memory flag queried after the
//! fact.

use std::collections::TryReserveError;

/// Growable byte buffer passed between filter stages.
///
/// A thin owner of `Vec<u8>` whose allocating operations report failure
/// through `Result`. Non-allocating operations (`clear`, `swap`) cannot
/// fail.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterBuffer {
    data: Vec<u8>,
}

impl FilterBuffer {
    /// Creates an empty buffer. Does not allocate.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates a buffer holding a copy of `content`.
    pub fn from_slice(content: &[u8]) -> Self {
        Self {
            data: content.to_vec(),
        }
    }

    /// Ensures capacity for at least `target` bytes in total.
    ///
    /// Growing never discards existing content. Shrinking is not supported;
    /// a `target` at or below the current capacity is a no-op.
    pub fn grow(&mut self, target: usize) -> Result<(), TryReserveError> {
        let additional = target.saturating_sub(self.data.len());
        self.data.try_reserve(additional)
    }

    /// Appends `bytes`, reserving room first.
    pub fn put(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        self.data.try_reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Replaces the content with a copy of `bytes`.
    pub fn set(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        self.data.clear();
        self.put(bytes)
    }

    /// Drops the content, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Exchanges content (and allocations) with `other`.
    pub fn swap(&mut self, other: &mut FilterBuffer) {
        std::mem::swap(&mut self.data, &mut other.data);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the buffer, handing back the owned bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for FilterBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for FilterBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
