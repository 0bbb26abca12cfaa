//! Filter chain construction, execution and teardown
//!
//! A [`FilterChain`] is an ordered sequence of transform stages built for
//! one `(path, direction)` request and applied to a byte buffer. Execution
//! ping-pongs content between the caller's two buffers; a stage that
//! declines to run leaves the pipeline's visible output untouched, which is
//! the central correctness contract of this module.

use std::collections::TryReserveError;
use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, trace};

use crate::buffer::FilterBuffer;
use crate::config::ConfigError;
use crate::repo::Repository;
use crate::stages;

/// Transfer direction a chain is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Content moving from its working form into the object store.
    ToStorage,
    /// Content moving from the object store into the working tree.
    ToWorktree,
}

/// Outcome of one stage over a buffer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// The stage wrote its transform into the destination buffer.
    Applied,
    /// The stage chose not to run. Whatever it wrote is discarded, and the
    /// next stage reads the same input this one was given.
    Declined,
}

/// Errors from chain construction.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Loading the repository's filter settings failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Worktree-direction filters are a known gap; asking for them fails
    /// permanently rather than producing a partial chain.
    #[error("filters for the working tree direction are not implemented")]
    NotImplemented,

    /// A stage collaborator failed to construct. The whole build fails and
    /// no partially-built chain is returned.
    #[error("failed to construct the {stage} stage: {reason}")]
    StageConstruction {
        stage: &'static str,
        reason: String,
    },
}

/// Errors from chain application.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Buffer growth failed. The application aborts immediately and the
    /// destination buffer is left in an undefined partial state; callers
    /// must discard it.
    #[error("out of memory while filtering content")]
    OutOfMemory(#[from] TryReserveError),
}

/// One transform unit in a chain.
///
/// Implementors with resources to release beyond their own allocation do so
/// in a `Drop` impl; the chain drops every stage exactly once when it is
/// disposed.
pub trait Stage {
    /// Stage name for diagnostics.
    fn name(&self) -> &'static str;

    /// Transforms `src` into `dest`, or declines.
    ///
    /// `dest` arrives cleared. Returning [`StageStatus::Declined`] is not a
    /// failure: the executor discards `dest` and carries the input forward.
    /// Allocation failure is the only fatal outcome a stage can report.
    fn apply(
        &self,
        dest: &mut FilterBuffer,
        src: &FilterBuffer,
    ) -> Result<StageStatus, ApplyError>;
}

/// An ordered sequence of stages for one transfer request.
///
/// Built per `(path, direction)` and owned by the caller; dropping the
/// chain releases every stage. Ownership makes dispose-exactly-once a
/// compile-time guarantee.
pub struct FilterChain {
    stages: Vec<Box<dyn Stage>>,
}

impl fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "stages",
                &self.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl FilterChain {
    /// Builds the chain for `path` in direction `mode`.
    ///
    /// Ensures the repository's filter settings are cached first and
    /// propagates any configuration failure untouched. The storage
    /// direction currently registers at most the line-ending normalization
    /// stage; the worktree direction is [`BuildError::NotImplemented`].
    pub fn load<P: AsRef<Path>>(
        repo: &mut Repository,
        path: P,
        mode: FilterMode,
    ) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let settings = repo.filter_settings()?;

        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        match mode {
            FilterMode::ToStorage => {
                stages::crlf::register(&mut stages, &settings, path)?;
            }
            FilterMode::ToWorktree => return Err(BuildError::NotImplemented),
        }

        debug!(
            stages = stages.len(),
            path = %path.display(),
            "filter chain built"
        );
        Ok(Self { stages })
    }

    /// A chain with no stages; applies as the identity transform.
    pub fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a stage. Stages execute in append order.
    pub fn push(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Number of stages, in execution order.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the chain over `source`, leaving the result in `dest`.
    ///
    /// Both buffers are treated as mutable scratch space for the duration
    /// of the call and must not alias. An empty `source` bypasses every
    /// stage and yields an empty `dest`. On success the result is in
    /// `dest` regardless of how many stages ran or declined; on error the
    /// content of both buffers is undefined.
    pub fn apply(
        &self,
        dest: &mut FilterBuffer,
        source: &mut FilterBuffer,
    ) -> Result<(), ApplyError> {
        if source.is_empty() {
            dest.clear();
            return Ok(());
        }

        // Pre-size the destination to roughly the output we expect, so the
        // common single-stage chain allocates once.
        dest.grow(source.len())?;

        // Slot 0 is the caller's source, slot 1 the caller's dest. The slot
        // holding the current output is tracked explicitly instead of being
        // re-derived from iteration parity.
        let mut src_slot = 0;

        for stage in &self.stages {
            let (into, from) = if src_slot == 0 {
                (&mut *dest, &*source)
            } else {
                (&mut *source, &*dest)
            };

            into.clear();
            match stage.apply(into, from)? {
                StageStatus::Applied => {
                    src_slot = 1 - src_slot;
                    trace!(stage = stage.name(), "stage applied");
                }
                StageStatus::Declined => {
                    // The write slot keeps the stage's partial output, but
                    // nothing reads it: the next stage consumes the same
                    // input this one was given.
                    trace!(stage = stage.name(), "stage declined");
                }
            }
        }

        // The result must land in the caller's dest whether the chain was
        // empty, every stage declined, or the last stage wrote to source.
        if src_slot == 0 {
            dest.swap(source);
        }

        Ok(())
    }

    /// Consumes the chain, dropping every stage in order and releasing the
    /// chain's backing storage.
    pub fn dispose(self) {
        drop(self);
    }
}
