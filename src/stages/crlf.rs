//! Line-ending normalization into storage
//!
//! Folds CRLF pairs to LF when content moves from its working form into
//! the object store. The stage is deliberately conservative: it declines on
//! anything that classifies as binary and on content with nothing to fold,
//! and the chain executor then carries the input through untouched.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::buffer::FilterBuffer;
use crate::chain::{ApplyError, BuildError, Stage, StageStatus};
use crate::settings::{AutoCrlfPolicy, FilterSettings};
use crate::text;

/// Stage folding CRLF pairs to LF on the way into the object store.
pub struct CrlfToStorage {
    path: PathBuf,
}

impl CrlfToStorage {
    /// Builds the stage for `path` under the repository's cached policies.
    ///
    /// Returns `None` when `core.auto_crlf` is off: no conversion applies
    /// on the storage direction, so no stage belongs in the chain. The
    /// `core.eol` policy only affects the (unimplemented) worktree
    /// direction and is not consulted here.
    pub fn new(settings: &FilterSettings, path: &Path) -> Option<Self> {
        if settings.auto_crlf == AutoCrlfPolicy::False {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
        })
    }
}

/// Appends the normalization stage to `stages` when the repository's
/// policies call for it. Returns the number of stages appended.
pub fn register(
    stages: &mut Vec<Box<dyn Stage>>,
    settings: &FilterSettings,
    path: &Path,
) -> Result<usize, BuildError> {
    match CrlfToStorage::new(settings, path) {
        Some(stage) => {
            stages.push(Box::new(stage));
            Ok(1)
        }
        None => Ok(0),
    }
}

impl Stage for CrlfToStorage {
    fn name(&self) -> &'static str {
        "crlf-to-storage"
    }

    fn apply(
        &self,
        dest: &mut FilterBuffer,
        src: &FilterBuffer,
    ) -> Result<StageStatus, ApplyError> {
        let stats = text::gather_stats(src.as_slice());

        // Line-ending normalization is only safe on text
        if stats.is_binary() {
            trace!(path = %self.path.display(), "binary content, skipping normalization");
            return Ok(StageStatus::Declined);
        }

        if stats.crlf == 0 {
            return Ok(StageStatus::Declined);
        }

        dest.grow(src.len())?;

        let mut rest = src.as_slice();
        while let Some(pos) = rest.iter().position(|&b| b == b'\r') {
            if rest.get(pos + 1) == Some(&b'\n') {
                // Drop the CR, keep the LF
                dest.put(&rest[..pos])?;
            } else {
                // A lone CR is not a line ending we rewrite
                dest.put(&rest[..=pos])?;
            }
            rest = &rest[pos + 1..];
        }
        dest.put(rest)?;

        Ok(StageStatus::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EolPolicy;

    fn storage_stage() -> CrlfToStorage {
        CrlfToStorage {
            path: PathBuf::from("src/main.c"),
        }
    }

    fn apply(stage: &CrlfToStorage, content: &[u8]) -> (StageStatus, Vec<u8>) {
        let src = FilterBuffer::from_slice(content);
        let mut dest = FilterBuffer::new();
        let status = stage.apply(&mut dest, &src).unwrap();
        (status, dest.into_vec())
    }

    #[test]
    fn folds_crlf_to_lf() {
        let (status, out) = apply(&storage_stage(), b"one\r\ntwo\r\nthree\r\n");
        assert_eq!(status, StageStatus::Applied);
        assert_eq!(out, b"one\ntwo\nthree\n");
    }

    #[test]
    fn preserves_lone_cr() {
        let (status, out) = apply(&storage_stage(), b"mixed\r\nwith\rreturns\r\n");
        assert_eq!(status, StageStatus::Applied);
        assert_eq!(out, b"mixed\nwith\rreturns\n");
    }

    #[test]
    fn declines_on_binary_content() {
        let (status, _) = apply(&storage_stage(), b"header\x00\r\npayload");
        assert_eq!(status, StageStatus::Declined);
    }

    #[test]
    fn declines_when_nothing_to_fold() {
        let (status, _) = apply(&storage_stage(), b"already\nnormalized\n");
        assert_eq!(status, StageStatus::Declined);

        let (status, _) = apply(&storage_stage(), b"only\rlone\rreturns");
        assert_eq!(status, StageStatus::Declined);
    }

    #[test]
    fn registration_follows_auto_crlf() {
        let path = Path::new("docs/README.md");

        let off = FilterSettings::new();
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();
        assert_eq!(register(&mut stages, &off, path).unwrap(), 0);

        let mut on = FilterSettings::new();
        on.auto_crlf = AutoCrlfPolicy::True;
        assert_eq!(register(&mut stages, &on, path).unwrap(), 1);

        let mut input_only = FilterSettings::new();
        input_only.auto_crlf = AutoCrlfPolicy::Input;
        input_only.eol = EolPolicy::Lf;
        assert_eq!(register(&mut stages, &input_only, path).unwrap(), 1);
        assert_eq!(stages.len(), 2);
    }
}
