pub mod filter;
pub mod walkdir_filter;

use crate::backup::result_error::result::Result;
use derive_more::Display;
use dyn_iter::DynIter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a discovered path becomes inside the snapshot
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Stored as an empty directory member
    #[display("directory")]
    Directory,
    /// Stored with its content streamed from disk
    #[display("file")]
    File,
}

/// A single path discovered while walking the session directory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// Location on disk the content is read from
    pub src: Arc<Path>,

    /// Location inside the snapshot, relative to the session directory
    pub relative: Arc<Path>,

    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new<A: Into<Arc<Path>>, B: Into<Arc<Path>>>(src: A, relative: B, kind: EntryKind) -> Self {
        Self {
            src: src.into(),
            relative: relative.into(),
            kind,
        }
    }

    pub fn directory<A: Into<Arc<Path>>, B: Into<Arc<Path>>>(src: A, relative: B) -> Self {
        Self::new(src, relative, EntryKind::Directory)
    }

    pub fn file<A: Into<Arc<Path>>, B: Into<Arc<Path>>>(src: A, relative: B) -> Self {
        Self::new(src, relative, EntryKind::File)
    }

    pub fn relative_path_buf(&self) -> PathBuf {
        self.relative.to_path_buf()
    }
}

/// Source of the entries mirrored into one snapshot.
///
/// Each call starts a fresh walk; nothing is cached between runs. Errors are
/// yielded in-stream and the consumer is expected to stop at the first one.
pub trait TreeEntryIterable {
    fn tree_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<TreeEntry>>>;
}
