//! Include/exclude decisions for session directory entries.
//!
//! Pure functions over relative paths; no filesystem access happens here.

use crate::backup::archive::EntryKind;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, Path};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathFilter {
    blacklist: HashSet<OsString>,
}

impl PathFilter {
    pub fn new<I, S>(blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            blacklist: blacklist.into_iter().map(Into::into).collect(),
        }
    }

    /// True when any segment of `relative` is a blacklisted name, not only the leaf.
    pub fn is_blacklisted<P: AsRef<Path>>(&self, relative: P) -> bool {
        relative.as_ref().components().any(|c| match c {
            Component::Normal(name) => self.blacklist.contains(name),
            _ => false,
        })
    }

    /// Blacklisted paths plus loose files sitting directly in the session directory.
    pub fn is_excluded<P: AsRef<Path>>(&self, relative: P, kind: EntryKind) -> bool {
        let relative = relative.as_ref();
        self.is_blacklisted(relative) || (kind == EntryKind::File && is_top_level(relative))
    }
}

fn is_top_level(relative: &Path) -> bool {
    relative
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> PathFilter {
        PathFilter::new(["archives", "fc2t"])
    }

    #[test]
    fn test_blacklisted_at_top_level() {
        assert!(filter().is_blacklisted("archives"));
        assert!(filter().is_blacklisted("fc2t"));
        assert!(!filter().is_blacklisted("constellation4"));
    }

    #[test]
    fn test_blacklisted_at_any_depth() {
        assert!(filter().is_blacklisted("fc2t/stuff.txt"));
        assert!(filter().is_blacklisted("archives/13.tar"));
        assert!(filter().is_blacklisted("constellation4/fc2t/deep/file.lua"));
        assert!(filter().is_blacklisted("a/b/c/archives"));
    }

    #[test]
    fn test_blacklist_matches_whole_segments_only() {
        assert!(!filter().is_blacklisted("constellation4/archives_old/x.lua"));
        assert!(!filter().is_blacklisted("my-fc2t/x"));
        assert!(!filter().is_blacklisted("constellation4/scripts/fc2t.lua"));
    }

    #[test]
    fn test_top_level_file_excluded() {
        assert!(filter().is_excluded("loose.txt", EntryKind::File));
        assert!(!filter().is_excluded("constellation4", EntryKind::Directory));
    }

    #[test]
    fn test_nested_files_included() {
        assert!(!filter().is_excluded("constellation4/scripts/a.lua", EntryKind::File));
        assert!(!filter().is_excluded("constellation4/loose.txt", EntryKind::File));
        assert!(!filter().is_excluded("constellation4/scripts", EntryKind::Directory));
    }

    #[test]
    fn test_blacklist_applies_regardless_of_kind() {
        assert!(filter().is_excluded("fc2t", EntryKind::Directory));
        assert!(filter().is_excluded("universe4/archives", EntryKind::Directory));
        assert!(filter().is_excluded("universe4/archives/x", EntryKind::File));
    }

    #[test]
    fn test_empty_blacklist_only_drops_loose_files() {
        let filter = PathFilter::default();
        assert!(!filter.is_blacklisted("archives/x"));
        assert!(filter.is_excluded("loose.txt", EntryKind::File));
        assert!(!filter.is_excluded("archives/x", EntryKind::File));
    }

    #[test]
    fn test_curdir_prefix_does_not_hide_top_level() {
        assert!(filter().is_excluded("./loose.txt", EntryKind::File));
    }
}
