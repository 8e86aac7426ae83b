use crate::backup::archive::filter::PathFilter;
use crate::backup::archive::{EntryKind, TreeEntry, TreeEntryIterable};
use crate::backup::function_path;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::validate::validate_dir_exist;

use bon::Builder;
use dyn_iter::{DynIter, IntoDynIterator};
use function_name::named;
use getset::Getters;
use validator::Validate;
use walkdir::{DirEntry, WalkDir};

use std::path::{Path, PathBuf};

/// Recursive walk over a session directory.
///
/// Blacklisted directories are pruned from the walk entirely; every surviving
/// entry is still checked against the full filter, which also drops loose files
/// at the top level. With `sort_entries` set, siblings come out ordered by file
/// name so that two walks of an unchanged tree produce identical snapshots.
#[derive(Clone, Debug, Validate, Builder, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct SessionTreeWalker {
    #[validate(custom(function = validate_dir_exist))]
    #[builder(into)]
    src_dir: PathBuf,
    #[builder(default)]
    filter: PathFilter,
    #[builder(default = true)]
    sort_entries: bool,
    #[builder(default)]
    follow_links: bool,
}

impl TreeEntryIterable for SessionTreeWalker {
    #[named]
    fn tree_entry_iterator<'a>(&self) -> Result<DynIter<'a, Result<TreeEntry>>> {
        self.validate()
            .map_err(Error::from)
            .with_msg(format!("Cannot walk session directory {:?}", self.src_dir))?;

        tracing::info!("Walking session directory {:?}", self.src_dir);

        let mut walk = WalkDir::new(&self.src_dir)
            .min_depth(1)
            .follow_links(self.follow_links);
        if self.sort_entries {
            walk = walk.sort_by_file_name();
        }

        let prune_root = self.src_dir.clone();
        let prune_filter = self.filter.clone();
        let src_dir = self.src_dir.clone();
        let filter = self.filter.clone();

        let entries = walk
            .into_iter()
            .filter_entry(move |de| match de.path().strip_prefix(&prune_root) {
                Ok(relative) if prune_filter.is_blacklisted(relative) => {
                    tracing::debug!("Pruning blacklisted {:?}", relative);
                    false
                }
                _ => true,
            })
            .filter_map(move |res| match res {
                Ok(de) => process_dir_entry(de, &src_dir, &filter),
                Err(e) => Some(Err(e.into())),
            })
            .map(|res| res.with_msg(function_path!()));

        Ok(entries.into_dyn_iter())
    }
}

fn process_dir_entry<P: AsRef<Path>>(
    de: DirEntry,
    base_src_dir: P,
    filter: &PathFilter,
) -> Option<Result<TreeEntry>> {
    let relative = match de.path().strip_prefix(base_src_dir.as_ref()) {
        Ok(relative) => relative.to_path_buf(),
        Err(e) => {
            return Some(Err(Error::from(e).with_msg(format!(
                "Stripping {:?} from {:?} failed",
                base_src_dir.as_ref(),
                de.path()
            ))))
        }
    };

    // classify through the link target, a linked directory is stored as a directory
    let kind = if de.path().is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    if filter.is_excluded(&relative, kind) {
        tracing::trace!("Skipping {} {:?}", kind, relative);
        return None;
    }

    tracing::trace!("Including {} {:?}", kind, relative);
    Some(Ok(TreeEntry::new(de.into_path(), relative, kind)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_session_tree(dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir.join("archives"))?;
        std::fs::create_dir_all(dir.join("fc2t"))?;
        std::fs::create_dir_all(dir.join("constellation4/scripts"))?;
        std::fs::create_dir_all(dir.join("constellation4/logs"))?;
        std::fs::write(dir.join("fc2t/stuff.txt"), "stuff")?;
        std::fs::write(dir.join("loose.txt"), "loose")?;
        std::fs::write(dir.join("constellation4/scripts/a.lua"), "print('a')")?;
        std::fs::write(dir.join("constellation4/logs/b.log"), "log line")?;
        Ok(())
    }

    fn walker(dir: &Path) -> SessionTreeWalker {
        SessionTreeWalker::builder()
            .src_dir(dir)
            .filter(PathFilter::new(["archives", "fc2t"]))
            .build()
    }

    fn relative_paths(walker: &SessionTreeWalker) -> Vec<(PathBuf, EntryKind)> {
        walker
            .tree_entry_iterator()
            .unwrap()
            .map(|res| res.unwrap())
            .map(|e| (e.relative_path_buf(), e.kind))
            .collect()
    }

    #[test]
    fn test_walk_session_tree_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_session_tree(temp_dir.path()).unwrap();

        let entries = relative_paths(&walker(temp_dir.path()));

        assert_eq!(
            entries,
            vec![
                (PathBuf::from("constellation4"), EntryKind::Directory),
                (PathBuf::from("constellation4/logs"), EntryKind::Directory),
                (PathBuf::from("constellation4/logs/b.log"), EntryKind::File),
                (PathBuf::from("constellation4/scripts"), EntryKind::Directory),
                (PathBuf::from("constellation4/scripts/a.lua"), EntryKind::File),
            ]
        );
    }

    #[test]
    fn test_entries_carry_absolute_source() {
        let temp_dir = TempDir::new().unwrap();
        create_session_tree(temp_dir.path()).unwrap();

        for entry in walker(temp_dir.path()).tree_entry_iterator().unwrap() {
            let entry = entry.unwrap();
            assert_eq!(entry.src.as_ref(), temp_dir.path().join(&*entry.relative));
        }
    }

    #[test]
    fn test_unsorted_walk_yields_same_set() {
        let temp_dir = TempDir::new().unwrap();
        create_session_tree(temp_dir.path()).unwrap();

        let unsorted = SessionTreeWalker::builder()
            .src_dir(temp_dir.path())
            .filter(PathFilter::new(["archives", "fc2t"]))
            .sort_entries(false)
            .build();

        let mut a = relative_paths(&unsorted);
        let mut b = relative_paths(&walker(temp_dir.path()));
        a.sort_by(|x, y| x.0.cmp(&y.0));
        b.sort_by(|x, y| x.0.cmp(&y.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_deeply_nested_blacklist_is_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        std::fs::create_dir_all(dir.join("universe4/fc2t/deeper")).unwrap();
        std::fs::write(dir.join("universe4/fc2t/deeper/x.lua"), "x").unwrap();
        std::fs::write(dir.join("universe4/keep.lua"), "keep").unwrap();

        let entries = relative_paths(&walker(dir));

        assert_eq!(
            entries,
            vec![
                (PathBuf::from("universe4"), EntryKind::Directory),
                (PathBuf::from("universe4/keep.lua"), EntryKind::File),
            ]
        );
    }

    #[test]
    fn test_only_loose_files_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

        assert!(relative_paths(&walker(temp_dir.path())).is_empty());
    }

    #[test]
    fn test_nonexistent_directory() {
        let source = walker(Path::new("/nonexistent/session/directory"));
        assert!(source.tree_entry_iterator().is_err());
    }

    #[test]
    fn test_file_as_src_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_directory.txt");
        std::fs::write(&file_path, "content").unwrap();

        assert!(walker(&file_path).tree_entry_iterator().is_err());
    }

    #[test]
    fn test_walk_is_restartable() {
        let temp_dir = TempDir::new().unwrap();
        create_session_tree(temp_dir.path()).unwrap();
        let walker = walker(temp_dir.path());

        assert_eq!(relative_paths(&walker), relative_paths(&walker));
    }
}
