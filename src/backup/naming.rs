//! Resolution of every path a single run touches.
//!
//! All names are derived from one clock reading, so the daily archive and the
//! hourly snapshot of a run always agree on the date.

use crate::backup::file_ext::FileExtProvider;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::snapshot_config::SnapshotConfig;
use crate::backup::tar::TAR_FILE_EXT;
use chrono::{DateTime, TimeZone};
use getset::Getters;
use std::fmt::{Display, Write};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, Getters)]
#[getset(get = "pub")]
pub struct ArchivePaths {
    source_root: PathBuf,
    archive_root: PathBuf,
    daily_archive: PathBuf,
    hourly_snapshot: PathBuf,
    /// File name of the hourly snapshot, reused as its member name in the daily archive
    hourly_entry_name: String,
}

impl ArchivePaths {
    pub fn resolve<P, O, T>(
        config: &SnapshotConfig,
        source_root: P,
        now: &DateTime<T>,
    ) -> Result<Self>
    where
        P: AsRef<Path>,
        O: Display,
        T: TimeZone<Offset = O>,
    {
        let source_root = source_root.as_ref().to_path_buf();
        let archive_root = source_root.join(&**config.archive_dir_name());

        let daily_name = format!(
            "{}.{}",
            format_time(now, config.daily_format())?,
            TAR_FILE_EXT
        );
        let hourly_entry_name = format!(
            "{}.{}",
            format_time(now, config.hourly_format())?,
            config.file_ext().unwrap_or(TAR_FILE_EXT.into())
        );

        let daily_archive = archive_root.join(daily_name);
        let hourly_snapshot = archive_root.join(&hourly_entry_name);
        // Building the snapshot truncates its file, which must never be the daily archive
        if daily_archive == hourly_snapshot {
            return Err(Error::ArchiveNameCollision(daily_archive));
        }

        Ok(Self {
            daily_archive,
            hourly_snapshot,
            source_root,
            archive_root,
            hourly_entry_name,
        })
    }
}

fn format_time<O: Display, T: TimeZone<Offset = O>>(
    dt: &DateTime<T>,
    format: &str,
) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).map_err(|_| Error::InvalidTimeFormat(format.into()))?;
    Ok(out)
}
