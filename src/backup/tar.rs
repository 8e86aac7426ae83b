use crate::backup::archive::{EntryKind, TreeEntry};
use crate::backup::compress::{CompressorConfig, SnapshotWriterBuilder};
use crate::backup::finish::Finish;
use crate::backup::result_error::result::{MapErrWithMsg, Result};
use getset::CopyGetters;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, IntoInnerError, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Extension of an uncompressed tar, and so of every daily archive
pub static TAR_FILE_EXT: &str = "tar";

const TAR_BLOCK_SIZE: u64 = 512;

/// Builds the hourly snapshot at `path` from walker output.
///
/// The file is truncated first, so rebuilding within the same hour replaces the
/// previous content instead of accumulating. File contents are streamed from
/// disk. On error the partially written file is left where it is.
///
/// Returns the number of entries written.
pub fn create_snapshot_archive<I>(
    path: &Path,
    entries: I,
    compressor: &CompressorConfig,
) -> Result<u64>
where
    I: IntoIterator<Item = Result<TreeEntry>>,
{
    let file = File::create(path).map_err_with_msg(|| format!("Create {:?} failed", path))?;
    let mut builder = compressor
        .wrap_writer(BufWriter::new(file))
        .map(BufWriter::new)
        .map(tar::Builder::new)?;

    let mut entry_count = 0;
    for entry in entries {
        let entry = entry?;
        match entry.kind {
            EntryKind::Directory => builder
                .append_dir(&*entry.relative, &*entry.src)
                .map_err_with_msg(|| {
                    format!("Adding directory {:?} into {:?} failed", entry.relative, path)
                })?,
            EntryKind::File => File::open(&entry.src)
                .and_then(|mut f| builder.append_file(&*entry.relative, &mut f))
                .map_err_with_msg(|| {
                    format!("Adding file {:?} into {:?} failed", entry.src, path)
                })?,
        }
        entry_count += 1;
    }

    builder
        .into_inner()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .finish()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()
        .map_err_with_msg(|| format!("Closing {:?} failed", path))?;

    tracing::info!("Wrote {} entries into {:?}", entry_count, path);
    Ok(entry_count)
}

/// Outcome of appending one snapshot to a daily archive
#[derive(Clone, Copy, Debug, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct DailyAppend {
    /// Members in the daily archive after the append
    members: u64,
    /// Whether a member with the same name was already present
    replaced_existing: bool,
}

/// Appends `snapshot_path` as member `entry_name` of the daily archive.
///
/// The daily archive is created when absent. Existing members are kept
/// byte-for-byte: only the end-of-archive marker is cut off and rewritten after
/// the new member. A repeated `entry_name` is appended again rather than
/// rewritten, and the later copy is the one tar extraction keeps.
pub fn append_nested_archive(
    daily_path: &Path,
    snapshot_path: &Path,
    entry_name: &str,
) -> Result<DailyAppend> {
    let mut daily = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(daily_path)
        .map_err_with_msg(|| format!("Open {:?} failed", daily_path))?;

    let scan = scan_members(&daily, entry_name)
        .map_err_with_msg(|| format!("Reading existing members of {:?} failed", daily_path))?;

    if scan.has_entry_name {
        tracing::warn!(
            "{:?} already holds {:?}, appending a newer copy",
            daily_path,
            entry_name
        );
    }

    daily.set_len(scan.data_end)?;
    daily.seek(SeekFrom::Start(scan.data_end))?;

    let mut builder = tar::Builder::new(BufWriter::new(daily));
    File::open(snapshot_path)
        .and_then(|mut f| builder.append_file(entry_name, &mut f))
        .map_err_with_msg(|| {
            format!("Adding {:?} into {:?} failed", snapshot_path, daily_path)
        })?;

    builder
        .into_inner()?
        .into_inner()
        .map_err(IntoInnerError::into_error)?
        .sync_all()
        .map_err_with_msg(|| format!("Closing {:?} failed", daily_path))?;

    let members = scan.members + 1;
    tracing::info!("{:?} now holds {} snapshot(s)", daily_path, members);
    Ok(DailyAppend {
        members,
        replaced_existing: scan.has_entry_name,
    })
}

struct MemberScan {
    /// Offset just past the data of the last member, where the next header goes
    data_end: u64,
    members: u64,
    has_entry_name: bool,
}

fn scan_members(file: &File, entry_name: &str) -> std::io::Result<MemberScan> {
    let mut scan = MemberScan {
        data_end: 0,
        members: 0,
        has_entry_name: false,
    };

    let file_len = file.metadata()?.len();
    if file_len == 0 {
        return Ok(scan);
    }

    let mut archive = tar::Archive::new(file);
    for entry in archive.entries_with_seek()? {
        let entry = entry?;
        let padded_size = entry.size().div_ceil(TAR_BLOCK_SIZE) * TAR_BLOCK_SIZE;
        scan.data_end = entry.raw_file_position() + padded_size;
        scan.members += 1;
        if entry.path()?.as_os_str() == entry_name {
            scan.has_entry_name = true;
        }
    }

    if scan.data_end > file_len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "last member needs {} bytes but the archive holds {}",
                scan.data_end, file_len
            ),
        ));
    }

    Ok(scan)
}

/// Paths and kinds of every member of an uncompressed tar archive, in stored order.
pub fn list_members(path: &Path) -> Result<Vec<(PathBuf, EntryKind)>> {
    let file = File::open(path).map_err_with_msg(|| format!("Open {:?} failed", path))?;
    let mut archive = tar::Archive::new(file);
    let mut members = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        let kind = if entry.header().entry_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        members.push((entry.path()?.into_owned(), kind));
    }
    Ok(members)
}
