use crate::backup::archive::filter::PathFilter;
use crate::backup::archive::walkdir_filter::SessionTreeWalker;
use crate::backup::archive::TreeEntryIterable;
use crate::backup::compress::CompressorConfig;
use crate::backup::file_ext::FileExtProvider;
use crate::backup::function_path;
use crate::backup::naming::ArchivePaths;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{MapErrWithMsg, Result};
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};
use crate::backup::tar::{append_nested_archive, create_snapshot_archive, TAR_FILE_EXT};
use crate::backup::validate::{
    validate_file_names, validate_time_format, validate_valid_file_name,
};
use bon::Builder;
use chrono::{DateTime, TimeZone};
use function_name::named;
use getset::Getters;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use validator::{Validate, ValidationError};

/// Everything a snapshot run needs besides the session directory and the clock.
///
/// Loaded from YAML, every field is optional:
///
/// ```yaml
/// archive_dir_name: archives
/// blacklist: [fc2t]
/// daily_format: "%Y-%m-%d"
/// hourly_format: "%H"
/// compressor:
///   compressor_type: xz
///   thread: 2
/// sort_entries: true
/// follow_links: false
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Validate, Builder, PartialEq, Eq, Getters)]
#[serde(deny_unknown_fields)]
#[getset(get = "pub")]
pub struct SnapshotConfig {
    /// Directory under the session directory holding every archive; never mirrored
    #[serde(default = "default_archive_dir_name")]
    #[builder(default = default_archive_dir_name(), into)]
    #[validate(custom(function = validate_valid_file_name))]
    archive_dir_name: Arc<str>,
    /// Directory names skipped at any depth, in addition to `archive_dir_name`
    #[serde(default = "default_blacklist")]
    #[builder(default = default_blacklist())]
    #[validate(custom(function = validate_file_names))]
    blacklist: Vec<Arc<str>>,
    #[serde(default = "default_daily_format")]
    #[builder(default = default_daily_format(), into)]
    #[validate(custom(function = validate_time_format))]
    daily_format: Arc<str>,
    #[serde(default = "default_hourly_format")]
    #[builder(default = default_hourly_format(), into)]
    #[validate(custom(function = validate_time_format))]
    hourly_format: Arc<str>,
    /// Applies to the hourly snapshot only
    #[serde(default)]
    #[builder(default)]
    #[validate(custom(function = validate_compressor))]
    compressor: CompressorConfig,
    #[serde(default = "default_true")]
    #[builder(default = true)]
    sort_entries: bool,
    #[serde(default)]
    #[builder(default)]
    follow_links: bool,
}

fn default_archive_dir_name() -> Arc<str> {
    "archives".into()
}

fn default_blacklist() -> Vec<Arc<str>> {
    vec!["fc2t".into()]
}

fn default_daily_format() -> Arc<str> {
    "%Y-%m-%d".into()
}

fn default_hourly_format() -> Arc<str> {
    "%H".into()
}

fn default_true() -> bool {
    true
}

fn validate_compressor(compressor: &CompressorConfig) -> std::result::Result<(), ValidationError> {
    compressor.validate().map_err(|e| {
        ValidationError::new("InvalidCompressor")
            .with_message(format!("Invalid compressor config: {e}").into())
    })
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl FileExtProvider for SnapshotConfig {
    fn file_ext(&self) -> Option<Arc<str>> {
        Some(
            std::iter::once(Arc::from(TAR_FILE_EXT))
                .chain(self.compressor.file_ext())
                .join(".")
                .into(),
        )
    }
}

impl SnapshotConfig {
    /// Parses and validates a YAML config.
    pub fn from_yaml_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_yml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Configured blacklist plus the archive directory itself.
    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(
            self.blacklist
                .iter()
                .chain(std::iter::once(&self.archive_dir_name))
                .map(|name| &**name),
        )
    }

    pub fn tree_walker<P: AsRef<Path>>(&self, source_root: P) -> SessionTreeWalker {
        SessionTreeWalker::builder()
            .src_dir(source_root.as_ref())
            .filter(self.path_filter())
            .sort_entries(self.sort_entries)
            .follow_links(self.follow_links)
            .build()
    }

    /// One full snapshot run against `source_root` at clock reading `now`.
    ///
    /// Stages run in order and the first failure ends the run. Nothing already
    /// written is rolled back: a built hourly snapshot stays on disk even when
    /// adding it to the daily archive fails.
    #[named]
    pub fn run<P, O, T>(&self, source_root: P, now: &DateTime<T>) -> Result<ArchivePaths>
    where
        P: AsRef<Path>,
        O: Display,
        T: TimeZone<Offset = O>,
    {
        self.run_stages(source_root.as_ref(), now)
            .with_debug_object_and_fn_name(self.clone(), function_path!())
    }

    fn run_stages<O: Display, T: TimeZone<Offset = O>>(
        &self,
        source_root: &Path,
        now: &DateTime<T>,
    ) -> Result<ArchivePaths> {
        let paths = ArchivePaths::resolve(self, source_root, now)?;
        info!("Session directory: {:?}", paths.source_root());
        info!("Archive directory: {:?}", paths.archive_root());
        info!("Daily archive: {:?}", paths.daily_archive());
        info!("Hourly snapshot: {:?}", paths.hourly_snapshot());

        ensure_archive_root(paths.archive_root())?;

        let entries = self.tree_walker(paths.source_root()).tree_entry_iterator()?;
        create_snapshot_archive(paths.hourly_snapshot(), entries, &self.compressor)
            .with_msg("Building hourly snapshot failed")?;

        append_nested_archive(
            paths.daily_archive(),
            paths.hourly_snapshot(),
            paths.hourly_entry_name(),
        )
        .with_msg("Adding hourly snapshot to daily archive failed")?;

        Ok(paths)
    }
}

fn ensure_archive_root(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }
        return Ok(());
    }

    std::fs::create_dir(dir)
        .map_err_with_msg(|| format!("Create archive directory {:?} failed", dir))?;
    info!("Archive directory created: {:?}", dir);
    Ok(())
}
