//! Optional compression of the hourly snapshot stream.
//!
//! Daily archives are never compressed: they are appended to in place.

pub mod xz;

use crate::backup::file_ext::FileExtProvider;
use crate::backup::finish::Finish;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithDebugObjectAndFnName;
use derive_more::From;
use io_enum::Write;
use liblzma::write::XzEncoder;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

static XZ_FILE_EXT: &str = "xz";

/// Output stage sitting between the tar builder and the snapshot file
#[derive(Write)]
pub enum SnapshotWriter<W: Write> {
    Plain(W),
    Xz(XzEncoder<W>),
}

impl<W: Write> Finish<W> for SnapshotWriter<W> {
    fn finish(self) -> std::io::Result<W> {
        match self {
            SnapshotWriter::Plain(w) => Ok(w),
            SnapshotWriter::Xz(w) => w.finish(),
        }
    }
}

#[derive(Clone, Default, From, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "compressor_type")]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub enum CompressorConfig {
    #[default]
    None,
    Xz(xz::XzConfig),
}

impl CompressorConfig {
    pub fn is_compressed(&self) -> bool {
        !matches!(self, CompressorConfig::None)
    }
}

impl Validate for CompressorConfig {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        match self {
            CompressorConfig::None => Ok(()),
            CompressorConfig::Xz(xz) => xz.validate(),
        }
    }
}

/// Wraps the raw snapshot file writer in the configured compression stage.
pub trait SnapshotWriterBuilder<W: Write> {
    fn wrap_writer(&self, writer: W) -> Result<SnapshotWriter<W>>;
}

impl<W: Write> SnapshotWriterBuilder<W> for CompressorConfig {
    fn wrap_writer(&self, writer: W) -> Result<SnapshotWriter<W>> {
        match self {
            CompressorConfig::None => {
                tracing::debug!("Snapshot stream is not compressed");
                Ok(SnapshotWriter::Plain(writer))
            }
            CompressorConfig::Xz(xz) => xz.wrap_writer(writer),
        }
        .with_debug_object_and_fn_name(self.clone(), "wrap_writer")
    }
}

impl FileExtProvider for CompressorConfig {
    fn file_ext(&self) -> Option<Arc<str>> {
        self.is_compressed().then(|| Arc::from(XZ_FILE_EXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_is_uncompressed() {
        assert_eq!(CompressorConfig::default(), CompressorConfig::None);
        assert!(!CompressorConfig::None.is_compressed());
        assert!(CompressorConfig::None.file_ext().is_none());
    }

    #[test]
    fn test_xz_file_ext() {
        let config = CompressorConfig::Xz(xz::XzConfig::default());
        assert!(config.is_compressed());
        assert_eq!(config.file_ext().as_deref(), Some("xz"));
    }

    #[test]
    fn test_plain_writer_passes_bytes_through() {
        let mut writer = CompressorConfig::None
            .wrap_writer(Cursor::new(Vec::new()))
            .unwrap();
        writer.write_all(b"13.tar").unwrap();
        let cursor = writer.finish().unwrap();
        assert_eq!(cursor.into_inner(), b"13.tar");
    }

    #[test]
    fn test_deserialize_tagged_config() {
        let none: CompressorConfig =
            serde_json::from_str(r#"{"compressor_type":"none"}"#).unwrap();
        assert_eq!(none, CompressorConfig::None);

        let xz: CompressorConfig =
            serde_json::from_str(r#"{"compressor_type":"xz","thread":1}"#).unwrap();
        assert!(matches!(xz, CompressorConfig::Xz(_)));
    }

    #[test]
    fn test_deserialize_rejects_unknown_type() {
        let res = serde_json::from_str::<CompressorConfig>(r#"{"compressor_type":"zstd"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_validate_delegates_to_xz() {
        let bad: CompressorConfig =
            serde_json::from_str(r#"{"compressor_type":"xz","thread":0}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}
