use crate::backup::compress::{SnapshotWriter, SnapshotWriterBuilder};
use crate::backup::result_error::result::Result;
use getset::CopyGetters;
use liblzma::stream::{Check, MtStreamBuilder};
use liblzma::write::XzEncoder;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::io::Write;
use std::num::NonZero;
use validator::Validate;

static COMPRESSION_PRESET: u32 = 6;
static DEFAULT_MAX_PARALLELIZATION: usize = 8;

/// XZ settings for the hourly snapshot.
///
/// The preset is fixed; only the encoder thread count is configurable. `thread`
/// above 1 switches to the multithreaded liblzma stream encoder.
#[skip_serializing_none]
#[derive(Clone, Default, Validate, Serialize, Deserialize, Debug, PartialEq, Eq, CopyGetters)]
#[serde(deny_unknown_fields)]
#[getset(get_copy = "pub")]
pub struct XzConfig {
    /// Defaults to half the available cores
    #[validate(range(min = 1))]
    thread: Option<u32>,
}

impl XzConfig {
    pub fn new(thread: Option<u32>) -> Self {
        Self { thread }
    }

    fn effective_thread(&self) -> u32 {
        self.thread.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZero::get)
                .map(|core| core / 2)
                .map(|t| t.clamp(1, DEFAULT_MAX_PARALLELIZATION) as u32)
                .unwrap_or(1)
        })
    }
}

impl<W: Write> SnapshotWriterBuilder<W> for XzConfig {
    fn wrap_writer(&self, writer: W) -> Result<SnapshotWriter<W>> {
        let thread = self.effective_thread();

        tracing::debug!("Compressing snapshot with xz, threads={}", thread);

        if thread == 1 {
            Ok(SnapshotWriter::Xz(XzEncoder::new(writer, COMPRESSION_PRESET)))
        } else {
            let stream = MtStreamBuilder::new()
                .preset(COMPRESSION_PRESET)
                .check(Check::Crc64)
                .threads(thread)
                .encoder()?;
            Ok(SnapshotWriter::Xz(XzEncoder::new_stream(writer, stream)))
        }
    }
}
