use std::sync::Arc;

/// Supplies the extension segment a writer stage adds to an archive file name.
///
/// `None` means the stage is transparent, e.g. no compression.
pub trait FileExtProvider {
    fn file_ext(&self) -> Option<Arc<str>>;
}
