//! A file received through the publication form.

use bytes::Bytes;
use std::fmt;

/// Transient upload: lives for one request, is written to the blob store and
/// then dropped.
#[derive(Clone, PartialEq)]
pub struct UploadedFile {
    /// Original client-side file name; becomes the leaf of the storage path.
    pub file_name: String,

    /// MIME type announced by the client, if any.
    pub content_type: Option<String>,

    pub content: Bytes,
}

impl UploadedFile {
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.content.len())
            .finish()
    }
}
