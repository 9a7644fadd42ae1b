//! Data types flowing in and out of the ingest crate.
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;

/// One file received from a client, before it touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name as supplied by the client. Only its extension is kept.
    pub original_name: String,
    /// Declared MIME type, if any. Not validated.
    pub content_type: Option<String>,
    /// Raw file contents.
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(original_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            original_name: original_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Extension of the original name including the leading dot, or an
    /// empty string. Letters and digits from any script are kept; an
    /// extension holding anything else (separators, spaces, punctuation) is
    /// dropped so the generated name stays safe to serve.
    pub fn extension(&self) -> String {
        Path::new(&self.original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(char::is_alphanumeric))
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Reference to a file written under the content root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Relative URL, e.g. `/uploads/img1718000000000.png`.
    pub url: String,
    /// Generated file name.
    pub file_name: String,
    /// Location on disk.
    #[serde(skip)]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_last_suffix() {
        assert_eq!(UploadedFile::new("cat.png", "x").extension(), ".png");
        assert_eq!(UploadedFile::new("archive.tar.gz", "x").extension(), ".gz");
        assert_eq!(UploadedFile::new("README", "x").extension(), "");
        assert_eq!(UploadedFile::new(".bashrc", "x").extension(), "");
    }

    #[test]
    fn extension_keeps_non_ascii_letters() {
        assert_eq!(UploadedFile::new("x.jpég", "x").extension(), ".jpég");
        assert_eq!(UploadedFile::new("写真.ПНГ", "x").extension(), ".ПНГ");
    }

    #[test]
    fn extension_drops_unsafe_characters() {
        assert_eq!(UploadedFile::new("evil.p/ng", "x").extension(), "");
        assert_eq!(UploadedFile::new("space.j pg", "x").extension(), "");
        assert_eq!(UploadedFile::new("query.png?x=1", "x").extension(), "");
    }
}
