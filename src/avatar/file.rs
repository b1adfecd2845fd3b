use std::path::{Path, PathBuf};

use image::ImageFormat;

use super::{data_url::DataUrl, error::UploadError, state::AvatarSettings};

const UNKNOWN_MIME: &str = "application/octet-stream";

/// A file handed over by the picker. Only metadata is held; the bytes are
/// read after validation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl SelectedFile {
    /// Stat `path` and guess its MIME type from the extension unless one is
    /// given.
    pub async fn from_path(path: &Path, mime_type: Option<&str>) -> std::io::Result<SelectedFile> {
        let metadata = tokio::fs::metadata(path).await?;
        let mime_type = match mime_type {
            Some(mime) => mime.trim().to_ascii_lowercase(),
            None => guess_mime_type(path).to_string(),
        };
        Ok(SelectedFile {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            mime_type,
            size_bytes: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    /// Type check first, then size.
    pub fn validate(&self, settings: &AvatarSettings) -> Result<(), UploadError> {
        if !self.mime_type.starts_with("image/") {
            return Err(UploadError::InvalidType {
                mime_type: self.mime_type.clone(),
            });
        }
        if self.size_bytes > settings.max_upload_bytes {
            return Err(UploadError::TooLarge {
                size: self.size_bytes,
                max_size: settings.max_upload_bytes,
            });
        }
        Ok(())
    }

    /// Read the whole file into a data URL tagged with the declared type.
    pub async fn read_data_url(&self) -> Result<DataUrl, UploadError> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(DataUrl::new(self.mime_type.clone(), data))
    }
}

fn guess_mime_type(path: &Path) -> &'static str {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type())
        .unwrap_or(UNKNOWN_MIME)
}
