use thiserror::Error;

const MIB: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("not a data URL")]
    MissingScheme,
    #[error("data URL has no payload")]
    MissingPayload,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(#[source] base64::DecodeError),
}

/// Every way an avatar upload can end early.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file type {mime_type:?} is not an image")]
    InvalidType { mime_type: String },

    #[error("file is {size} bytes, limit is {max_size}")]
    TooLarge { size: u64, max_size: u64 },

    #[error("another upload is still in progress")]
    Busy,

    #[error("could not read selected file: {0}")]
    Read(#[from] std::io::Error),

    #[error("could not process image: {0}")]
    Processing(String),

    #[error("profile update failed: {0}")]
    UpdateFailed(color_eyre::Report),
}

impl UploadError {
    /// The message shown to the user for this failure.
    pub fn notification(&self) -> String {
        match self {
            UploadError::InvalidType { .. } => "Please select an image file".to_string(),
            UploadError::TooLarge { max_size, .. } => {
                format!("Image size should be less than {}", format_limit(*max_size))
            }
            UploadError::Busy => "An upload is already in progress".to_string(),
            UploadError::Read(_) | UploadError::Processing(_) => {
                "Failed to process image. Please try again.".to_string()
            }
            UploadError::UpdateFailed(_) => {
                "Failed to update profile. Please try again.".to_string()
            }
        }
    }
}

// rounds down, so every size under the shown limit is accepted
fn format_limit(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    if bytes < MIB {
        return format!("{}KB", bytes / 1024);
    }
    let tenths = bytes * 10 / MIB;
    match tenths % 10 {
        0 => format!("{}MB", tenths / 10),
        frac => format!("{}.{frac}MB", tenths / 10),
    }
}

impl From<DataUrlError> for UploadError {
    fn from(err: DataUrlError) -> Self {
        UploadError::Processing(err.to_string())
    }
}

impl From<image::ImageError> for UploadError {
    fn from(err: image::ImageError) -> Self {
        UploadError::Processing(err.to_string())
    }
}
