use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::data_url::DataUrl;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_MAX_WIDTH: u32 = 400;
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(PartialEq, Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AvatarSettings {
    /// Largest file accepted from the picker, in bytes
    pub max_upload_bytes: u64,
    /// Wider images are scaled down to this width
    pub max_width: u32,
    /// JPEG quality in `(0, 1]`
    pub quality: f32,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        AvatarSettings {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_width: DEFAULT_MAX_WIDTH,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl AvatarSettings {
    /// `max_width` with a zero from a hand-edited state file treated as 1.
    pub fn width_limit(&self) -> u32 {
        self.max_width.max(1)
    }

    /// Quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        if !self.quality.is_finite() {
            return (DEFAULT_QUALITY * 100.0) as u8;
        }
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// The avatar shown while an update is in flight.
///
/// Cloning shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct Preview(Arc<Mutex<Option<DataUrl>>>);

impl Preview {
    pub async fn get(&self) -> Option<DataUrl> {
        self.0.lock().await.clone()
    }

    pub(crate) async fn set(&self, image: DataUrl) {
        *self.0.lock().await = Some(image);
    }

    pub(crate) async fn clear(&self) {
        self.0.lock().await.take();
    }
}
