use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::{
    notify::Notifier,
    store::{ProfileStore, ProfileUpdate},
};

pub use data_url::DataUrl;
pub use error::{DataUrlError, UploadError};
pub use file::SelectedFile;
pub use img::{compress_image, target_dimensions};
pub use state::{AvatarSettings, Preview};

mod data_url;
mod error;
mod file;
mod img;
mod state;

/// Runs the validate, compress, update pipeline for avatar uploads.
pub struct AvatarUploader {
    store: Arc<dyn ProfileStore>,
    notifier: Arc<dyn Notifier>,
    settings: AvatarSettings,
    preview: Preview,
    // held for the whole upload, a second upload is turned away
    in_flight: Mutex<()>,
}

impl std::fmt::Debug for AvatarUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarUploader")
            .field("settings", &self.settings)
            .field("preview", &self.preview)
            .field("uploading", &self.is_uploading())
            .finish()
    }
}

impl AvatarUploader {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        notifier: Arc<dyn Notifier>,
        settings: AvatarSettings,
    ) -> AvatarUploader {
        AvatarUploader {
            store,
            notifier,
            settings,
            preview: Preview::default(),
            in_flight: Mutex::new(()),
        }
    }

    /// Shared handle to the transient preview.
    pub fn preview(&self) -> Preview {
        self.preview.clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Handle a picker selection. Only the first file is used; an empty
    /// selection does nothing.
    ///
    /// Every failure is reported to the notifier before it is returned.
    pub async fn handle_image_upload(
        &self,
        files: impl IntoIterator<Item = SelectedFile>,
    ) -> Result<Option<DataUrl>, UploadError> {
        let Some(file) = files.into_iter().next() else {
            return Ok(None);
        };
        match self.upload(&file).await {
            Ok(image) => {
                self.notifier.success("Profile picture updated");
                Ok(Some(image))
            }
            Err(err) => {
                self.notify_failure(&err);
                Err(err)
            }
        }
    }

    pub(crate) fn notify_failure(&self, err: &UploadError) {
        self.notifier.error(&err.notification());
    }

    #[instrument(skip_all, fields(file = %file.name))]
    async fn upload(&self, file: &SelectedFile) -> Result<DataUrl, UploadError> {
        info!(
            name = %file.name,
            mime_type = %file.mime_type,
            size = file.size_bytes,
            "File selected"
        );
        if let Err(err) = file.validate(&self.settings) {
            warn!(error = "Rejected selected file", err = %err);
            return Err(err);
        }

        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Upload already in progress, ignoring selection");
            return Err(UploadError::Busy);
        };

        let compressed = match self.compress(file).await {
            Ok(compressed) => compressed,
            Err(err) => {
                error!(error = "Could not process image", err = %err);
                self.preview.clear().await;
                return Err(err);
            }
        };

        self.preview.set(compressed.clone()).await;
        let update = ProfileUpdate {
            profile_pic: compressed.to_string(),
        };
        let result = self.store.update_profile(update).await;
        self.preview.clear().await;

        match result {
            Ok(_) => {
                info!("Profile updated");
                Ok(compressed)
            }
            Err(err) => {
                error!(error = "Failed to update profile", ?err);
                Err(UploadError::UpdateFailed(err))
            }
        }
    }

    async fn compress(&self, file: &SelectedFile) -> Result<DataUrl, UploadError> {
        let original = file.read_data_url().await?;
        let original_len = original.encoded_len();
        info!(length = original_len, "Read original image");

        let compressed = compress_image(
            original,
            self.settings.width_limit(),
            self.settings.jpeg_quality(),
        )
        .await?;
        let compressed_len = compressed.encoded_len();
        info!(
            length = compressed_len,
            ratio = %format!("{:.1}%", compression_ratio(original_len, compressed_len)),
            "Compressed image"
        );
        Ok(compressed)
    }
}

/// Size saved, as a percentage of the original. Negative when the output
/// grew.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 0.0;
    }
    (original_len as f64 - compressed_len as f64) / original_len as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use color_eyre::eyre::Result;
    use image::ImageFormat;
    use tokio::sync::Notify;

    use super::img::tests::encode_test_image;
    use super::*;
    use crate::notify::{Notification, RecordingNotifier};
    use crate::store::{MemoryProfileStore, Profile};

    /// Blocks inside `update_profile` until released.
    struct GatedStore {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl ProfileStore for GatedStore {
        async fn profile(&self) -> Result<Profile> {
            unreachable!()
        }

        async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(Profile {
                full_name: String::new(),
                email: String::new(),
                profile_pic: Some(update.profile_pic),
                created_at: Utc::now(),
            })
        }
    }

    #[test]
    fn ratio_is_percentage_saved() {
        assert_eq!(compression_ratio(200, 50), 75.0);
        assert_eq!(compression_ratio(100, 150), -50.0);
        assert_eq!(compression_ratio(0, 10), 0.0);
    }

    #[tokio::test]
    async fn empty_selection_is_ignored() {
        let notifier = Arc::new(RecordingNotifier::default());
        let uploader = AvatarUploader::new(
            Arc::new(GatedStore {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            notifier.clone(),
            AvatarSettings::default(),
        );
        assert!(uploader.handle_image_upload(Vec::new()).await.unwrap().is_none());
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn overlapping_upload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, encode_test_image(64, 64, ImageFormat::Png)).unwrap();
        let file = SelectedFile::from_path(&path, None).await.unwrap();

        let store = Arc::new(GatedStore {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let uploader = Arc::new(AvatarUploader::new(
            store.clone(),
            notifier.clone(),
            AvatarSettings::default(),
        ));

        let first = tokio::spawn({
            let uploader = Arc::clone(&uploader);
            let file = file.clone();
            async move { uploader.handle_image_upload([file]).await }
        });
        tokio::time::timeout(Duration::from_secs(10), store.entered.notified())
            .await
            .unwrap();
        assert!(uploader.is_uploading());
        assert!(uploader.preview().get().await.is_some());

        let second = uploader.handle_image_upload([file]).await;
        assert!(matches!(second, Err(UploadError::Busy)));

        store.release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert!(first.is_some());
        assert!(!uploader.is_uploading());
        assert!(uploader.preview().get().await.is_none());
        assert_eq!(
            notifier.sent(),
            vec![
                Notification::Error("An upload is already in progress".into()),
                Notification::Success("Profile picture updated".into()),
            ]
        );
    }

    #[tokio::test]
    async fn zero_width_limit_still_produces_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, encode_test_image(64, 32, ImageFormat::Png)).unwrap();
        let file = SelectedFile::from_path(&path, None).await.unwrap();

        let settings = AvatarSettings {
            max_width: 0,
            ..AvatarSettings::default()
        };
        let uploader = AvatarUploader::new(
            Arc::new(MemoryProfileStore::new(Profile {
                full_name: String::new(),
                email: String::new(),
                profile_pic: None,
                created_at: Utc::now(),
            })),
            Arc::new(RecordingNotifier::default()),
            settings,
        );
        let out = uploader.handle_image_upload([file]).await.unwrap().unwrap();
        let img = image::load_from_memory(out.data()).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }
}
