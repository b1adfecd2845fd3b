use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use avatar::{AvatarSettings, AvatarUploader, DataUrl, SelectedFile, UploadError};
use data::Datastore;
use notify::Notifier;
use store::{DatastoreProfileStore, Profile, ProfileStore};
use view::ProfileView;

pub mod avatar;
mod data;
pub mod notify;
pub mod store;
pub mod view;

/// Profile screen backed by a data directory.
pub struct App {
    datastore: Datastore,
    store: Arc<dyn ProfileStore>,
    uploader: AvatarUploader,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("datastore", &self.datastore)
            .field("uploader", &self.uploader)
            .finish()
    }
}

impl App {
    pub fn new(data_dir: &Path, notifier: Arc<dyn Notifier>) -> Result<App> {
        let datastore = Datastore::new(data_dir);
        let state = datastore
            .load_state()
            .wrap_err(format!("Loading state from {}", data_dir.display()))?;

        let store: Arc<dyn ProfileStore> = Arc::new(DatastoreProfileStore::new(datastore.clone()));
        let uploader = AvatarUploader::new(Arc::clone(&store), notifier, state.settings);

        Ok(App {
            datastore,
            store,
            uploader,
        })
    }

    pub fn uploader(&self) -> &AvatarUploader {
        &self.uploader
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.store.profile().await
    }

    /// Current profile screen as text.
    pub async fn render(&self) -> Result<String> {
        let profile = self.profile().await?;
        Ok(ProfileView::new(&profile, self.uploader.is_uploading()).to_string())
    }

    /// Replace the avatar with the first of `paths`.
    ///
    /// Files that cannot even be inspected are reported like unreadable
    /// uploads.
    #[instrument(skip(self))]
    pub async fn upload(
        &self,
        paths: &[impl AsRef<Path> + std::fmt::Debug],
        mime_type: Option<&str>,
    ) -> Result<Option<DataUrl>, UploadError> {
        let Some(path) = paths.first() else {
            return Ok(None);
        };
        if paths.len() > 1 {
            info!(ignored = paths.len() - 1, "Only the first selected file is used");
        }
        let file = match SelectedFile::from_path(path.as_ref(), mime_type).await {
            Ok(file) => file,
            Err(err) => {
                let err = UploadError::Read(err);
                self.uploader.notify_failure(&err);
                return Err(err);
            }
        };
        self.uploader.handle_image_upload([file]).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppState {
    #[serde(default)]
    profile: Option<Profile>,
    #[serde(default)]
    settings: AvatarSettings,
}

impl AppState {
    pub fn new(profile: Profile, settings: AvatarSettings) -> AppState {
        AppState {
            profile: Some(profile),
            settings,
        }
    }

    /// Write this state into `data_dir`, replacing what is there.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        Datastore::new(data_dir).save_state(self)
    }

    /// Store `profile` as the signed-in user, keeping any settings already
    /// saved in `data_dir`.
    pub fn init_profile(data_dir: &Path, profile: Profile) -> Result<()> {
        let datastore = Datastore::new(data_dir);
        let mut state = datastore.load_state()?;
        state.profile = Some(profile);
        datastore.save_state(&state)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn profile(full_name: &str) -> Profile {
        Profile {
            full_name: full_name.into(),
            email: "mary@example.com".into(),
            profile_pic: None,
            created_at: Utc.with_ymd_and_hms(2020, 2, 2, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn init_keeps_custom_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AvatarSettings {
            max_width: 128,
            quality: 0.5,
            ..AvatarSettings::default()
        };
        AppState::new(profile("Old Name"), settings.clone())
            .save(dir.path())
            .unwrap();

        AppState::init_profile(dir.path(), profile("Mary Jackson")).unwrap();

        let state = Datastore::new(dir.path()).load_state().unwrap();
        assert_eq!(state.settings, settings);
        assert_eq!(state.profile, Some(profile("Mary Jackson")));
    }

    #[test]
    fn init_on_empty_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        AppState::init_profile(dir.path(), profile("Mary Jackson")).unwrap();

        let state = Datastore::new(dir.path()).load_state().unwrap();
        assert_eq!(state.settings, AvatarSettings::default());
        assert!(state.profile.is_some());
    }
}
