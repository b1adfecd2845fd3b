use async_trait::async_trait;
use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::data::Datastore;

/// The signed-in user as held by the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub profile_pic: String,
}

/// Owner of the authoritative profile. Uploads only go through
/// [`ProfileStore::update_profile`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn profile(&self) -> Result<Profile>;

    /// Persist the update and return the stored profile.
    async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile>;
}

#[derive(Debug)]
pub struct MemoryProfileStore {
    profile: Mutex<Profile>,
}

impl MemoryProfileStore {
    pub fn new(profile: Profile) -> MemoryProfileStore {
        MemoryProfileStore {
            profile: Mutex::new(profile),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn profile(&self) -> Result<Profile> {
        Ok(self.profile.lock().await.clone())
    }

    async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        let mut profile = self.profile.lock().await;
        profile.profile_pic = Some(update.profile_pic);
        Ok(profile.clone())
    }
}

/// Keeps the profile in the data directory's state file.
#[derive(Debug)]
pub(crate) struct DatastoreProfileStore {
    datastore: Datastore,
    // serializes read-modify-write of the state file
    lock: Mutex<()>,
}

impl DatastoreProfileStore {
    pub(crate) fn new(datastore: Datastore) -> DatastoreProfileStore {
        DatastoreProfileStore {
            datastore,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl ProfileStore for DatastoreProfileStore {
    async fn profile(&self) -> Result<Profile> {
        let _guard = self.lock.lock().await;
        self.datastore
            .load_state()?
            .profile
            .ok_or_else(|| eyre!("no profile in {}", self.datastore.state_file().display()))
    }

    #[instrument(skip_all)]
    async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile> {
        let _guard = self.lock.lock().await;
        let mut state = self.datastore.load_state()?;
        let Some(profile) = state.profile.as_mut() else {
            return Err(eyre!(
                "no profile in {}",
                self.datastore.state_file().display()
            ));
        };
        profile.profile_pic = Some(update.profile_pic);
        let profile = profile.clone();
        self.datastore
            .save_state(&state)
            .wrap_err("Saving updated profile")?;
        info!(bytes = profile.profile_pic.as_ref().map(String::len), "Stored profile picture");
        Ok(profile)
    }
}
