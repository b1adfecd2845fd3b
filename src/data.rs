use std::{
    fs::{self, read_to_string},
    path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};

use crate::AppState;

const STATE_FILE_NAME: &str = "state.json";

#[derive(Debug, Clone)]
pub(crate) struct Datastore {
    base_path: PathBuf,
}
impl Datastore {
    pub(crate) fn new(path: &Path) -> Datastore {
        Datastore {
            base_path: PathBuf::from(path),
        }
    }

    pub(crate) fn state_file(&self) -> PathBuf {
        self.base_path.join(STATE_FILE_NAME)
    }

    /// Raw contents of the state file, empty if it does not exist yet.
    pub(crate) fn load_state_file(&self) -> Result<String> {
        let statefile = self.state_file();
        if !statefile.exists() {
            return Ok(String::new());
        }
        read_to_string(&statefile)
            .wrap_err(format!("Reading state file at {}", statefile.display()))
    }

    pub(crate) fn save_state_file(&self, data: &str) -> Result<()> {
        let statefile = self.state_file();
        fs::write(&statefile, data)
            .wrap_err(format!("Writing state file to {}", statefile.display()))
    }

    pub(crate) fn load_state(&self) -> Result<AppState> {
        let raw = self.load_state_file()?;
        if raw.trim().is_empty() {
            return Ok(AppState::default());
        }
        serde_json::from_str(&raw).wrap_err("Parsing app state")
    }

    pub(crate) fn save_state(&self, state: &AppState) -> Result<()> {
        let raw = serde_json::to_string_pretty(state).wrap_err("Serializing app state")?;
        self.save_state_file(&raw)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::store::Profile;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let datastore = Datastore::new(dir.path());
        let state = datastore.load_state().unwrap();
        assert_eq!(state, AppState::default());
        assert!(!datastore.state_file().exists());
    }

    #[test]
    fn state_survives_a_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let datastore = Datastore::new(dir.path());
        let mut state = AppState::default();
        state.profile = Some(Profile {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            profile_pic: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        });
        state.settings.max_width = 256;
        datastore.save_state(&state).unwrap();

        assert_eq!(Datastore::new(dir.path()).load_state().unwrap(), state);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let datastore = Datastore::new(dir.path());
        datastore.save_state_file("{ not json").unwrap();
        let err = datastore.load_state().unwrap_err();
        assert!(format!("{err:?}").contains("Parsing app state"));
    }
}
