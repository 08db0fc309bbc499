use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Settings;
use crate::error::Result;
use crate::profile::UserProfile;

const SETTINGS_FILE: &str = "settings.toml";
const PROFILE_FILE: &str = "profile.toml";

pub struct SettingsStorage {
    dir: PathBuf,
}

impl SettingsStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load_settings(&self) -> Settings {
        match self.read(SETTINGS_FILE) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                log::error!("Failed to load settings, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(SETTINGS_FILE, settings).map_err(|e| {
            log::error!("Failed to save settings: {}", e);
            e
        })
    }

    pub fn load_profile(&self) -> Option<UserProfile> {
        match self.read(PROFILE_FILE) {
            Ok(profile) => profile,
            Err(e) => {
                log::error!("Failed to load profile: {}", e);
                None
            }
        }
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write(PROFILE_FILE, profile).map_err(|e| {
            log::error!("Failed to save profile: {}", e);
            e
        })
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let text = match fs::read_to_string(self.dir.join(name)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(toml::from_str(&text)?))
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let text = toml::to_string_pretty(value)?;
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename: readers never see a partial file.
        let tmp = self.dir.join(format!("{}.tmp", name));
        fs::write(&tmp, text)?;
        fs::rename(&tmp, self.dir.join(name))?;
        Ok(())
    }
}
