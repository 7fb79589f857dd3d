//! Load and persist [`Settings`] through the database key-value table.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Settings;
use crate::db::Database;

const SETTINGS_KEY: &str = "settings";

/// Settings persistence on top of [`Database`].
pub struct SettingsStore<'a> {
    db: &'a Database,
}

impl<'a> SettingsStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Stored settings, or defaults when nothing usable is stored.
    pub async fn load(&self) -> Result<Settings> {
        let Some(raw) = self.db.get_value(SETTINGS_KEY).await? else {
            debug!("No stored settings, using defaults");
            return Ok(Settings::default());
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(error = %e, "Stored settings are unreadable, using defaults");
                Ok(Settings::default())
            }
        }
    }

    pub async fn save(&self, settings: &Settings) -> Result<()> {
        let raw = serde_json::to_string(settings).context("Failed to encode settings")?;
        self.db.set_value(SETTINGS_KEY, &raw).await
    }

    /// Change one setting and persist the result.
    pub async fn update(&self, key: &str, value: &str) -> Result<Settings> {
        let mut settings = self.load().await?;
        settings.set(key, value)?;
        self.save(&settings).await?;

        debug!(key = key, value = value, "Setting updated");
        Ok(settings)
    }

    /// Drop stored settings so defaults apply again.
    pub async fn reset(&self) -> Result<()> {
        self.db.delete_value(SETTINGS_KEY).await?;
        Ok(())
    }
}
