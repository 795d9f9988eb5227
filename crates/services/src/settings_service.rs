use std::sync::Arc;

use exam_core::model::Settings;
use storage::repository::SettingsRepository;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<Settings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Persist settings, replacing the stored value.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if persistence fails.
    pub async fn save(&self, settings: &Settings) -> Result<(), SettingsServiceError> {
        self.repo.save_settings(settings).await?;
        Ok(())
    }
}
