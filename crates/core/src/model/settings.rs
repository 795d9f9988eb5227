use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// How questions are laid out during an exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// One question at a time with previous/next controls.
    Buttons,
    /// All questions in one continuous list.
    #[default]
    Scroll,
}

/// User preferences, independent of exam progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    pub theme: Theme,
    pub font_size: FontSize,
    pub auto_save: bool,
    pub study_mode: bool,
    pub keyboard_shortcuts: bool,
    pub navigation_mode: NavigationMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_size: FontSize::Medium,
            auto_save: true,
            study_mode: false,
            keyboard_shortcuts: true,
            navigation_mode: NavigationMode::Scroll,
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub theme: Option<Theme>,
    pub font_size: Option<FontSize>,
    pub auto_save: Option<bool>,
    pub study_mode: Option<bool>,
    pub keyboard_shortcuts: Option<bool>,
    pub navigation_mode: Option<NavigationMode>,
}

impl SettingsPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Settings {
    /// Returns these settings with every field present in `patch` replaced.
    #[must_use]
    pub fn merged(self, patch: SettingsPatch) -> Self {
        Self {
            theme: patch.theme.unwrap_or(self.theme),
            font_size: patch.font_size.unwrap_or(self.font_size),
            auto_save: patch.auto_save.unwrap_or(self.auto_save),
            study_mode: patch.study_mode.unwrap_or(self.study_mode),
            keyboard_shortcuts: patch.keyboard_shortcuts.unwrap_or(self.keyboard_shortcuts),
            navigation_mode: patch.navigation_mode.unwrap_or(self.navigation_mode),
        }
    }
}
