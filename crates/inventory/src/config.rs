//! View-model configuration.

use vacation_core::YYYY_MM_DD_DATE_FORMAT;

/// Environment variable overriding [`ViewModelConfig::name`].
pub const NAME_ENV: &str = "VACATION_VIEW_MODEL_NAME";

/// Environment variable overriding [`ViewModelConfig::display_pattern`].
pub const DISPLAY_PATTERN_ENV: &str = "VACATION_DISPLAY_DATE_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModelConfig {
    /// Name used in log fields
    pub name: String,
    /// Date pattern used to render trip dates for display
    pub display_pattern: String,
}

impl Default for ViewModelConfig {
    fn default() -> Self {
        Self {
            name: "inventory".to_string(),
            display_pattern: YYYY_MM_DD_DATE_FORMAT.to_string(),
        }
    }
}

impl ViewModelConfig {
    /// Defaults, overridden by any of the environment variables that are set
    /// and non-blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(name) = lookup(NAME_ENV).filter(|v| !v.trim().is_empty()) {
            config.name = name;
        }
        if let Some(pattern) = lookup(DISPLAY_PATTERN_ENV).filter(|v| !v.trim().is_empty()) {
            config.display_pattern = pattern;
        }
        config
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_display_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.display_pattern = pattern.into();
        self
    }
}
