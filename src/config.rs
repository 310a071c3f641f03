//! Engine configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config file")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlogConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub host: String,
    /// Content pattern, e.g. `~/blog/content/*.md`. Directory components
    /// are scanned recursively.
    pub content: String,
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Offset applied to bracket dates, in hours east of UTC.
    #[serde(default = "default_time_zone_offset")]
    pub time_zone_offset_hours: i32,
    /// Watch the content tree and reload on change.
    #[serde(default)]
    pub watch: bool,
}

fn default_posts_per_page() -> usize {
    10
}

fn default_api_path() -> String {
    "/api".to_string()
}

fn default_time_zone_offset() -> i32 {
    -8
}

impl BlogConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.trim().is_empty() {
            return Err(ConfigError::Validation(
                "`content` must name a file, directory or glob".to_string(),
            ));
        }
        if self.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "`posts_per_page` must be at least 1".to_string(),
            ));
        }
        if self.time_zone_offset_hours.abs() > 14 {
            return Err(ConfigError::Validation(
                "`time_zone_offset_hours` must be within -14..=14".to_string(),
            ));
        }
        Ok(())
    }

    /// Content pattern with `~` expanded to the home directory.
    pub fn content_pattern(&self) -> String {
        shellexpand::tilde(&self.content).into_owned()
    }

    pub fn time_zone(&self) -> FixedOffset {
        // Validated range, cannot fail.
        FixedOffset::east_opt(self.time_zone_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}
