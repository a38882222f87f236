//! Extension settings and the on-disk poker description templates.
//!
//! The templates are the only persisted state. They live in
//! `poker_display_config.json` under the per-user config directory and are
//! re-read at every hand evaluation, so edits apply without a restart. A
//! missing or unreadable file means the built-in defaults.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use gamba_engine::{EngineConfig, TemplateSource};
use gamba_hand::HandTemplates;

/// Directory name under the user's config directory.
pub const APP_NAME: &str = "Gamba-Suite";

/// File holding the poker description templates.
pub const TEMPLATE_FILE: &str = "poker_display_config.json";

/// Errors from reading or writing settings files.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The platform has no per-user config directory.
    #[error("no config directory for this user")]
    NoConfigDir,

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode templates: {0}")]
    Encode(#[source] serde_json::Error),
}

// ---------------------------------------------------------------------------
// TemplateStore
// ---------------------------------------------------------------------------

/// The template file on disk.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
}

impl TemplateStore {
    /// A store backed by exactly `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store for [`TEMPLATE_FILE`] inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(TEMPLATE_FILE))
    }

    /// The store in the per-user config directory.
    pub fn default_location() -> Result<Self, SettingsError> {
        let dirs = ProjectDirs::from("", "", APP_NAME).ok_or(SettingsError::NoConfigDir)?;
        Ok(Self::in_dir(dirs.config_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the templates, failing on a missing or corrupt file.
    ///
    /// Keys missing from the file take their default values.
    pub fn try_load(&self) -> Result<HandTemplates, SettingsError> {
        let data = std::fs::read(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Reads the templates, falling back to the defaults on any error.
    pub fn load(&self) -> HandTemplates {
        match self.try_load() {
            Ok(templates) => templates,
            Err(SettingsError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no template file, using defaults");
                HandTemplates::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "template file unusable, using defaults");
                HandTemplates::default()
            }
        }
    }

    /// Writes `templates`, creating the directory if needed.
    pub fn save(&self, templates: &HandTemplates) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(write_error)?;
        }
        let data = serde_json::to_vec_pretty(templates).map_err(SettingsError::Encode)?;
        std::fs::write(&self.path, data).map_err(write_error)?;
        tracing::info!(path = %self.path.display(), "templates saved");
        Ok(())
    }
}

impl TemplateSource for TemplateStore {
    fn templates(&self) -> HandTemplates {
        self.load()
    }
}

// ---------------------------------------------------------------------------
// ExtensionConfig
// ---------------------------------------------------------------------------

/// Everything the extension process is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Where the host bridge connects.
    pub bind: String,
    /// How long the host has to say hello after connecting.
    pub handshake_timeout: Duration,
    pub engine: EngineConfig,
    /// Template file; the per-user config directory when `None`.
    pub template_path: Option<PathBuf>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:9092".to_string(),
            handshake_timeout: Duration::from_secs(5),
            engine: EngineConfig::default(),
            template_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::in_dir(dir.path());

        assert!(matches!(store.try_load(), Err(SettingsError::Read { .. })));
        assert_eq!(store.load(), HandTemplates::default());
    }

    #[test]
    fn test_load_corrupt_file_returns_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::in_dir(dir.path());
        std::fs::write(store.path(), b"{ not json").expect("write");

        assert!(matches!(store.try_load(), Err(SettingsError::Parse { .. })));
        assert_eq!(store.load(), HandTemplates::default());
    }

    #[test]
    fn test_save_then_load_returns_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::in_dir(dir.path().join("nested"));
        let templates = HandTemplates {
            full_house: "Boat! %s".into(),
            nothing: "Bust".into(),
            ..HandTemplates::default()
        };

        store.save(&templates).expect("save");
        assert_eq!(store.load(), templates);
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = TemplateStore::in_dir(dir.path());
        std::fs::write(store.path(), br#"{"nothing":"Zilch"}"#).expect("write");

        let templates = store.templates();
        assert_eq!(templates.nothing, "Zilch");
        assert_eq!(templates.full_house, HandTemplates::default().full_house);
    }

    #[test]
    fn test_extension_config_default() {
        let config = ExtensionConfig::default();
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert!(config.template_path.is_none());
    }
}
