//! Configuration for the heading-sync backend.
//!
//! The configuration lives in a single TOML file and is exposed as an
//! immutable snapshot: [`config`] hands out an `Arc<Config>`, and every
//! update produces a new snapshot which is persisted and then atomically
//! swapped in, so a trigger in flight keeps reading the settings it started
//! with.

use notename::SanitizeOptions;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

static CONFIG: OnceCell<RwLock<ConfigInner>> = OnceCell::new();

#[derive(Debug)]
struct ConfigInner {
    config: Arc<Config>,
    file_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read/write config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

struct LoadedConfig {
    config: Config,
    file_path: PathBuf,
    maybe_error: Option<toml::de::Error>,
}

fn default_config_file() -> PathBuf {
    use directories::ProjectDirs;
    use std::sync::OnceLock;

    static CELL: OnceLock<PathBuf> = OnceLock::new();

    CELL.get_or_init(|| {
        ProjectDirs::from("org", "headsync", "headsync")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("headsync.toml"))
    })
    .clone()
}

fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let config_file = specified_config_file.unwrap_or_else(default_config_file);

    let mut maybe_config_err = None;
    let mut config: Config = std::fs::read_to_string(&config_file)
        .ok()
        .and_then(|contents| {
            toml::from_str(&contents)
                .map_err(|err| {
                    maybe_config_err.replace(err);
                })
                .ok()
        })
        .unwrap_or_default();

    config.normalize();

    LoadedConfig {
        config,
        file_path: config_file,
        maybe_error: maybe_config_err,
    }
}

fn inner() -> &'static RwLock<ConfigInner> {
    CONFIG.get_or_init(|| {
        let LoadedConfig {
            config, file_path, ..
        } = load_config(None);
        RwLock::new(ConfigInner {
            config: Arc::new(config),
            file_path,
        })
    })
}

/// Loads the configuration once at startup, optionally from a custom file
/// location. Returns the loaded snapshot together with the deserialization
/// error if the file was malformed and the defaults were used instead.
pub fn load_config_on_startup(
    specified_config_file: Option<PathBuf>,
) -> (Arc<Config>, Option<toml::de::Error>) {
    let LoadedConfig {
        config,
        file_path,
        maybe_error,
    } = load_config(specified_config_file);

    let config = Arc::new(config);

    let initialized = CONFIG.get_or_init(|| {
        RwLock::new(ConfigInner {
            config: config.clone(),
            file_path,
        })
    });

    (initialized.read().config.clone(), maybe_error)
}

/// Returns the current configuration snapshot.
///
/// Lazily initialized from the default config file location when
/// [`load_config_on_startup`] was never called, which is also what the test
/// code relies on.
pub fn config() -> Arc<Config> {
    inner().read().config.clone()
}

/// Path of the file the configuration is persisted to.
pub fn config_file() -> PathBuf {
    inner().read().file_path.clone()
}

/// Applies `update` to a copy of the current configuration, persists it and
/// swaps it in as the new snapshot.
///
/// This is the single write path: an invalid ignore pattern introduced by
/// `update` is rejected here and reverts to the empty (disabled) pattern
/// before anything is persisted.
pub fn update_config(update: impl FnOnce(&mut Config)) -> Result<Arc<Config>, ConfigError> {
    let lock = inner();

    let mut updated = Config::clone(&lock.read().config);
    update(&mut updated);
    updated.normalize();

    let updated = Arc::new(updated);

    let file_path = lock.read().file_path.clone();
    persist(&updated, &file_path)?;

    lock.write().config = updated.clone();

    Ok(updated)
}

fn persist(config: &Config, file_path: &Path) -> Result<(), ConfigError> {
    if let Some(config_dir) = file_path.parent() {
        std::fs::create_dir_all(config_dir)?;
    }
    std::fs::write(file_path, toml::to_string_pretty(config)?)?;
    Ok(())
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Heading-sync plugin.
    pub heading_sync: HeadingSyncConfig,
}

impl Config {
    fn normalize(&mut self) {
        self.heading_sync.normalize();
    }
}

/// Heading-sync plugin.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HeadingSyncConfig {
    /// Whether to sync the filename when a note is saved.
    pub sync_on_save: bool,

    /// Whether to sync the filename when a note is opened.
    pub sync_on_open: bool,

    /// Extra literal strings to strip from headings, on top of the
    /// characters that are never legal in a filename.
    pub illegal_symbols: Vec<String>,

    /// Substitute inserted for illegal content. Empty means plain deletion.
    pub replacement: String,

    /// Keep only ASCII letters and digits, transliterating accented Latin
    /// letters first.
    pub alphanumeric_only: bool,

    /// Skip documents whose path matches this pattern (substring match).
    /// Empty disables the pattern.
    pub ignore_pattern: String,

    /// Explicitly ignored document paths, checked by membership only.
    pub ignored_files: Vec<String>,
}

impl Default for HeadingSyncConfig {
    fn default() -> Self {
        Self {
            sync_on_save: true,
            sync_on_open: true,
            illegal_symbols: Vec::new(),
            replacement: String::new(),
            alphanumeric_only: false,
            ignore_pattern: String::new(),
            ignored_files: Vec::new(),
        }
    }
}

impl HeadingSyncConfig {
    /// Snapshot of the sanitization settings for one sanitize call.
    pub fn sanitize_options(&self) -> SanitizeOptions {
        SanitizeOptions {
            replacement: self.replacement.clone(),
            alphanumeric_only: self.alphanumeric_only,
            illegal_symbols: self.illegal_symbols.clone(),
        }
    }

    /// Adds `path` to the ignored list unless it is already present.
    /// Returns whether the list changed.
    pub fn add_ignored_file(&mut self, path: &str) -> bool {
        if self.ignored_files.iter().any(|existing| existing == path) {
            return false;
        }
        self.ignored_files.push(path.to_string());
        true
    }

    /// Removes `path` from the ignored list. Returns whether it was present.
    pub fn remove_ignored_file(&mut self, path: &str) -> bool {
        let old_len = self.ignored_files.len();
        self.ignored_files.retain(|existing| existing != path);
        self.ignored_files.len() != old_len
    }

    /// Checks a candidate ignore pattern, for rejecting invalid input at the
    /// point it is entered rather than every time it is evaluated.
    pub fn validate_ignore_pattern(pattern: &str) -> Result<(), regex::Error> {
        if pattern.is_empty() {
            return Ok(());
        }
        Regex::new(pattern).map(|_| ())
    }

    fn normalize(&mut self) {
        if let Err(err) = Self::validate_ignore_pattern(&self.ignore_pattern) {
            tracing::warn!(
                pattern = %self.ignore_pattern,
                %err,
                "Invalid ignore pattern, disabling it"
            );
            self.ignore_pattern.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let config: Config = toml::from_str(
            r#"
            [heading-sync]
            replacement = "-"
            "#,
        )
        .unwrap();
        assert_eq!(config.heading_sync.replacement, "-");
        assert!(config.heading_sync.sync_on_save);
        assert!(config.heading_sync.sync_on_open);
        assert!(config.heading_sync.illegal_symbols.is_empty());
        assert!(!config.heading_sync.alphanumeric_only);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed: Result<Config, _> = toml::from_str(
            r#"
            [heading-sync]
            no-such-field = true
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = Config {
            heading_sync: HeadingSyncConfig {
                sync_on_open: false,
                illegal_symbols: vec!["TODO".to_string()],
                replacement: "_".to_string(),
                alphanumeric_only: true,
                ignore_pattern: "drafts/.*".to_string(),
                ignored_files: vec!["inbox/scratch.md".to_string()],
                ..Default::default()
            },
        };
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn normalize_disables_invalid_ignore_pattern() {
        let mut config = Config::default();
        config.heading_sync.ignore_pattern = "*[unclosed".to_string();
        config.normalize();
        assert!(config.heading_sync.ignore_pattern.is_empty());

        let mut config = Config::default();
        config.heading_sync.ignore_pattern = "drafts/.*".to_string();
        config.normalize();
        assert_eq!(config.heading_sync.ignore_pattern, "drafts/.*");
    }

    #[test]
    fn validate_ignore_pattern_accepts_empty() {
        assert!(HeadingSyncConfig::validate_ignore_pattern("").is_ok());
        assert!(HeadingSyncConfig::validate_ignore_pattern("notes/\\d+").is_ok());
        assert!(HeadingSyncConfig::validate_ignore_pattern("(open").is_err());
    }

    #[test]
    fn ignored_file_list_membership() {
        let mut settings = HeadingSyncConfig::default();
        assert!(settings.add_ignored_file("inbox/scratch.md"));
        assert!(!settings.add_ignored_file("inbox/scratch.md"));
        assert_eq!(settings.ignored_files, vec!["inbox/scratch.md".to_string()]);

        assert!(settings.remove_ignored_file("inbox/scratch.md"));
        assert!(!settings.remove_ignored_file("inbox/scratch.md"));
        assert!(settings.ignored_files.is_empty());
    }

    #[test]
    fn sanitize_options_mirror_settings() {
        let settings = HeadingSyncConfig {
            replacement: "-".to_string(),
            alphanumeric_only: true,
            illegal_symbols: vec!["x".to_string()],
            ..Default::default()
        };
        let options = settings.sanitize_options();
        assert_eq!(options.replacement, "-");
        assert!(options.alphanumeric_only);
        assert_eq!(options.illegal_symbols, vec!["x".to_string()]);
    }
}
