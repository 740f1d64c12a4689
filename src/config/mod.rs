//! Layered configuration: INI file, then environment, then inline overrides.

use std::{
    collections::HashMap,
    env, fs, io,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use thiserror::Error;
use tracing::{debug, warn};

pub mod template;

pub const RUN_DIR: &str = "RUN_DIR";
pub const OMP_NUM_THREADS: &str = "OMP_NUM_THREADS";
pub const LINKER: &str = "LINKER";
pub const PRELINKFLAGS: &str = "PRELINKFLAGS";
pub const POSTLINKFLAGS: &str = "POSTLINKFLAGS";
pub const MPIEXEC: &str = "MPIEXEC";
pub const MPIEXECFLAGS: &str = "MPIEXECFLAGS";
pub const VERBOSE: &str = "VERBOSE";

/// Environment variable that points at an explicit configuration file.
pub const CONFIG_ENV: &str = "HPCMAGIC_CONFIG";

const CONFIG_FILE_NAME: &str = "hpcmagic.ini";
const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration key `{0}` is not set")]
    MissingKey(String),

    #[error("configuration key `{0}` is empty")]
    EmptyKey(String),

    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Tokens from an inline override string that were not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideReport {
    pub applied: Vec<String>,
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    inner: HashMap<String, String>,
}

impl Config {
    /// Read the default section of `path`. A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "configuration file not found, starting empty");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse INI text. Lines indented deeper than the key above them continue
    /// that key's value, joined with a newline.
    pub fn parse(text: &str) -> Self {
        let mut inner: HashMap<String, String> = HashMap::new();
        let mut in_default = true;
        // Key that an indented line would continue, with the key's own indent.
        let mut open: Option<(String, usize)> = None;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            let indent = raw.len() - raw.trim_start().len();

            if let Some((key, key_indent)) = &open {
                if indent > *key_indent {
                    if let Some(value) = inner.get_mut(key) {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(line);
                    }
                    continue;
                }
            }
            open = None;

            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                in_default = section.trim().eq_ignore_ascii_case(DEFAULT_SECTION);
                continue;
            }
            if !in_default {
                continue;
            }
            match split_entry(line) {
                Some((k, v)) => {
                    let key = normalize_key(k);
                    inner.insert(key.clone(), v.trim().to_string());
                    open = Some((key, indent));
                }
                None => warn!(line = %line, "ignoring configuration line without a value"),
            }
        }

        Self { inner }
    }

    /// Replace known keys with same-named environment variables. Never adds keys.
    pub fn overlay_environment(&mut self) {
        for (key, value) in self.inner.iter_mut() {
            if let Ok(v) = env::var(key.as_str()) {
                debug!(key = %key, "overridden from environment");
                *value = v;
            }
        }
    }

    /// Apply a `key=value:key=value` override string.
    pub fn apply_overrides(&mut self, overrides: &str) -> OverrideReport {
        let mut report = OverrideReport::default();

        for token in overrides.split(':') {
            if token.trim().is_empty() {
                continue;
            }
            match token.split_once('=') {
                Some((k, v)) if !k.trim().is_empty() => {
                    let key = normalize_key(k);
                    self.inner.insert(key.clone(), v.to_string());
                    report.applied.push(key);
                }
                _ => report.rejected.push(token.to_string()),
            }
        }

        report
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.insert(normalize_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(&normalize_key(key)).map(String::as_str)
    }

    /// Look up a key that must be present and non-empty.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            None => Err(ConfigError::MissingKey(normalize_key(key))),
            Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyKey(normalize_key(key))),
            Some(v) => Ok(v),
        }
    }

    /// Whitespace-split flags. The key must exist but may be empty.
    pub fn flags(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        self.get(key)
            .map(|v| v.split_whitespace().map(str::to_string).collect())
            .ok_or_else(|| ConfigError::MissingKey(normalize_key(key)))
    }

    pub fn is_verbose(&self) -> bool {
        self.get(VERBOSE)
            .map(|v| v.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// All entries sorted by key.
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .inner
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let (k, rest) = line.split_at(pos);
    if k.trim().is_empty() {
        return None;
    }
    Some((k, &rest[1..]))
}

fn normalize_key(k: &str) -> String {
    k.trim().to_ascii_uppercase()
}

/// Resolve which configuration file to use.
///
/// Order: explicit path, `HPCMAGIC_CONFIG`, the per-user config directory,
/// then the per-user data directory. When nothing exists the per-user config
/// path is returned so that loading yields an empty configuration.
pub fn discover_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    if let Ok(p) = env::var(CONFIG_ENV) {
        if !p.trim().is_empty() {
            return PathBuf::from(p);
        }
    }

    let user = user_config_path();
    if user.exists() {
        return user;
    }
    if let Some(data) = BaseDirs::new().map(|b| b.data_dir().join("hpcmagic").join(CONFIG_FILE_NAME)) {
        if data.exists() {
            return data;
        }
    }
    user
}

pub fn user_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("hpcmagic").join(CONFIG_FILE_NAME)
}
