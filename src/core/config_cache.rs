// src/core/config_cache.rs

//! # Config Cache
//!
//! Generic key/value config parsing for the option defaults. Files such as
//! `krb5.conf` and `ldap.conf` are read through the hardened file layer,
//! parsed into identifier/value pairs, and cached per path so that one
//! resolution session never parses the same file twice.

use crate::system::secure_fs::{self, SecureFsError};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Separator used when the caller gives none: `=` or whitespace, with optional
/// whitespace around the `=`.
pub const DEFAULT_SEPARATOR: &str = r"\s*=\s*|\s+";

lazy_static! {
    static ref DEFAULT_LINE_RE: Regex =
        line_pattern(DEFAULT_SEPARATOR).expect("default separator pattern is valid");
}

pub type ConfigMap = HashMap<String, String>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid separator pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Cannot read config file: {0}")]
    File(#[from] SecureFsError),
}

/// Parsed config files of one session, keyed by path and separator.
#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: HashMap<(PathBuf, Option<String>), ConfigMap>,
    parse_count: usize,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the parsed contents of `path`, parsing it on first use.
    ///
    /// Each separator gets its own parse of the file. A missing file parses as
    /// an empty map (and is cached as such), since every caller has a
    /// fallback. Any other read failure is an error.
    pub fn load(&mut self, path: &Path, separator: Option<&str>) -> Result<&ConfigMap, ConfigError> {
        let key = (path.to_path_buf(), separator.map(str::to_string));
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                log::trace!("Config cache hit for '{}'", path.display());
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let parsed = read_config(path, separator)?;
                self.parse_count += 1;
                Ok(entry.insert(parsed))
            }
        }
    }

    /// Loads `path` with the default separator and looks `key` up in it.
    pub fn lookup(&mut self, path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
        let map = self.load(path, None)?;
        Ok(lookup_value(map, key).map(str::to_string))
    }

    /// `true` once `path` has been parsed with any separator.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.entries.keys().any(|(cached, _)| cached == path)
    }

    /// How many files this cache actually parsed.
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }
}

/// Config Value Lookup: exact key first, then a case-insensitive match.
pub fn lookup_value<'m>(map: &'m ConfigMap, key: &str) -> Option<&'m str> {
    if let Some(value) = map.get(key) {
        return Some(value.as_str());
    }
    map.iter()
        .filter(|(k, _)| k.eq_ignore_ascii_case(key))
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, v)| v.as_str())
}

/// Parses config text into identifier/value pairs.
///
/// Blank lines and lines starting with `#` or `;` are skipped, as are lines
/// that do not start with an identifier (section headers such as
/// `[libdefaults]`). When a key repeats, the first occurrence wins.
pub fn parse_config_str(content: &str, separator: Option<&str>) -> Result<ConfigMap, ConfigError> {
    let custom;
    let line_re: &Regex = match separator {
        Some(pattern) => {
            custom = line_pattern(pattern).map_err(|source| ConfigError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;
            &custom
        }
        None => &DEFAULT_LINE_RE,
    };

    let mut map = ConfigMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }
        let Some(caps) = line_re.captures(trimmed) else {
            log::trace!("Config line skipped: '{}'", trimmed);
            continue;
        };
        let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        map.entry(key.as_str().to_string())
            .or_insert_with(|| value.as_str().to_string());
    }
    Ok(map)
}

fn line_pattern(separator: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^([A-Za-z_][A-Za-z0-9_.\-]*)(?:{})(.*?)\s*$",
        separator
    ))
}

fn read_config(path: &Path, separator: Option<&str>) -> Result<ConfigMap, ConfigError> {
    match secure_fs::read_to_string_checked(path) {
        Ok(content) => {
            log::debug!("Parsing config file '{}'", path.display());
            parse_config_str(&content, separator)
        }
        Err(e) if e.is_not_found() => {
            log::debug!("Config file '{}' not found, using no values", path.display());
            Ok(ConfigMap::new())
        }
        Err(e) => Err(e.into()),
    }
}
