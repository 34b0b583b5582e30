//! Gemini API key sources
//!
//! Keys come from the comma-separated `GEMINI_API_KEYS` variable and, when
//! `GEMINI_KEYS_FILE` is set, from a JSON file of the form
//! `{"GEMINI_API_KEYS": ["k1", "k2"]}` (a comma-separated string is accepted
//! too). Environment keys come first. Tokens are trimmed and empty entries
//! dropped; order and duplicates are preserved.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read keys file {path}: {source}")]
    KeysFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse keys file {path}: {source}")]
    KeysFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct KeysFile {
    #[serde(rename = "GEMINI_API_KEYS", default)]
    keys: Option<KeyList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeyList {
    List(Vec<String>),
    Joined(String),
}

/// Split a comma-separated key list
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Read keys from a JSON keys file
pub fn load_keys_file(path: &Path) -> Result<Vec<String>, ConfigurationError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::KeysFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let file: KeysFile =
        serde_json::from_str(&raw).map_err(|source| ConfigurationError::KeysFileParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(match file.keys {
        Some(KeyList::List(keys)) => keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect(),
        Some(KeyList::Joined(joined)) => parse_key_list(&joined),
        None => Vec::new(),
    })
}

/// Merge the environment list and the optional keys file, in that order
pub fn collect_keys(
    env_value: Option<&str>,
    keys_file: Option<&Path>,
) -> Result<Vec<String>, ConfigurationError> {
    let mut keys = env_value.map(parse_key_list).unwrap_or_default();

    if let Some(path) = keys_file {
        let from_file = load_keys_file(path)?;
        tracing::debug!(path = %path.display(), count = from_file.len(), "Loaded keys file");
        keys.extend(from_file);
    }

    Ok(keys)
}
