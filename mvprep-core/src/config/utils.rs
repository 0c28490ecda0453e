//! Configuration utility functions
//!
//! Helpers for reading override values out of the environment. Every helper
//! takes the lookup as a closure so callers (and tests) can substitute
//! something other than the process environment.

use std::path::PathBuf;
use std::str::FromStr;

/// Reads the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parses a value from `lookup(key)`, keeping `current` when absent or invalid.
pub fn env_parse<T, F>(lookup: &F, key: &str, current: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => {
                log::debug!("Config override from {key}: {raw}");
                value
            }
            Err(_) => {
                log::warn!("Ignoring invalid value '{raw}' for {key}");
                current
            }
        },
        None => current,
    }
}

/// Reads a path from `lookup(key)`, keeping `current` when absent or empty.
pub fn env_path<F>(lookup: &F, key: &str, current: PathBuf) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => current,
    }
}
