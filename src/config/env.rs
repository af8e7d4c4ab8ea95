use std::fmt::Display;
use std::str::FromStr;

use log::{info, warn};

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads typed settings from a key/value source, logging what was loaded
pub struct EnvReader {
    lookup: Lookup,
}

impl EnvReader {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        match self.raw(key) {
            Some(value) => {
                info!("Loaded {}={}", key, value);
                value
            }
            None => {
                warn!("Environment variable {} not set, using default: {}", key, default);
                default.to_string()
            }
        }
    }

    /// Like `string`, but never writes the value to the log
    pub fn secret(&self, key: &str) -> String {
        match self.raw(key) {
            Some(value) => {
                info!("Loaded {} (hidden)", key);
                value
            }
            None => {
                warn!("Environment variable {} not set, requests will carry an empty secret", key);
                String::new()
            }
        }
    }

    pub fn parsed<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + Display,
    {
        let Some(raw) = self.raw(key) else {
            warn!("Environment variable {} not set, using default: {}", key, default);
            return default;
        };

        match raw.parse::<T>() {
            Ok(value) => {
                info!("Loaded {}={}", key, value);
                value
            }
            Err(_) => {
                warn!("Failed to parse {}={:?}, using default: {}", key, raw, default);
                default
            }
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
