//! Store configuration (policies + thresholds), loadable from the environment.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stocktrack_core::DomainError;

pub const ENV_STALE_REFERENCES: &str = "STOCKTRACK_STALE_REFERENCES";
pub const ENV_SORT_MODE: &str = "STOCKTRACK_SORT_MODE";
pub const ENV_LOW_STOCK_THRESHOLD: &str = "STOCKTRACK_LOW_STOCK_THRESHOLD";

pub const DEFAULT_LOW_STOCK_THRESHOLD: u64 = 10;

/// What Update/Delete/Edit do with an id that no longer exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReferencePolicy {
    /// Silently do nothing.
    #[default]
    Ignore,
    /// Fail with `DomainError::NotFound`.
    Reject,
}

impl FromStr for StaleReferencePolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(DomainError::validation(format!(
                "unknown stale reference policy '{other}' (expected ignore|reject)"
            ))),
        }
    }
}

/// How "sort by quantity" behaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Reorder the stored collection.
    #[default]
    InPlace,
    /// Leave storage alone; order only the derived view.
    View,
}

impl FromStr for SortMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "in_place" => Ok(Self::InPlace),
            "view" => Ok(Self::View),
            other => Err(DomainError::validation(format!(
                "unknown sort mode '{other}' (expected in_place|view)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub stale_references: StaleReferencePolicy,
    pub sort_mode: SortMode,
    pub low_stock_threshold: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stale_references: StaleReferencePolicy::default(),
            sort_mode: SortMode::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl StoreConfig {
    /// Read overrides from `STOCKTRACK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults;
    /// unparsable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            stale_references: parse_or(&lookup, ENV_STALE_REFERENCES, defaults.stale_references),
            sort_mode: parse_or(&lookup, ENV_SORT_MODE, defaults.sort_mode),
            low_stock_threshold: parse_or(&lookup, ENV_LOW_STOCK_THRESHOLD, defaults.low_stock_threshold),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + core::fmt::Debug,
    T::Err: core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(key, value = %raw, error = %err, fallback = ?default, "ignoring invalid config value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let cfg = StoreConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, StoreConfig::default());
        assert_eq!(cfg.low_stock_threshold, 10);
        assert_eq!(cfg.sort_mode, SortMode::InPlace);
        assert_eq!(cfg.stale_references, StaleReferencePolicy::Ignore);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            (ENV_STALE_REFERENCES, "Reject"),
            (ENV_SORT_MODE, "view"),
            (ENV_LOW_STOCK_THRESHOLD, " 3 "),
        ]));
        assert_eq!(cfg.stale_references, StaleReferencePolicy::Reject);
        assert_eq!(cfg.sort_mode, SortMode::View);
        assert_eq!(cfg.low_stock_threshold, 3);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            (ENV_SORT_MODE, "sideways"),
            (ENV_LOW_STOCK_THRESHOLD, "-4"),
        ]));
        assert_eq!(cfg.sort_mode, SortMode::InPlace);
        assert_eq!(cfg.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }

    #[test]
    fn sort_mode_accepts_kebab_case() {
        assert_eq!("in-place".parse::<SortMode>().unwrap(), SortMode::InPlace);
    }

    #[test]
    fn deserializes_partial_json() {
        let cfg: StoreConfig = serde_json::from_str(r#"{"sort_mode":"view"}"#).unwrap();
        assert_eq!(cfg.sort_mode, SortMode::View);
        assert_eq!(cfg.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
    }
}
