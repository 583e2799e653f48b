//! Persisted dashboard settings.
//!
//! Stored as `key=value` lines in `~/.lean-dashboard.conf`. Missing keys and
//! values that fail to parse fall back to their defaults.

use crate::lean::LeanThresholds;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default directory holding the dated dashboard CSVs.
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Directory containing `mlb_dashboard_YYYY-MM-DD.csv` files
    pub data_dir: PathBuf,
    /// Lean tier thresholds used for the F5 view
    pub thresholds: LeanThresholds,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            thresholds: LeanThresholds::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from the default location, or defaults if there is no config file.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from an explicit path. An unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines over the defaults.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            let t = &mut config.thresholds;
            match key.trim() {
                "data_dir" if !value.is_empty() => config.data_dir = PathBuf::from(value),
                "strong_era" => set_threshold(&mut t.strong_era, value),
                "strong_whip" => set_threshold(&mut t.strong_whip, value),
                "moderate_era" => set_threshold(&mut t.moderate_era, value),
                "moderate_whip" => set_threshold(&mut t.moderate_whip, value),
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        config
    }

    /// Serialize to the `key=value` format read by [`DashboardConfig::parse`].
    pub fn to_conf_string(&self) -> String {
        let t = &self.thresholds;
        format!(
            "data_dir={}\nstrong_era={}\nstrong_whip={}\nmoderate_era={}\nmoderate_whip={}\n",
            self.data_dir.display(),
            t.strong_era,
            t.strong_whip,
            t.moderate_era,
            t.moderate_whip
        )
    }

    /// Save to the default location. Does nothing if `HOME` is unset.
    pub fn save(&self) -> Result<()> {
        match config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_conf_string())
            .with_context(|| format!("Failed to write config {}", path.display()))
    }
}

fn set_threshold(slot: &mut f64, value: &str) {
    match parse_threshold(value) {
        Ok(v) => *slot = v,
        Err(e) => log::warn!("Ignoring {}", e),
    }
}

/// Parse a threshold edge. Must be a finite, non-negative number.
pub fn parse_threshold(value: &str) -> Result<f64, String> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!(
            "invalid threshold value '{}' (expected a number >= 0)",
            value
        )),
    }
}

/// Get the config file path: ~/.lean-dashboard.conf
pub fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".lean-dashboard.conf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(DashboardConfig::parse(""), DashboardConfig::default());
    }

    #[test]
    fn test_parse_overrides_and_ignores_junk() {
        let config = DashboardConfig::parse(
            "# settings\ndata_dir = /srv/mlb\nstrong_era=1.25\nstrong_whip=abc\nmoderate_whip=-1\ncolor=blue\nnot a pair\n",
        );
        assert_eq!(config.data_dir, PathBuf::from("/srv/mlb"));
        assert_eq!(config.thresholds.strong_era, 1.25);
        assert_eq!(config.thresholds.strong_whip, 0.15);
        assert_eq!(config.thresholds.moderate_era, 0.60);
        assert_eq!(config.thresholds.moderate_whip, 0.10);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lean.conf");
        let config = DashboardConfig {
            data_dir: dir.path().join("daily"),
            thresholds: LeanThresholds {
                strong_era: 1.5,
                strong_whip: 0.2,
                moderate_era: 0.75,
                moderate_whip: 0.125,
            },
        };
        config.save_to(&path).unwrap();
        assert_eq!(DashboardConfig::load_from(&path), config);
    }

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("1.25"), Ok(1.25));
        assert_eq!(parse_threshold(" 0 "), Ok(0.0));
        for bad in ["-1", "-0.01", "inf", "NaN", "abc", ""] {
            assert!(parse_threshold(bad).is_err(), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig::load_from(&dir.path().join("absent.conf"));
        assert_eq!(config, DashboardConfig::default());
    }
}
