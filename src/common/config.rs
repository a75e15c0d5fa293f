use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::zoom::ZoomStrategy;

pub fn data_dir() -> PathBuf { dirs::home_dir().unwrap().join(".redock") }
pub fn store_file() -> PathBuf { data_dir().join("layouts.json") }
pub fn config_file() -> PathBuf { dirs::home_dir().unwrap().join(".redock.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Master switch for automatic reactions to display changes. Manual
    /// commands still work when this is off.
    #[serde(default = "yes")]
    pub enabled: bool,

    /// Restore the stored layout for a configuration when it reappears.
    #[serde(default = "yes")]
    pub auto_restore: bool,

    /// Capture a fresh layout whenever an external display is connected.
    /// Independent of `auto_restore`; when both are on, restore runs first.
    #[serde(default)]
    pub auto_capture: bool,

    /// Zoom all windows to the remaining screen when displays disconnect.
    #[serde(default = "yes")]
    pub auto_zoom: bool,

    /// Show the Dock on connect and auto-hide it on disconnect.
    #[serde(default)]
    pub auto_dock_control: bool,

    /// Application names never captured, restored, or zoomed.
    #[serde(default)]
    pub excluded_apps: Vec<String>,

    #[serde(default)]
    pub zoom_strategy: ZoomStrategy,

    /// How long to wait for the display list to settle before reacting to a
    /// configuration change. Bursts within this window coalesce.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_restore: true,
            auto_capture: false,
            auto_zoom: true,
            auto_dock_control: false,
            excluded_apps: Vec::new(),
            zoom_strategy: ZoomStrategy::default(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Settings {
    pub fn excluded_set(&self) -> HashSet<String> {
        self.excluded_apps.iter().cloned().collect()
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.settle_ms > 30_000 {
            issues.push(format!(
                "settle_ms of {} would delay every reaction by more than 30s",
                self.settle_ms
            ));
        }

        let mut seen = HashSet::new();
        for (index, name) in self.excluded_apps.iter().enumerate() {
            if name.trim().is_empty() {
                issues.push(format!("excluded_apps entry {} is empty", index));
            }
            if !seen.insert(name) {
                issues.push(format!("duplicate excluded app '{}'", name));
            }
        }

        issues
    }

    /// Attempts to fix out-of-range values automatically. Returns the number
    /// of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.settle_ms > 30_000 {
            self.settle_ms = default_settle_ms();
            fixes += 1;
        }

        let before = self.excluded_apps.len();
        let mut seen = HashSet::new();
        self.excluded_apps
            .retain(|name| !name.trim().is_empty() && seen.insert(name.clone()));
        fixes += before - self.excluded_apps.len();

        fixes
    }
}

fn yes() -> bool { true }

fn default_settle_ms() -> u64 { 1000 }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn default() -> Config { Self::parse(include_str!("../../redock.default.toml")).unwrap() }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    fn parse(buf: &str) -> anyhow::Result<Config> {
        let mut config: Config = toml::from_str(buf)?;
        let fixed = config.settings.auto_fix_values();
        if fixed > 0 {
            tracing::warn!("adjusted {fixed} out-of-range config values");
        }
        for issue in config.settings.validate() {
            tracing::warn!("config: {issue}");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default();
        assert!(config.settings.enabled);
        assert!(config.settings.auto_restore);
        assert!(!config.settings.auto_capture);
        assert!(config.settings.auto_zoom);
        assert_eq!(config.settings.settle_ms, 1000);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("[settings]\nauto_zoom = false\n").unwrap();
        assert!(!config.settings.auto_zoom);
        assert!(config.settings.auto_restore);
        assert_eq!(config.settings.excluded_apps, Vec::<String>::new());
    }

    #[test]
    fn auto_fix_drops_blank_and_duplicate_exclusions() {
        let mut settings = Settings {
            excluded_apps: vec!["Finder".into(), "".into(), "Finder".into()],
            settle_ms: 60_000,
            ..Settings::default()
        };
        let fixed = settings.auto_fix_values();
        assert_eq!(fixed, 3);
        assert_eq!(settings.excluded_apps, vec!["Finder".to_string()]);
        assert_eq!(settings.settle_ms, 1000);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn saved_config_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redock.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[settings]\nnot_a_key = 1\n").is_err());
    }
}
