use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

pub const DEFAULT_FEED_PORT: u16 = 7878;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GestureSettings {
    /// When false, the landmark feed is never started and only the keyboard jumps.
    pub enabled: bool,
    pub feed_port: u16,
    pub poll_interval_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            feed_port: DEFAULT_FEED_PORT,
            poll_interval_ms: 16,
        }
    }
}

impl GestureSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub gesture: GestureSettings,
    /// Fixed obstacle seed; `None` picks one per launch.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            tuning: Tuning::default(),
            gesture: GestureSettings::default(),
            seed: None,
        }
    }
}

impl RunnerSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.tuning = self.tuning.sanitized();
        self.gesture.poll_interval_ms = self.gesture.poll_interval_ms.clamp(1, 1_000);
        self
    }
}

fn default_version() -> u32 {
    1
}

/// Directory for settings and scores: `$XDG_CONFIG_HOME/gesture-runner`, else
/// `$HOME/.config/gesture-runner`, else `./gesture-runner`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME").map(|home| {
                let mut p = PathBuf::from(home);
                p.push(".config");
                p
            })
        })
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("gesture-runner")
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        match std::env::var_os("RUNNER_SETTINGS_PATH") {
            Some(explicit) => Self::new(explicit),
            None => Self::new(config_dir().join("settings.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files give defaults; the game must start either way.
    pub fn load(&self) -> RunnerSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            return RunnerSettings::default();
        };
        match serde_json::from_slice::<RunnerSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!(
                    "ignoring invalid settings file {}: {err}",
                    self.path.display()
                );
                RunnerSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &RunnerSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

pub fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

pub fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gesture-runner-settings-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_loads_defaults() {
        let store = SettingsStore::new(temp_path("missing"));
        assert_eq!(store.load(), RunnerSettings::default());
    }

    #[test]
    fn save_then_load_keeps_user_values() {
        let path = temp_path("roundtrip");
        let store = SettingsStore::new(&path);
        let mut settings = RunnerSettings::default();
        settings.gesture.feed_port = 9000;
        settings.seed = Some(42);
        settings.tuning.gravity = 2000.0;

        store.save(&settings).expect("save settings");
        let loaded = store.load();
        assert_eq!(loaded, settings);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let path = temp_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(SettingsStore::new(&path).load(), RunnerSettings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn sanitized_clamps_poll_interval() {
        let mut settings = RunnerSettings::default();
        settings.gesture.poll_interval_ms = 0;
        settings.version = 7;
        let settings = settings.sanitized();
        assert_eq!(settings.gesture.poll_interval_ms, 1);
        assert_eq!(settings.version, 1);
    }
}
