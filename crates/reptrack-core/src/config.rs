use anyhow::{bail, Context, Result};
use reptrack_detector::DetectorSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "config.toml";

/// Get the local data directory for reptrack.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("reptrack");
    Ok(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub program: String,
    pub script: PathBuf,
    pub timeout_secs: u64,
    /// Detector processes allowed to run at once
    pub max_concurrent: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let settings = DetectorSettings::default();
        Self {
            program: settings.program,
            script: settings.script,
            timeout_secs: settings.timeout.as_secs(),
            max_concurrent: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file, defaults to `reptrack.db` in the data directory
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub frame_interval_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 500,
        }
    }
}

/// Settings read from `config.toml` in the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub recorder: RecorderConfig,
}

impl Config {
    /// Keys accepted by [`Config::get`] and [`Config::set`]
    pub const KEYS: [&'static str; 7] = [
        "detector.program",
        "detector.script",
        "detector.timeout_secs",
        "detector.max_concurrent",
        "server.addr",
        "storage.db_path",
        "recorder.frame_interval_ms",
    ];

    /// Location of `config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined
    pub fn path() -> Result<PathBuf> {
        Ok(get_data_dir()?.join(CONFIG_FILE))
    }

    /// Load `config.toml` from the data directory, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be written
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Apply `REPTRACK_*` overrides, looking each variable up with `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(program) = lookup("REPTRACK_DETECTOR_PROGRAM") {
            self.detector.program = program;
        }
        if let Some(script) = lookup("REPTRACK_DETECTOR_SCRIPT") {
            self.detector.script = PathBuf::from(script);
        }
        if let Some(addr) = lookup("REPTRACK_SERVER_ADDR") {
            self.server.addr = addr;
        }
    }

    /// Read one setting as text, e.g. `server.addr`
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key
    pub fn get(&self, key: &str) -> Result<String> {
        Ok(match key {
            "detector.program" => self.detector.program.clone(),
            "detector.script" => self.detector.script.display().to_string(),
            "detector.timeout_secs" => self.detector.timeout_secs.to_string(),
            "detector.max_concurrent" => self.detector.max_concurrent.to_string(),
            "server.addr" => self.server.addr.clone(),
            "storage.db_path" => self
                .storage
                .db_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "recorder.frame_interval_ms" => self.recorder.frame_interval_ms.to_string(),
            _ => bail!(
                "Unknown config key: {key}. Valid keys: {}",
                Self::KEYS.join(", ")
            ),
        })
    }

    /// Change one setting. An empty value clears `storage.db_path`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or a value that does not parse
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "detector.program" => self.detector.program = value.to_string(),
            "detector.script" => self.detector.script = PathBuf::from(value),
            "detector.timeout_secs" => {
                let secs: u64 = parse_number(key, value)?;
                if secs == 0 {
                    bail!("{key} must be at least 1");
                }
                self.detector.timeout_secs = secs;
            }
            "detector.max_concurrent" => {
                let max: usize = parse_number(key, value)?;
                if max == 0 {
                    bail!("{key} must be at least 1");
                }
                self.detector.max_concurrent = max;
            }
            "server.addr" => self.server.addr = value.to_string(),
            "storage.db_path" => {
                self.storage.db_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "recorder.frame_interval_ms" => {
                self.recorder.frame_interval_ms = parse_number(key, value)?;
            }
            _ => bail!(
                "Unknown config key: {key}. Valid keys: {}",
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Every setting as `(key, value)` pairs
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }

    #[must_use]
    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            program: self.detector.program.clone(),
            script: self.detector.script.clone(),
            timeout: Duration::from_secs(self.detector.timeout_secs.max(1)),
        }
    }

    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.recorder.frame_interval_ms.max(1))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} expects a number, got '{value}'"))
}
