//! Configuration loading for the EcoSynth backend
//!
//! Resolution priority, highest first:
//! 1. Command-line argument (handled by the binary's clap layer)
//! 2. Environment variable (`ECOSYNTH_*`)
//! 3. TOML config file
//! 4. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Top-level configuration, deserialized from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub regions: RegionsConfig,
    pub proximity: ProximityConfig,
    pub consensus: ConsensusConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Path to the GeoJSON reference dataset of administrative boundaries
    pub path: PathBuf,
}

/// Evidence-admission policy
///
/// Both checks are deployment policy, not compile-time choices: each can be
/// disabled independently for permissive deployments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Enforce the live-location vs photo-location distance check
    pub enforce_distance: bool,
    /// Maximum allowed distance in meters between the submitter's live
    /// location and the photo's embedded location
    pub max_distance_meters: f64,
    /// Enforce the capture-time recency check
    pub enforce_recency: bool,
    /// Maximum allowed age in hours of the photo's embedded capture time
    pub max_capture_age_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Number of concurring votes required to finalize a submission
    pub quorum: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Gemini API key for predictions, eco-scores, and analysis reports
    pub gemini_api_key: Option<String>,
    /// OpenWeather API key for the weather proxy
    pub openweather_api_key: Option<String>,
    /// Timeout applied to every outbound third-party call, in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            regions: RegionsConfig::default(),
            proximity: ProximityConfig::default(),
            consensus: ConsensusConfig::default(),
            upstream: UpstreamConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5800 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ecosynth.db"),
        }
    }
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/regions.geojson"),
        }
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            enforce_distance: true,
            max_distance_meters: 1000.0,
            enforce_recency: true,
            max_capture_age_hours: 24,
        }
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self { quorum: 3 }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openweather_api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then apply
    /// environment-variable overrides.
    ///
    /// A missing file is not an error (compiled defaults apply); a file that
    /// exists but does not parse is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                info!("Configuration loaded from {}", path.display());
                config
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using defaults",
                    path.display()
                );
                Config::default()
            }
            None => Config::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `ECOSYNTH_*` environment-variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("ECOSYNTH_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid ECOSYNTH_PORT: {}", port),
            }
        }
        if let Ok(path) = std::env::var("ECOSYNTH_DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("ECOSYNTH_REGIONS_PATH") {
            self.regions.path = PathBuf::from(path);
        }
        if let Ok(key) = std::env::var("ECOSYNTH_GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                self.upstream.gemini_api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("ECOSYNTH_OPENWEATHER_API_KEY") {
            if !key.trim().is_empty() {
                self.upstream.openweather_api_key = Some(key);
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.consensus.quorum == 0 {
            return Err(Error::Config(
                "consensus.quorum must be at least 1".to_string(),
            ));
        }
        let proximity = &self.proximity;
        if proximity.enforce_distance
            && (!proximity.max_distance_meters.is_finite() || proximity.max_distance_meters <= 0.0)
        {
            return Err(Error::Config(format!(
                "proximity.max_distance_meters must be a positive number, got {}",
                proximity.max_distance_meters
            )));
        }
        if proximity.enforce_recency && proximity.max_capture_age_hours <= 0 {
            return Err(Error::Config(format!(
                "proximity.max_capture_age_hours must be positive, got {}",
                proximity.max_capture_age_hours
            )));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(Error::Config(
                "upstream.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5800);
        assert_eq!(config.consensus.quorum, 3);
        assert!(config.proximity.enforce_distance);
        assert_eq!(config.proximity.max_distance_meters, 1000.0);
        assert!(config.proximity.enforce_recency);
        assert_eq!(config.proximity.max_capture_age_hours, 24);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/ecosynth.toml"))).unwrap();
        assert_eq!(config.server.port, 5800);
    }

    #[test]
    fn toml_sections_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
port = 9000

[consensus]
quorum = 5

[proximity]
max_distance_meters = 250.0
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.consensus.quorum, 5);
        assert_eq!(config.proximity.max_distance_meters, 250.0);
        // Section present but key omitted keeps the section default
        assert_eq!(config.proximity.max_capture_age_hours, 24);
    }

    #[test]
    fn zero_quorum_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[consensus]\nquorum = 0\n").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn proximity_checks_can_be_disabled() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[proximity]
enforce_distance = false
enforce_recency = false
"#
        )
        .unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert!(!config.proximity.enforce_distance);
        assert!(!config.proximity.enforce_recency);
    }
}
