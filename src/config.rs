//! Store application configuration that gets read from disk
use crate::Error;
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use simplelog::LevelFilter;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Connection settings for a Private Radar server
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PrivateRadarConfig {
    base_url: Option<String>,
    auth_token: Option<String>,
}

impl PrivateRadarConfig {
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

/// Configuration struct that we can create from the config file used
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_level_filter",
        serialize_with = "serialize_level_filter",
        default = "default_level_filter"
    )]
    log_level: LevelFilter,
    #[serde(default)]
    private_radar: Option<PrivateRadarConfig>,
}

impl Config {
    pub fn load<T: Read>(source: &mut T) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(source)
    }

    /// Load the configuration from an explicit file path
    pub fn load_from_path(path: &Path) -> Result<Self, Error> {
        let mut file = File::open(path)?;
        Ok(Config::load(&mut file)?)
    }

    /// Load the configuration from the first well-known location that exists,
    /// falling back to the built-in defaults
    pub fn discover() -> Result<Self, Error> {
        for path in default_config_paths() {
            if path.exists() {
                debug!("Reading configuration file: {:?}", path);
                return Config::load_from_path(&path);
            }
        }
        Ok(Config::default())
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn private_radar(&self) -> Option<&PrivateRadarConfig> {
        self.private_radar.as_ref()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_level_filter(),
            private_radar: None,
        }
    }
}

/// Well-known configuration file locations, in priority order
fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("kml2gpx.yml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("kml2gpx").join("config.yml"));
    }
    if let Some(dir) = dirs::home_dir() {
        paths.push(dir.join(".kml2gpx.yml"));
    }
    paths
}

fn deserialize_level_filter<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
where
    D: Deserializer<'de>,
{
    let buf = String::deserialize(deserializer)?;
    LevelFilter::from_str(&buf)
        .map_err(|_| serde::de::Error::custom(format!("invalid level value: {}", buf)))
}

fn serialize_level_filter<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&level.to_string())
}

fn default_level_filter() -> LevelFilter {
    LevelFilter::Info
}
