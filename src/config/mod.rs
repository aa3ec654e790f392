pub mod loader;
pub mod structs;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use structs::{CampaignConfig, Config, SmtpConfig, TemplateKind, TestConfig};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write default config file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("test mode is enabled but [TEST] recipient_email is empty")]
    MissingTestRecipient,
    #[error("test mode is enabled but [TEST] recipient_email {0:?} is not a valid address")]
    InvalidTestRecipient(String),
}

impl Config {
    pub fn load<P: AsRef<Path>>(file_path: P) -> Result<Self, ConfigError> {
        let path = file_path.as_ref();
        let config_contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&config_contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
