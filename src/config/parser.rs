use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads and parses a configuration file without validating it
///
/// Missing tables and keys take their defaults. Use this when values are still
/// going to be overridden (for example from the command line) and validate the
/// merged result once.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    read_config_with_hash(path).map(|(config, _)| config)
}

/// Reads a configuration file and returns it with the SHA-256 of its content
///
/// The hash is logged at startup so two runs can be told apart by their
/// configuration. The config is not validated.
pub fn read_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok((config, content_hash(&content)))
}

/// Reads, parses, and validates a configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
