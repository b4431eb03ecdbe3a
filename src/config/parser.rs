use crate::config::types::Config;
use crate::error::{ConfigError, Result};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content = std::fs::read_to_string(path).map_err(|source| {
		if source.kind() == std::io::ErrorKind::NotFound {
			ConfigError::ConfigNotFound {
				path: path.to_path_buf(),
			}
		} else {
			ConfigError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			}
		}
	})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
///
/// Only the shape is checked here. Rule semantics are validated when the
/// rules are compiled into a `RuleSet`.
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	toml::from_str(content).map_err(|source| ConfigError::ConfigParseError {
		path: path.to_path_buf(),
		source,
	})
}
