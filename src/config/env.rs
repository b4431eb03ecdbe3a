use crate::config::types::{Config, RuleConfig};
use crate::error::{ConfigError, Result};

pub const MATCH_HOST_VAR: &str = "DEVROUTE_MATCH_HOST";
pub const MATCH_PATH_PREFIX_VAR: &str = "DEVROUTE_MATCH_PATH_PREFIX";
pub const TARGET_HOST_VAR: &str = "DEVROUTE_TARGET_HOST";
pub const TARGET_PORT_VAR: &str = "DEVROUTE_TARGET_PORT";
pub const TARGET_SCHEME_VAR: &str = "DEVROUTE_TARGET_SCHEME";

const REQUIRED_VARS: [&str; 4] = [
	MATCH_HOST_VAR,
	MATCH_PATH_PREFIX_VAR,
	TARGET_HOST_VAR,
	TARGET_PORT_VAR,
];

/// Build a single-rule config from `DEVROUTE_*` variables.
///
/// Returns `Ok(None)` when none of the required variables is set, and
/// `MissingEnvVar` when only some of them are. `DEVROUTE_TARGET_SCHEME`
/// defaults to `http`.
pub fn config_from_lookup<F>(lookup: F) -> Result<Option<Config>>
where
	F: Fn(&str) -> Option<String>,
{
	let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

	if REQUIRED_VARS.iter().all(|&name| get(name).is_none()) {
		return Ok(None);
	}

	let require = |name: &'static str| get(name).ok_or(ConfigError::MissingEnvVar { name });
	let match_host = require(MATCH_HOST_VAR)?;
	let match_path_prefix = require(MATCH_PATH_PREFIX_VAR)?;
	let target_host = require(TARGET_HOST_VAR)?;
	let port = require(TARGET_PORT_VAR)?;

	let target_port = port
		.trim()
		.parse::<i64>()
		.map_err(|_| ConfigError::InvalidEnvVar {
			name: TARGET_PORT_VAR,
			value: port.clone(),
		})?;

	let target_scheme = get(TARGET_SCHEME_VAR).unwrap_or_else(|| "http".to_string());

	Ok(Some(Config {
		rules: vec![RuleConfig {
			match_host,
			match_path_prefix,
			target_host,
			target_port,
			target_scheme,
		}],
	}))
}
