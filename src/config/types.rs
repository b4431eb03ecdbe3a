use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Top-level configuration, from a `.devroute.toml` file or the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	/// Rewrite rules, in priority order. First matching rule wins.
	#[serde(default)]
	pub rules: Vec<RuleConfig>,
}

/// A rewrite rule as written in configuration, before validation.
///
/// Port and scheme are kept loose here so that out-of-range values are
/// reported by the rule loader with the rule index instead of failing
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
	/// Host to match, compared case-insensitively.
	pub match_host: String,

	/// Path prefix to match, compared case-sensitively. Must start with `/`.
	pub match_path_prefix: String,

	/// Host (name or address) requests are redirected to.
	pub target_host: String,

	/// Port requests are redirected to. No default.
	pub target_port: i64,

	/// `http` or `https`.
	pub target_scheme: String,
}

/// Where a configuration was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
	/// A TOML file on disk.
	File(PathBuf),

	/// `DEVROUTE_*` environment variables.
	Environment,
}

impl fmt::Display for ConfigSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigSource::File(path) => write!(f, "{}", path.display()),
			ConfigSource::Environment => f.write_str("environment"),
		}
	}
}

/// A loaded configuration with its source for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// Where it came from.
	pub source: ConfigSource,
}
