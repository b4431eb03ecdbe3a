use std::path::PathBuf;

/// Errors raised while loading configuration and compiling rules.
///
/// These are fatal at startup: an engine that fails to load must not route
/// traffic. They are never produced while handling a request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Rule {index}: match_path_prefix must be non-empty and start with '/' (got {prefix:?})")]
	InvalidPathPrefix { index: usize, prefix: String },

	#[error("Rule {index}: target_port must be between 1 and 65535 (got {port})")]
	InvalidPort { index: usize, port: i64 },

	#[error("Rule {index}: target_scheme must be \"http\" or \"https\" (got {scheme:?})")]
	InvalidScheme { index: usize, scheme: String },

	#[error("Rule {index}: {field} must not be empty")]
	EmptyHost { index: usize, field: &'static str },

	#[error(
		"Rule {index} duplicates rule {first} (match_host {host:?}, match_path_prefix {prefix:?})"
	)]
	DuplicateRule {
		index: usize,
		first: usize,
		host: String,
		prefix: String,
	},

	#[error("Environment variable {name} is required when configuring from the environment")]
	MissingEnvVar { name: &'static str },

	#[error("Environment variable {name} has an invalid value: {value:?}")]
	InvalidEnvVar { name: &'static str, value: String },

	#[error(
		"No configuration found: pass --config, set DEVROUTE_CONFIG, create .devroute.toml, or set DEVROUTE_* variables"
	)]
	NoConfig,
}

/// Errors raised inside a request or response hook.
///
/// The engine catches these at its boundary and lets the request through
/// to its original destination.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
	#[error("Original host {host:?} is not a valid Host header value")]
	InvalidHostHeader {
		host: String,
		#[source]
		source: http::header::InvalidHeaderValue,
	},

	#[error("Rewrite hook panicked: {message}")]
	Panicked { message: String },
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised when building a request view from a URL.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
	#[error("Invalid URL: {url}")]
	InvalidUrl {
		url: String,
		#[source]
		source: url::ParseError,
	},

	#[error("Unsupported URL scheme {scheme:?} (expected http or https)")]
	UnsupportedScheme { scheme: String },

	#[error("URL has no host: {url}")]
	MissingHost { url: String },

	#[error("Invalid HTTP method: {method:?}")]
	InvalidMethod { method: String },

	#[error("Invalid header {header:?} (expected \"Name: value\")")]
	InvalidHeader { header: String },
}

/// A log sink could not accept a record.
#[derive(Debug, thiserror::Error)]
#[error("Log sink rejected record: {reason}")]
pub struct SinkError {
	pub reason: String,
}
