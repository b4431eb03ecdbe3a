use crate::config::types::RuleConfig;
use crate::error::{ConfigError, Result};
use std::fmt;
use std::str::FromStr;

/// URL scheme a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
	Http,
	Https,
}

impl Scheme {
	pub fn as_str(&self) -> &'static str {
		match self {
			Scheme::Http => "http",
			Scheme::Https => "https",
		}
	}

	/// Port implied when a URL omits one.
	pub fn default_port(&self) -> u16 {
		match self {
			Scheme::Http => 80,
			Scheme::Https => 443,
		}
	}
}

impl fmt::Display for Scheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Scheme {
	type Err = ();

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("http") {
			Ok(Scheme::Http)
		} else if s.eq_ignore_ascii_case("https") {
			Ok(Scheme::Https)
		} else {
			Err(())
		}
	}
}

/// A validated rewrite rule. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
	match_host: String,
	match_path_prefix: String,
	target_host: String,
	target_port: u16,
	target_scheme: Scheme,
}

impl Rule {
	/// Validate a configured rule. `index` is its position in the config,
	/// used in error messages.
	pub fn from_config(index: usize, config: &RuleConfig) -> Result<Self> {
		if config.match_host.is_empty() {
			return Err(ConfigError::EmptyHost {
				index,
				field: "match_host",
			});
		}

		if config.target_host.is_empty() {
			return Err(ConfigError::EmptyHost {
				index,
				field: "target_host",
			});
		}

		if !config.match_path_prefix.starts_with('/') {
			return Err(ConfigError::InvalidPathPrefix {
				index,
				prefix: config.match_path_prefix.clone(),
			});
		}

		let target_port = u16::try_from(config.target_port)
			.ok()
			.filter(|port| *port != 0)
			.ok_or(ConfigError::InvalidPort {
				index,
				port: config.target_port,
			})?;

		let target_scheme =
			config
				.target_scheme
				.parse::<Scheme>()
				.map_err(|()| ConfigError::InvalidScheme {
					index,
					scheme: config.target_scheme.clone(),
				})?;

		Ok(Rule {
			match_host: config.match_host.clone(),
			match_path_prefix: config.match_path_prefix.clone(),
			target_host: config.target_host.clone(),
			target_port,
			target_scheme,
		})
	}

	pub fn match_host(&self) -> &str {
		&self.match_host
	}

	pub fn match_path_prefix(&self) -> &str {
		&self.match_path_prefix
	}

	pub fn target_host(&self) -> &str {
		&self.target_host
	}

	pub fn target_port(&self) -> u16 {
		self.target_port
	}

	pub fn target_scheme(&self) -> Scheme {
		self.target_scheme
	}

	/// Whether a request for `host` and `path` falls under this rule.
	///
	/// Host is compared case-insensitively, path case-sensitively.
	pub fn matches(&self, host: &str, path: &str) -> bool {
		self.match_host.eq_ignore_ascii_case(host) && path.starts_with(&self.match_path_prefix)
	}

	/// Strip the prefix from a matching path, keeping its last character.
	///
	/// For prefixes ending in `/` this leaves exactly one leading `/`. With a
	/// prefix of `"/"` nothing is removed. `path` must start with the prefix.
	pub fn trim_path<'p>(&self, path: &'p str) -> &'p str {
		let keep_from = self
			.match_path_prefix
			.char_indices()
			.next_back()
			.map_or(0, |(index, _)| index);
		path.get(keep_from..).unwrap_or(path)
	}
}

impl fmt::Display for Rule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}{} -> {}://{}:{}",
			self.match_host,
			self.match_path_prefix,
			self.target_scheme,
			self.target_host,
			self.target_port
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rule_config(prefix: &str, port: i64, scheme: &str) -> RuleConfig {
		RuleConfig {
			match_host: "staging.api.example.com".to_string(),
			match_path_prefix: prefix.to_string(),
			target_host: "127.0.0.1".to_string(),
			target_port: port,
			target_scheme: scheme.to_string(),
		}
	}

	#[test]
	fn test_valid_rule() {
		let rule = Rule::from_config(0, &rule_config("/stg/", 5000, "http")).unwrap();
		assert_eq!(rule.match_host(), "staging.api.example.com");
		assert_eq!(rule.match_path_prefix(), "/stg/");
		assert_eq!(rule.target_host(), "127.0.0.1");
		assert_eq!(rule.target_port(), 5000);
		assert_eq!(rule.target_scheme(), Scheme::Http);
	}

	#[test]
	fn test_scheme_is_case_insensitive() {
		let rule = Rule::from_config(0, &rule_config("/", 443, "HTTPS")).unwrap();
		assert_eq!(rule.target_scheme(), Scheme::Https);
	}

	#[test]
	fn test_prefix_must_start_with_slash() {
		match Rule::from_config(3, &rule_config("stg/", 5000, "http")).unwrap_err() {
			ConfigError::InvalidPathPrefix { index, prefix } => {
				assert_eq!(index, 3);
				assert_eq!(prefix, "stg/");
			}
			other => panic!("Expected InvalidPathPrefix, got {other:?}"),
		}
	}

	#[test]
	fn test_empty_prefix_is_rejected() {
		let result = Rule::from_config(0, &rule_config("", 5000, "http"));
		assert!(matches!(result, Err(ConfigError::InvalidPathPrefix { .. })));
	}

	#[test]
	fn test_port_bounds() {
		for port in [0, -1, 65536, 100_000] {
			match Rule::from_config(0, &rule_config("/", port, "http")).unwrap_err() {
				ConfigError::InvalidPort { port: reported, .. } => assert_eq!(reported, port),
				other => panic!("Expected InvalidPort, got {other:?}"),
			}
		}
		assert!(Rule::from_config(0, &rule_config("/", 1, "http")).is_ok());
		assert!(Rule::from_config(0, &rule_config("/", 65535, "http")).is_ok());
	}

	#[test]
	fn test_unknown_scheme() {
		match Rule::from_config(0, &rule_config("/", 21, "ftp")).unwrap_err() {
			ConfigError::InvalidScheme { scheme, .. } => assert_eq!(scheme, "ftp"),
			other => panic!("Expected InvalidScheme, got {other:?}"),
		}
	}

	#[test]
	fn test_empty_hosts() {
		let mut config = rule_config("/", 5000, "http");
		config.match_host.clear();
		assert!(matches!(
			Rule::from_config(0, &config),
			Err(ConfigError::EmptyHost {
				field: "match_host",
				..
			})
		));

		let mut config = rule_config("/", 5000, "http");
		config.target_host.clear();
		assert!(matches!(
			Rule::from_config(0, &config),
			Err(ConfigError::EmptyHost {
				field: "target_host",
				..
			})
		));
	}

	#[test]
	fn test_matches_host_case_insensitively() {
		let rule = Rule::from_config(0, &rule_config("/stg/", 5000, "http")).unwrap();
		assert!(rule.matches("staging.api.example.com", "/stg/apply"));
		assert!(rule.matches("STAGING.api.Example.com", "/stg/apply"));
		assert!(!rule.matches("other.example.com", "/stg/apply"));
	}

	#[test]
	fn test_matches_path_case_sensitively() {
		let rule = Rule::from_config(0, &rule_config("/stg/", 5000, "http")).unwrap();
		assert!(!rule.matches("staging.api.example.com", "/STG/apply"));
		assert!(!rule.matches("staging.api.example.com", "/stg"));
	}

	#[test]
	fn test_trim_path() {
		let rule = Rule::from_config(0, &rule_config("/stg/v1/ubah-izin/", 5000, "http")).unwrap();
		assert_eq!(rule.trim_path("/stg/v1/ubah-izin/apply"), "/apply");
		assert_eq!(rule.trim_path("/stg/v1/ubah-izin/"), "/");
	}

	#[test]
	fn test_trim_path_root_prefix_keeps_everything() {
		let rule = Rule::from_config(0, &rule_config("/", 5000, "http")).unwrap();
		assert_eq!(rule.trim_path("/foo/bar"), "/foo/bar");
	}

	#[test]
	fn test_trim_path_prefix_without_trailing_slash() {
		// Keeps the last character of the prefix, as the slicing dictates.
		let rule = Rule::from_config(0, &rule_config("/api", 5000, "http")).unwrap();
		assert_eq!(rule.trim_path("/api/users"), "i/users");
	}

	#[test]
	fn test_trim_path_multibyte_prefix() {
		let rule = Rule::from_config(0, &rule_config("/café", 5000, "http")).unwrap();
		assert_eq!(rule.trim_path("/café/menu"), "é/menu");
	}

	#[test]
	fn test_display() {
		let rule = Rule::from_config(0, &rule_config("/stg/", 5000, "http")).unwrap();
		assert_eq!(
			rule.to_string(),
			"staging.api.example.com/stg/ -> http://127.0.0.1:5000"
		);
	}
}
