//! Configuration loading for devroute.
//!
//! This module handles:
//! - TOML config file parsing
//! - Single-rule configuration from `DEVROUTE_*` environment variables
//! - Config file discovery
//! - The `--init` template

pub mod discovery;
pub mod env;
pub mod parser;
pub mod template;
pub mod types;

pub use discovery::{CONFIG_FILE_NAME, discover_config, discover_config_with, user_config_path};
pub use env::config_from_lookup;
pub use parser::{parse_config_file, parse_config_str};
pub use template::init_template;
pub use types::{Config, ConfigSource, LoadedConfig, RuleConfig};
