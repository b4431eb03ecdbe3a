use crate::config::env::config_from_lookup;
use crate::config::parser::parse_config_file;
use crate::config::types::{ConfigSource, LoadedConfig};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".devroute.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_VAR: &str = "DEVROUTE_CONFIG";

/// Locate and load the configuration using the process environment.
///
/// See [`discover_config_with`] for the lookup order.
pub fn discover_config(explicit: Option<&Path>, start_dir: &Path) -> Result<LoadedConfig> {
	discover_config_with(explicit, start_dir, dirs::home_dir().as_deref(), |name| {
		std::env::var(name).ok()
	})
}

/// Locate and load the configuration.
///
/// The lookup order is:
/// 1. `explicit` path (from `--config`)
/// 2. The file named by `DEVROUTE_CONFIG`
/// 3. The nearest `.devroute.toml`, walking up from `start_dir`
/// 4. `~/.devroute.toml`
/// 5. A single rule built from `DEVROUTE_*` variables
///
/// The first source found is used on its own; sources are never merged.
pub fn discover_config_with<F>(
	explicit: Option<&Path>,
	start_dir: &Path,
	home_dir: Option<&Path>,
	lookup: F,
) -> Result<LoadedConfig>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(path) = explicit {
		return load_file(path);
	}

	if let Some(path) = lookup(CONFIG_PATH_VAR).filter(|value| !value.is_empty()) {
		return load_file(Path::new(&path));
	}

	if let Some(path) = find_upwards(start_dir) {
		return load_file(&path);
	}

	if let Some(home) = home_dir {
		let path = home.join(CONFIG_FILE_NAME);
		if path.is_file() {
			return load_file(&path);
		}
	}

	match config_from_lookup(lookup)? {
		Some(config) => Ok(LoadedConfig {
			config,
			source: ConfigSource::Environment,
		}),
		None => Err(ConfigError::NoConfig),
	}
}

/// Walk up from `start_dir` looking for `.devroute.toml`.
fn find_upwards(start_dir: &Path) -> Option<PathBuf> {
	start_dir
		.ancestors()
		.map(|dir| dir.join(CONFIG_FILE_NAME))
		.find(|path| path.is_file())
}

fn load_file(path: &Path) -> Result<LoadedConfig> {
	let config = parse_config_file(path)?;
	Ok(LoadedConfig {
		config,
		source: ConfigSource::File(path.to_path_buf()),
	})
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Option<PathBuf> {
	dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}
