use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use devroute::config::{
	CONFIG_FILE_NAME, LoadedConfig, discover_config, init_template, user_config_path,
};
use devroute::engine::{Engine, HookRegistry};
use devroute::error::ConfigError;
use devroute::rules::{RequestView, RuleSet};

#[derive(Parser)]
#[command(name = "devroute")]
#[command(
	author,
	version,
	about = "Redirect staging API traffic to a local development server"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Config file to use instead of searching for .devroute.toml
	#[arg(long, global = true, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Log output format (logs go to stderr)
	#[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
	log_format: LogFormat,

	/// Create a template .devroute.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .devroute.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Run one request through the rewrite rules and print where it goes
	Check {
		/// HTTP method, e.g. GET
		method: String,

		/// Absolute request URL
		url: String,

		/// Extra request header, as "Name: value" (repeatable)
		#[arg(short = 'H', long = "header", value_name = "HEADER")]
		headers: Vec<String>,
	},

	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective configuration and its source
	Show,
	/// Check the configuration for errors without handling any traffic
	Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
	Text,
	Json,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	// Variables already set in the environment win over .env entries.
	dotenvy::dotenv().ok();

	init_logging(cli.log_format);

	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(command) = cli.command {
		let config_path = cli.config.as_deref();
		return match command {
			Commands::Check {
				method,
				url,
				headers,
			} => handle_check(config_path, &method, &url, &headers),
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(config_path),
				ConfigAction::Validate => handle_config_validate(config_path),
			},
		};
	}

	Ok(ExitCode::SUCCESS)
}

fn init_logging(format: LogFormat) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let builder = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(std::io::stderr().is_terminal());

	match format {
		LogFormat::Text => builder.init(),
		LogFormat::Json => builder.json().init(),
	}
}

fn load_config(config_path: Option<&Path>) -> Result<LoadedConfig> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	discover_config(config_path, &cwd).context("Failed to load configuration")
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_check(
	config_path: Option<&Path>,
	method: &str,
	url: &str,
	headers: &[String],
) -> Result<ExitCode> {
	let loaded = load_config(config_path)?;
	let engine = Arc::new(
		Engine::load(&loaded.config)
			.with_context(|| format!("Invalid configuration in {}", loaded.source))?,
	);

	let mut host = HookRegistry::new();
	engine.attach(&mut host);

	let mut view = RequestView::from_url(method, url).context("Invalid request")?;
	for header in headers {
		view.append_header_line(header)
			.context("Invalid request header")?;
	}

	host.run_request_hooks(&mut view);

	let stats = engine.stats();
	let outcome = if stats.rewritten > 0 {
		"rewritten"
	} else if stats.hook_errors > 0 {
		"passed through (rewrite failed)"
	} else {
		"ignored"
	};

	println!("# {outcome}");
	println!("{} {}", view.method, view.url());
	for (name, value) in &view.headers {
		println!(
			"{}: {}",
			display_header_name(name.as_str()),
			String::from_utf8_lossy(value.as_bytes())
		);
	}

	Ok(ExitCode::SUCCESS)
}

/// `x-request-id` -> `X-Request-Id`
fn display_header_name(name: &str) -> String {
	name.split('-')
		.map(|part| {
			let mut chars = part.chars();
			match chars.next() {
				Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join("-")
}

fn handle_config_show(config_path: Option<&Path>) -> Result<ExitCode> {
	let loaded = load_config(config_path)?;
	let rules = RuleSet::from_config(&loaded.config)
		.with_context(|| format!("Invalid configuration in {}", loaded.source))?;

	println!("# Source: {}", loaded.source);
	println!("# rules: {}", rules.len());
	println!();

	for (i, rule) in rules.iter().enumerate() {
		println!("  Rule {}:", i + 1);
		println!("    match_host: {}", rule.match_host());
		println!("    match_path_prefix: {}", rule.match_path_prefix());
		println!("    target_host: {}", rule.target_host());
		println!("    target_port: {}", rule.target_port());
		println!("    target_scheme: {}", rule.target_scheme());
		println!();
	}

	if let Some(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(config_path: Option<&Path>) -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let result = discover_config(config_path, &cwd).and_then(|loaded| {
		let rules = RuleSet::from_config(&loaded.config)?;
		Ok((loaded, rules.len()))
	});

	match result {
		Ok((loaded, count)) => {
			println!("Configuration is valid:");
			println!("  {} ({} rules)", loaded.source, count);
			Ok(ExitCode::SUCCESS)
		}
		Err(ConfigError::NoConfig) => {
			println!("No configuration found.");
			Ok(ExitCode::FAILURE)
		}
		Err(e) => {
			eprintln!("Configuration error: {:#}", anyhow::Error::from(e));
			Ok(ExitCode::FAILURE)
		}
	}
}
