//! Devroute - redirect staging traffic to a local development server.
//!
//! This library provides a request-rewriting engine meant to be loaded into
//! an intercepting proxy, including:
//! - Configuration parsing (TOML file or `DEVROUTE_*` environment variables)
//! - Rule validation and host/path-prefix matching
//! - Request rewriting that keeps the original `Host` header
//! - Hook registration, traffic logging and fail-open error handling
//!
//! # Example
//!
//! ```no_run
//! use devroute::config::discover_config;
//! use devroute::engine::{Engine, HookRegistry};
//! use devroute::rules::RequestView;
//! use std::sync::Arc;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let loaded = discover_config(None, &cwd).unwrap();
//! let engine = Arc::new(Engine::load(&loaded.config).unwrap());
//!
//! let mut host = HookRegistry::new();
//! engine.attach(&mut host);
//!
//! let mut view =
//!     RequestView::from_url("GET", "http://staging.api.example.com/stg/v1/ubah-izin/apply")
//!         .unwrap();
//! host.run_request_hooks(&mut view);
//! println!("{} {}", view.method, view.url());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod rules;

pub use engine::{Engine, EngineStats, RequestOutcome};
pub use error::{ConfigError, HookError, RequestError, Result};
