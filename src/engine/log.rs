//! Per-request traffic records and where they go.

use crate::error::SinkError;
use crate::rules::rewriter::{Destination, RequestView};
use serde::Serialize;
use tracing::info;

/// `tracing` target used for traffic records.
pub const TRAFFIC_TARGET: &str = "devroute::traffic";

/// One record per request. The serialized shape is what downstream log
/// processors consume:
///
/// - `{"event":"rewrite","method":..,"from_url":..,"to_url":..}`
/// - `{"event":"ignore","method":..,"host":..,"path":..}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum LogRecord<'a> {
	Rewrite {
		method: &'a str,
		from_url: &'a Destination,
		to_url: &'a Destination,
	},
	Ignore {
		method: &'a str,
		host: &'a str,
		path: &'a str,
	},
}

impl<'a> LogRecord<'a> {
	pub fn ignore(view: &'a RequestView) -> Self {
		LogRecord::Ignore {
			method: view.method.as_str(),
			host: &view.host,
			path: &view.path,
		}
	}
}

/// Destination for traffic records.
///
/// Implementations must not block. Errors are counted by the engine and
/// otherwise dropped.
pub trait LogSink: Send + Sync {
	fn emit(&self, record: &LogRecord<'_>) -> Result<(), SinkError>;
}

/// Emits records as `tracing` events on [`TRAFFIC_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
	fn emit(&self, record: &LogRecord<'_>) -> Result<(), SinkError> {
		match record {
			LogRecord::Rewrite {
				method,
				from_url,
				to_url,
			} => {
				info!(
					target: TRAFFIC_TARGET,
					event = "rewrite",
					method = %method,
					from_url = %from_url,
					to_url = %to_url,
					"rewrote {method} {from_url} -> {to_url}"
				);
			}
			LogRecord::Ignore { method, host, path } => {
				info!(
					target: TRAFFIC_TARGET,
					event = "ignore",
					method = %method,
					host = %host,
					path = %path,
					"ignored {method} {host}{path}"
				);
			}
		}
		Ok(())
	}
}
