//! The rewriting engine exposed to a host proxy.
//!
//! This module handles:
//! - Building the rule set once from configuration
//! - Registering request/response hooks with the host
//! - Emitting one traffic record per request
//! - Failing open when a rewrite goes wrong

pub mod host;
pub mod log;

pub use host::{HookRegistry, ProxyHost, RequestHook, ResponseHook};
pub use log::{LogRecord, LogSink, TRAFFIC_TARGET, TracingSink};

use crate::config::types::Config;
use crate::error::{HookError, Result};
use crate::rules::matcher::RuleSet;
use crate::rules::rewriter::{RequestView, ResponseView, RewriteDecision, apply};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// What happened to a request passed to [`Engine::on_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
	/// A rule matched and the request was redirected.
	Rewritten,

	/// No rule matched.
	Ignored,

	/// A rule matched but rewriting failed; the request was restored and
	/// passed through unchanged.
	FailedOpen,
}

/// Point-in-time copy of the engine's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
	pub requests: u64,
	pub rewritten: u64,
	pub ignored: u64,
	pub hook_errors: u64,
	pub dropped_log_records: u64,
}

#[derive(Debug, Default)]
struct Counters {
	requests: AtomicU64,
	rewritten: AtomicU64,
	ignored: AtomicU64,
	hook_errors: AtomicU64,
	dropped_log_records: AtomicU64,
}

/// Rewrites intercepted requests according to a fixed rule set.
///
/// The rule set is read-only after construction, so one engine can be
/// shared across threads and called concurrently.
pub struct Engine {
	rules: RuleSet,
	sink: Arc<dyn LogSink>,
	counters: Counters,
}

impl Engine {
	/// Build an engine from configuration, logging traffic to `sink`.
	///
	/// Any invalid or ambiguous rule fails construction.
	pub fn new(config: &Config, sink: Arc<dyn LogSink>) -> Result<Self> {
		let rules = RuleSet::from_config(config)?;

		for rule in rules.iter() {
			info!(%rule, "loaded rewrite rule");
		}
		info!(rules = rules.len(), "rewrite engine ready");

		Ok(Engine {
			rules,
			sink,
			counters: Counters::default(),
		})
	}

	/// Build an engine that logs traffic through `tracing`.
	pub fn load(config: &Config) -> Result<Self> {
		Self::new(config, Arc::new(TracingSink))
	}

	/// Register this engine's hooks with a host proxy.
	pub fn attach(self: &Arc<Self>, host: &mut dyn ProxyHost) {
		let engine = Arc::clone(self);
		host.register_request_hook(Box::new(move |view: &mut RequestView| {
			engine.on_request(view);
		}));

		let engine = Arc::clone(self);
		host.register_response_hook(Box::new(move |view: &mut ResponseView| {
			engine.on_response(view)
		}));
	}

	pub fn rules(&self) -> &RuleSet {
		&self.rules
	}

	pub fn stats(&self) -> EngineStats {
		EngineStats {
			requests: self.counters.requests.load(Ordering::Relaxed),
			rewritten: self.counters.rewritten.load(Ordering::Relaxed),
			ignored: self.counters.ignored.load(Ordering::Relaxed),
			hook_errors: self.counters.hook_errors.load(Ordering::Relaxed),
			dropped_log_records: self.counters.dropped_log_records.load(Ordering::Relaxed),
		}
	}

	/// Request hook: rewrite `view` if a rule matches it.
	///
	/// Emits exactly one traffic record. If the rewrite fails or panics the
	/// view is restored and the request goes to its original destination.
	pub fn on_request(&self, view: &mut RequestView) -> RequestOutcome {
		self.fail_open(view, |view| apply(view, &self.rules))
	}

	/// Response hook. Nothing to do until response rules exist.
	#[inline]
	pub fn on_response(&self, _view: &mut ResponseView) {}

	fn fail_open<'r, F>(&'r self, view: &mut RequestView, rewrite: F) -> RequestOutcome
	where
		F: FnOnce(&mut RequestView) -> std::result::Result<RewriteDecision<'r>, HookError>,
	{
		self.counters.requests.fetch_add(1, Ordering::Relaxed);

		let snapshot = view.clone();
		let result = panic::catch_unwind(AssertUnwindSafe(|| rewrite(view))).unwrap_or_else(
			|payload| {
				Err(HookError::Panicked {
					message: panic_message(payload.as_ref()),
				})
			},
		);

		match result {
			Ok(RewriteDecision::Rewritten {
				original, rewritten, ..
			}) => {
				self.counters.rewritten.fetch_add(1, Ordering::Relaxed);
				self.emit(&LogRecord::Rewrite {
					method: view.method.as_str(),
					from_url: &original,
					to_url: &rewritten,
				});
				RequestOutcome::Rewritten
			}
			Ok(RewriteDecision::Ignored) => {
				self.counters.ignored.fetch_add(1, Ordering::Relaxed);
				self.emit(&LogRecord::ignore(view));
				RequestOutcome::Ignored
			}
			Err(error) => {
				*view = snapshot;
				self.counters.hook_errors.fetch_add(1, Ordering::Relaxed);
				warn!(
					%error,
					host = %view.host,
					path = %view.path,
					"rewrite failed, passing request through unchanged"
				);
				self.emit(&LogRecord::ignore(view));
				RequestOutcome::FailedOpen
			}
		}
	}

	/// Sink errors and panics are both counted as dropped records.
	fn emit(&self, record: &LogRecord<'_>) {
		let delivered = matches!(
			panic::catch_unwind(AssertUnwindSafe(|| self.sink.emit(record))),
			Ok(Ok(()))
		);
		if !delivered {
			self.counters
				.dropped_log_records
				.fetch_add(1, Ordering::Relaxed);
		}
	}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		message.to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}
