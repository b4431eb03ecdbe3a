//! The hook-registration seam between the engine and a host proxy.

use crate::rules::rewriter::{RequestView, ResponseView};

/// Callback run for every intercepted request.
pub type RequestHook = Box<dyn Fn(&mut RequestView) + Send + Sync>;

/// Callback run for every intercepted response.
pub type ResponseHook = Box<dyn Fn(&mut ResponseView) + Send + Sync>;

/// What a host proxy offers to a rewriting engine.
///
/// The host owns TLS interception, connection handling and HTTP parsing.
/// It invokes registered hooks concurrently, one call per in-flight
/// request, each with exclusive access to that request's view.
pub trait ProxyHost {
	fn register_request_hook(&mut self, hook: RequestHook);

	fn register_response_hook(&mut self, hook: ResponseHook);
}

/// A minimal in-process host: stores hooks and runs them in registration
/// order. Used for dry runs and tests.
#[derive(Default)]
pub struct HookRegistry {
	request_hooks: Vec<RequestHook>,
	response_hooks: Vec<ResponseHook>,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn run_request_hooks(&self, view: &mut RequestView) {
		for hook in &self.request_hooks {
			hook(view);
		}
	}

	pub fn run_response_hooks(&self, view: &mut ResponseView) {
		for hook in &self.response_hooks {
			hook(view);
		}
	}

	pub fn request_hook_count(&self) -> usize {
		self.request_hooks.len()
	}

	pub fn response_hook_count(&self) -> usize {
		self.response_hooks.len()
	}
}

impl ProxyHost for HookRegistry {
	fn register_request_hook(&mut self, hook: RequestHook) {
		self.request_hooks.push(hook);
	}

	fn register_response_hook(&mut self, hook: ResponseHook) {
		self.response_hooks.push(hook);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::StatusCode;

	#[test]
	fn test_hooks_run_in_registration_order() {
		let mut registry = HookRegistry::new();
		registry.register_request_hook(Box::new(|view: &mut RequestView| {
			view.path.push_str("/a")
		}));
		registry.register_request_hook(Box::new(|view: &mut RequestView| {
			view.path.push_str("/b")
		}));

		let mut view = RequestView::from_url("GET", "http://example.com/root").unwrap();
		registry.run_request_hooks(&mut view);

		assert_eq!(view.path, "/root/a/b");
		assert_eq!(registry.request_hook_count(), 2);
	}

	#[test]
	fn test_response_hooks() {
		let mut registry = HookRegistry::new();
		registry.register_response_hook(Box::new(|view: &mut ResponseView| {
			view.status = StatusCode::ACCEPTED
		}));

		let mut view = ResponseView::default();
		registry.run_response_hooks(&mut view);

		assert_eq!(view.status, StatusCode::ACCEPTED);
		assert_eq!(registry.response_hook_count(), 1);
	}
}
