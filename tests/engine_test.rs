use devroute::config::{Config, parse_config_str};
use devroute::engine::{Engine, ProxyHost, RequestHook, ResponseHook};
use devroute::rules::{RequestView, ResponseView};
use devroute::{ConfigError, EngineStats};
use std::path::Path;
use std::sync::Arc;

/// Stands in for the intercepting proxy: records registrations and lets
/// the test drive the hooks.
#[derive(Default)]
struct FakeHost {
	request_hooks: Vec<RequestHook>,
	response_hooks: Vec<ResponseHook>,
}

impl ProxyHost for FakeHost {
	fn register_request_hook(&mut self, hook: RequestHook) {
		self.request_hooks.push(hook);
	}

	fn register_response_hook(&mut self, hook: ResponseHook) {
		self.response_hooks.push(hook);
	}
}

fn load(content: &str) -> Config {
	parse_config_str(content, Path::new("test.toml")).unwrap()
}

const STAGING: &str = r#"
[[rules]]
match_host = "staging.api.example.com"
match_path_prefix = "/stg/v1/ubah-izin/"
target_host = "127.0.0.1"
target_port = 5000
target_scheme = "http"
"#;

#[test]
fn test_attach_registers_one_hook_of_each_kind() {
	let engine = Arc::new(Engine::load(&load(STAGING)).unwrap());
	let mut host = FakeHost::default();

	engine.attach(&mut host);

	assert_eq!(host.request_hooks.len(), 1);
	assert_eq!(host.response_hooks.len(), 1);
}

#[test]
fn test_end_to_end_rewrite_through_host() {
	let engine = Arc::new(Engine::load(&load(STAGING)).unwrap());
	let mut host = FakeHost::default();
	engine.attach(&mut host);

	let mut view =
		RequestView::from_url("GET", "http://staging.api.example.com/stg/v1/ubah-izin/apply")
			.unwrap();
	(host.request_hooks[0])(&mut view);

	assert_eq!(view.method, http::Method::GET);
	assert_eq!(view.url(), "http://127.0.0.1:5000/apply");
	assert_eq!(view.headers["Host"], "staging.api.example.com");

	let mut response = ResponseView::default();
	let before = response.clone();
	(host.response_hooks[0])(&mut response);
	assert_eq!(response, before);

	assert_eq!(engine.stats().rewritten, 1);
}

#[test]
fn test_first_match_wins_through_host() {
	let config = load(
		r#"
[[rules]]
match_host = "a"
match_path_prefix = "/x/"
target_host = "127.0.0.1"
target_port = 5000
target_scheme = "http"

[[rules]]
match_host = "a"
match_path_prefix = "/x/y/"
target_host = "127.0.0.1"
target_port = 5001
target_scheme = "http"
"#,
	);
	let engine = Arc::new(Engine::load(&config).unwrap());
	let mut host = FakeHost::default();
	engine.attach(&mut host);

	let mut view = RequestView::from_url("GET", "http://a/x/y/z").unwrap();
	(host.request_hooks[0])(&mut view);

	assert_eq!(view.port, 5000);
	assert_eq!(view.path, "/y/z");
}

#[test]
fn test_https_target() {
	let config = load(
		r#"
[[rules]]
match_host = "staging.api.example.com"
match_path_prefix = "/"
target_host = "localhost"
target_port = 443
target_scheme = "https"
"#,
	);
	let engine = Engine::load(&config).unwrap();

	let mut view = RequestView::from_url("PUT", "http://staging.api.example.com/foo/bar").unwrap();
	engine.on_request(&mut view);

	assert_eq!(view.url(), "https://localhost/foo/bar");
	assert_eq!(view.headers["host"], "staging.api.example.com");
}

#[test]
fn test_duplicate_rules_leave_no_engine() {
	let config = load(&format!("{STAGING}{STAGING}"));

	match Engine::load(&config) {
		Err(ConfigError::DuplicateRule { index, first, .. }) => {
			assert_eq!(index, 1);
			assert_eq!(first, 0);
		}
		Err(other) => panic!("Expected DuplicateRule, got {other:?}"),
		Ok(_) => panic!("Expected load to fail"),
	}
}

#[test]
fn test_shared_engine_across_threads() {
	let engine = Arc::new(Engine::load(&load(STAGING)).unwrap());
	let mut host = FakeHost::default();
	engine.attach(&mut host);
	let hook = &host.request_hooks[0];

	std::thread::scope(|scope| {
		for worker in 0..4 {
			scope.spawn(move || {
				for i in 0..25 {
					let mut view = RequestView::from_url(
						"GET",
						&format!("http://staging.api.example.com/stg/v1/ubah-izin/{worker}-{i}"),
					)
					.unwrap();
					hook(&mut view);
					assert_eq!(view.path, format!("/{worker}-{i}"));
				}
			});
		}
	});

	assert_eq!(
		engine.stats(),
		EngineStats {
			requests: 100,
			rewritten: 100,
			ignored: 0,
			hook_errors: 0,
			dropped_log_records: 0,
		}
	);
}
