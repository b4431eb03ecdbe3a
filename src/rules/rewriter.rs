use crate::error::{HookError, RequestError};
use crate::rules::matcher::RuleSet;
use crate::rules::rule::{Rule, Scheme};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::{Serialize, Serializer};
use std::fmt;

/// The parts of an in-flight request a rewrite can touch.
///
/// Owned by the host proxy; hooks borrow it mutably for one call.
/// `path` includes the query string when the host reports one.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestView {
	pub method: Method,
	pub scheme: Scheme,
	pub host: String,
	pub port: u16,
	pub path: String,
	pub headers: HeaderMap,
}

impl RequestView {
	/// Build a view of an absolute-form request, as a proxy receives it.
	///
	/// A `Host` header is added from the URL authority, the way a client
	/// would send it.
	pub fn from_url(method: &str, url: &str) -> Result<Self, RequestError> {
		let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).map_err(|_| {
			RequestError::InvalidMethod {
				method: method.to_string(),
			}
		})?;

		let parsed = url::Url::parse(url).map_err(|source| RequestError::InvalidUrl {
			url: url.to_string(),
			source,
		})?;

		let scheme = parsed
			.scheme()
			.parse::<Scheme>()
			.map_err(|()| RequestError::UnsupportedScheme {
				scheme: parsed.scheme().to_string(),
			})?;

		let host = match parsed.host() {
			Some(url::Host::Domain(domain)) => domain.to_string(),
			Some(url::Host::Ipv4(addr)) => addr.to_string(),
			Some(url::Host::Ipv6(addr)) => addr.to_string(),
			None => {
				return Err(RequestError::MissingHost {
					url: url.to_string(),
				});
			}
		};

		let port = parsed.port().unwrap_or_else(|| scheme.default_port());

		let mut path = parsed.path().to_string();
		if let Some(query) = parsed.query() {
			path.push('?');
			path.push_str(query);
		}

		let mut headers = HeaderMap::new();
		if let Some(authority) = parsed.host_str() {
			let value = match parsed.port() {
				Some(port) => format!("{authority}:{port}"),
				None => authority.to_string(),
			};
			if let Ok(value) = HeaderValue::from_str(&value) {
				headers.insert(header::HOST, value);
			}
		}

		Ok(RequestView {
			method,
			scheme,
			host,
			port,
			path,
			headers,
		})
	}

	/// Append a `Name: value` header line.
	pub fn append_header_line(&mut self, line: &str) -> Result<(), RequestError> {
		let invalid = || RequestError::InvalidHeader {
			header: line.to_string(),
		};

		let (name, value) = line.split_once(':').ok_or_else(invalid)?;
		let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|_| invalid())?;
		let value = HeaderValue::from_str(value.trim()).map_err(|_| invalid())?;

		self.headers.append(name, value);
		Ok(())
	}

	/// Snapshot of the fields that make up the request URL.
	pub fn destination(&self) -> Destination {
		Destination {
			scheme: self.scheme,
			host: self.host.clone(),
			port: self.port,
			path: self.path.clone(),
		}
	}

	/// The full request URL.
	pub fn url(&self) -> String {
		UrlParts {
			scheme: self.scheme,
			host: &self.host,
			port: self.port,
			path: &self.path,
		}
		.to_string()
	}
}

/// The response counterpart of [`RequestView`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseView {
	pub status: StatusCode,
	pub headers: HeaderMap,
}

impl Default for ResponseView {
	fn default() -> Self {
		ResponseView {
			status: StatusCode::OK,
			headers: HeaderMap::new(),
		}
	}
}

/// Where a request is sent: scheme, host, port and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
	pub scheme: Scheme,
	pub host: String,
	pub port: u16,
	pub path: String,
}

impl fmt::Display for Destination {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let parts = UrlParts {
			scheme: self.scheme,
			host: &self.host,
			port: self.port,
			path: &self.path,
		};
		fmt::Display::fmt(&parts, f)
	}
}

impl Serialize for Destination {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

struct UrlParts<'a> {
	scheme: Scheme,
	host: &'a str,
	port: u16,
	path: &'a str,
}

impl fmt::Display for UrlParts<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}://", self.scheme)?;

		// IPv6 literals need brackets in a URL authority.
		if self.host.contains(':') && !self.host.starts_with('[') {
			write!(f, "[{}]", self.host)?;
		} else {
			f.write_str(self.host)?;
		}

		if self.port != self.scheme.default_port() {
			write!(f, ":{}", self.port)?;
		}

		f.write_str(self.path)
	}
}

/// Outcome of running a request through the rule set.
#[derive(Debug, Clone, PartialEq)]
pub enum RewriteDecision<'r> {
	/// No rule matched; the request was left untouched.
	Ignored,

	/// A rule matched and the request was redirected.
	Rewritten {
		rule: &'r Rule,
		original: Destination,
		rewritten: Destination,
	},
}

impl<'r> RewriteDecision<'r> {
	pub fn is_matched(&self) -> bool {
		matches!(self, RewriteDecision::Rewritten { .. })
	}

	pub fn rule(&self) -> Option<&'r Rule> {
		match self {
			RewriteDecision::Ignored => None,
			RewriteDecision::Rewritten { rule, .. } => Some(*rule),
		}
	}
}

/// Rewrite `view` with the first matching rule, if any.
///
/// A request no rule matches is not touched.
pub fn apply<'r>(
	view: &mut RequestView,
	rules: &'r RuleSet,
) -> Result<RewriteDecision<'r>, HookError> {
	match rules.find(&view.host, &view.path) {
		Some(rule) => apply_rule(view, rule),
		None => Ok(RewriteDecision::Ignored),
	}
}

/// Redirect `view` to the rule's target. `rule` must match `view`.
///
/// The prefix is trimmed from the path and the original host is kept in the
/// `Host` header, replacing any existing `Host` values. On error the view is
/// left untouched.
pub fn apply_rule<'r>(
	view: &mut RequestView,
	rule: &'r Rule,
) -> Result<RewriteDecision<'r>, HookError> {
	let host_value = if view.host.contains(':') && !view.host.starts_with('[') {
		format!("[{}]", view.host)
	} else {
		view.host.clone()
	};
	let host_header =
		HeaderValue::from_str(&host_value).map_err(|source| HookError::InvalidHostHeader {
			host: view.host.clone(),
			source,
		})?;

	let original = view.destination();

	view.path = rule.trim_path(&original.path).to_string();
	view.host = rule.target_host().to_string();
	view.port = rule.target_port();
	view.scheme = rule.target_scheme();
	view.headers.insert(header::HOST, host_header);

	Ok(RewriteDecision::Rewritten {
		rule,
		original,
		rewritten: view.destination(),
	})
}
