//! Rule matching and request rewriting for devroute.
//!
//! This module handles:
//! - Validating configured rules
//! - Host/path-prefix lookup with first-match-wins semantics
//! - Redirecting matched requests while keeping the original `Host` header

pub mod matcher;
pub mod rewriter;
pub mod rule;

pub use matcher::RuleSet;
pub use rewriter::{
	Destination, RequestView, ResponseView, RewriteDecision, apply, apply_rule,
};
pub use rule::{Rule, Scheme};
