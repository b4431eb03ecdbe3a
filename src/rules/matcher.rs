use crate::config::types::Config;
use crate::error::{ConfigError, Result};
use crate::rules::rule::Rule;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// An ordered, read-only collection of rules with first-match-wins lookup.
///
/// Rules are indexed by lowercased `match_host`; each bucket holds rule
/// positions in insertion order, so a lookup only scans the rules for the
/// request's host.
#[derive(Debug, Default)]
pub struct RuleSet {
	rules: Vec<Rule>,
	by_host: HashMap<String, Vec<usize>>,
}

impl RuleSet {
	/// Validate and compile every rule in a config.
	///
	/// Fails on the first invalid rule or on a repeated
	/// `(match_host, match_path_prefix)` pair. No `RuleSet` is produced on
	/// failure.
	pub fn from_config(config: &Config) -> Result<Self> {
		let rules = config
			.rules
			.iter()
			.enumerate()
			.map(|(index, rule)| Rule::from_config(index, rule))
			.collect::<Result<Vec<_>>>()?;

		Self::from_rules(rules)
	}

	/// Build a set from already validated rules, rejecting duplicates.
	pub fn from_rules(rules: Vec<Rule>) -> Result<Self> {
		let mut by_host: HashMap<String, Vec<usize>> = HashMap::new();
		let mut seen: HashMap<(String, String), usize> = HashMap::new();

		for (index, rule) in rules.iter().enumerate() {
			let host = rule.match_host().to_ascii_lowercase();

			match seen.entry((host.clone(), rule.match_path_prefix().to_string())) {
				Entry::Occupied(first) => {
					return Err(ConfigError::DuplicateRule {
						index,
						first: *first.get(),
						host: rule.match_host().to_string(),
						prefix: rule.match_path_prefix().to_string(),
					});
				}
				Entry::Vacant(slot) => {
					slot.insert(index);
				}
			}

			by_host.entry(host).or_default().push(index);
		}

		Ok(RuleSet { rules, by_host })
	}

	/// Find the first rule matching `host` and `path`.
	pub fn find(&self, host: &str, path: &str) -> Option<&Rule> {
		let bucket = match self.by_host.get(host) {
			Some(bucket) => bucket,
			None if host.bytes().any(|b| b.is_ascii_uppercase()) => {
				self.by_host.get(&host.to_ascii_lowercase())?
			}
			None => return None,
		};

		bucket
			.iter()
			.map(|&index| &self.rules[index])
			.find(|rule| rule.matches(host, path))
	}

	/// Rules in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Rule> {
		self.rules.iter()
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}
}
