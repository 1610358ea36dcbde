//! Category filter rules and the rule evaluation engine
//!
//! Rules map a dotted category prefix (and optionally a provider name) to a
//! minimum level. Evaluation picks the rule with the longest matching
//! prefix; on equal length a provider-specific rule beats a wildcard one.
//! Rule sets are immutable once built — the dispatcher swaps whole sets
//! atomically on reconfiguration.

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single filter rule.
///
/// The category is matched on whole dot segments: `"A"` governs `"A"` and
/// `"A.B"` but never `"AB"`. An empty category matches every event, and a
/// `None` provider applies to every provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRule {
    pub provider: Option<String>,
    pub category: String,
    pub min_level: LogLevel,
}

impl FilterRule {
    /// Rule applying to every provider.
    pub fn new(category: impl Into<String>, min_level: LogLevel) -> Self {
        Self {
            provider: None,
            category: category.into(),
            min_level,
        }
    }

    /// Rule applying to the named provider only.
    pub fn for_provider(
        provider: impl Into<String>,
        category: impl Into<String>,
        min_level: LogLevel,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            category: category.into(),
            min_level,
        }
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    wildcard: Option<LogLevel>,
    per_provider: HashMap<String, LogLevel>,
}

impl TrieNode {
    fn candidate(&self, provider: &str) -> Option<LogLevel> {
        self.per_provider.get(provider).copied().or(self.wildcard)
    }
}

/// An immutable, compiled set of filter rules.
///
/// Rules are compiled into a trie keyed on dot segments, so evaluating a
/// category walks only its ancestor prefixes rather than scanning every
/// rule. When two rules target the same (provider, category) pair the later
/// one wins.
#[derive(Debug)]
pub struct FilterRuleSet {
    rules: Vec<FilterRule>,
    default_level: LogLevel,
    root: TrieNode,
}

impl FilterRuleSet {
    /// Fallback minimum used when no rule matches and no default was
    /// configured.
    pub const FALLBACK_LEVEL: LogLevel = LogLevel::Info;

    pub fn build(rules: Vec<FilterRule>, default_level: Option<LogLevel>) -> Self {
        let mut root = TrieNode::default();
        for rule in &rules {
            let mut node = &mut root;
            if !rule.category.is_empty() {
                for segment in rule.category.split('.') {
                    node = node.children.entry(segment.to_string()).or_default();
                }
            }
            match &rule.provider {
                Some(provider) => {
                    node.per_provider.insert(provider.clone(), rule.min_level);
                }
                None => node.wildcard = Some(rule.min_level),
            }
        }
        Self {
            rules,
            default_level: default_level.unwrap_or(Self::FALLBACK_LEVEL),
            root,
        }
    }

    /// An empty rule set with the given default minimum level.
    pub fn empty(default_level: LogLevel) -> Self {
        Self::build(Vec::new(), Some(default_level))
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }

    pub fn default_level(&self) -> LogLevel {
        self.default_level
    }

    /// Rebuild this set with a different default minimum level.
    pub fn with_default_level(&self, default_level: LogLevel) -> Self {
        Self::build(self.rules.clone(), Some(default_level))
    }

    /// The minimum level governing `(provider, category)`: the longest
    /// matching rule's level, provider-specific winning length ties, or the
    /// default when nothing matches.
    pub fn min_level_for(&self, provider: &str, category: &str) -> LogLevel {
        let mut node = &self.root;
        let mut selected = node.candidate(provider);

        for segment in category.split('.') {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if let Some(level) = node.candidate(provider) {
                        selected = Some(level);
                    }
                }
                None => break,
            }
        }

        selected.unwrap_or(self.default_level)
    }

    /// Whether an event at `level` in `category` passes for `provider`.
    /// Deterministic and side-effect free.
    pub fn evaluate(&self, provider: &str, category: &str, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.min_level_for(provider, category)
    }
}
