//! Token usage counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named token counters (for example `prompt`, `completion`, `total`).
///
/// Defaults to the three standard counters, all zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenUsage(BTreeMap<String, u64>);

impl TokenUsage {
    /// Counter holding prompt tokens.
    pub const PROMPT: &'static str = "prompt";
    /// Counter holding completion tokens.
    pub const COMPLETION: &'static str = "completion";
    /// Counter holding the overall token count.
    pub const TOTAL: &'static str = "total";

    /// Creates usage from prompt and completion counts, deriving the total.
    #[must_use]
    pub fn new(prompt: u64, completion: u64) -> Self {
        let mut counters = BTreeMap::new();
        counters.insert(Self::PROMPT.to_owned(), prompt);
        counters.insert(Self::COMPLETION.to_owned(), completion);
        counters.insert(Self::TOTAL.to_owned(), prompt.saturating_add(completion));
        Self(counters)
    }

    /// Creates usage with no counters at all.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets a named counter, replacing any previous value.
    #[must_use]
    pub fn with_counter(mut self, name: impl Into<String>, value: u64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Returns the value of a named counter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// Returns the overall token count.
    ///
    /// Reads the `total` counter; when absent, sums every other counter.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.get(Self::TOTAL)
            .unwrap_or_else(|| self.0.values().fold(0, |acc, v| acc.saturating_add(*v)))
    }

    /// Iterates over counters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl Default for TokenUsage {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for TokenUsage {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
