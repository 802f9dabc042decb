//! Golden sanitization cases loaded from JSON fixtures.

use std::sync::Arc;

use serde::Deserialize;

use distill::{
    DistillerConfig, HtmlFilter, SafeFilter, StrictFilter, StripFilter, UnsafeFilter,
    WordBreakFilter, distill,
};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    Strip,
    Strict,
    #[default]
    Safe,
    Unsafe,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct GoldenCase {
    pub name: String,
    pub input: String,
    #[serde(default)]
    pub policy: Policy,
    #[serde(default)]
    pub max_length: usize,
    #[serde(default = "default_true")]
    pub normalize_whitespace: bool,
    #[serde(default)]
    pub encode_non_ascii: bool,
    #[serde(default = "default_true")]
    pub balance_tags: bool,
    /// Word-break decorator threshold; 0 leaves the policy undecorated.
    #[serde(default)]
    pub word_break: usize,
    pub expected: String,
}

impl GoldenCase {
    pub fn config(&self) -> DistillerConfig {
        DistillerConfig {
            max_length: self.max_length,
            normalize_whitespace: self.normalize_whitespace,
            encode_non_ascii: self.encode_non_ascii,
            balance_tags: self.balance_tags,
            ..DistillerConfig::default()
        }
    }

    pub fn filter(&self) -> Arc<dyn HtmlFilter> {
        let base: Arc<dyn HtmlFilter> = match self.policy {
            Policy::Strip => Arc::new(StripFilter),
            Policy::Strict => Arc::new(StrictFilter),
            Policy::Safe => Arc::new(SafeFilter),
            Policy::Unsafe => Arc::new(UnsafeFilter),
        };
        if self.word_break > 0 {
            Arc::new(WordBreakFilter::new(self.word_break, base))
        } else {
            base
        }
    }

    pub fn run(&self) -> String {
        distill(&self.input, &self.config(), self.filter())
    }
}

/// Parse a JSON fixture: a top-level array of cases.
pub fn load_cases(json: &str) -> Vec<GoldenCase> {
    serde_json::from_str(json).expect("golden fixture must be valid JSON")
}
