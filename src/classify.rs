//! Scope classification of topic identifiers
//!
//! The table is owned by the calculation-modules side and handed in through
//! configuration. A topic matches a rule when its id is the rule prefix
//! followed by a non-empty run of ASCII digits, so `B1` matches `B` while
//! `BM1` only matches `BM`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeBucket {
    Scope1,
    Scope2Location,
    /// Signed deltas turning location-based scope 2 into market-based.
    Scope2MarketAdjustment,
    Scope3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRule {
    pub prefix: String,
    pub bucket: ScopeBucket,
}

impl ScopeRule {
    pub fn new(prefix: impl Into<String>, bucket: ScopeBucket) -> Self {
        Self {
            prefix: prefix.into(),
            bucket,
        }
    }

    pub fn matches(&self, topic_id: &str) -> bool {
        topic_id
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Ordered rule table; first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeClassification {
    pub rules: Vec<ScopeRule>,
}

impl Default for ScopeClassification {
    fn default() -> Self {
        Self {
            rules: vec![
                ScopeRule::new("A", ScopeBucket::Scope1),
                ScopeRule::new("B", ScopeBucket::Scope2Location),
                ScopeRule::new("BM", ScopeBucket::Scope2MarketAdjustment),
                ScopeRule::new("C", ScopeBucket::Scope3),
            ],
        }
    }
}

impl ScopeClassification {
    pub fn new(rules: Vec<ScopeRule>) -> Self {
        Self { rules }
    }

    /// Bucket for a topic, or `None` for topics outside every scope.
    pub fn classify(&self, topic_id: &str) -> Option<ScopeBucket> {
        self.rules
            .iter()
            .find(|rule| rule.matches(topic_id))
            .map(|rule| rule.bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// T-CLS-1: default table follows the prefix + digits convention
    #[test]
    fn t_cls_1_default_table() {
        let table = ScopeClassification::default();
        assert_eq!(table.classify("A1"), Some(ScopeBucket::Scope1));
        assert_eq!(table.classify("A12"), Some(ScopeBucket::Scope1));
        assert_eq!(table.classify("B1"), Some(ScopeBucket::Scope2Location));
        assert_eq!(table.classify("BM2"), Some(ScopeBucket::Scope2MarketAdjustment));
        assert_eq!(table.classify("C7"), Some(ScopeBucket::Scope3));
    }

    /// T-CLS-2: ids without a numeric suffix stay unclassified
    #[test]
    fn t_cls_2_non_matching_ids() {
        let table = ScopeClassification::default();
        assert_eq!(table.classify("A"), None);
        assert_eq!(table.classify("A1b"), None);
        assert_eq!(table.classify("D1"), None);
        assert_eq!(table.classify("a1"), None);
        assert_eq!(table.classify(""), None);
    }

    /// T-CLS-3: custom tables replace the default entirely
    #[test]
    fn t_cls_3_custom_table() {
        let table = ScopeClassification::new(vec![ScopeRule::new("S1-", ScopeBucket::Scope1)]);
        assert_eq!(table.classify("S1-04"), Some(ScopeBucket::Scope1));
        assert_eq!(table.classify("A1"), None);
    }
}
