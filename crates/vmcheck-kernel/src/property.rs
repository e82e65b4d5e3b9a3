//! Property bags and their classification.
//!
//! A property bag is the ordered `extraConfig` list attached to the VM that
//! backs a node. Values are opaque scalars; they are compared through their
//! text rendering so that `"TRUE"`, `"true"` and a JSON `true` all read the
//! same way.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One `(key, value)` entry of a property bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValue {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl OptionValue {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Text rendering used for comparison.
    ///
    /// Strings render without quotes; other scalars render as JSON text.
    pub fn rendered(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Ordered key/value configuration of one entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(pub Vec<OptionValue>);

impl PropertyBag {
    /// First entry whose key matches `key` exactly.
    pub fn lookup(&self, key: &str) -> Option<&OptionValue> {
        self.0.iter().find(|entry| entry.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<OptionValue> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = OptionValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Discrete outcome of interpreting one entity's property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Enabled,
    Disabled,
}

impl Classification {
    /// Metric label value for this classification.
    pub fn label(self) -> &'static str {
        match self {
            Self::Enabled => "ENABLED",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify the property `key` of `bag`.
///
/// A missing key classifies as [`Classification::Disabled`], the same as an
/// explicit falsy value. Callers that need to distinguish the two branches
/// for diagnostics can use [`PropertyBag::lookup`] first.
pub fn classify(bag: &PropertyBag, key: &str) -> Classification {
    match bag.lookup(key) {
        Some(entry) => classify_value(entry),
        None => Classification::Disabled,
    }
}

/// Classify a matched entry by its rendered value.
pub fn classify_value(entry: &OptionValue) -> Classification {
    if entry.rendered().eq_ignore_ascii_case("true") {
        Classification::Enabled
    } else {
        Classification::Disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: &str = "ctkEnabled";

    fn bag(entries: &[(&str, Value)]) -> PropertyBag {
        entries
            .iter()
            .map(|(k, v)| OptionValue::new(*k, v.clone()))
            .collect()
    }

    #[test]
    fn missing_key_is_disabled() {
        assert_eq!(classify(&PropertyBag::default(), KEY), Classification::Disabled);
        let other = bag(&[("scsi0:0.ctkEnabled", json!("TRUE"))]);
        assert_eq!(classify(&other, KEY), Classification::Disabled);
    }

    #[test]
    fn true_matches_in_any_case() {
        for spelling in ["true", "TRUE", "True", "tRuE"] {
            let b = bag(&[(KEY, json!(spelling))]);
            assert_eq!(classify(&b, KEY), Classification::Enabled, "{spelling}");
        }
        assert_eq!(
            classify(&bag(&[(KEY, json!(true))]), KEY),
            Classification::Enabled
        );
    }

    #[test]
    fn other_values_are_disabled() {
        for value in [json!("false"), json!("yes"), json!(1), json!(null), json!(" true")] {
            let b = bag(&[(KEY, value.clone())]);
            assert_eq!(classify(&b, KEY), Classification::Disabled, "{value}");
        }
    }

    #[test]
    fn key_match_is_case_sensitive() {
        let b = bag(&[("CTKENABLED", json!("true"))]);
        assert_eq!(classify(&b, KEY), Classification::Disabled);
    }

    #[test]
    fn first_matching_entry_wins() {
        let b = bag(&[(KEY, json!("false")), (KEY, json!("true"))]);
        assert_eq!(classify(&b, KEY), Classification::Disabled);
    }

    #[test]
    fn lookup_returns_the_first_matching_entry() {
        let b = bag(&[("other", json!("x")), (KEY, json!("TRUE")), (KEY, json!("false"))]);
        let entry: &OptionValue = b.lookup(KEY).unwrap();
        assert_eq!(entry.key, KEY);
        assert_eq!(entry.rendered(), "TRUE");
        assert!(b.lookup("missing").is_none());
    }
}
