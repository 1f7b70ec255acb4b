//! Identity keys for feature entries.
//!
//! The feature table never holds two live entries for the same
//! `(feature_name, pattern)` pair: a later directive with an identical key
//! replaces the earlier one, and a clear directive removes it. `EntryKey` is
//! that identity.
//!
//! ## What counts as "the same entry"
//!
//! Identity is purely structural:
//!
//! - the feature name,
//! - the scope qualifier (`foo`, `*::foo` and `::foo` are three different
//!   keys even though the first two match the same declarations),
//! - the leaf name or its absence,
//! - the signature or its absence, including default expressions and the
//!   `const` qualifier.
//!
//! Value, body and attributes are *not* part of the key. This is what makes a
//! clear symmetric with the define it undoes rather than with resolution: a
//! clear on `clone()` does not touch an entry on `*::clone()`.

use super::pattern::FeaturePattern;
use super::table::FeatureEntry;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EntryKey {
    pub(crate) feature: String,
    pub(crate) pattern: FeaturePattern,
}

impl EntryKey {
    pub(crate) fn from_entry(entry: &FeatureEntry) -> Self {
        EntryKey { feature: entry.feature_name().to_string(), pattern: entry.pattern().clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FeatureValue;

    fn key(feature: &str, pattern: &str, value: &str) -> EntryKey {
        let pattern = FeaturePattern::parse(pattern).unwrap();
        let entry = FeatureEntry::new(feature, pattern, FeatureValue::from_token(value));
        EntryKey::from_entry(&entry)
    }

    #[test]
    fn value_does_not_change_identity() {
        assert_eq!(key("except", "clone()", "1"), key("except", "clone()", ""));
        assert_eq!(key("except", "clone()", "1"), key("except", "clone()", "0"));
    }

    #[test]
    fn qualifier_and_feature_name_change_identity() {
        assert_ne!(key("except", "clone()", "1"), key("except", "*::clone()", "1"));
        assert_ne!(key("except", "clone()", "1"), key("new", "clone()", "1"));
        assert_ne!(key("except", "clone()", "1"), key("except", "clone", "1"));
    }
}
