//! The feature table.
//!
//! The table is built in two phases that never interleave:
//!
//! 1. **Accumulation** ([`FeatureTableBuilder`]): directives are applied with
//!    [`FeatureTableBuilder::define`] in source order. Order is load-bearing:
//!    it breaks precedence ties and decides which entry a clear removes.
//! 2. **Query** ([`FeatureTable`]): [`FeatureTableBuilder::freeze`] consumes
//!    the builder and produces an immutable, indexed table that can be shared
//!    across threads and queried with [`FeatureTable::best_match`].
//!
//! ```text
//! define(add)   -+
//! define(0)     -+  FeatureTableBuilder           FeatureTable
//! define(clear) -+  slots + live key map   freeze  entries + per-feature index
//! tick() (decl) -+  --------------------------->  best_match(feature, variant)
//! ```
//!
//! ## Invariants
//!
//! - At most one live entry per `(feature_name, pattern)` (see `dedup.rs`).
//! - `sequence_index` values are unique and increase with definition order.
//!   Declarations share the same counter (`tick`), which is how a global
//!   entry knows whether it precedes a declaration.
//! - A clear removes only a structurally identical live entry; otherwise it
//!   is a no-op and an [`Diagnostic::AmbiguousClearTarget`] is recorded.

use super::dedup::EntryKey;
use super::pattern::{FeaturePattern, Specificity};
use super::template::Template;
use crate::decl::{ScopeGraph, Variant};
use crate::diagnostics::Diagnostic;
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

/// Attribute map of a feature entry. Ordered so output is deterministic.
pub type Attributes = BTreeMap<String, String>;

/// Value of a directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeatureValue {
    /// Non-empty value other than `"0"`.
    Enabled(String),
    /// Value `"0"`: an explicit inactive rule that still takes part in
    /// precedence.
    Disabled,
    /// Empty value: removes an identical earlier rule.
    Cleared,
}

impl FeatureValue {
    pub fn from_token(token: &str) -> Self {
        match token {
            "" => FeatureValue::Cleared,
            "0" => FeatureValue::Disabled,
            other => FeatureValue::Enabled(other.to_string()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, FeatureValue::Enabled(_))
    }

    /// The directive value as written.
    pub fn token(&self) -> &str {
        match self {
            FeatureValue::Enabled(token) => token,
            FeatureValue::Disabled => "0",
            FeatureValue::Cleared => "",
        }
    }
}

/// One directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureEntry {
    feature_name: String,
    pattern: FeaturePattern,
    value: FeatureValue,
    body: Option<Template>,
    attributes: Attributes,
    sequence_index: u64,
}

impl FeatureEntry {
    pub fn new(feature_name: impl Into<String>, pattern: FeaturePattern, value: FeatureValue) -> Self {
        FeatureEntry {
            feature_name: feature_name.into(),
            pattern,
            value,
            body: None,
            attributes: Attributes::new(),
            sequence_index: 0,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Template::new(body));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn pattern(&self) -> &FeaturePattern {
        &self.pattern
    }

    pub fn value(&self) -> &FeatureValue {
        &self.value
    }

    pub fn body(&self) -> Option<&Template> {
        self.body.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Position in the directive stream; assigned by [`FeatureTableBuilder::define`].
    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }
}

/// Outcome of [`FeatureTableBuilder::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defined {
    Inserted,
    Replaced,
    Cleared,
    /// A clear with no identical live entry; recorded as a diagnostic.
    ClearIgnored,
}

/// Mutable table used during accumulation.
#[derive(Debug, Default)]
pub struct FeatureTableBuilder {
    slots: Vec<Option<FeatureEntry>>,
    live: HashMap<EntryKey, usize>,
    next_sequence: u64,
    diagnostics: Vec<Diagnostic>,
}

impl FeatureTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next position in the directive stream.
    pub fn tick(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Apply one directive.
    pub fn define(&mut self, mut entry: FeatureEntry) -> Defined {
        entry.sequence_index = self.tick();
        let key = EntryKey::from_entry(&entry);

        if entry.value == FeatureValue::Cleared {
            return match self.live.remove(&key) {
                Some(slot) => {
                    self.slots[slot] = None;
                    tracing::debug!(feature = %key.feature, pattern = %key.pattern, "cleared feature entry");
                    Defined::Cleared
                }
                None => {
                    let diagnostic = Diagnostic::AmbiguousClearTarget {
                        feature: key.feature,
                        pattern: key.pattern.to_string(),
                        sequence: entry.sequence_index,
                    };
                    tracing::warn!(%diagnostic);
                    self.diagnostics.push(diagnostic);
                    Defined::ClearIgnored
                }
            };
        }

        let replaced = match self.live.remove(&key) {
            Some(slot) => {
                self.slots[slot] = None;
                true
            }
            None => false,
        };
        tracing::debug!(
            feature = %key.feature,
            pattern = %key.pattern,
            value = entry.value.token(),
            sequence = entry.sequence_index,
            replaced,
            "defined feature entry"
        );
        self.live.insert(key, self.slots.len());
        self.slots.push(Some(entry));

        if replaced { Defined::Replaced } else { Defined::Inserted }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// End accumulation and build the immutable, indexed table.
    pub fn freeze(self) -> FeatureTable {
        let entries: Vec<FeatureEntry> = self.slots.into_iter().flatten().collect();

        let mut index: HashMap<String, FeatureIndex> = HashMap::new();
        for (id, entry) in entries.iter().enumerate() {
            let bucket = index.entry(entry.feature_name.clone()).or_default();
            match entry.pattern.name() {
                Some(name) => bucket.by_name.entry(name.to_string()).or_default().push(id),
                None => bucket.global.push(id),
            }
        }

        tracing::debug!(entries = entries.len(), features = index.len(), "feature table frozen");
        FeatureTable { entries, index, diagnostics: self.diagnostics }
    }
}

/// Candidate lists for one feature name.
#[derive(Debug, Clone, Default)]
struct FeatureIndex {
    by_name: HashMap<String, Vec<usize>>,
    global: Vec<usize>,
}

/// Ranking key: precedence class, then inheritance proximity, then recency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Rank {
    specificity: Specificity,
    proximity: Reverse<usize>,
    sequence: u64,
}

/// Immutable feature table used during the query phase.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    entries: Vec<FeatureEntry>,
    index: HashMap<String, FeatureIndex>,
    diagnostics: Vec<Diagnostic>,
}

impl FeatureTable {
    /// The single highest-precedence live entry for `feature` that matches
    /// `variant`, or `None`.
    ///
    /// Global entries only apply to declarations registered after them;
    /// variants without a registered position see every global entry.
    pub fn best_match(&self, feature: &str, variant: &Variant, scopes: &ScopeGraph) -> Option<&FeatureEntry> {
        let bucket = self.index.get(feature)?;
        let named = bucket.by_name.get(variant.leaf_name()).map(Vec::as_slice).unwrap_or(&[]);

        let best = named
            .iter()
            .chain(bucket.global.iter())
            .map(|&id| &self.entries[id])
            .filter(|entry| precedes(entry, variant))
            .filter_map(|entry| {
                let depth = entry.pattern.matches(variant, scopes)?;
                let rank = Rank {
                    specificity: entry.pattern.specificity(),
                    proximity: Reverse(depth),
                    sequence: entry.sequence_index,
                };
                Some((rank, entry))
            })
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, entry)| entry);

        if let Some(entry) = best {
            tracing::trace!(
                feature,
                variant = %variant.qualified_name(),
                arity = variant.arity(),
                pattern = %entry.pattern,
                sequence = entry.sequence_index,
                "best match"
            );
        }
        best
    }

    /// Feature names with at least one live entry, sorted.
    pub fn feature_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Live entries in definition order.
    pub fn entries(&self) -> &[FeatureEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn precedes(entry: &FeatureEntry, variant: &Variant) -> bool {
    !entry.pattern.is_global() || variant.position().is_none_or(|position| entry.sequence_index < position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Declaration, ScopePath};

    fn entry(feature: &str, pattern: &str, value: &str) -> FeatureEntry {
        FeatureEntry::new(feature, FeaturePattern::parse(pattern).unwrap(), FeatureValue::from_token(value))
    }

    #[test]
    fn value_tokens_map_to_states() {
        assert_eq!(FeatureValue::from_token(""), FeatureValue::Cleared);
        assert_eq!(FeatureValue::from_token("0"), FeatureValue::Disabled);
        assert_eq!(FeatureValue::from_token("1"), FeatureValue::Enabled("1".to_string()));
        assert_eq!(FeatureValue::from_token("00"), FeatureValue::Enabled("00".to_string()));
        assert!(!FeatureValue::Disabled.is_active());
    }

    #[test]
    fn define_replaces_identical_pattern() {
        let mut builder = FeatureTableBuilder::new();
        assert_eq!(builder.define(entry("except", "foo", "1").with_body("first")), Defined::Inserted);
        assert_eq!(builder.define(entry("except", "foo", "1").with_body("second")), Defined::Replaced);
        assert_eq!(builder.len(), 1);

        let table = builder.freeze();
        let v = Variant::of(Declaration::function("foo"));
        let hit = table.best_match("except", &v, &ScopeGraph::new()).unwrap();
        assert_eq!(hit.body().unwrap().text(), "second");
        assert_eq!(hit.sequence_index(), 1);
    }

    #[test]
    fn clear_without_identical_entry_is_reported() {
        let mut builder = FeatureTableBuilder::new();
        builder.define(entry("except", "*::clone()", "1"));
        assert_eq!(builder.define(entry("except", "clone()", "")), Defined::ClearIgnored);
        assert_eq!(builder.len(), 1);
        assert_eq!(
            builder.diagnostics(),
            [Diagnostic::AmbiguousClearTarget { feature: "except".into(), pattern: "clone()".into(), sequence: 1 }]
        );
        assert_eq!(builder.freeze().diagnostics().len(), 1);
    }

    #[test]
    fn clear_removes_identical_entry() {
        let mut builder = FeatureTableBuilder::new();
        builder.define(entry("except", "clone()", "1"));
        assert_eq!(builder.define(entry("except", "clone()", "")), Defined::Cleared);
        assert!(builder.is_empty());
        assert!(builder.diagnostics().is_empty());
        assert!(builder.freeze().feature_names().is_empty());
    }

    #[test]
    fn later_entry_wins_at_equal_specificity() {
        let mut builder = FeatureTableBuilder::new();
        builder.define(entry("except", "foo", "1").with_body("unqualified"));
        builder.define(entry("except", "*::foo", "1").with_body("wildcard"));
        let table = builder.freeze();

        let v = Variant::of(Declaration::function("foo"));
        assert_eq!(table.best_match("except", &v, &ScopeGraph::new()).unwrap().body().unwrap().text(), "wildcard");
    }

    #[test]
    fn more_specific_entry_wins_regardless_of_order() {
        let mut builder = FeatureTableBuilder::new();
        builder.define(entry("except", "Object::foo(int)", "1").with_body("scoped+sig"));
        builder.define(entry("except", "Object::foo", "1").with_body("scoped"));
        builder.define(entry("except", "foo(int)", "1").with_body("sig"));
        builder.define(entry("except", "foo", "1").with_body("name"));
        builder.define(entry("except", "", "1").with_body("global"));
        let table = builder.freeze();
        let scopes = ScopeGraph::new();

        let body = |decl: Declaration| {
            table.best_match("except", &Variant::of(decl), &scopes).map(|e| e.body().unwrap().text().to_string())
        };
        assert_eq!(body(Declaration::method("Object::foo").param("int")).as_deref(), Some("scoped+sig"));
        assert_eq!(body(Declaration::method("Object::foo").param("long")).as_deref(), Some("scoped"));
        assert_eq!(body(Declaration::method("Other::foo").param("int")).as_deref(), Some("sig"));
        assert_eq!(body(Declaration::function("foo")).as_deref(), Some("name"));
        assert_eq!(body(Declaration::function("bar")).as_deref(), Some("global"));
    }

    #[test]
    fn direct_scope_beats_inherited_scope() {
        let mut scopes = ScopeGraph::new();
        let base = ScopePath::parse("Base");
        scopes.declare_scope(base.clone(), []);
        scopes.declare_scope(ScopePath::parse("Derived"), [base.clone()]);
        scopes.declare_member(&base, "m");

        let mut builder = FeatureTableBuilder::new();
        builder.define(entry("except", "Derived::m", "1").with_body("derived"));
        builder.define(entry("except", "Base::m", "1").with_body("base"));
        let table = builder.freeze();

        let v = Variant::of(Declaration::method("Derived::m").inherited());
        assert_eq!(table.best_match("except", &v, &scopes).unwrap().body().unwrap().text(), "derived");
    }

    #[test]
    fn global_entries_apply_only_to_later_declarations() {
        let mut builder = FeatureTableBuilder::new();
        let early = builder.tick();
        builder.define(entry("except", "", "1"));
        let late = builder.tick();
        let table = builder.freeze();
        let scopes = ScopeGraph::new();

        let before = Variant::of(Declaration::function("f").at_position(early));
        let after = Variant::of(Declaration::function("f").at_position(late));
        let unregistered = Variant::of(Declaration::function("f"));
        assert!(table.best_match("except", &before, &scopes).is_none());
        assert!(table.best_match("except", &after, &scopes).is_some());
        assert!(table.best_match("except", &unregistered, &scopes).is_some());
    }

    #[test]
    fn unknown_feature_has_no_match() {
        let table = FeatureTableBuilder::new().freeze();
        assert!(table.best_match("except", &Variant::of(Declaration::function("f")), &ScopeGraph::new()).is_none());
    }
}
