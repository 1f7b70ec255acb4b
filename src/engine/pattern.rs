//! Feature patterns and the matching test.
//!
//! A pattern targets declarations by scope, leaf name and (optionally) an
//! explicit signature:
//!
//! ```text
//! pattern text                 scope qualifier      name    signature
//! ------------------------------------------------------------------------
//! (empty)                      Unqualified          -       -        global
//! foo                          Unqualified          foo     -
//! *::foo(int)                  Wildcard             foo     (int)
//! ::foo                        Exact(<global>)      foo     -
//! Object::foo(int) const       Exact(Object)        foo     (int) const
//! hello(int i=0, double d=1)   Unqualified          hello   (int = 0, double = 1)
//! ```
//!
//! ## Precedence
//!
//! When several patterns match one variant the most specific wins:
//!
//! ```text
//! ScopedNameSignature > ScopedName > NameSignature > Name > Global
//! ```
//!
//! Inside one precedence class a direct scope match beats an inherited one,
//! and a nearer base beats a farther one. Remaining ties go to the entry
//! defined last (see `table.rs`).
//!
//! ## Signatures and default arguments
//!
//! A signature carrying default expressions names the *declared* form of a
//! function; it matches every variant the default-argument expander derives
//! from that declaration. A signature without defaults names one concrete
//! arity only.

use crate::decl::{Parameter, QualifiedName, ScopeGraph, ScopePath, Variant, parse_parameter_list, split_parameter_list};
use crate::diagnostics::PatternError;
use std::fmt;

/// How a pattern constrains the scope of the declarations it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeQualifier {
    /// Bare name: matches identically named declarations in any scope.
    Unqualified,
    /// `Scope::name`: the immediate enclosing scope must equal the path, or
    /// inherit the member from it. `::name` is the global scope.
    Exact(ScopePath),
    /// `*::name`: any scope, including the global one.
    Wildcard,
}

/// Explicit parameter list of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    params: Vec<Parameter>,
    is_const: bool,
}

impl Signature {
    /// # Panics
    ///
    /// Panics on an empty parameter type or a non-trailing default; textual
    /// signatures are validated before they get here.
    pub fn new(params: Vec<Parameter>) -> Self {
        for (i, p) in params.iter().enumerate() {
            assert!(!p.ty.is_empty(), "malformed signature: parameter {i} has an empty type");
            assert!(
                p.default.is_some() || params[..i].iter().all(|q| q.default.is_none()),
                "malformed signature: parameter {i} follows a defaulted parameter"
            );
        }
        Signature { params, is_const: false }
    }

    pub fn const_qualified(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub fn has_defaults(&self) -> bool {
        self.params.iter().any(|p| p.default.is_some())
    }

    fn matches(&self, variant: &Variant) -> bool {
        if !variant.kind().is_callable() || self.is_const != variant.is_const() {
            return false;
        }
        if self.has_defaults() {
            return self.params == variant.declaration().signature();
        }
        self.params.len() == variant.arity() && self.params.iter().map(|p| &p.ty).eq(variant.parameter_types())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        write!(f, "({})", params.join(", "))?;
        if self.is_const {
            f.write_str(" const")?;
        }
        Ok(())
    }
}

/// Precedence class of a pattern, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    Global,
    Name,
    NameSignature,
    ScopedName,
    ScopedNameSignature,
}

/// A scope + name + signature specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeaturePattern {
    scope: ScopeQualifier,
    name: Option<String>,
    signature: Option<Signature>,
}

impl FeaturePattern {
    /// Matches every declaration.
    pub fn global() -> Self {
        FeaturePattern { scope: ScopeQualifier::Unqualified, name: None, signature: None }
    }

    pub fn named(name: &str) -> Self {
        FeaturePattern { scope: ScopeQualifier::Unqualified, name: Some(name.to_string()), signature: None }
    }

    pub fn wildcard(name: &str) -> Self {
        FeaturePattern { scope: ScopeQualifier::Wildcard, name: Some(name.to_string()), signature: None }
    }

    pub fn scoped(scope: ScopePath, name: &str) -> Self {
        FeaturePattern { scope: ScopeQualifier::Exact(scope), name: Some(name.to_string()), signature: None }
    }

    /// # Panics
    ///
    /// Panics when called on the global pattern: a signature needs a name.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        assert!(self.name.is_some(), "a global pattern cannot carry a signature");
        self.signature = Some(signature);
        self
    }

    /// Parse pattern text such as `*::clone()` or `Object::foo(int) const`.
    /// Empty text is the global pattern.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let trimmed = text.trim();
        let malformed = |reason: String| PatternError::Malformed { text: trimmed.to_string(), reason };
        if trimmed.is_empty() {
            return Ok(Self::global());
        }

        let (name_part, signature) = match split_parameter_list(trimmed) {
            None => (trimmed, None),
            Some(Err(reason)) => return Err(malformed(reason)),
            Some(Ok((name, params, rest))) => {
                let params = parse_parameter_list(params).map_err(&malformed)?;
                let signature = match rest.trim() {
                    "" => Signature::new(params),
                    "const" => Signature::new(params).const_qualified(),
                    other => return Err(malformed(format!("unexpected `{other}` after the parameter list"))),
                };
                (name, Some(signature))
            }
        };

        let name_part = name_part.trim();
        let (scope, leaf) = if let Some(rest) = name_part.strip_prefix("*::") {
            (ScopeQualifier::Wildcard, rest.trim().to_string())
        } else if let Some(rest) = name_part.strip_prefix("::") {
            (ScopeQualifier::Exact(ScopePath::global()), rest.trim().to_string())
        } else {
            let q = QualifiedName::parse(name_part);
            let scope = if q.scope.is_global() { ScopeQualifier::Unqualified } else { ScopeQualifier::Exact(q.scope) };
            (scope, q.leaf)
        };

        if !is_valid_leaf(&leaf) {
            return Err(malformed(format!("`{leaf}` is not a declaration name")));
        }

        Ok(FeaturePattern { scope, name: Some(leaf), signature })
    }

    pub fn scope(&self) -> &ScopeQualifier {
        &self.scope
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn is_global(&self) -> bool {
        self.name.is_none()
    }

    pub fn specificity(&self) -> Specificity {
        match (&self.name, &self.scope, &self.signature) {
            (None, _, _) => Specificity::Global,
            (Some(_), ScopeQualifier::Exact(_), Some(_)) => Specificity::ScopedNameSignature,
            (Some(_), ScopeQualifier::Exact(_), None) => Specificity::ScopedName,
            (Some(_), _, Some(_)) => Specificity::NameSignature,
            (Some(_), _, None) => Specificity::Name,
        }
    }

    /// Matching test against one variant.
    ///
    /// Returns the inheritance distance of the match (`0` for a direct match)
    /// or `None` when the pattern does not apply.
    pub fn matches(&self, variant: &Variant, scopes: &ScopeGraph) -> Option<usize> {
        let Some(name) = &self.name else {
            return Some(0);
        };
        if name != variant.leaf_name() {
            return None;
        }
        if let Some(signature) = &self.signature {
            if !signature.matches(variant) {
                return None;
            }
        }

        match &self.scope {
            ScopeQualifier::Unqualified | ScopeQualifier::Wildcard => Some(0),
            ScopeQualifier::Exact(path) if path == variant.scope() => Some(0),
            ScopeQualifier::Exact(path) => {
                if !variant.kind().is_member() {
                    return None;
                }
                scopes
                    .inherited_providers(variant.scope(), name)
                    .into_iter()
                    .find(|(provider, _)| *provider == path)
                    .map(|(_, depth)| depth)
            }
        }
    }
}

impl fmt::Display for FeaturePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(name) = &self.name else {
            return f.write_str("<global>");
        };
        match &self.scope {
            ScopeQualifier::Unqualified => {}
            ScopeQualifier::Wildcard => f.write_str("*::")?,
            ScopeQualifier::Exact(path) if path.is_global() => f.write_str("::")?,
            ScopeQualifier::Exact(path) => write!(f, "{path}::")?,
        }
        f.write_str(name)?;
        if let Some(signature) = &self.signature {
            write!(f, "{signature}")?;
        }
        Ok(())
    }
}

fn is_valid_leaf(leaf: &str) -> bool {
    regex!(r"^(?:~?[A-Za-z_][A-Za-z0-9_]*(?:<.*>)?|operator\s*\S.*)$").is_match(leaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::Declaration;

    fn pattern(text: &str) -> FeaturePattern {
        FeaturePattern::parse(text).unwrap()
    }

    #[test]
    fn parse_distinguishes_scope_qualifiers() {
        assert_eq!(pattern("foo").scope(), &ScopeQualifier::Unqualified);
        assert_eq!(pattern("*::foo").scope(), &ScopeQualifier::Wildcard);
        assert_eq!(pattern("::foo").scope(), &ScopeQualifier::Exact(ScopePath::global()));
        assert_eq!(pattern("a::B::foo").scope(), &ScopeQualifier::Exact(ScopePath::parse("a::B")));
        assert!(pattern("").is_global());
        assert!(pattern("   ").is_global());
    }

    #[test]
    fn parse_reads_signatures() {
        let p = pattern("Object::foo(const char *s, int n = 3) const");
        let sig = p.signature().unwrap();
        assert!(sig.is_const());
        assert!(sig.has_defaults());
        assert_eq!(sig.to_string(), "(char const *, int = 3) const");
        assert_eq!(p.to_string(), "Object::foo(char const *, int = 3) const");

        assert_eq!(pattern("clone()").signature().unwrap().params().len(), 0);
        assert_eq!(pattern("clone(void)").signature().unwrap().params().len(), 0);
        assert_eq!(pattern("Functor::operator()(int)").name(), Some("operator()"));
    }

    #[test]
    fn names_containing_operator_are_plain_names() {
        let p = pattern("Foo::get_operator()");
        assert_eq!(p.name(), Some("get_operator"));
        assert_eq!(p.signature().unwrap().params().len(), 0);
        let p = pattern("cooperator(int)");
        assert_eq!(p.name(), Some("cooperator"));
        assert_eq!(p.signature().unwrap().params().len(), 1);
    }

    #[test]
    fn qualified_parameter_types_keep_their_type_name() {
        assert_ne!(pattern("f(const Foo)").signature(), pattern("f(const Bar)").signature());
        assert_eq!(pattern("f(const size_t)").to_string(), "f(size_t const)");

        let scopes = ScopeGraph::new();
        let v = Variant::of(Declaration::function("f").param("const size_t"));
        assert!(pattern("f(const size_t)").matches(&v, &scopes).is_some());
        assert!(pattern("f(size_t const n)").matches(&v, &scopes).is_some());
        assert!(pattern("f(const Foo)").matches(&v, &scopes).is_none());
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(FeaturePattern::parse("foo(int").is_err());
        assert!(FeaturePattern::parse("foo(int) volatile").is_err());
        assert!(FeaturePattern::parse("(int)").is_err());
        assert!(FeaturePattern::parse("foo(int = 1, double)").is_err());
        assert!(FeaturePattern::parse("two words").is_err());
    }

    #[test]
    fn specificity_follows_precedence_table() {
        assert_eq!(pattern("").specificity(), Specificity::Global);
        assert_eq!(pattern("foo").specificity(), Specificity::Name);
        assert_eq!(pattern("*::foo").specificity(), Specificity::Name);
        assert_eq!(pattern("foo(int)").specificity(), Specificity::NameSignature);
        assert_eq!(pattern("A::foo").specificity(), Specificity::ScopedName);
        assert_eq!(pattern("A::foo(int)").specificity(), Specificity::ScopedNameSignature);
        assert!(Specificity::ScopedName > Specificity::NameSignature);
        assert!(Specificity::Name > Specificity::Global);
    }

    #[test]
    fn structural_identity_includes_the_qualifier() {
        assert_ne!(pattern("*::clone()"), pattern("clone()"));
        assert_eq!(pattern("clone( )"), pattern("clone()"));
        assert_eq!(pattern("f(const char*)"), pattern("f(char const *)"));
    }

    #[test]
    fn exact_scope_matches_only_the_immediate_scope() {
        let scopes = ScopeGraph::new();
        let v = Variant::of(Declaration::method("Object::foo"));
        assert_eq!(pattern("Object::foo").matches(&v, &scopes), Some(0));
        assert_eq!(pattern("foo").matches(&v, &scopes), Some(0));
        assert_eq!(pattern("*::foo").matches(&v, &scopes), Some(0));
        assert_eq!(pattern("Other::foo").matches(&v, &scopes), None);
        assert_eq!(pattern("::foo").matches(&v, &scopes), None);

        let global = Variant::of(Declaration::function("foo"));
        assert_eq!(pattern("::foo").matches(&global, &scopes), Some(0));
        assert_eq!(pattern("*::foo").matches(&global, &scopes), Some(0));
        assert_eq!(pattern("Object::foo").matches(&global, &scopes), None);
        assert_eq!(pattern("bar").matches(&global, &scopes), None);
        assert_eq!(pattern("").matches(&global, &scopes), Some(0));

        let nested = Variant::of(Declaration::method("Object::Inner::foo"));
        assert_eq!(pattern("Object::foo").matches(&nested, &scopes), None);
    }

    #[test]
    fn signatures_compare_exactly() {
        let scopes = ScopeGraph::new();
        let v = Variant::of(Declaration::function("f").param("int").param("char const *"));
        assert!(pattern("f(int, const char*)").matches(&v, &scopes).is_some());
        assert!(pattern("f(int)").matches(&v, &scopes).is_none());
        assert!(pattern("f(long, char const *)").matches(&v, &scopes).is_none());
        assert!(pattern("f(int, const char*) const").matches(&v, &scopes).is_none());

        let c = Variant::of(Declaration::method("A::get").const_qualified());
        assert!(pattern("A::get() const").matches(&c, &scopes).is_some());
        assert!(pattern("A::get()").matches(&c, &scopes).is_none());
        assert!(pattern("A::get").matches(&c, &scopes).is_some());
    }

    #[test]
    fn variables_never_match_signatures() {
        let scopes = ScopeGraph::new();
        let v = Variant::of(Declaration::variable("counter"));
        assert!(pattern("counter()").matches(&v, &scopes).is_none());
        assert!(pattern("counter").matches(&v, &scopes).is_some());
    }

    #[test]
    fn exact_scope_follows_inheritance() {
        let mut scopes = ScopeGraph::new();
        let base = ScopePath::parse("Base");
        scopes.declare_scope(base.clone(), []);
        scopes.declare_scope(ScopePath::parse("Derived"), [base.clone()]);
        scopes.declare_member(&base, "m");

        let inherited = Variant::of(Declaration::method("Derived::m").inherited());
        assert_eq!(pattern("Base::m").matches(&inherited, &scopes), Some(1));
        assert_eq!(pattern("Derived::m").matches(&inherited, &scopes), Some(0));

        scopes.declare_member(&ScopePath::parse("Derived"), "m");
        let redeclared = Variant::of(Declaration::method("Derived::m"));
        assert_eq!(pattern("Base::m").matches(&redeclared, &scopes), None);
    }
}
