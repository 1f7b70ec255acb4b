use crate::decl::{Declaration, ScopeGraph, ScopePath, Variant};
use crate::diagnostics::{Diagnostic, ScriptError};
use crate::directives::script::{Item, parse_script};
use crate::engine::{
    DefaultArgMode, Defined, FactSheet, FeatureEntry, FeatureTable, FeatureTableBuilder, ResolvedFeature, Resolver,
    RunMetrics, expand_default_args, number_overloads,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Feature that switches default-argument expansion off for one declaration.
pub const COMPACT_DEFAULT_ARGS: &str = "compactdefaultargs";

/// Options that affect expansion and the derived template facts.
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit one full-signature variant per declaration instead of one per
    /// default-argument arity.
    pub compact_default_args: bool,
    /// Prefix of generated wrapper names (`$wrapname`).
    pub wrapper_prefix: String,
    /// Prefix of overload suffixes (`$overname`), followed by the index.
    pub overload_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            compact_default_args: false,
            wrapper_prefix: "_wrap_".to_string(),
            overload_prefix: "__SWIG_".to_string(),
        }
    }
}

/// Accumulates declarations, scopes and feature directives in source order.
///
/// Call [`InterfaceBuilder::finish`] to freeze the feature table and expand
/// declarations; nothing can be resolved before that.
#[derive(Debug, Default)]
pub struct InterfaceBuilder {
    table: FeatureTableBuilder,
    scopes: ScopeGraph,
    declarations: Vec<Arc<Declaration>>,
}

impl InterfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_scope(&mut self, scope: ScopePath, bases: impl IntoIterator<Item = ScopePath>) {
        self.scopes.declare_scope(scope, bases);
    }

    pub fn rename_scope(&mut self, scope: ScopePath, target_name: &str) {
        self.scopes.rename_scope(scope, target_name);
    }

    /// Register a declaration at the current stream position.
    pub fn declare(&mut self, decl: Declaration) -> Arc<Declaration> {
        let decl = Arc::new(decl.at_position(self.table.tick()));
        self.scopes.record(&decl);
        self.declarations.push(Arc::clone(&decl));
        decl
    }

    /// Apply a feature directive at the current stream position.
    pub fn define(&mut self, entry: FeatureEntry) -> Defined {
        self.table.define(entry)
    }

    /// Apply one item of an interface script.
    pub fn push(&mut self, item: Item) {
        match item {
            Item::Scope { path, bases, target_name } => {
                if let Some(target) = target_name {
                    self.rename_scope(path.clone(), &target);
                }
                self.declare_scope(path, bases);
            }
            Item::Declaration(decl) => {
                self.declare(decl);
            }
            Item::Directive(entry) => {
                self.define(entry);
            }
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.table.diagnostics()
    }

    /// Freeze the table and expand every declaration into its variants.
    pub fn finish(self, options: Options) -> Interface {
        let start = Instant::now();
        let table = self.table.freeze();

        let mut variants = Vec::new();
        for decl in &self.declarations {
            let mode = if options.compact_default_args || compact_requested(&table, &self.scopes, decl) {
                DefaultArgMode::Compact
            } else {
                DefaultArgMode::Expand
            };
            variants.extend(expand_default_args(Arc::clone(decl), mode));
        }
        number_overloads(&mut variants);

        tracing::debug!(declarations = self.declarations.len(), variants = variants.len(), "interface finished");
        Interface {
            table,
            scopes: self.scopes,
            options,
            declarations: self.declarations,
            variants,
            expand: start.elapsed(),
        }
    }
}

fn compact_requested(table: &FeatureTable, scopes: &ScopeGraph, decl: &Arc<Declaration>) -> bool {
    let full = Variant::new(Arc::clone(decl), decl.signature().len());
    table.best_match(COMPACT_DEFAULT_ARGS, &full, scopes).is_some_and(|e| e.value().is_active())
}

/// A finalized interface: frozen feature table, scope graph and the emitted
/// variants. Safe to share across threads for concurrent queries.
#[derive(Debug, Clone)]
pub struct Interface {
    table: FeatureTable,
    scopes: ScopeGraph,
    options: Options,
    declarations: Vec<Arc<Declaration>>,
    variants: Vec<Variant>,
    expand: Duration,
}

impl Interface {
    pub fn builder() -> InterfaceBuilder {
        InterfaceBuilder::new()
    }

    /// Read an interface script and finish it with `options`.
    ///
    /// # Example
    /// ```
    /// use declmark::{Interface, Options};
    ///
    /// let script = r#"
    ///     %exception Object::allocate %{ try { $action } catch (...) { throw; } %}
    ///     class Object;
    ///     method Object::allocate(int) -> void *;
    /// "#;
    /// let iface = Interface::from_script(script, Options::default()).unwrap();
    /// let variant = iface.variants_named("Object::allocate").next().unwrap();
    /// let except = iface.resolve(variant, "except");
    /// assert!(except.active);
    /// assert_eq!(except.body.unwrap(), "try { result = (void *)(arg1)->allocate(arg2); } catch (...) { throw; }");
    /// ```
    pub fn from_script(text: &str, options: Options) -> Result<Self, ScriptError> {
        let mut builder = InterfaceBuilder::new();
        for item in parse_script(text)? {
            builder.push(item);
        }
        Ok(builder.finish(options))
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.table, &self.scopes, &self.options)
    }

    /// Resolve `feature` on `variant`.
    pub fn resolve(&self, variant: &Variant, feature: &str) -> ResolvedFeature {
        self.resolver().resolve(variant, feature)
    }

    /// Resolve `feature` on `variant` with backend-supplied template facts.
    pub fn resolve_with_facts(&self, variant: &Variant, feature: &str, facts: &FactSheet) -> ResolvedFeature {
        self.resolver().resolve_with_facts(variant, feature, facts)
    }

    /// Names of every feature active on `variant`.
    pub fn active_features(&self, variant: &Variant) -> BTreeSet<String> {
        self.resolver().active_features(variant)
    }

    pub fn facts(&self, variant: &Variant) -> FactSheet {
        self.resolver().facts(variant)
    }

    /// Emitted variants in emission order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Variants whose qualified name is `qualified`, e.g. `"Object::foo"`.
    pub fn variants_named<'a>(&'a self, qualified: &str) -> impl Iterator<Item = &'a Variant> + use<'a> {
        let qualified = qualified.to_string();
        self.variants.iter().filter(move |v| v.qualified_name().to_string() == qualified)
    }

    /// Variant of `qualified` with exactly `arity` parameters.
    pub fn variant(&self, qualified: &str, arity: usize) -> Option<&Variant> {
        self.variants_named(qualified).find(|v| v.arity() == arity)
    }

    pub fn declarations(&self) -> &[Arc<Declaration>] {
        &self.declarations
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn scopes(&self) -> &ScopeGraph {
        &self.scopes
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.table.diagnostics()
    }

    /// Resolve every feature over every variant.
    pub fn report(&self, selection: &ReportOptions) -> Report {
        let start = Instant::now();
        let resolver = self.resolver();
        let names: Vec<&str> = if selection.features.is_empty() {
            self.table.feature_names()
        } else {
            selection.features.iter().map(String::as_str).collect()
        };

        let mut queries = 0;
        let mut variants = Vec::with_capacity(self.variants.len());
        for variant in &self.variants {
            let mut features = Vec::new();
            for &name in &names {
                queries += 1;
                if resolver.matched_entry(variant, name).is_none() {
                    continue;
                }
                let resolved = resolver.resolve(variant, name);
                if resolved.active || selection.include_inactive {
                    features.push(FeatureReport { name: name.to_string(), resolved });
                }
            }

            if features.is_empty() && !selection.include_unmatched {
                continue;
            }
            let facts = resolver.facts(variant);
            variants.push(VariantReport {
                decl: facts.decl,
                wrapper_name: facts.wrapper_name,
                overload_suffix: facts.overload_suffix,
                reduced: variant.is_reduced(),
                features,
            });
        }
        let resolve = start.elapsed();

        Report {
            variants,
            diagnostics: self.diagnostics().iter().map(ToString::to_string).collect(),
            metrics: RunMetrics {
                total: self.expand + resolve,
                expand: self.expand,
                resolve,
                variants: self.variants.len(),
                queries,
            },
        }
    }
}

/// Which parts of the resolution to include in a [`Report`].
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Restrict to these feature names; empty means every defined feature.
    pub features: Vec<String>,
    /// Also list matched but disabled features.
    pub include_inactive: bool,
    /// Also list variants without any listed feature.
    pub include_unmatched: bool,
}

/// Resolution of every selected feature over every variant.
#[derive(Debug, Clone)]
pub struct Report {
    pub variants: Vec<VariantReport>,
    pub diagnostics: Vec<String>,
    pub metrics: RunMetrics,
}

#[derive(Debug, Clone)]
pub struct VariantReport {
    /// `$decl` of the variant.
    pub decl: String,
    pub wrapper_name: String,
    pub overload_suffix: String,
    /// True for variants that drop defaulted parameters.
    pub reduced: bool,
    pub features: Vec<FeatureReport>,
}

#[derive(Debug, Clone)]
pub struct FeatureReport {
    pub name: String,
    pub resolved: ResolvedFeature,
}
