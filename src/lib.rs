//! Declaration feature attachment and resolution.
//!
//! A wrapper generator lets users attach named overlays ("features") to the
//! declarations it emits: an exception-handling block around one method, an
//! ownership flag on a factory function, a docstring on a class member.
//! Directives are written before or after the declarations they target and
//! address them by scope, name and (optionally) signature:
//!
//! ```text
//! %feature("except") %{ try { $action } catch (...) { log_unknown(); } %}
//! %exception Object::allocate(int) %{ ... %}
//! %newobject Factory::make;
//! ```
//!
//! This crate decides, for every emitted variant of every declaration, which
//! of those overlays applies and what its body expands to.
//!
//! ```
//! use declmark::{Declaration, InterfaceBuilder, Options, feature};
//!
//! let mut builder = InterfaceBuilder::new();
//! builder.define(feature! { name: "except", pattern: "", body: "guard($action)" });
//! builder.define(feature! { name: "except", pattern: "Object::size", value: "0" });
//! builder.declare(Declaration::method("Object::size").returns("size_t"));
//! builder.declare(Declaration::method("Object::clear"));
//! let iface = builder.finish(Options::default());
//!
//! let clear = iface.variant("Object::clear", 0).unwrap();
//! assert_eq!(iface.resolve(clear, "except").body.as_deref(), Some("guard((arg1)->clear();)"));
//! let size = iface.variant("Object::size", 0).unwrap();
//! assert!(!iface.resolve(size, "except").active);
//! ```

#[macro_use]
mod macros;

pub mod api;
pub mod decl;
pub mod diagnostics;
pub mod directives;
pub mod engine;

pub use api::{
    COMPACT_DEFAULT_ARGS, FeatureReport, Interface, InterfaceBuilder, Options, Report, ReportOptions, VariantReport,
};
pub use decl::{
    DeclFlags, DeclKind, Declaration, Parameter, QualifiedName, ScopeGraph, ScopePath, TypeDesc, Variant,
};
pub use diagnostics::{Diagnostic, PatternError, ScriptError};
pub use directives::{Item, parse_script};
pub use engine::{
    Attributes, Defined, FactSheet, FeatureEntry, FeaturePattern, FeatureTable, FeatureTableBuilder, FeatureValue,
    ResolvedFeature, Resolver, RunMetrics, ScopeQualifier, Signature, Specificity, Template,
};
