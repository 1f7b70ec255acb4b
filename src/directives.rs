//! Directive vocabulary.
//!
//! Everything above the engine that knows how directives are *written*:
//!
//! - `aliases.rs`: shorthand directives (`%exception`, `%newobject`, ...) and
//!   the `%feature` form each one stands for.
//! - `script.rs`: a reader for interface scripts, producing the ordered
//!   stream of scopes, declarations and directives that
//!   [`InterfaceBuilder::push`](crate::InterfaceBuilder::push) consumes.
//!
//! The engine never sees alias names or script syntax; by the time an entry
//! reaches [`FeatureTableBuilder`](crate::FeatureTableBuilder) it is a plain
//! `(feature, pattern, value, body, attributes)` record.

#[path = "directives/aliases.rs"]
pub mod aliases;
#[path = "directives/script.rs"]
pub mod script;

#[cfg(test)]
#[path = "directives/tests.rs"]
mod tests;

pub use aliases::{Alias, AliasValue};
pub use script::{Item, parse_script};
