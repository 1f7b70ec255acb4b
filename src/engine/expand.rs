//! Default-argument expansion and overload numbering.
//!
//! A declaration with trailing defaults is emitted as one variant per arity,
//! full signature first:
//!
//! ```text
//! void hello(int i = 0, double d = 0.0);
//!
//! Expand   -> hello(int, double)   hello(int)   hello()
//! Compact  -> hello(int, double)
//! ```
//!
//! Which feature entries reach which variant is decided by the matcher (see
//! `pattern.rs`): a pattern carrying the declared defaults reaches all of
//! them, a plain signature reaches one arity, a name-only pattern reaches all.
//!
//! After expansion every callable variant sharing a scope and leaf name with
//! another one is numbered in emission order; that number drives the
//! `$overname` fact.

use crate::decl::{Declaration, ScopePath, Variant};
use std::collections::HashMap;
use std::sync::Arc;

/// How defaulted parameters are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultArgMode {
    /// One variant per arity.
    #[default]
    Expand,
    /// A single full-signature variant; the wrapper handles the defaults.
    Compact,
}

/// Variants to emit for `decl`, from the full signature down to the
/// shortest.
pub fn expand_default_args(decl: Arc<Declaration>, mode: DefaultArgMode) -> Vec<Variant> {
    let full = decl.signature().len();
    if mode == DefaultArgMode::Compact || !decl.has_defaults() {
        return vec![Variant::new(decl, full)];
    }

    (decl.required_arity()..=full).rev().map(|arity| Variant::new(Arc::clone(&decl), arity)).collect()
}

/// Assign overload indices to callables that share scope and leaf name.
/// Variants that are alone under their name get no index.
pub fn number_overloads(variants: &mut [Variant]) {
    let mut groups: HashMap<(ScopePath, String), Vec<usize>> = HashMap::new();
    for (i, variant) in variants.iter().enumerate() {
        if variant.kind().is_callable() {
            groups.entry((variant.scope().clone(), variant.leaf_name().to_string())).or_default().push(i);
        }
    }

    for members in groups.into_values() {
        let single = members.len() == 1;
        for (n, i) in members.into_iter().enumerate() {
            variants[i].set_overload(if single { None } else { Some(n) });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello() -> Arc<Declaration> {
        Arc::new(Declaration::function("hello").param_default("int", "0").param_default("double", "0.0"))
    }

    #[test]
    fn expands_from_full_signature_down() {
        let decl = hello();
        let variants = expand_default_args(decl.clone(), DefaultArgMode::Expand);
        assert_eq!(variants.iter().map(Variant::arity).collect::<Vec<_>>(), [2, 1, 0]);
        assert!(variants.iter().all(|v| v.is_default_arg_variant_of(&decl)));
    }

    #[test]
    fn keeps_required_parameters() {
        let decl = Arc::new(Declaration::function("f").param("char *").param_default("int", "1"));
        let arities: Vec<usize> =
            expand_default_args(decl, DefaultArgMode::Expand).iter().map(Variant::arity).collect();
        assert_eq!(arities, [2, 1]);
    }

    #[test]
    fn compact_mode_emits_one_variant() {
        let variants = expand_default_args(hello(), DefaultArgMode::Compact);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].arity(), 2);
    }

    #[test]
    fn declarations_without_defaults_are_untouched() {
        let variants = expand_default_args(Arc::new(Declaration::function("g").param("int")), DefaultArgMode::Expand);
        assert_eq!(variants.len(), 1);
        assert!(!variants[0].is_reduced());
    }

    #[test]
    fn overloads_are_numbered_in_emission_order() {
        let mut variants = expand_default_args(hello(), DefaultArgMode::Expand);
        variants.push(Variant::of(Declaration::function("hello").param("char const *")));
        variants.push(Variant::of(Declaration::function("alone")));
        variants.push(Variant::of(Declaration::variable("hello_count")));
        variants.push(Variant::of(Declaration::method("Other::hello")));
        number_overloads(&mut variants);

        let indices: Vec<Option<usize>> = variants.iter().map(Variant::overload_index).collect();
        assert_eq!(indices, [Some(0), Some(1), Some(2), Some(3), None, None, None]);
    }
}
