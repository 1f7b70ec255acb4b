//! Template substitution.
//!
//! Feature bodies may contain placeholders that are replaced, per emitted
//! variant, with facts about that variant:
//!
//! ```text
//! $action              invocation expression for this exact overload
//! $name                C/C++ qualified name
//! $symname             target-language name
//! $overname            overload suffix ("" outside an overload set)
//! $wrapname            wrapper function name
//! $decl                qualified name + parameter types
//! $fulldecl            return type + $decl
//! $parentclassname     enclosing class (members only)
//! $parentclasssymname  enclosing class target name (members only)
//! ```
//!
//! Substitution is one pass over the original text: a substituted value is
//! never rescanned, so facts that happen to contain `$...` cannot loop.
//! Placeholders outside this set are left as written.
//!
//! Every body is scanned once when its entry is created. The resulting
//! [`Placeholders`] mask lets resolution skip both the fact sheet and the
//! substitution pass for bodies that contain no placeholder at all.

use crate::api::Options;
use crate::decl::{DeclKind, ScopeGraph, TypeDesc, Variant};
use bitflags::bitflags;
use regex::{Captures, Regex};

bitflags! {
    /// Set of recognized placeholders present in a body.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Placeholders: u16 {
        const ACTION               = 1 << 0;
        const NAME                 = 1 << 1;
        const SYMNAME              = 1 << 2;
        const OVERNAME             = 1 << 3;
        const WRAPNAME             = 1 << 4;
        const DECL                 = 1 << 5;
        const FULLDECL             = 1 << 6;
        const PARENTCLASSNAME      = 1 << 7;
        const PARENTCLASSSYMNAME   = 1 << 8;
    }
}

impl Placeholders {
    /// Map a `$token` to its placeholder, if recognized.
    pub fn from_token(token: &str) -> Option<Self> {
        let placeholder = match token {
            "$action" => Placeholders::ACTION,
            "$name" => Placeholders::NAME,
            "$symname" => Placeholders::SYMNAME,
            "$overname" => Placeholders::OVERNAME,
            "$wrapname" => Placeholders::WRAPNAME,
            "$decl" => Placeholders::DECL,
            "$fulldecl" => Placeholders::FULLDECL,
            "$parentclassname" => Placeholders::PARENTCLASSNAME,
            "$parentclasssymname" => Placeholders::PARENTCLASSSYMNAME,
            _ => return None,
        };
        Some(placeholder)
    }

    /// Recognized placeholders occurring in `text`.
    pub fn scan(text: &str) -> Self {
        placeholder_regex()
            .find_iter(text)
            .filter_map(|m| Placeholders::from_token(m.as_str()))
            .fold(Placeholders::empty(), |acc, p| acc | p)
    }
}

fn placeholder_regex() -> &'static Regex {
    regex!(r"\$[A-Za-z_][A-Za-z0-9_]*")
}

/// A feature body with its pre-scanned placeholder set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    text: String,
    placeholders: Placeholders,
}

impl Template {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let placeholders = Placeholders::scan(&text);
        Template { text, placeholders }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn placeholders(&self) -> Placeholders {
        self.placeholders
    }

    /// Replace every recognized placeholder with its fact.
    pub fn expand(&self, facts: &FactSheet) -> String {
        if self.placeholders.is_empty() {
            return self.text.clone();
        }
        placeholder_regex()
            .replace_all(&self.text, |caps: &Captures| {
                let token = &caps[0];
                facts.get(token).unwrap_or(token).to_string()
            })
            .into_owned()
    }
}

/// Per-variant facts consumed by [`Template::expand`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSheet {
    pub action: String,
    pub name: String,
    pub symbol_name: String,
    pub overload_suffix: String,
    pub wrapper_name: String,
    pub decl: String,
    pub full_decl: String,
    pub parent_class_name: String,
    pub parent_class_target_name: String,
}

impl FactSheet {
    /// Derive the facts for `variant`.
    ///
    /// ```text
    /// Special::something(char const *) -> char *, overload #0
    ///
    /// $action    result = (char *)Special::something(arg1);
    /// $overname  __SWIG_0
    /// $wrapname  _wrap_Special_something__SWIG_0
    /// $decl      Special::something(char const *)
    /// $fulldecl  char * Special::something(char const *)
    /// ```
    pub fn for_variant(variant: &Variant, scopes: &ScopeGraph, options: &Options) -> Self {
        let decl = variant.declaration();
        let scope = variant.scope();

        let overload_suffix =
            variant.overload_index().map(|i| format!("{}{}", options.overload_prefix, i)).unwrap_or_default();

        let (parent_class_name, parent_class_target_name) = if variant.kind().is_member() && !scope.is_global() {
            (scope.to_string(), scopes.target_name(scope))
        } else {
            (String::new(), String::new())
        };

        let mangled = match scope.parent() {
            None => decl.symbol_name().to_string(),
            Some(outer) if outer.is_global() => format!("{}_{}", scopes.target_name(scope), decl.symbol_name()),
            Some(outer) => format!("{}_{}_{}", outer.mangled(), scopes.target_name(scope), decl.symbol_name()),
        };

        let decl_text = decl_text(variant);
        let full_decl = match decl.return_type() {
            Some(ty) => format!("{ty} {decl_text}"),
            None => decl_text.clone(),
        };

        FactSheet {
            action: action_text(variant),
            name: variant.qualified_name().to_string(),
            symbol_name: decl.symbol_name().to_string(),
            wrapper_name: format!("{}{}{}", options.wrapper_prefix, mangled, overload_suffix),
            overload_suffix,
            decl: decl_text,
            full_decl,
            parent_class_name,
            parent_class_target_name,
        }
    }

    /// The fact for a `$token`, or `None` when the token is not a
    /// recognized placeholder.
    pub fn get(&self, token: &str) -> Option<&str> {
        let fact = match token {
            "$action" => &self.action,
            "$name" => &self.name,
            "$symname" => &self.symbol_name,
            "$overname" => &self.overload_suffix,
            "$wrapname" => &self.wrapper_name,
            "$decl" => &self.decl,
            "$fulldecl" => &self.full_decl,
            "$parentclassname" => &self.parent_class_name,
            "$parentclasssymname" => &self.parent_class_target_name,
            _ => return None,
        };
        Some(fact.as_str())
    }
}

fn decl_text(variant: &Variant) -> String {
    let name = variant.qualified_name().to_string();
    if !variant.kind().is_callable() {
        return name;
    }
    let params: Vec<&str> = variant.parameter_types().map(TypeDesc::as_str).collect();
    let mut text = format!("{}({})", name, params.join(", "));
    if variant.is_const() {
        text.push_str(" const");
    }
    text
}

/// The raw invocation for this arity. Instance members take the object as
/// `arg1`; the remaining arguments follow as `arg2..`.
fn action_text(variant: &Variant) -> String {
    let decl = variant.declaration();
    let first = if variant.kind().has_receiver() { 2 } else { 1 };
    let args: Vec<String> = (0..variant.arity()).map(|i| format!("arg{}", i + first)).collect();

    let target = match variant.kind() {
        DeclKind::Method => format!("(arg1)->{}({})", decl.leaf_name(), args.join(", ")),
        DeclKind::MemberVariable => format!("(arg1)->{}", decl.leaf_name()),
        DeclKind::Function | DeclKind::StaticMethod => format!("{}({})", decl.qualified_name(), args.join(", ")),
        DeclKind::Variable => decl.qualified_name().to_string(),
    };

    match decl.return_type() {
        Some(ty) if !ty.is_void() => format!("result = ({ty}){target};"),
        _ => format!("{target};"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Declaration, ScopePath};

    fn facts(variant: &Variant) -> FactSheet {
        FactSheet::for_variant(variant, &ScopeGraph::new(), &Options::default())
    }

    #[test]
    fn scan_finds_only_recognized_placeholders() {
        let mask = Placeholders::scan("$action; $decl $bogus $names $$");
        assert_eq!(mask, Placeholders::ACTION | Placeholders::DECL);
        assert!(Template::new("plain text").placeholders().is_empty());
    }

    #[test]
    fn expand_is_single_pass() {
        let sheet = FactSheet { action: "$decl".to_string(), decl: "f()".to_string(), ..FactSheet::default() };
        assert_eq!(Template::new("[$action] [$decl]").expand(&sheet), "[$decl] [f()]");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let sheet = FactSheet { name: "foo".to_string(), ..FactSheet::default() };
        assert_eq!(Template::new("$name $names $input").expand(&sheet), "foo $names $input");
    }

    #[test]
    fn facts_for_overloaded_static_function() {
        let v = Variant::of(Declaration::function("Special::something").param("char const*").returns("char *"))
            .with_overload(0);
        let sheet = facts(&v);
        assert_eq!(sheet.decl, "Special::something(char const *)");
        assert_eq!(sheet.full_decl, "char * Special::something(char const *)");
        assert_eq!(sheet.action, "result = (char *)Special::something(arg1);");
        assert_eq!(sheet.overload_suffix, "__SWIG_0");
        assert_eq!(sheet.wrapper_name, "_wrap_Special_something__SWIG_0");
        assert_eq!(sheet.parent_class_name, "");
    }

    #[test]
    fn facts_for_instance_members() {
        let mut scopes = ScopeGraph::new();
        scopes.rename_scope(ScopePath::parse("ns::Object"), "PyObject");

        let method = Variant::of(Declaration::method("ns::Object::resize").param("int").param("int").const_qualified());
        let sheet = FactSheet::for_variant(&method, &scopes, &Options::default());
        assert_eq!(sheet.action, "(arg1)->resize(arg2, arg3);");
        assert_eq!(sheet.decl, "ns::Object::resize(int, int) const");
        assert_eq!(sheet.parent_class_name, "ns::Object");
        assert_eq!(sheet.parent_class_target_name, "PyObject");
        assert_eq!(sheet.wrapper_name, "_wrap_ns_PyObject_resize");
        assert_eq!(sheet.overload_suffix, "");

        let member = Variant::of(Declaration::member_variable("ns::Object::size").returns("size_t"));
        let sheet = FactSheet::for_variant(&member, &scopes, &Options::default());
        assert_eq!(sheet.action, "result = (size_t)(arg1)->size;");
        assert_eq!(sheet.decl, "ns::Object::size");
    }

    #[test]
    fn renamed_symbols_feed_symname_and_wrapname() {
        let v = Variant::of(Declaration::function("print").renamed("print_"));
        let sheet = facts(&v);
        assert_eq!(sheet.symbol_name, "print_");
        assert_eq!(sheet.name, "print");
        assert_eq!(sheet.wrapper_name, "_wrap_print_");
        assert_eq!(sheet.action, "print();");
    }
}
