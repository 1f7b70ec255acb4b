use super::*;
use crate::api::{Interface, Options};
use crate::decl::{DeclKind, ScopePath};
use crate::diagnostics::ScriptError;
use crate::engine::FeatureValue;
use indoc::indoc;

fn directive(item: &Item) -> &crate::engine::FeatureEntry {
    match item {
        Item::Directive(entry) => entry,
        other => panic!("expected a directive, got {other:?}"),
    }
}

#[test]
fn reads_feature_directives() {
    let items = parse_script(indoc! {r#"
        %feature("except") Object::allocate(int) %{
            try { $action } catch (...) { throw; }
        %}
        %feature("except", "0") Object::release;
        %feature("docstring", lang="python", note="a, b") ::helper { Returns {1}. }
        %feature("ref");
    "#})
    .unwrap();
    assert_eq!(items.len(), 4);

    let e = directive(&items[0]);
    assert_eq!(e.feature_name(), "except");
    assert_eq!(e.value(), &FeatureValue::Enabled("1".to_string()));
    assert_eq!(e.pattern().to_string(), "Object::allocate(int)");
    assert_eq!(e.body().unwrap().text(), "try { $action } catch (...) { throw; }");

    let e = directive(&items[1]);
    assert_eq!(e.value(), &FeatureValue::Disabled);
    assert!(e.body().is_none());

    let e = directive(&items[2]);
    assert_eq!(e.pattern().to_string(), "::helper");
    assert_eq!(e.body().unwrap().text(), "Returns {1}.");
    assert_eq!(e.attributes().get("lang").map(String::as_str), Some("python"));
    assert_eq!(e.attributes().get("note").map(String::as_str), Some("a, b"));

    let e = directive(&items[3]);
    assert!(e.pattern().is_global());
    assert_eq!(e.value().token(), "1");
}

#[test]
fn reads_alias_directives() {
    let items = parse_script(indoc! {r#"
        %exception %{ guard(); %}
        %exception;
        %noexception Object::size;
        %newobject Factory::make;
        %clearnewobject Factory::make;
        %mutable *::count;
    "#})
    .unwrap();

    let got: Vec<(&str, &str, String)> = items
        .iter()
        .map(directive)
        .map(|e| (e.feature_name(), e.value().token(), e.pattern().to_string()))
        .collect();
    assert_eq!(
        got,
        [
            ("except", "1", "<global>".to_string()),
            ("except", "", "<global>".to_string()),
            ("except", "0", "Object::size".to_string()),
            ("new", "1", "Factory::make".to_string()),
            ("new", "", "Factory::make".to_string()),
            ("immutable", "", "*::count".to_string()),
        ]
    );
}

#[test]
fn reads_scopes_and_declarations() {
    let items = parse_script(indoc! {r#"
        // scopes
        class Base;
        class Derived : public Base, Mixin as PyDerived;
        /* members */
        method Base::name() const -> const char*;
        inherited method Derived::name() const -> char const *;
        static Derived::count(void) -> int;
        member Derived::size : size_t;
        # free declarations
        function hello(int i = 0, double d = 0.0) as hello_world;
        variable verbose : bool;
    "#})
    .unwrap();
    assert_eq!(items.len(), 8);

    match &items[1] {
        Item::Scope { path, bases, target_name } => {
            assert_eq!(path, &ScopePath::parse("Derived"));
            assert_eq!(bases, &[ScopePath::parse("Base"), ScopePath::parse("Mixin")]);
            assert_eq!(target_name.as_deref(), Some("PyDerived"));
        }
        other => panic!("expected a scope, got {other:?}"),
    }

    let decls: Vec<_> = items
        .iter()
        .filter_map(|item| match item {
            Item::Declaration(decl) => Some(decl),
            _ => None,
        })
        .collect();
    assert_eq!(decls.len(), 6);

    assert_eq!(decls[0].kind(), DeclKind::Method);
    assert!(decls[0].is_const());
    assert_eq!(decls[0].return_type().unwrap().as_str(), "char const *");

    assert!(decls[1].is_inherited());
    assert_eq!(decls[2].kind(), DeclKind::StaticMethod);
    assert!(decls[2].signature().is_empty());
    assert_eq!(decls[3].kind(), DeclKind::MemberVariable);
    assert_eq!(decls[3].return_type().unwrap().as_str(), "size_t");

    assert_eq!(decls[4].required_arity(), 0);
    assert_eq!(decls[4].signature().len(), 2);
    assert_eq!(decls[4].symbol_name(), "hello_world");
    assert_eq!(decls[5].kind(), DeclKind::Variable);
}

#[test]
fn identifiers_containing_operator_keep_their_parameter_list() {
    let items = parse_script(indoc! {r#"
        class Foo;
        %feature("except") Foo::get_operator();
        method Foo::get_operator();
        method Foo::operator()(int) -> int;
    "#})
    .unwrap();
    assert_eq!(items.len(), 4);

    let e = directive(&items[1]);
    assert_eq!(e.pattern().name(), Some("get_operator"));
    assert_eq!(e.pattern().to_string(), "Foo::get_operator()");

    let decls: Vec<_> = items
        .iter()
        .filter_map(|item| match item {
            Item::Declaration(decl) => Some(decl),
            _ => None,
        })
        .collect();
    assert_eq!(decls[0].leaf_name(), "get_operator");
    assert!(decls[0].signature().is_empty());
    assert_eq!(decls[1].leaf_name(), "operator()");
    assert_eq!(decls[1].signature().len(), 1);
}

#[test]
fn reports_errors_with_line_numbers() {
    let cases: &[(&str, usize, &str)] = &[
        ("class A;\n%bogus foo;", 2, "unknown directive"),
        ("%exception foo %{ never closed", 1, "unterminated"),
        ("\n\nfunction f(int = 0, double);", 3, "invalid parameter list"),
        ("method free_function();", 1, "scoped name"),
        ("%feature(\"except\") foo(int) volatile;", 1, "malformed pattern"),
        ("%newobject make { body }", 1, "does not take a body"),
        ("%newobject make\nclass A;", 1, "must end with"),
        ("function f() const;", 1, "only methods"),
        ("typedef int x;", 1, "expected a declaration"),
        ("%feature(except) foo;", 1, "quoted feature name"),
        ("class A", 1, "missing `;`"),
    ];
    for &(script, line, needle) in cases {
        let err = parse_script(script).expect_err(script);
        assert_eq!(err.line(), line, "{script:?} -> {err}");
        assert!(err.to_string().contains(needle), "{script:?} -> {err}");
    }
}

#[test]
fn pattern_errors_keep_their_source() {
    let err = parse_script("%noexception two words;").unwrap_err();
    assert!(matches!(err, ScriptError::Pattern { line: 1, .. }));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn scripts_drive_the_engine_end_to_end() {
    let script = indoc! {r#"
        class Base;
        class Derived : Base as PyDerived;

        %feature("except") %{ try { $action } catch (...) { log_unknown(); } %}
        %exception Base::describe %{ /* $parentclasssymname */ $action %}
        %noexception Derived::quiet;

        method Base::describe() -> char const *;
        inherited method Derived::describe() -> char const *;
        method Derived::quiet();
        method Derived::loud(int level = 1);
    "#};
    let iface = Interface::from_script(script, Options::default()).unwrap();

    let inherited = iface.variant("Derived::describe", 0).unwrap();
    assert_eq!(
        iface.resolve(inherited, "except").body.as_deref(),
        Some("/* PyDerived */ result = (char const *)(arg1)->describe();")
    );

    let quiet = iface.variant("Derived::quiet", 0).unwrap();
    assert!(!iface.resolve(quiet, "except").active);

    let loud: Vec<_> = iface.variants_named("Derived::loud").collect();
    assert_eq!(loud.len(), 2);
    assert_eq!(
        iface.resolve(loud[1], "except").body.as_deref(),
        Some("try { (arg1)->loud(); } catch (...) { log_unknown(); }")
    );
    assert!(iface.diagnostics().is_empty());
}
