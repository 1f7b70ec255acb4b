#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`FeatureEntry`](crate::FeatureEntry) from literal parts.
///
/// `value` defaults to `"1"`; `""` produces a clear and `"0"` a disable.
///
/// ```
/// use declmark::feature;
///
/// let entry = feature! {
///     name: "except",
///     pattern: "Object::allocate(int)",
///     body: "try { $action } catch (...) { throw; }",
///     attrs: { "throws" => "std::bad_alloc" },
/// };
/// assert_eq!(entry.feature_name(), "except");
/// ```
#[macro_export]
macro_rules! feature {
    (
        name: $name:expr,
        pattern: $pattern:expr
        $(, value: $value:expr)?
        $(, body: $body:expr)?
        $(, attrs: { $($key:expr => $val:expr),* $(,)? })?
        $(,)?
    ) => {{
        let pattern = $crate::FeaturePattern::parse($pattern).unwrap();
        let token: &str = "1";
        $(let token: &str = $value;)?
        #[allow(unused_mut)]
        let mut entry = $crate::FeatureEntry::new($name, pattern, $crate::FeatureValue::from_token(token));
        $(entry = entry.with_body($body);)?
        $($(entry = entry.with_attribute($key, $val);)*)?
        entry
    }};
}
