//! Declaration model.
//!
//! A [`Declaration`] is one emittable unit handed over by the header parser:
//! a qualified name, a kind, a parameter list (with trailing defaults) and a
//! few flags. Declarations are immutable once built. The generator never
//! emits a `Declaration` directly; it emits [`Variant`]s, which are views on a
//! declaration cut down to one concrete arity (see `engine/expand.rs`).
//!
//! ```text
//! Declaration  hello(int = 0, double = 0.0)
//!   ├─ Variant arity 2   hello(int, double)
//!   ├─ Variant arity 1   hello(int)
//!   └─ Variant arity 0   hello()
//! ```
//!
//! Scope inheritance is kept out of the declarations themselves and lives in
//! the [`ScopeGraph`]: each scope knows its bases and the member names it
//! declares, which is all the matcher needs to decide whether `Derived::m`
//! is inherited from `Base::m`.
//!
//! Type descriptors are normalized on construction so that textual variants
//! of the same type compare equal:
//!
//! ```text
//! "const char*"     -> "char const *"
//! "std::map<int,T>" -> "std::map<int, T>"
//! "int&&"           -> "int &&"
//! ```

use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

// --- Types --------------------------------------------------------------------

/// A normalized C/C++ type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeDesc(String);

impl TypeDesc {
    /// Normalize `text` into a type descriptor.
    pub fn parse(text: &str) -> TypeDesc {
        let mut tokens = type_tokens(text);
        hoist_leading_qualifiers(&mut tokens);
        TypeDesc(join_type_tokens(&tokens))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_void(&self) -> bool {
        self.0 == "void"
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn type_tokens(text: &str) -> Vec<&str> {
    regex!(r"::|&&|\.\.\.|[A-Za-z_][A-Za-z0-9_]*|[0-9]+|\S").find_iter(text).map(|m| m.as_str()).collect()
}

const QUALIFIERS: &[&str] = &["const", "volatile"];

/// Move leading cv-qualifiers behind the base type: `const char *` reads as
/// `char const *`.
fn hoist_leading_qualifiers(tokens: &mut Vec<&str>) {
    let leading = tokens.iter().take_while(|t| QUALIFIERS.contains(t)).count();
    if leading == 0 {
        return;
    }

    let mut depth = 0usize;
    let mut end = leading;
    while end < tokens.len() {
        match tokens[end] {
            "<" | "(" => depth += 1,
            ">" | ")" => depth = depth.saturating_sub(1),
            "*" | "&" | "&&" | "[" if depth == 0 => break,
            _ => {}
        }
        end += 1;
    }
    if end == leading {
        return;
    }

    let qualifiers: Vec<&str> = tokens.drain(..leading).collect();
    let insert_at = end - leading;
    for (offset, q) in qualifiers.into_iter().enumerate() {
        tokens.insert(insert_at + offset, q);
    }
}

fn join_type_tokens(tokens: &[&str]) -> String {
    let mut out = String::new();
    let mut prev: Option<&str> = None;
    for &tok in tokens {
        if let Some(p) = prev {
            if needs_space(p, tok) {
                out.push(' ');
            }
        }
        out.push_str(tok);
        prev = Some(tok);
    }
    out
}

fn needs_space(prev: &str, next: &str) -> bool {
    const TIGHT_AFTER: &[&str] = &["::", "<", "(", "["];
    const TIGHT_BEFORE: &[&str] = &["::", "<", ">", ",", ")", "[", "]"];

    if TIGHT_AFTER.contains(&prev) || TIGHT_BEFORE.contains(&next) {
        return false;
    }
    !matches!((prev, next), ("*", "*") | (")", "("))
}

// --- Parameters -------------------------------------------------------------

/// One parameter: a type and, for trailing parameters, a default expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub ty: TypeDesc,
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(ty: &str) -> Self {
        Parameter { ty: TypeDesc::parse(ty), default: None }
    }

    pub fn with_default(ty: &str, default: &str) -> Self {
        Parameter { ty: TypeDesc::parse(ty), default: Some(normalize_expr(default)) }
    }

    /// Parse `int i = 0` / `char const *` style text. A trailing parameter
    /// name is dropped; it never takes part in matching.
    pub fn parse(text: &str) -> Option<Self> {
        let (ty, default) = match split_top_level_assign(text) {
            Some((ty, default)) => (ty, Some(default)),
            None => (text, None),
        };

        let mut tokens = type_tokens(ty);
        strip_parameter_name(&mut tokens);
        if tokens.is_empty() {
            return None;
        }

        let mut ty = tokens;
        hoist_leading_qualifiers(&mut ty);
        let ty = TypeDesc(join_type_tokens(&ty));

        match default {
            Some(expr) if expr.trim().is_empty() => None,
            Some(expr) => Some(Parameter { ty, default: Some(normalize_expr(expr)) }),
            None => Some(Parameter { ty, default: None }),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "{} = {}", self.ty, default),
            None => write!(f, "{}", self.ty),
        }
    }
}

fn normalize_expr(expr: &str) -> String {
    expr.split_whitespace().collect::<Vec<_>>().join(" ")
}

const BUILTIN_WORDS: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char16_t", "char32_t", "short", "int", "long", "float", "double", "signed",
    "unsigned", "const", "volatile", "struct", "class", "enum", "union", "typename",
];

fn strip_parameter_name(tokens: &mut Vec<&str>) {
    let mut depth = 0usize;
    let mut top_level_words = 0usize;
    for tok in tokens.iter() {
        match *tok {
            "<" | "(" => depth += 1,
            ">" | ")" => depth = depth.saturating_sub(1),
            t if depth == 0 && is_identifier(t) && !QUALIFIERS.contains(&t) => top_level_words += 1,
            _ => {}
        }
    }

    let Some(&last) = tokens.last() else {
        return;
    };
    if top_level_words < 2 && !matches!(tokens.len().checked_sub(2).map(|i| tokens[i]), Some("*" | "&" | "&&")) {
        return;
    }
    if !is_identifier(last) || BUILTIN_WORDS.contains(&last) {
        return;
    }
    if let Some(prev) = tokens.len().checked_sub(2).map(|i| tokens[i]) {
        if prev == "::" || matches!(prev, "struct" | "class" | "enum" | "union" | "typename") {
            return;
        }
    }
    tokens.pop();
}

fn is_identifier(tok: &str) -> bool {
    tok.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Split `text` at its first top-level `=` (not part of `==`, `<=`, ...).
fn split_top_level_assign(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' | b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => {
                let prev = i.checked_sub(1).map(|j| bytes[j]);
                let next = bytes.get(i + 1).copied();
                if !matches!(prev, Some(b'=' | b'!' | b'<' | b'>')) && next != Some(b'=') {
                    return Some((&text[..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `text` on commas that are not nested inside `<>`, `()`, `[]` or `{}`.
pub(crate) fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' | b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Parse the text between the parentheses of a parameter list.
///
/// `()` and `(void)` are both the empty list. Returns an error message when a
/// parameter is empty or a defaulted parameter is followed by one without a
/// default.
pub(crate) fn parse_parameter_list(text: &str) -> Result<Vec<Parameter>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return Ok(Vec::new());
    }

    let mut params = Vec::new();
    for piece in split_top_level_commas(trimmed) {
        let param = Parameter::parse(piece).ok_or_else(|| format!("empty parameter in `({trimmed})`"))?;
        if param.default.is_none() && params.last().is_some_and(|p: &Parameter| p.default.is_some()) {
            return Err(format!("parameter `{}` follows a defaulted parameter", param.ty));
        }
        params.push(param);
    }
    Ok(params)
}

/// Split `name(params) rest` at its outermost parameter list.
///
/// Handles `operator()` so that its own parentheses are kept in the name.
/// Returns `None` when there is no parameter list, and `Err` when the
/// parentheses are unbalanced.
pub(crate) fn split_parameter_list(text: &str) -> Option<Result<(&str, &str, &str), String>> {
    let search_from = match regex!(r"(?:^|::|\s)operator\b").find(text) {
        Some(m) => {
            let after = text[m.end()..].trim_start();
            if after.starts_with("()") { text.len() - after.len() + 2 } else { m.end() }
        }
        None => 0,
    };

    let open = search_from + text[search_from..].find('(')?;
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(Ok((&text[..open], &text[open + 1..i], &text[i + 1..])));
                }
            }
            _ => {}
        }
    }
    Some(Err(format!("unbalanced parentheses in `{}`", text.trim())))
}

// --- Names and scopes ---------------------------------------------------------

/// A scope path such as `ns::Outer::Inner`; the empty path is the global scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopePath(Vec<String>);

impl ScopePath {
    pub fn global() -> Self {
        ScopePath(Vec::new())
    }

    pub fn parse(text: &str) -> Self {
        ScopePath(split_scope_segments(text).into_iter().map(str::to_string).filter(|s| !s.is_empty()).collect())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScopePath(segments.into_iter().map(Into::into).collect())
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The enclosing scope, or `None` for the global scope.
    pub fn parent(&self) -> Option<ScopePath> {
        if self.0.is_empty() { None } else { Some(ScopePath(self.0[..self.0.len() - 1].to_vec())) }
    }

    /// Scope segments joined with `_`, used for wrapper names.
    pub fn mangled(&self) -> String {
        self.0.iter().map(|s| mangle_segment(s)).collect::<Vec<_>>().join("_")
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

fn mangle_segment(segment: &str) -> String {
    segment.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

fn split_scope_segments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                parts.push(text[start..i].trim());
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(text[start..].trim());
    parts
}

/// Scope path plus leaf symbol name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub scope: ScopePath,
    pub leaf: String,
}

impl QualifiedName {
    pub fn new(scope: ScopePath, leaf: impl Into<String>) -> Self {
        QualifiedName { scope, leaf: leaf.into() }
    }

    /// Parse `A::B::leaf`. A leading `::` is accepted and ignored.
    pub fn parse(text: &str) -> Self {
        let mut segments = split_scope_segments(text.trim());
        let leaf = segments.pop().unwrap_or_default().to_string();
        let scope = ScopePath(segments.into_iter().filter(|s| !s.is_empty()).map(str::to_string).collect());
        QualifiedName { scope, leaf }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_global() { f.write_str(&self.leaf) } else { write!(f, "{}::{}", self.scope, self.leaf) }
    }
}

// --- Declarations -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Function,
    Method,
    StaticMethod,
    Variable,
    MemberVariable,
}

impl DeclKind {
    pub fn is_callable(self) -> bool {
        matches!(self, DeclKind::Function | DeclKind::Method | DeclKind::StaticMethod)
    }

    /// Members are the kinds that can be inherited through a scope's bases.
    pub fn is_member(self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::StaticMethod | DeclKind::MemberVariable)
    }

    /// Instance members receive the object as their first wrapper argument.
    pub fn has_receiver(self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::MemberVariable)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::StaticMethod => "static",
            DeclKind::Variable => "variable",
            DeclKind::MemberVariable => "member",
        }
    }
}

bitflags! {
    /// Qualifiers and origin markers on a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u8 {
        /// Member copied into a derived scope from one of its bases.
        const INHERITED = 1 << 0;
        /// `const`-qualified method.
        const CONST     = 1 << 1;
    }
}

/// One declaration as produced by the header parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    name: QualifiedName,
    kind: DeclKind,
    params: Vec<Parameter>,
    return_type: Option<TypeDesc>,
    symbol_name: Option<String>,
    flags: DeclFlags,
    position: Option<u64>,
}

impl Declaration {
    pub fn new(kind: DeclKind, qualified_name: &str) -> Self {
        Declaration {
            name: QualifiedName::parse(qualified_name),
            kind,
            params: Vec::new(),
            return_type: None,
            symbol_name: None,
            flags: DeclFlags::empty(),
            position: None,
        }
    }

    pub fn function(name: &str) -> Self {
        Self::new(DeclKind::Function, name)
    }

    pub fn method(name: &str) -> Self {
        Self::new(DeclKind::Method, name)
    }

    pub fn static_method(name: &str) -> Self {
        Self::new(DeclKind::StaticMethod, name)
    }

    pub fn variable(name: &str) -> Self {
        Self::new(DeclKind::Variable, name)
    }

    pub fn member_variable(name: &str) -> Self {
        Self::new(DeclKind::MemberVariable, name)
    }

    pub fn param(self, ty: &str) -> Self {
        self.with_parameter(Parameter::new(ty))
    }

    pub fn param_default(self, ty: &str, default: &str) -> Self {
        self.with_parameter(Parameter::with_default(ty, default))
    }

    /// Append a parameter.
    ///
    /// # Panics
    ///
    /// Panics when the type is empty or when a parameter without a default
    /// follows a defaulted one.
    pub fn with_parameter(mut self, param: Parameter) -> Self {
        assert!(!param.ty.is_empty(), "parameter of `{}` has an empty type", self.name);
        assert!(
            param.default.is_some() || self.params.last().is_none_or(|p| p.default.is_none()),
            "`{}`: only trailing parameters may have defaults",
            self.name
        );
        self.params.push(param);
        self
    }

    pub fn with_parameters(self, params: impl IntoIterator<Item = Parameter>) -> Self {
        params.into_iter().fold(self, Self::with_parameter)
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_type = Some(TypeDesc::parse(ty));
        self
    }

    /// Target-language name, when it differs from the C/C++ leaf name.
    pub fn renamed(mut self, symbol_name: &str) -> Self {
        self.symbol_name = Some(symbol_name.to_string());
        self
    }

    pub fn inherited(mut self) -> Self {
        self.flags |= DeclFlags::INHERITED;
        self
    }

    pub fn const_qualified(mut self) -> Self {
        self.flags |= DeclFlags::CONST;
        self
    }

    pub(crate) fn at_position(mut self, position: u64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn leaf_name(&self) -> &str {
        &self.name.leaf
    }

    pub fn scope(&self) -> &ScopePath {
        &self.name.scope
    }

    /// Enclosing scopes, innermost first. The global scope is not listed.
    pub fn scope_chain(&self) -> Vec<ScopePath> {
        std::iter::successors(Some(self.name.scope.clone()), ScopePath::parent).filter(|s| !s.is_global()).collect()
    }

    pub fn signature(&self) -> &[Parameter] {
        &self.params
    }

    pub fn kind(&self) -> DeclKind {
        self.kind
    }

    pub fn flags(&self) -> DeclFlags {
        self.flags
    }

    pub fn is_inherited(&self) -> bool {
        self.flags.contains(DeclFlags::INHERITED)
    }

    pub fn is_const(&self) -> bool {
        self.flags.contains(DeclFlags::CONST)
    }

    pub fn return_type(&self) -> Option<&TypeDesc> {
        self.return_type.as_ref()
    }

    pub fn symbol_name(&self) -> &str {
        self.symbol_name.as_deref().unwrap_or(&self.name.leaf)
    }

    /// Position in the interleaved declaration/directive stream, once registered.
    pub fn position(&self) -> Option<u64> {
        self.position
    }

    pub fn has_defaults(&self) -> bool {
        self.params.iter().any(|p| p.default.is_some())
    }

    /// Number of parameters without a default.
    pub fn required_arity(&self) -> usize {
        self.params.iter().take_while(|p| p.default.is_none()).count()
    }
}

// --- Variants -----------------------------------------------------------------

/// One concrete overload/default-argument instance of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    decl: Arc<Declaration>,
    arity: usize,
    overload: Option<usize>,
}

impl Variant {
    pub(crate) fn new(decl: Arc<Declaration>, arity: usize) -> Self {
        debug_assert!(arity <= decl.params.len() && arity >= decl.required_arity());
        Variant { decl, arity, overload: None }
    }

    /// The full-arity variant of `decl`, outside any overload set.
    pub fn of(decl: Declaration) -> Self {
        let arity = decl.params.len();
        Variant { decl: Arc::new(decl), arity, overload: None }
    }

    pub fn with_overload(mut self, index: usize) -> Self {
        self.overload = Some(index);
        self
    }

    pub(crate) fn set_overload(&mut self, index: Option<usize>) {
        self.overload = index;
    }

    pub fn declaration(&self) -> &Declaration {
        &self.decl
    }

    pub fn qualified_name(&self) -> &QualifiedName {
        self.decl.qualified_name()
    }

    pub fn leaf_name(&self) -> &str {
        self.decl.leaf_name()
    }

    pub fn scope(&self) -> &ScopePath {
        self.decl.scope()
    }

    pub fn scope_chain(&self) -> Vec<ScopePath> {
        self.decl.scope_chain()
    }

    pub fn kind(&self) -> DeclKind {
        self.decl.kind()
    }

    pub fn is_const(&self) -> bool {
        self.decl.is_const()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Parameters of this variant: the declared list cut to `arity`.
    pub fn signature(&self) -> &[Parameter] {
        &self.decl.params[..self.arity]
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &TypeDesc> {
        self.signature().iter().map(|p| &p.ty)
    }

    pub fn overload_index(&self) -> Option<usize> {
        self.overload
    }

    /// Position of the underlying declaration in the directive stream.
    pub fn position(&self) -> Option<u64> {
        self.decl.position()
    }

    /// True when this variant was produced by expanding `base`'s default
    /// arguments (the full-arity variant included).
    pub fn is_default_arg_variant_of(&self, base: &Declaration) -> bool {
        base.has_defaults() && *self.decl == *base
    }

    /// True for the variants that drop at least one defaulted parameter.
    pub fn is_reduced(&self) -> bool {
        self.arity < self.decl.params.len()
    }
}

// --- Scope graph --------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct ScopeNode {
    bases: Vec<ScopePath>,
    members: HashSet<String>,
    target_name: Option<String>,
}

/// Scopes with their base links and declared member names.
#[derive(Debug, Clone, Default)]
pub struct ScopeGraph {
    scopes: HashMap<ScopePath, ScopeNode>,
}

impl ScopeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `scope` with the given bases. Redeclaring adds bases.
    pub fn declare_scope(&mut self, scope: ScopePath, bases: impl IntoIterator<Item = ScopePath>) {
        let node = self.scopes.entry(scope).or_default();
        for base in bases {
            if !node.bases.contains(&base) {
                node.bases.push(base);
            }
        }
    }

    /// Give `scope` a target-language name.
    pub fn rename_scope(&mut self, scope: ScopePath, target_name: &str) {
        self.scopes.entry(scope).or_default().target_name = Some(target_name.to_string());
    }

    pub fn declare_member(&mut self, scope: &ScopePath, name: &str) {
        self.scopes.entry(scope.clone()).or_default().members.insert(name.to_string());
    }

    /// Record a declaration's leaf name as a member of its scope, unless the
    /// declaration was copied in from a base.
    pub fn record(&mut self, decl: &Declaration) {
        if decl.kind().is_member() && !decl.is_inherited() {
            self.declare_member(decl.scope(), decl.leaf_name());
        }
    }

    pub fn bases(&self, scope: &ScopePath) -> &[ScopePath] {
        self.scopes.get(scope).map(|n| n.bases.as_slice()).unwrap_or(&[])
    }

    pub fn declares(&self, scope: &ScopePath, name: &str) -> bool {
        self.scopes.get(scope).is_some_and(|n| n.members.contains(name))
    }

    /// Target-language name of `scope`: the rename if any, else its last segment.
    pub fn target_name(&self, scope: &ScopePath) -> String {
        self.scopes
            .get(scope)
            .and_then(|n| n.target_name.clone())
            .or_else(|| scope.last().map(str::to_string))
            .unwrap_or_default()
    }

    /// Bases that supply `member` to `scope` by inheritance, with their
    /// distance (1 = direct base). Empty when `scope` declares `member` itself.
    ///
    /// The walk is breadth-first and stops climbing a branch at the first
    /// scope that declares the member.
    ///
    /// ```text
    /// Base { m }        Base is a provider of m for Derived (depth 2)
    ///   └─ Mid          Mid does not declare m, keep climbing
    ///        └─ Derived
    /// ```
    pub fn inherited_providers<'a>(&'a self, scope: &'a ScopePath, member: &str) -> Vec<(&'a ScopePath, usize)> {
        let mut found = Vec::new();
        if self.declares(scope, member) {
            return found;
        }

        let mut seen: HashSet<&ScopePath> = HashSet::from([scope]);
        let mut queue: VecDeque<(&ScopePath, usize)> = self.bases(scope).iter().map(|b| (b, 1)).collect();
        while let Some((base, depth)) = queue.pop_front() {
            if !seen.insert(base) {
                continue;
            }
            if self.declares(base, member) {
                found.push((base, depth));
                continue;
            }
            queue.extend(self.bases(base).iter().map(|b| (b, depth + 1)));
        }
        found
    }
}
