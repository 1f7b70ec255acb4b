//! Interface-script reader.
//!
//! Turns a small statement language into the ordered stream of items the
//! [`InterfaceBuilder`](crate::InterfaceBuilder) consumes. It is enough to
//! drive the engine end to end from a file; it is not a C/C++ parser.
//!
//! ```text
//! // directives
//! %feature("except") Object::allocate(int) %{ try { $action } catch (...) { throw; } %}
//! %feature("except", "0") Object::release;
//! %feature("docstring", "1", lang="python") Object { Allocates. }
//! %newobject Object::clone;
//!
//! // scopes and declarations
//! class Object : Base as PyObject;
//! method Object::allocate(int size, bool zero = false) -> void *;
//! inherited method Object::name() const -> char const *;
//! static Object::count() -> int;
//! member Object::size : size_t;
//! function hello(int i = 0, double d = 0.0) as hello_world;
//! variable verbose : bool;
//! ```
//!
//! Directive statements end with `;` or with a body, written `%{ ... %}` or
//! `{ ... }` (braces balanced). Comments are `//`, `/* */`, and `#` at the
//! start of a statement.

use super::aliases;
use crate::decl::{DeclKind, Declaration, QualifiedName, ScopePath, parse_parameter_list, split_parameter_list};
use crate::diagnostics::ScriptError;
use crate::engine::{Attributes, FeatureEntry, FeaturePattern, FeatureValue};

/// One statement of an interface script, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `class Name [: Base, ...] [as Target];`
    Scope { path: ScopePath, bases: Vec<ScopePath>, target_name: Option<String> },
    Declaration(Declaration),
    /// A `%feature` directive or an alias of one.
    Directive(FeatureEntry),
}

/// Read every item of `text`.
pub fn parse_script(text: &str) -> Result<Vec<Item>, ScriptError> {
    let mut reader = Reader { text, pos: 0 };
    let mut items = Vec::new();
    while let Some(item) = reader.next_item()? {
        items.push(item);
    }
    tracing::debug!(items = items.len(), "read interface script");
    Ok(items)
}

struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn line(&self) -> usize {
        line_at(self.text, self.pos)
    }

    fn skip_trivia(&mut self) -> Result<(), ScriptError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") || trimmed.starts_with('#') {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else if let Some(comment) = trimmed.strip_prefix("/*") {
                let end = comment.find("*/").ok_or(ScriptError::Unterminated { line: self.line(), what: "comment" })?;
                self.pos += end + 4;
            } else if trimmed.starts_with(';') {
                self.pos += 1;
            } else {
                return Ok(());
            }
        }
    }

    fn next_item(&mut self) -> Result<Option<Item>, ScriptError> {
        self.skip_trivia()?;
        if self.rest().is_empty() {
            return Ok(None);
        }

        let line = self.line();
        if self.rest().starts_with('%') {
            self.pos += 1;
            return self.directive(line).map(Some);
        }

        let statement = self.statement(line)?;
        parse_statement(statement, line).map(Some)
    }

    /// Text up to the next top-level `;`, which is consumed.
    fn statement(&mut self, line: usize) -> Result<&'a str, ScriptError> {
        let rest = self.rest();
        let mut depth = 0usize;
        for (i, b) in rest.bytes().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => {
                    self.pos += i + 1;
                    return Ok(&rest[..i]);
                }
                _ => {}
            }
        }
        Err(ScriptError::Unterminated { line, what: "statement (missing `;`)" })
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let found = regex!(r"^[A-Za-z_][A-Za-z0-9_]*").find(self.rest())?;
        self.pos += found.end();
        Some(found.as_str())
    }

    /// Text between a `(` at the cursor and its matching `)`, skipping
    /// parentheses inside string literals.
    fn parenthesized(&mut self, line: usize) -> Result<&'a str, ScriptError> {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        if !trimmed.starts_with('(') {
            return Err(ScriptError::Syntax { line, reason: "expected `(` after `%feature`".to_string() });
        }
        let start = rest.len() - trimmed.len();

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, b) in trimmed.bytes().enumerate() {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += start + i + 1;
                        return Ok(&trimmed[1..i]);
                    }
                }
                _ => {}
            }
        }
        Err(ScriptError::Unterminated { line, what: "`%feature(...)` argument list" })
    }

    /// Pattern text and optional body that follow a directive head.
    fn pattern_and_body(&mut self, line: usize) -> Result<(&'a str, Option<&'a str>), ScriptError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut depth = 0usize;
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b';' if depth == 0 => {
                    self.pos += i + 1;
                    return Ok((&rest[..i], None));
                }
                b'%' if depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                    let inner = &rest[i + 2..];
                    let end = inner.find("%}").ok_or(ScriptError::Unterminated { line, what: "`%{` body" })?;
                    self.pos += i + 2 + end + 2;
                    return Ok((&rest[..i], Some(inner[..end].trim())));
                }
                b'{' if depth == 0 => {
                    let end = matching_brace(&rest[i..]).ok_or(ScriptError::Unterminated { line, what: "`{` body" })?;
                    self.pos += i + end + 1;
                    return Ok((&rest[..i], Some(rest[i + 1..i + end].trim())));
                }
                b'%' | b'\n' if depth == 0 && starts_new_statement(&rest[i..]) => break,
                _ => {}
            }
            i += 1;
        }
        Err(ScriptError::Syntax { line, reason: "directive must end with `;` or a body".to_string() })
    }

    fn directive(&mut self, line: usize) -> Result<Item, ScriptError> {
        let name = self
            .identifier()
            .ok_or_else(|| ScriptError::Syntax { line, reason: "expected a directive name after `%`".to_string() })?;

        if name == "feature" {
            let args = self.parenthesized(line)?;
            let FeatureArgs { feature, value, attributes } = parse_feature_args(args, line)?;
            let (pattern, body) = self.pattern_and_body(line)?;
            let value = value.unwrap_or_else(|| "1".to_string());
            return build_entry(&feature, pattern, &value, body, attributes, line);
        }

        let alias =
            aliases::lookup(name).ok_or_else(|| ScriptError::UnknownDirective { line, name: name.to_string() })?;
        let (pattern, body) = self.pattern_and_body(line)?;
        if body.is_some() && !alias.takes_body() {
            return Err(ScriptError::Syntax { line, reason: format!("`%{name}` does not take a body") });
        }
        build_entry(alias.feature, pattern, alias.value_token(body.is_some()), body, Attributes::new(), line)
    }
}

fn line_at(text: &str, pos: usize) -> usize {
    text[..pos].bytes().filter(|&b| b == b'\n').count() + 1
}

/// Offset of the `}` closing the `{` that starts `text`.
fn matching_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// A line break or `%` followed by something that can only begin a new
/// statement, meaning the current directive lost its terminator.
fn starts_new_statement(text: &str) -> bool {
    let keyword = regex!(r"^\s*\n\s*(?:inherited|class|struct|function|method|static|variable|member)\s");
    regex!(r"^(?:%[A-Za-z_]|\s*\n\s*%[A-Za-z_])").is_match(text) || keyword.is_match(text)
}

fn build_entry(
    feature: &str,
    pattern: &str,
    value: &str,
    body: Option<&str>,
    attributes: Attributes,
    line: usize,
) -> Result<Item, ScriptError> {
    let pattern = FeaturePattern::parse(pattern).map_err(|source| ScriptError::Pattern { line, source })?;
    let mut entry = FeatureEntry::new(feature, pattern, FeatureValue::from_token(value));
    if let Some(body) = body {
        entry = entry.with_body(body);
    }
    for (key, value) in attributes {
        entry = entry.with_attribute(key, value);
    }
    Ok(Item::Directive(entry))
}

struct FeatureArgs {
    feature: String,
    value: Option<String>,
    attributes: Attributes,
}

/// `"name" [, "value"] [, key="value"]*`
fn parse_feature_args(args: &str, line: usize) -> Result<FeatureArgs, ScriptError> {
    let syntax = |reason: String| ScriptError::Syntax { line, reason };
    let mut parts = split_arguments(args).into_iter().map(str::trim);

    let feature = parts
        .next()
        .and_then(unquote)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| syntax("`%feature` needs a quoted feature name".to_string()))?;

    let mut value = None;
    let mut attributes = Attributes::new();
    for (n, part) in parts.enumerate() {
        if let Some(text) = unquote(part) {
            if n > 0 || value.is_some() {
                return Err(syntax(format!("unexpected value `{part}` in `%feature(\"{feature}\")`")));
            }
            value = Some(text);
            continue;
        }
        let caps = regex!(r#"^([A-Za-z_][A-Za-z0-9_:]*)\s*=\s*(".*")$"#)
            .captures(part)
            .ok_or_else(|| syntax(format!("expected `key=\"value\"`, found `{part}`")))?;
        let attr = unquote(&caps[2]).ok_or_else(|| syntax(format!("malformed attribute `{part}`")))?;
        attributes.insert(caps[1].to_string(), attr);
    }

    Ok(FeatureArgs { feature, value, attributes })
}

/// Split on commas outside string literals.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in text.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b',' if !in_string => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Contents of a `"..."` literal with `\"`, `\\`, `\n` and `\t` unescaped.
fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Some(out)
}

// --- Declarations -------------------------------------------------------------

fn parse_statement(text: &str, line: usize) -> Result<Item, ScriptError> {
    let syntax = |reason: String| ScriptError::Syntax { line, reason };
    let text = text.trim();

    let (inherited, text) = match split_keyword(text) {
        ("inherited", rest) => (true, rest),
        _ => (false, text),
    };
    let (keyword, rest) = split_keyword(text);
    let kind = match keyword {
        "class" | "struct" if !inherited => return parse_class(rest, line),
        "function" => DeclKind::Function,
        "method" => DeclKind::Method,
        "static" => DeclKind::StaticMethod,
        "variable" => DeclKind::Variable,
        "member" => DeclKind::MemberVariable,
        "" => return Err(syntax("empty statement".to_string())),
        other => return Err(syntax(format!("expected a declaration, found `{other}`"))),
    };
    if inherited && !kind.is_member() {
        return Err(syntax(format!("only members can be inherited, not a `{keyword}`")));
    }

    let (rest, symbol_name) = split_target_name(rest);
    let (name, params, is_const, ty) = if kind.is_callable() {
        split_callable(rest, line)?
    } else {
        let (name, ty) = match find_single_colon(rest) {
            Some(at) => (&rest[..at], Some(rest[at + 1..].trim())),
            None => (rest, None),
        };
        if name.contains('(') {
            return Err(syntax(format!("a `{keyword}` takes no parameter list")));
        }
        (name.trim(), None, false, ty)
    };

    let qualified = QualifiedName::parse(name);
    if qualified.leaf.is_empty() || qualified.leaf.contains(char::is_whitespace) {
        return Err(syntax(format!("`{name}` is not a declaration name")));
    }
    if kind.is_member() && qualified.scope.is_global() {
        return Err(syntax(format!("a `{keyword}` needs a scoped name such as `Class::{}`", qualified.leaf)));
    }
    if is_const && kind != DeclKind::Method {
        return Err(syntax(format!("only methods can be `const`, not `{name}`")));
    }

    let params = match params {
        Some(params) => parse_parameter_list(params)
            .map_err(|reason| ScriptError::Parameters { line, name: name.to_string(), reason })?,
        None => Vec::new(),
    };

    let mut decl = Declaration::new(kind, name).with_parameters(params);
    if let Some(ty) = ty.filter(|t| !t.is_empty()) {
        decl = decl.returns(ty);
    }
    if let Some(symbol) = symbol_name {
        decl = decl.renamed(symbol);
    }
    if is_const {
        decl = decl.const_qualified();
    }
    if inherited {
        decl = decl.inherited();
    }
    Ok(Item::Declaration(decl))
}

type CallableParts<'a> = (&'a str, Option<&'a str>, bool, Option<&'a str>);

/// `name[(params)] [const] [-> type]`
fn split_callable(text: &str, line: usize) -> Result<CallableParts<'_>, ScriptError> {
    let syntax = |reason: String| ScriptError::Syntax { line, reason };
    let (name, params, tail) = match split_parameter_list(text) {
        Some(Ok(parts)) => (parts.0.trim(), Some(parts.1), parts.2),
        Some(Err(reason)) => return Err(syntax(reason)),
        None => match text.find("->") {
            Some(at) => (text[..at].trim(), None, &text[at..]),
            None => (text.trim(), None, ""),
        },
    };

    let mut tail = tail.trim();
    let is_const = match split_keyword(tail) {
        ("const", rest) => {
            tail = rest;
            true
        }
        _ => false,
    };
    let ty = match tail {
        "" => None,
        _ => match tail.strip_prefix("->") {
            Some(ty) => Some(ty.trim()),
            None => return Err(syntax(format!("unexpected `{tail}` after `{name}`"))),
        },
    };
    Ok((name, params, is_const, ty))
}

/// `Name [: Base, ...] [as Target]`
fn parse_class(text: &str, line: usize) -> Result<Item, ScriptError> {
    let (text, target_name) = split_target_name(text);
    let (name, bases) = match find_single_colon(text) {
        Some(at) => (text[..at].trim(), Some(&text[at + 1..])),
        None => (text.trim(), None),
    };
    if name.is_empty() {
        return Err(ScriptError::Syntax { line, reason: "class without a name".to_string() });
    }

    let mut base_paths = Vec::new();
    for base in bases.map(crate::decl::split_top_level_commas).unwrap_or_default() {
        let base = regex!(r"^(?:(?:public|protected|private|virtual)\s+)*").replace(base.trim(), "");
        if base.is_empty() {
            return Err(ScriptError::Syntax { line, reason: format!("empty base in `class {name}`") });
        }
        base_paths.push(ScopePath::parse(&base));
    }

    Ok(Item::Scope {
        path: ScopePath::parse(name),
        bases: base_paths,
        target_name: target_name.map(str::to_string),
    })
}

/// First whitespace-delimited word and the trimmed rest.
fn split_keyword(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(at) => (&text[..at], text[at..].trim_start()),
        None => (text, ""),
    }
}

/// Strip a trailing `as Name`.
fn split_target_name(text: &str) -> (&str, Option<&str>) {
    match regex!(r"(?s)^(.*?)\s+as\s+([A-Za-z_][A-Za-z0-9_]*)\s*$").captures(text) {
        Some(caps) => match (caps.get(1), caps.get(2)) {
            (Some(head), Some(target)) => (head.as_str(), Some(target.as_str())),
            _ => (text, None),
        },
        None => (text, None),
    }
}

/// Byte offset of the first top-level `:` that is not part of `::`.
fn find_single_colon(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' => depth += 1,
            b'>' | b')' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                let prev = i.checked_sub(1).map(|j| bytes[j]);
                let next = bytes.get(i + 1).copied();
                if prev != Some(b':') && next != Some(b':') {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
