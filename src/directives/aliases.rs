//! Builder-level aliases.
//!
//! Each alias is shorthand for a `%feature` directive on a fixed feature
//! name with a fixed value. The engine only ever sees the expanded form.
//!
//! ```text
//! %exception p %{ b %}     ->  %feature("except") p %{ b %}
//! %exception p;            ->  %feature("except", "") p;
//! %noexception p;          ->  %feature("except", "0") p;
//! %newobject p;            ->  %feature("new", "1") p;
//! %mutable p;              ->  %feature("immutable", "") p;
//! ```

use crate::api::COMPACT_DEFAULT_ARGS;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Value an alias contributes to the expanded directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasValue {
    /// Fixed value token.
    Set(&'static str),
    /// Empty value: clears an identical earlier directive.
    Clear,
    /// Enabled with the body that follows; without a body, a clear.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alias {
    pub directive: &'static str,
    pub feature: &'static str,
    pub value: AliasValue,
}

static ALIASES: Lazy<HashMap<&'static str, Alias>> = Lazy::new(|| {
    use AliasValue::{Body, Clear, Set};

    let table: &[(&'static str, &'static str, AliasValue)] = &[
        ("exception", "except", Body),
        ("noexception", "except", Set("0")),
        ("clearexception", "except", Clear),
        ("allowexception", "except:allowed", Set("1")),
        ("clearallowexception", "except:allowed", Clear),
        ("newobject", "new", Set("1")),
        ("nonewobject", "new", Set("0")),
        ("clearnewobject", "new", Clear),
        ("delobject", "del", Set("1")),
        ("nodelobject", "del", Set("0")),
        ("cleardelobject", "del", Clear),
        ("immutable", "immutable", Set("1")),
        ("mutable", "immutable", Clear),
        ("compactdefaultargs", COMPACT_DEFAULT_ARGS, Set("1")),
        ("nocompactdefaultargs", COMPACT_DEFAULT_ARGS, Set("0")),
        ("clearcompactdefaultargs", COMPACT_DEFAULT_ARGS, Clear),
    ];

    table.iter().map(|&(directive, feature, value)| (directive, Alias { directive, feature, value })).collect()
});

/// Alias for `%name`, written without the `%`.
pub fn lookup(directive: &str) -> Option<&'static Alias> {
    ALIASES.get(directive)
}

/// Every known alias, sorted by directive name.
pub fn all() -> Vec<&'static Alias> {
    let mut aliases: Vec<&'static Alias> = ALIASES.values().collect();
    aliases.sort_by_key(|a| a.directive);
    aliases
}

impl Alias {
    /// Value token of the expanded directive, given whether a body follows.
    pub fn value_token(&self, has_body: bool) -> &'static str {
        match self.value {
            AliasValue::Set(token) => token,
            AliasValue::Clear => "",
            AliasValue::Body if has_body => "1",
            AliasValue::Body => "",
        }
    }

    /// Whether this alias accepts a body.
    pub fn takes_body(&self) -> bool {
        self.value == AliasValue::Body
    }
}
