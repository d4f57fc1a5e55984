//! Argument type grammar.
//!
//! Each argument type is a [`TypeRule`]: it recognises the first character
//! of a token, decides which later character closes it, and parses the
//! collected literal into a [`Value`]. The built-in rules form a closed
//! [`BuiltinType`] enum; hosts add their own rules by implementing the
//! trait. Rules are kept in a [`TypeRegistry`] ordered by priority.

use std::fmt;
use std::rc::Rc;

use cinder_types::{Payload, VARIABLE_TYPE, Value};

/// Per-token state threaded through `begin`/`end` calls.
///
/// A fresh record is created for every token and discarded once the token
/// has been parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenScratch {
    /// Character that opened the token, for types closed by a matching one.
    pub opener: Option<char>,
    /// The previous character was an escape.
    pub escaped: bool,
    /// Nesting depth for bracketed types.
    pub depth: u32,
}

/// A named lexical category of command argument.
pub trait TypeRule {
    /// Type name used in command syntax declarations and value tags.
    fn name(&self) -> &str;

    /// Scan priority; lower runs first. `None` sorts after every explicit
    /// priority, in registration order.
    fn priority(&self) -> Option<u32> {
        None
    }

    /// Whether `ch` can start a token of this type.
    fn begin(&self, ch: char, scratch: &mut TokenScratch) -> bool;

    /// Whether `ch` completes the token currently being collected.
    fn end(&self, ch: char, scratch: &mut TokenScratch) -> bool;

    /// Convert the collected literal into a value, or [`Value::error`].
    fn parse(&self, literal: &str) -> Value;
}

/// The argument types every interpreter starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// Decimal number, e.g. `42`, `-3.5`, `1e3`.
    Number,
    /// Single- or double-quoted text with backslash escapes.
    String,
    /// `$name` reference into the interpreter's variables.
    Variable,
    /// `t`, `true`, `f` or `false`, any case after the first letter.
    Bool,
    /// Operator such as `=`, `+=` or `>=`.
    Symbol,
    /// Bare identifier, e.g. `north`.
    Word,
}

impl BuiltinType {
    pub const ALL: [BuiltinType; 6] = [
        BuiltinType::Number,
        BuiltinType::String,
        BuiltinType::Variable,
        BuiltinType::Bool,
        BuiltinType::Symbol,
        BuiltinType::Word,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinType::Number => "number",
            BuiltinType::String => "string",
            BuiltinType::Variable => VARIABLE_TYPE,
            BuiltinType::Bool => "bool",
            BuiltinType::Symbol => "symbol",
            BuiltinType::Word => "word",
        }
    }

    /// Shared handle suitable for [`TypeRegistry::register`].
    pub fn rule(self) -> Rc<dyn TypeRule> {
        Rc::new(self)
    }
}

impl TypeRule for BuiltinType {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn priority(&self) -> Option<u32> {
        match self {
            BuiltinType::Number => Some(0),
            BuiltinType::String => Some(1),
            BuiltinType::Variable => Some(2),
            BuiltinType::Bool => Some(3),
            BuiltinType::Symbol => Some(4),
            BuiltinType::Word => None,
        }
    }

    fn begin(&self, ch: char, scratch: &mut TokenScratch) -> bool {
        match self {
            BuiltinType::Number => ch.is_ascii_digit() || matches!(ch, '-' | '.'),
            BuiltinType::String => {
                if ch == '"' || ch == '\'' {
                    scratch.opener = Some(ch);
                    true
                } else {
                    false
                }
            },
            BuiltinType::Variable => ch == '$',
            BuiltinType::Bool => matches!(ch, 't' | 'f'),
            BuiltinType::Symbol => SYMBOL_CHARS.contains(ch),
            BuiltinType::Word => ch.is_alphabetic() || ch == '_',
        }
    }

    fn end(&self, ch: char, scratch: &mut TokenScratch) -> bool {
        match self {
            BuiltinType::String => {
                if scratch.escaped {
                    scratch.escaped = false;
                    false
                } else if ch == '\\' {
                    scratch.escaped = true;
                    false
                } else {
                    scratch.opener == Some(ch)
                }
            },
            BuiltinType::Number
            | BuiltinType::Variable
            | BuiltinType::Bool
            | BuiltinType::Symbol
            | BuiltinType::Word => ch.is_whitespace(),
        }
    }

    fn parse(&self, literal: &str) -> Value {
        match self {
            BuiltinType::Number => parse_number(literal),
            BuiltinType::String => parse_string(literal),
            BuiltinType::Variable => parse_variable(literal),
            BuiltinType::Bool => parse_bool(literal),
            BuiltinType::Symbol => parse_symbol(literal),
            BuiltinType::Word => Value::new(literal, self.as_str()),
        }
    }
}

/// Characters that open a `symbol` token.
const SYMBOL_CHARS: &str = "+=-><*&^%!~/?|";

/// Operators accepted by the `symbol` type.
pub const OPERATORS: [&str; 22] = [
    "=", "+", "-", "/", "*", "&", "|", "^", "%", ">", "<", "==", "+=", "-=", "/=", "*=", "&=",
    "|=", "^=", "%=", ">=", "<=",
];

fn parse_number(literal: &str) -> Value {
    match literal.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::new(n, BuiltinType::Number.as_str()),
        _ => Value::error(format!("not a number: {literal}")),
    }
}

fn parse_string(literal: &str) -> Value {
    let mut chars = literal.chars();
    let (Some(open), Some(close)) = (chars.next(), chars.next_back()) else {
        return Value::error("unterminated string");
    };
    if open != close || !matches!(open, '"' | '\'') {
        return Value::error(format!("mismatched quotes: {literal}"));
    }
    let mut text = String::with_capacity(literal.len());
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some(c @ ('\\' | '"' | '\'')) => text.push(c),
            Some(other) => {
                text.push('\\');
                text.push(other);
            },
            None => text.push('\\'),
        }
    }
    Value::new(Payload::Text(text), BuiltinType::String.as_str())
}

fn parse_bool(literal: &str) -> Value {
    match literal.to_ascii_lowercase().as_str() {
        "t" | "true" => Value::new(Payload::Bool(true), BuiltinType::Bool.as_str()),
        "f" | "false" => Value::new(Payload::Bool(false), BuiltinType::Bool.as_str()),
        _ => Value::error(format!("not a bool: {literal}")),
    }
}

fn parse_symbol(literal: &str) -> Value {
    if OPERATORS.contains(&literal) {
        Value::new(literal, BuiltinType::Symbol.as_str())
    } else {
        Value::error(format!("unknown operator: {literal}"))
    }
}

fn parse_variable(literal: &str) -> Value {
    let name = literal.strip_prefix('$').unwrap_or(literal);
    if name.is_empty() {
        return Value::error("empty variable name");
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Value::error(format!("invalid variable name: {name}"));
    }
    Value::variable(name)
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Priority-ordered collection of type rules.
///
/// Ordering: ascending explicit priority with ties in registration order,
/// then every rule without a priority in registration order. Duplicates are
/// accepted; the earlier entry wins during scanning.
#[derive(Clone, Default)]
pub struct TypeRegistry {
    rules: Vec<Rc<dyn TypeRule>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every [`BuiltinType`].
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in BuiltinType::ALL {
            registry.register(builtin.rule());
        }
        registry
    }

    /// Insert a rule, keeping the priority ordering.
    pub fn register(&mut self, rule: Rc<dyn TypeRule>) {
        let index = match rule.priority() {
            None => self.rules.len(),
            Some(priority) => self
                .rules
                .iter()
                .position(|r| r.priority().is_none_or(|p| p > priority))
                .unwrap_or(self.rules.len()),
        };
        log::debug!("registered type '{}' at position {index}", rule.name());
        self.rules.insert(index, rule);
    }

    /// Find the first rule whose `begin` accepts `ch`.
    ///
    /// Each candidate sees a fresh scratch record; the winner's record is
    /// written back to `scratch`.
    pub fn claim(&self, ch: char, scratch: &mut TokenScratch) -> Option<Rc<dyn TypeRule>> {
        for rule in &self.rules {
            let mut trial = TokenScratch::default();
            if rule.begin(ch, &mut trial) {
                *scratch = trial;
                return Some(Rc::clone(rule));
            }
        }
        None
    }

    /// Rules in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<dyn TypeRule>> {
        self.rules.iter()
    }

    /// Type names in scan order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name() == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
