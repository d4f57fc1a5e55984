//! Parsed argument values.
//!
//! A [`Value`] pairs a [`Payload`] with the name of the type that produced
//! it. Type names are plain strings so hosts can register their own argument
//! types; the sentinel tags below are reserved by the interpreter.

use std::fmt;

/// Tag of a value whose parse failed.
pub const ERROR_TYPE: &str = "error";
/// Tag of an unresolved `$name` reference.
pub const VARIABLE_TYPE: &str = "variable";
/// Parameter type that accepts every value.
pub const ANY_TYPE: &str = "any";

/// The datum carried by a [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Number(f64),
    Bool(bool),
    Text(String),
    List(Vec<Payload>),
    Empty,
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Number(n) => {
                // Integral numbers print without a fractional part.
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            },
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Text(s) => write!(f, "{s}"),
            Payload::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            },
            Payload::Empty => Ok(()),
        }
    }
}

impl From<f64> for Payload {
    fn from(n: f64) -> Self {
        Payload::Number(n)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Number(n as f64)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_string())
    }
}

/// A parsed argument tagged with the type that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    payload: Payload,
    type_name: String,
    literal: Option<String>,
}

impl Value {
    pub fn new(payload: impl Into<Payload>, type_name: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            type_name: type_name.into(),
            literal: None,
        }
    }

    /// Attach the source text the value was parsed from.
    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        self.literal = Some(literal.into());
        self
    }

    /// The parse-failure sentinel, carrying a reason.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::new(Payload::Text(reason.into()), ERROR_TYPE)
    }

    /// An unresolved reference to the variable `name` (no sigil).
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(Payload::Text(name.into()), VARIABLE_TYPE)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.type_name == ERROR_TYPE
    }

    pub fn is_variable(&self) -> bool {
        self.type_name == VARIABLE_TYPE
    }

    pub fn as_number(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a line index: a non-negative integral number.
    pub fn as_index(&self) -> Option<usize> {
        let n = self.as_number()?;
        (n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64).then_some(n as usize)
    }

    /// Name of the referenced variable, for `variable` values.
    pub fn variable_name(&self) -> Option<&str> {
        if self.is_variable() { self.as_text() } else { None }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_variable() {
            write!(f, "${}", self.payload)
        } else {
            write!(f, "{}", self.payload)
        }
    }
}
