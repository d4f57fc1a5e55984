//! Line tokenizer driven by the type registry.
//!
//! A line is `NAME arg arg ...`. The command name runs up to the first
//! whitespace; every argument is claimed by the first registered type whose
//! `begin` accepts its first character and runs until that type's `end`
//! accepts a character. A synthetic trailing space flushes the final token.
//! A token closed by a non-whitespace character must still be followed by
//! whitespace before the next one starts.

use std::iter;
use std::rc::Rc;

use cinder_types::{ErrorCode, Value};

use crate::grammar::{TokenScratch, TypeRegistry, TypeRule};

/// A tokenized command invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    /// Uppercased command name.
    pub name: String,
    /// Arguments in source order.
    pub args: Vec<Value>,
}

/// The token currently being collected.
struct ActiveToken {
    rule: Rc<dyn TypeRule>,
    scratch: TokenScratch,
    literal: String,
}

impl ActiveToken {
    fn finish(self) -> Result<Value, ErrorCode> {
        let literal = self.literal.trim();
        let value = self.rule.parse(literal);
        if value.is_error() {
            log::debug!(
                "{}: cannot parse {literal:?}: {}",
                self.rule.name(),
                value.payload()
            );
            return Err(ErrorCode::SyntaxError);
        }
        if value.type_name() != self.rule.name() {
            log::debug!(
                "type '{}' produced a '{}' value",
                self.rule.name(),
                value.type_name()
            );
            return Err(ErrorCode::ParseFailure);
        }
        Ok(value.with_literal(literal))
    }
}

/// Tokenize one line.
///
/// Returns `Ok(None)` for blank lines and for lines whose first non-blank
/// character is `comment_marker`.
pub fn tokenize(
    line: &str,
    types: &TypeRegistry,
    comment_marker: char,
) -> Result<Option<ParsedCommand>, ErrorCode> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(comment_marker) {
        return Ok(None);
    }

    let (name, rest) = match trimmed.find(char::is_whitespace) {
        Some(split) => trimmed.split_at(split),
        None => (trimmed, ""),
    };

    let mut args = Vec::new();
    let mut active: Option<ActiveToken> = None;
    // Set when a token was closed by a non-whitespace char (e.g. a quote).
    let mut needs_separator = false;

    for ch in rest.chars().chain(iter::once(' ')) {
        if let Some(token) = active.as_mut() {
            token.literal.push(ch);
            if token.rule.end(ch, &mut token.scratch) {
                if let Some(done) = active.take() {
                    args.push(done.finish()?);
                }
                needs_separator = !ch.is_whitespace();
            }
            continue;
        }

        if needs_separator {
            if !ch.is_whitespace() {
                log::debug!("{ch:?} abuts the previous argument in {trimmed:?}");
                return Err(ErrorCode::UnknownType);
            }
            needs_separator = false;
        }

        // Blank arguments between separators are not tokens.
        if ch.is_whitespace() {
            continue;
        }

        let mut scratch = TokenScratch::default();
        let rule = types.claim(ch, &mut scratch).ok_or_else(|| {
            log::debug!("no type claims {ch:?} in {trimmed:?}");
            ErrorCode::UnknownType
        })?;
        active = Some(ActiveToken {
            rule,
            scratch,
            literal: ch.to_string(),
        });
    }

    if let Some(open) = active {
        log::debug!("unclosed {} argument {:?}", open.rule.name(), open.literal);
        return Err(ErrorCode::UnclosedArgument);
    }

    Ok(Some(ParsedCommand {
        name: name.to_uppercase(),
        args,
    }))
}
