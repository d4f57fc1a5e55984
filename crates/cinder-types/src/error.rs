//! Error types for Cinder.
//!
//! Two layers live here. [`CinderError`] covers host-level failures
//! (configuration, I/O, misuse of the engine such as starting a second
//! batch). [`ErrorCode`] is the stable integer taxonomy that tokenizing,
//! binding and command handlers report back to the host.

use std::fmt;
use std::io;

/// Errors produced by the Cinder framework outside of command execution.
#[derive(Debug, thiserror::Error)]
pub enum CinderError {
    #[error("interpreter busy: a batch is already running")]
    Busy,

    #[error("syntax declaration error: {0}")]
    Syntax(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("command error: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CinderError>;

/// Result of running a command line or a whole batch.
///
/// The numeric values are stable so hosts can branch on them. `0x8` is
/// intentionally unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    Success = 0x0,
    /// A handler signalled its own failure.
    ThrownError = 0x1,
    TypeMismatch = 0x2,
    TooManyArguments = 0x3,
    TooFewArguments = 0x4,
    /// No registered type claims a character.
    UnknownType = 0x5,
    /// End of line reached inside a token.
    UnclosedArgument = 0x6,
    /// A type recognised the token but could not parse it.
    SyntaxError = 0x7,
    UnknownCommand = 0x9,
    UnknownVariable = 0xA,
    /// A type produced a value tagged with a foreign type name.
    ParseFailure = 0xB,
}

impl ErrorCode {
    /// Every code, in numeric order.
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::Success,
        ErrorCode::ThrownError,
        ErrorCode::TypeMismatch,
        ErrorCode::TooManyArguments,
        ErrorCode::TooFewArguments,
        ErrorCode::UnknownType,
        ErrorCode::UnclosedArgument,
        ErrorCode::SyntaxError,
        ErrorCode::UnknownCommand,
        ErrorCode::UnknownVariable,
        ErrorCode::ParseFailure,
    ];

    /// Numeric value of the code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look a code up by its numeric value.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == ErrorCode::Success
    }

    /// Human-readable description for host-side messages.
    pub fn describe(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::ThrownError => "the command raised an error",
            ErrorCode::TypeMismatch => "argument type does not match the command syntax",
            ErrorCode::TooManyArguments => "too many arguments",
            ErrorCode::TooFewArguments => "too few arguments",
            ErrorCode::UnknownType => "unrecognised argument type",
            ErrorCode::UnclosedArgument => "unclosed argument",
            ErrorCode::SyntaxError => "syntax error in argument",
            ErrorCode::UnknownCommand => "unknown command",
            ErrorCode::UnknownVariable => "unknown variable",
            ErrorCode::ParseFailure => "argument could not be parsed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:X})", self.describe(), self.code())
    }
}

/// Host failures surfacing inside a handler are reported as thrown errors.
impl From<CinderError> for ErrorCode {
    fn from(err: CinderError) -> Self {
        log::debug!("handler failed: {err}");
        ErrorCode::ThrownError
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_error_display() {
        let e = CinderError::Busy;
        assert_eq!(
            format!("{e}"),
            "interpreter busy: a batch is already running"
        );
    }

    #[test]
    fn syntax_error_display() {
        let e = CinderError::Syntax("empty alternative".into());
        assert_eq!(format!("{e}"), "syntax declaration error: empty alternative");
    }

    #[test]
    fn config_error_display() {
        let e = CinderError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: CinderError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: CinderError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::Success.code(), 0x0);
        assert_eq!(ErrorCode::ThrownError.code(), 0x1);
        assert_eq!(ErrorCode::TypeMismatch.code(), 0x2);
        assert_eq!(ErrorCode::TooManyArguments.code(), 0x3);
        assert_eq!(ErrorCode::TooFewArguments.code(), 0x4);
        assert_eq!(ErrorCode::UnknownType.code(), 0x5);
        assert_eq!(ErrorCode::UnclosedArgument.code(), 0x6);
        assert_eq!(ErrorCode::SyntaxError.code(), 0x7);
        assert_eq!(ErrorCode::UnknownCommand.code(), 0x9);
        assert_eq!(ErrorCode::UnknownVariable.code(), 0xA);
        assert_eq!(ErrorCode::ParseFailure.code(), 0xB);
    }

    #[test]
    fn from_code_roundtrips_every_code() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
    }

    #[test]
    fn unassigned_code_is_none() {
        assert_eq!(ErrorCode::from_code(0x8), None);
        assert_eq!(ErrorCode::from_code(0xFF), None);
    }

    #[test]
    fn describe_is_never_empty() {
        for code in ErrorCode::ALL {
            assert!(!code.describe().is_empty(), "{code:?}");
        }
    }

    #[test]
    fn display_includes_hex_code() {
        assert_eq!(
            ErrorCode::UnknownVariable.to_string(),
            "unknown variable (0xA)"
        );
    }

    #[test]
    fn cinder_error_converts_to_thrown() {
        let code: ErrorCode = CinderError::Command("boom".into()).into();
        assert_eq!(code, ErrorCode::ThrownError);
    }

    #[test]
    fn default_is_success() {
        assert!(ErrorCode::default().is_success());
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn from_code_agrees_with_code(n in any::<u8>()) {
                if let Some(code) = ErrorCode::from_code(n) {
                    prop_assert_eq!(code.code(), n);
                } else {
                    prop_assert!(ErrorCode::ALL.iter().all(|c| c.code() != n));
                }
            }
        }
    }
}
