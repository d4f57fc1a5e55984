//! Foundation types for Cinder.
//!
//! This crate contains the types shared by the interpreter and its hosts:
//! parsed argument values, the stable error-code taxonomy, host-level
//! errors, and interpreter configuration.

pub mod config;
pub mod error;
pub mod value;

pub use config::InterpreterConfig;
pub use error::{CinderError, ErrorCode, Result};
pub use value::{ANY_TYPE, ERROR_TYPE, Payload, VARIABLE_TYPE, Value};
