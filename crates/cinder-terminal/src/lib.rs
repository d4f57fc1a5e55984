//! Command interpreter for line-oriented scripts.
//!
//! Lines are split into a command name and typed arguments by a registry of
//! argument types, bound against the command's declared syntax, and
//! dispatched to registered handlers. A batch runs line by line, awaiting
//! each handler before the next, with a cursor handlers may redirect.

pub mod binder;
mod commands;
pub mod grammar;
mod interpreter;
pub mod tokenizer;

/// Register SET, UNSET, PRINT, GOTO, END and HELP into an interpreter.
pub use commands::register_builtins;
/// Built-in argument types and the rule trait for host-defined ones.
pub use grammar::{BuiltinType, TokenScratch, TypeRegistry, TypeRule};
/// Command handler trait and its sync-closure adapter.
pub use interpreter::{Command, CommandFuture, CommandResult, FnCommand};
/// A registered command with its declared syntax.
pub use interpreter::CommandSpec;
/// The interpreter and batch runner.
pub use interpreter::{CompletionHook, Interpreter};
/// A tokenized line.
pub use tokenizer::ParsedCommand;
