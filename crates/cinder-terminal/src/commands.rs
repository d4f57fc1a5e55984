//! Built-in commands: variables, output, and flow control.

use cinder_types::{ErrorCode, Result, Value};

use crate::interpreter::{Command, CommandFuture, CommandResult, CommandSpec, Interpreter};

/// Register the built-in commands into an interpreter.
pub fn register_builtins(interp: &Interpreter) -> Result<()> {
    interp.register_command(
        CommandSpec::new("SET", &["variable", "any"], SetCmd)?
            .with_description("Assign a value to a variable"),
    );
    interp.register_command(
        CommandSpec::new("UNSET", &["variable"], UnsetCmd)?.with_description("Remove a variable"),
    );
    interp.register_command(
        CommandSpec::new("PRINT", &["any"], PrintCmd)?.with_description("Write a value to the output"),
    );
    // Flow control.
    interp.register_command(
        CommandSpec::new("GOTO", &["number"], GotoCmd)?.with_description("Continue at a line index"),
    );
    interp.register_command(
        CommandSpec::new("END", &[] as &[&str], EndCmd)?.with_description("Stop the batch"),
    );
    interp.register_command(
        CommandSpec::new("HELP", &["?word"], HelpCmd)?.with_description("List commands or show usage"),
    );
    log::debug!("registered builtin commands");
    Ok(())
}

fn done<'a>(result: CommandResult) -> CommandFuture<'a> {
    Box::pin(std::future::ready(result))
}

// ---------------------------------------------------------------------------
// SET / UNSET
// ---------------------------------------------------------------------------

struct SetCmd;
impl Command for SetCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        let result = match (args[0].variable_name(), args.get(1)) {
            (Some(name), Some(value)) => {
                interp.set_var(name, value.payload().clone(), value.type_name());
                Ok(())
            },
            _ => Err(ErrorCode::ThrownError),
        };
        done(result)
    }
}

struct UnsetCmd;
impl Command for UnsetCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        let result = match args[0].variable_name() {
            Some(name) if interp.unset_var(name) => Ok(()),
            _ => Err(ErrorCode::UnknownVariable),
        };
        done(result)
    }
}

// ---------------------------------------------------------------------------
// PRINT
// ---------------------------------------------------------------------------

struct PrintCmd;
impl Command for PrintCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        interp.emit(args[0].to_string());
        done(Ok(()))
    }
}

// ---------------------------------------------------------------------------
// GOTO / END
// ---------------------------------------------------------------------------

struct GotoCmd;
impl Command for GotoCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        let result = match args[0].as_index() {
            Some(line) => {
                log::trace!("goto {line}");
                interp.set_cursor(line);
                Ok(())
            },
            None => Err(ErrorCode::ThrownError),
        };
        done(result)
    }
}

struct EndCmd;
impl Command for EndCmd {
    fn execute<'a>(&'a self, _args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        interp.halt();
        done(Ok(()))
    }
}

// ---------------------------------------------------------------------------
// HELP
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        let Some(topic) = args.first().and_then(Value::as_text) else {
            for name in interp.command_names() {
                let Some(spec) = interp.command(&name) else {
                    continue;
                };
                if spec.description().is_empty() {
                    interp.emit(spec.usage());
                } else {
                    interp.emit(format!("{:<24} {}", spec.usage(), spec.description()));
                }
            }
            return done(Ok(()));
        };
        let result = match interp.command(topic) {
            Some(spec) => {
                interp.emit(spec.usage());
                if !spec.description().is_empty() {
                    interp.emit(format!("  {}", spec.description()));
                }
                Ok(())
            },
            None => Err(ErrorCode::UnknownCommand),
        };
        done(result)
    }
}
