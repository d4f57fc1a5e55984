//! Command trait, registry, and batch execution.
//!
//! The [`Interpreter`] owns the type registry, the command registry, the
//! variable environment, and the state of the running batch. All state sits
//! behind `Cell`/`RefCell` so command handlers can read and modify it through
//! a shared reference while the batch is running.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::{self, Future};
use std::pin::Pin;
use std::rc::Rc;

use cinder_types::{CinderError, ErrorCode, InterpreterConfig, Payload, Result, Value};

use crate::binder::{self, ParamSpec, parse_syntax};
use crate::grammar::{TypeRegistry, TypeRule};
use crate::tokenizer::{ParsedCommand, tokenize};

/// Outcome of a command handler. `Ok(())` maps to [`ErrorCode::Success`].
pub type CommandResult = std::result::Result<(), ErrorCode>;

/// Deferred handler result, awaited by the batch runner before the next line.
pub type CommandFuture<'a> = Pin<Box<dyn Future<Output = CommandResult> + 'a>>;

/// Callback invoked once per run with the final code.
pub type CompletionHook = Box<dyn FnMut(ErrorCode)>;

/// A command handler.
///
/// Handlers receive their bound arguments positionally and may suspend; the
/// runner awaits the returned future before touching the next line.
pub trait Command {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a>;
}

/// Adapter turning a synchronous closure into a [`Command`].
pub struct FnCommand<F>(F);

impl<F> FnCommand<F> {
    pub fn new(f: F) -> Self
    where
        F: Fn(&Interpreter, &[Value]) -> CommandResult,
    {
        Self(f)
    }
}

impl<F> Command for FnCommand<F>
where
    F: Fn(&Interpreter, &[Value]) -> CommandResult,
{
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        Box::pin(future::ready((self.0)(interp, &args)))
    }
}

// ---------------------------------------------------------------------------
// Command specs
// ---------------------------------------------------------------------------

/// A registered command: name, declared syntax, handler, and help metadata.
#[derive(Clone)]
pub struct CommandSpec {
    name: String,
    syntax: Vec<ParamSpec>,
    handler: Rc<dyn Command>,
    description: String,
    listed: bool,
}

impl CommandSpec {
    /// Build a command from a syntax declaration such as
    /// `["variable", "number|string"]`.
    pub fn new<S, C>(name: &str, syntax: &[S], handler: C) -> Result<Self>
    where
        S: AsRef<str>,
        C: Command + 'static,
    {
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(CinderError::Syntax(format!("invalid command name '{name}'")));
        }
        Ok(Self {
            name: name.to_uppercase(),
            syntax: parse_syntax(syntax)?,
            handler: Rc::new(handler),
            description: String::new(),
            listed: true,
        })
    }

    /// Build a spec around a synchronous closure.
    pub fn from_fn<S, F>(name: &str, syntax: &[S], f: F) -> Result<Self>
    where
        S: AsRef<str>,
        F: Fn(&Interpreter, &[Value]) -> CommandResult + 'static,
    {
        Self::new(name, syntax, FnCommand::new(f))
    }

    /// One-line description for `HELP`.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Hide the command from [`Interpreter::command_names`].
    pub fn unlisted(mut self) -> Self {
        self.listed = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn syntax(&self) -> &[ParamSpec] {
        &self.syntax
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_listed(&self) -> bool {
        self.listed
    }

    /// Usage line, e.g. `SET variable any`.
    pub fn usage(&self) -> String {
        let mut out = self.name.clone();
        for param in &self.syntax {
            out.push(' ');
            out.push_str(&param.to_string());
        }
        out
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("syntax", &self.syntax)
            .field("description", &self.description)
            .field("listed", &self.listed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// Command interpreter with a sequential batch runner.
///
/// Only one batch may run at a time; a second `run_*` call made while one
/// is pending fails with [`CinderError::Busy`].
pub struct Interpreter {
    config: InterpreterConfig,
    types: RefCell<TypeRegistry>,
    commands: RefCell<HashMap<String, Rc<CommandSpec>>>,
    variables: RefCell<HashMap<String, Value>>,
    batch: RefCell<Vec<String>>,
    cursor: Cell<usize>,
    line: Cell<usize>,
    busy: Cell<bool>,
    last_command: RefCell<Option<ParsedCommand>>,
    last_error: Cell<ErrorCode>,
    completion: RefCell<Option<CompletionHook>>,
    output: RefCell<Vec<String>>,
}

/// Returns the interpreter to idle when a run finishes or is dropped.
struct RunGuard<'a> {
    interp: &'a Interpreter,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.interp.batch.borrow_mut().clear();
        self.interp.busy.set(false);
    }
}

impl Interpreter {
    /// Create an interpreter with the default configuration and the built-in
    /// argument types. No commands are registered.
    pub fn new() -> Self {
        Self::with_config(InterpreterConfig::default())
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self {
            config,
            types: RefCell::new(TypeRegistry::with_builtins()),
            commands: RefCell::new(HashMap::new()),
            variables: RefCell::new(HashMap::new()),
            batch: RefCell::new(Vec::new()),
            cursor: Cell::new(0),
            line: Cell::new(0),
            busy: Cell::new(false),
            last_command: RefCell::new(None),
            last_error: Cell::new(ErrorCode::Success),
            completion: RefCell::new(None),
            output: RefCell::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    // -- Registration --

    /// Add an argument type to the grammar.
    pub fn register_type(&self, rule: Rc<dyn TypeRule>) {
        self.types.borrow_mut().register(rule);
    }

    /// Registered type names in scan order.
    pub fn type_names(&self) -> Vec<String> {
        self.types
            .borrow()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register_command(&self, spec: CommandSpec) {
        let name = spec.name().to_string();
        if self.commands.borrow_mut().insert(name.clone(), Rc::new(spec)).is_some() {
            log::debug!("replaced command {name}");
        }
    }

    /// Look up a command by name (case-insensitive).
    pub fn command(&self, name: &str) -> Option<Rc<CommandSpec>> {
        self.commands.borrow().get(&name.to_uppercase()).cloned()
    }

    /// Names of listed commands, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .borrow()
            .values()
            .filter(|spec| spec.is_listed())
            .map(|spec| spec.name().to_string())
            .collect();
        names.sort();
        names
    }

    // -- Variable API --

    /// Create or overwrite a variable.
    pub fn set_var(&self, name: &str, payload: impl Into<Payload>, type_name: &str) {
        self.variables
            .borrow_mut()
            .insert(name.to_uppercase(), Value::new(payload, type_name));
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        self.variables.borrow().get(&name.to_uppercase()).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.variables.borrow().contains_key(&name.to_uppercase())
    }

    /// Remove a variable. Returns `true` if it existed.
    pub fn unset_var(&self, name: &str) -> bool {
        self.variables.borrow_mut().remove(&name.to_uppercase()).is_some()
    }

    /// All variables, sorted by name.
    pub fn variables(&self) -> Vec<(String, Value)> {
        let mut vars: Vec<(String, Value)> = self
            .variables
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars
    }

    // -- Cursor API --

    /// Index of the next line the runner will execute.
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    /// Redirect the running batch; the line at `line` runs next.
    pub fn set_cursor(&self, line: usize) {
        self.cursor.set(line);
    }

    /// Index of the line most recently started, kept after the run ends so a
    /// host can report where a batch failed.
    pub fn current_line(&self) -> usize {
        self.line.get()
    }

    /// Move the cursor past the last line so the batch ends successfully.
    pub fn halt(&self) {
        self.cursor.set(usize::MAX);
    }

    /// Number of lines in the running batch (0 when idle).
    pub fn batch_len(&self) -> usize {
        self.batch.borrow().len()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    // -- Introspection --

    /// The most recently tokenized command.
    pub fn last_command(&self) -> Option<ParsedCommand> {
        self.last_command.borrow().clone()
    }

    /// Final code of the most recent run.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error.get()
    }

    /// Install the hook called once at the end of every run.
    pub fn set_completion_hook<F>(&self, hook: F)
    where
        F: FnMut(ErrorCode) + 'static,
    {
        *self.completion.borrow_mut() = Some(Box::new(hook));
    }

    /// Append a line to the output buffer.
    pub fn emit(&self, line: impl Into<String>) {
        self.output.borrow_mut().push(line.into());
    }

    /// Drain the output buffer.
    pub fn take_output(&self) -> Vec<String> {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    // -- Execution --

    /// Tokenize a line with the registered types.
    pub fn interpret(&self, line: &str) -> std::result::Result<Option<ParsedCommand>, ErrorCode> {
        let parsed = tokenize(line, &self.types.borrow(), self.config.comment_marker)?;
        if let Some(cmd) = &parsed {
            *self.last_command.borrow_mut() = Some(cmd.clone());
        }
        Ok(parsed)
    }

    /// Bind a tokenized command against its declared syntax and run the handler.
    pub async fn execute(&self, parsed: &ParsedCommand) -> ErrorCode {
        let Some(spec) = self.command(&parsed.name) else {
            log::debug!("unknown command {}", parsed.name);
            return ErrorCode::UnknownCommand;
        };
        let args = match binder::bind(spec.syntax(), &parsed.args, |name| self.get_var(name)) {
            Ok(args) => args,
            Err(code) => return code,
        };
        match spec.handler.execute(args, self).await {
            Ok(()) => ErrorCode::Success,
            Err(code) => code,
        }
    }

    /// Run a single line.
    pub async fn run_line(&self, line: &str) -> Result<ErrorCode> {
        self.run_batch(&[line]).await
    }

    /// Run `lines` in order until the cursor passes the end or a line fails.
    ///
    /// Returns the final code, which is also recorded as [`last_error`] and
    /// passed to the completion hook.
    ///
    /// [`last_error`]: Interpreter::last_error
    pub async fn run_batch<S: AsRef<str>>(&self, lines: &[S]) -> Result<ErrorCode> {
        let guard = self.begin_run(lines.iter().map(|l| l.as_ref().to_string()).collect())?;
        log::debug!("running batch of {} line(s)", lines.len());
        let code = self.drive().await;
        drop(guard);
        log::debug!("batch finished: {code}");
        self.finish(code);
        Ok(code)
    }

    fn begin_run(&self, lines: Vec<String>) -> Result<RunGuard<'_>> {
        if self.busy.replace(true) {
            return Err(CinderError::Busy);
        }
        *self.batch.borrow_mut() = lines;
        *self.last_command.borrow_mut() = None;
        self.cursor.set(0);
        self.line.set(0);
        self.last_error.set(ErrorCode::Success);
        Ok(RunGuard { interp: self })
    }

    async fn drive(&self) -> ErrorCode {
        loop {
            let index = self.cursor.get();
            let Some(line) = self.batch.borrow().get(index).cloned() else {
                return ErrorCode::Success;
            };
            // Advance first so the handler can overwrite the cursor.
            self.cursor.set(index + 1);
            self.line.set(index);
            log::trace!("line {index}: {line}");

            let parsed = match self.interpret(&line) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => continue,
                Err(code) => return code,
            };
            let code = self.execute(&parsed).await;
            if !code.is_success() {
                return code;
            }
        }
    }

    fn finish(&self, code: ErrorCode) {
        self.last_error.set(code);
        let hook = self.completion.borrow_mut().take();
        if let Some(mut hook) = hook {
            hook(code);
            let mut slot = self.completion.borrow_mut();
            if slot.is_none() {
                *slot = Some(hook);
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
