//! Host-side extensions: the `point` argument type and the commands that
//! only make sense with a runtime underneath (`WAIT`, `MOVE`).

use std::rc::Rc;
use std::time::Duration;

use cinder_terminal::{Command, CommandFuture, CommandSpec, Interpreter, TokenScratch, TypeRule};
use cinder_types::{ErrorCode, Payload, Result, Value};

pub const POINT_TYPE: &str = "point";

/// Variable `MOVE` writes the last position to.
pub const POSITION_VAR: &str = "POSITION";

/// Register the `point` type plus `WAIT` and `MOVE`.
pub fn register_host_commands(interp: &Interpreter) -> Result<()> {
    interp.register_type(Rc::new(PointType));
    interp.register_command(
        CommandSpec::new("WAIT", &["number"], WaitCmd)?.with_description("Pause for a number of seconds"),
    );
    interp.register_command(
        CommandSpec::new("MOVE", &["point"], MoveCmd)?.with_description("Move to an (x, y) position"),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// point type
// ---------------------------------------------------------------------------

/// `(x, y)` coordinate literal. Spaces are allowed inside the parentheses.
struct PointType;

impl TypeRule for PointType {
    fn name(&self) -> &str {
        POINT_TYPE
    }

    fn begin(&self, ch: char, scratch: &mut TokenScratch) -> bool {
        if ch != '(' {
            return false;
        }
        scratch.depth = 1;
        true
    }

    fn end(&self, ch: char, scratch: &mut TokenScratch) -> bool {
        match ch {
            '(' => scratch.depth += 1,
            ')' => scratch.depth = scratch.depth.saturating_sub(1),
            _ => {},
        }
        scratch.depth == 0
    }

    fn parse(&self, literal: &str) -> Value {
        let Some(inner) = literal.strip_prefix('(').and_then(|s| s.strip_suffix(')')) else {
            return Value::error("point must be wrapped in parentheses");
        };
        let coords: Vec<Option<f64>> = inner
            .split(',')
            .map(|part| part.trim().parse::<f64>().ok().filter(|n| n.is_finite()))
            .collect();
        match coords.as_slice() {
            [Some(x), Some(y)] => Value::new(
                Payload::List(vec![Payload::Number(*x), Payload::Number(*y)]),
                POINT_TYPE,
            ),
            _ => Value::error(format!("expected (x, y), got {literal}")),
        }
    }
}

fn point_coords(value: &Value) -> Option<(f64, f64)> {
    match value.payload() {
        Payload::List(items) => match items.as_slice() {
            [Payload::Number(x), Payload::Number(y)] => Some((*x, *y)),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// WAIT
// ---------------------------------------------------------------------------

struct WaitCmd;
impl Command for WaitCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, _interp: &'a Interpreter) -> CommandFuture<'a> {
        Box::pin(async move {
            let secs = args[0].as_number().ok_or(ErrorCode::ThrownError)?;
            let duration = Duration::try_from_secs_f64(secs).map_err(|e| {
                log::debug!("WAIT {secs}: {e}");
                ErrorCode::ThrownError
            })?;
            tokio::time::sleep(duration).await;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// MOVE
// ---------------------------------------------------------------------------

struct MoveCmd;
impl Command for MoveCmd {
    fn execute<'a>(&'a self, args: Vec<Value>, interp: &'a Interpreter) -> CommandFuture<'a> {
        let result = match point_coords(&args[0]) {
            Some((x, y)) => {
                log::info!("move to ({x}, {y})");
                interp.set_var(POSITION_VAR, args[0].payload().clone(), POINT_TYPE);
                interp.emit(format!("moved to {}", args[0]));
                Ok(())
            },
            None => Err(ErrorCode::ThrownError),
        };
        Box::pin(std::future::ready(result))
    }
}
