//! Built-in functions: `print`, `read_int`, `read_line`, `length`,
//! `left`, `right`, `mid`, `instr`.
//!
//! These are checked *before* the user's own function table on every
//! call — a Pebble program that declares its own `print` still gets the
//! built-in. There's no way to opt out; the language has no import or
//! visibility system to shadow these with (see the evaluator's Non-goals).
//!
//! String slicing (`left`, `right`, `mid`) and [`instr`] copy the host
//! language's slice semantics exactly: negative lengths and out-of-range
//! offsets clamp rather than panic, the way a `str[a:b]` slice would.

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use pebble_util::RuntimeError;

use crate::value::Value;

pub fn is_builtin(name: &str) -> bool {
    matches!(
        name,
        "print" | "read_int" | "read_line" | "length" | "left" | "right" | "mid" | "instr"
    )
}

pub fn call(name: &str, args: Vec<Value>) -> Result<Value, RuntimeError> {
    match name {
        "print" => print_fn(args),
        "read_int" => read_int(args),
        "read_line" => read_line(args),
        "length" => length(args),
        "left" => left(args),
        "right" => right(args),
        "mid" => mid(args),
        "instr" => instr(args),
        other => unreachable!("call() dispatched on non-builtin name '{other}'"),
    }
}

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() != expected {
        return Err(RuntimeError::new(format!(
            "'{name}' expects {expected} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn expect_str(name: &str, value: &Value) -> Result<Rc<str>, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(RuntimeError::new(format!(
            "'{name}' expects a string argument, got {}",
            other.type_name()
        ))),
    }
}

fn expect_int(name: &str, value: &Value) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(RuntimeError::new(format!(
            "'{name}' expects an int argument, got {}",
            other.type_name()
        ))),
    }
}

fn print_fn(mut args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("print", &args, 1)?;
    let value = args.pop().unwrap();
    let mut stdout = io::stdout();
    let _ = writeln!(stdout, "{value}");
    Ok(Value::Absent)
}

fn read_stdin_line() -> Result<Option<String>, RuntimeError> {
    let mut line = String::new();
    let n = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RuntimeError::new(format!("failed to read from stdin: {e}")))?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

fn read_int(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("read_int", &args, 0)?;
    match read_stdin_line()? {
        None => Err(RuntimeError::new("end of input")),
        Some(line) => Ok(Value::Int(line.trim().parse::<i64>().unwrap_or(0))),
    }
}

fn read_line(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("read_line", &args, 0)?;
    match read_stdin_line()? {
        None => Err(RuntimeError::new("end of input")),
        Some(line) => Ok(Value::Str(Rc::from(line))),
    }
}

fn length(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("length", &args, 1)?;
    let s = expect_str("length", &args[0])?;
    Ok(Value::Int(s.chars().count() as i64))
}

/// Clamps a character count `n` into `0..=len`, per §4.4's "`n` clamped
/// to `[0, length(s)]`".
fn clamp_count(n: i64, len: i64) -> i64 {
    n.clamp(0, len)
}

fn left(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("left", &args, 2)?;
    let s = expect_str("left", &args[0])?;
    let n = expect_int("left", &args[1])?;
    let chars: Vec<char> = s.chars().collect();
    let stop = clamp_count(n, chars.len() as i64) as usize;
    Ok(Value::Str(Rc::from(chars[..stop].iter().collect::<String>())))
}

fn right(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("right", &args, 2)?;
    let s = expect_str("right", &args[0])?;
    let n = expect_int("right", &args[1])?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let start = (len - clamp_count(n, len)) as usize;
    Ok(Value::Str(Rc::from(chars[start..].iter().collect::<String>())))
}

fn mid(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("mid", &args, 3)?;
    let s = expect_str("mid", &args[0])?;
    let start = expect_int("mid", &args[1])?;
    let length = expect_int("mid", &args[2])?;
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let from = start.clamp(0, len);
    let to = from.saturating_add(length.max(0)).clamp(from, len) as usize;
    Ok(Value::Str(Rc::from(chars[from as usize..to].iter().collect::<String>())))
}

fn instr(args: Vec<Value>) -> Result<Value, RuntimeError> {
    expect_arity("instr", &args, 2)?;
    let s = expect_str("instr", &args[0])?;
    let sub = expect_str("instr", &args[1])?;

    let haystack: Vec<char> = s.chars().collect();
    let needle: Vec<char> = sub.chars().collect();

    if needle.is_empty() {
        return Ok(Value::Int(0));
    }
    if needle.len() > haystack.len() {
        return Ok(Value::Int(-1));
    }

    for start in 0..=(haystack.len() - needle.len()) {
        if haystack[start..start + needle.len()] == needle[..] {
            return Ok(Value::Int(start as i64));
        }
    }
    Ok(Value::Int(-1))
}
