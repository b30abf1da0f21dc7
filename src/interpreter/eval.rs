//! Script evaluator (§4.D): parse → substitute → dispatch, one command at a
//! time, stopping on the first non-OK result code.

use super::interp::Interp;
use super::substitution::substitute_word;
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::parser::{ParseOutcome, Parser};
use crate::result::{EvalResult, Exception};

/// Evaluate a complete script. Empty or whitespace/comment-only scripts
/// return `OK` with an empty-string result (§4.D "Edge cases").
pub fn eval_script(interp: &mut Interp, host: &mut dyn HostOps, src: &str) -> EvalResult {
    let mut parser = Parser::new(src);
    let mut result = host.intern("");
    while !parser.at_end() {
        let words = match parser.parse_command() {
            Ok(ParseOutcome::Complete(words)) => words,
            Ok(ParseOutcome::Incomplete) => {
                return Err(Exception::error(TclErrorKind::syntax(
                    "script is incomplete (unclosed brace, quote, or bracket)",
                )))
            }
            Err(e) => return Err(Exception::Error(e)),
        };
        if words.is_empty() {
            continue;
        }
        let mut objs = Vec::with_capacity(words.len());
        for w in &words {
            objs.push(substitute_word(interp, host, w.kind, &w.text)?);
        }
        let cmd_obj = objs[0];
        let args = &objs[1..];
        result = eval_one_command(interp, host, cmd_obj, args)?;
        interp.set_result(result);
    }
    Ok(result)
}

/// Resolve and dispatch a single already-substituted command invocation.
/// Shared by the script evaluator and builtins that invoke a command list
/// directly (`apply`, trace scripts, `eval`).
pub fn eval_one_command(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    cmd_obj: ObjHandle,
    args: &[ObjHandle],
) -> EvalResult {
    let ns = interp.current_namespace();
    let name = host.get_str(cmd_obj).to_string();
    match super::command_table::resolve_command(interp, ns, &name) {
        Some((found_ns, entry)) => super::command_table::dispatch(interp, host, found_ns, &entry, cmd_obj, args),
        None => super::unknown::invoke_unknown(interp, host, cmd_obj, args),
    }
}

/// Evaluate a command-prefix list (as used by `apply`'s body call site,
/// `eval` with multiple words concatenated, and `tailcall`).
pub fn eval_words(interp: &mut Interp, host: &mut dyn HostOps, words: &[ObjHandle]) -> EvalResult {
    if words.is_empty() {
        return Ok(host.intern(""));
    }
    eval_one_command(interp, host, words[0], &words[1..])
}
