//! Backslash, variable, and command substitution over a word's raw text
//! (§4.C).

use super::interp::Interp;
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::parser::{decode_backslash, WordKind};
use crate::result::Exception;

/// Substitute one parsed word per §4.B's word-kind table: `Brace` words are
/// taken completely literally; everything else goes through backslash,
/// variable, and command substitution in one left-to-right pass.
pub fn substitute_word(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    kind: WordKind,
    text: &str,
) -> Result<ObjHandle, Exception> {
    match kind {
        WordKind::Brace => Ok(host.intern(text)),
        WordKind::Substituted => substitute_span(interp, host, text),
    }
}

/// Substitute an arbitrary source span (also used for `${...}`-free
/// bracket contents is not needed here — brackets recurse through
/// `Interp::eval_str`, not this function).
pub fn substitute_span(interp: &mut Interp, host: &mut dyn HostOps, text: &str) -> Result<ObjHandle, Exception> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                let (piece, next) = decode_backslash(&chars, i);
                out.push_str(&piece);
                i = next;
            }
            '$' => {
                let (value, next) = substitute_variable(interp, host, &chars, i)?;
                out.push_str(&value);
                i = next;
            }
            '[' => {
                let (value, next) = substitute_command(interp, host, &chars, i)?;
                out.push_str(&value);
                i = next;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(host.intern(&out))
}

/// `$name`, `$name(…)` is not modeled (arrays are a Non-goal), or `${...}`.
/// Returns the variable's string value and the index just past the
/// reference. A lone `$` with no valid name following it is literal.
fn substitute_variable(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    chars: &[char],
    start: usize,
) -> Result<(String, usize), Exception> {
    let mut i = start + 1;
    if i < chars.len() && chars[i] == '{' {
        let name_start = i + 1;
        let mut j = name_start;
        while j < chars.len() && chars[j] != '}' {
            j += 1;
        }
        if j >= chars.len() {
            return Err(Exception::error(TclErrorKind::syntax("missing close-brace for variable name")));
        }
        let name: String = chars[name_start..j].iter().collect();
        let v = super::frame_stack::read_var(interp, host, &name)?;
        return Ok((host.get_str(v).to_string(), j + 1));
    }
    let name_start = i;
    while i < chars.len() && crate::parser::lexer::is_varname_char(chars[i]) {
        i += 1;
    }
    if i == name_start {
        // No valid variable name: `$` is literal.
        return Ok(("$".to_string(), start + 1));
    }
    let name: String = chars[name_start..i].iter().collect();
    let v = super::frame_stack::read_var(interp, host, &name)?;
    Ok((host.get_str(v).to_string(), i))
}

/// `[...]`: find the matching `]` (balanced, backslash-escape aware, but
/// *not* brace-aware — brackets nest against brackets only), evaluate the
/// enclosed source as a script, and take its result's string form.
fn substitute_command(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    chars: &[char],
    start: usize,
) -> Result<(String, usize), Exception> {
    let mut i = start + 1;
    let mut depth = 1;
    let inner_start = i;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => {
                depth += 1;
                i += 1;
            }
            ']' => {
                depth -= 1;
                i += 1;
                if depth == 0 {
                    break;
                }
            }
            _ => i += 1,
        }
    }
    if depth != 0 {
        return Err(Exception::error(TclErrorKind::syntax("missing close-bracket")));
    }
    let inner_end = i - 1;
    let inner: String = chars[inner_start..inner_end].iter().collect();
    let result = interp.eval_str(host, &inner)?;
    Ok((host.get_str(result).to_string(), i))
}
