//! Trace subsystem (§4.I): variable/command/execution observers with a
//! single re-entry guard.

use super::interp::Interp;
use crate::error::TclError;
use crate::host::{HostOps, ObjHandle};

#[derive(Clone)]
pub struct TraceRecord {
    /// Space-separated operation names, e.g. `"read write unset"`.
    pub ops: String,
    /// A command-prefix list object; extra args are appended before calling.
    pub script: ObjHandle,
}

impl TraceRecord {
    pub fn has_op(&self, op: &str) -> bool {
        self.ops.split_whitespace().any(|o| o == op)
    }
}

/// Fire variable traces registered on `name` (the local alias actually used
/// by the caller). `records` must already be in LIFO order (most-recently
/// added first) by the caller, matching §4.I "fire in LIFO order".
///
/// Read/write trace errors propagate; unset trace errors are suppressed
/// (§4.I "Variable traces").
pub fn fire_variable(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    records: &[TraceRecord],
    local_alias: &str,
    op: &str,
) -> Result<(), TclError> {
    if interp.trace_guard || records.is_empty() {
        return Ok(());
    }
    interp.trace_guard = true;
    let name1 = host.intern(local_alias);
    let name2 = host.nil();
    let op_obj = host.intern(op);
    let mut first_err = None;
    for rec in records {
        if !rec.has_op(op) {
            continue;
        }
        let r = invoke_prefix(interp, host, rec.script, &[name1, name2, op_obj]);
        if let Err(e) = r {
            if op != "unset" && first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    interp.trace_guard = false;
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Fire command rename/delete traces. Errors never propagate; the
/// interpreter result is left exactly as it was before firing (§4.I
/// "Command traces").
pub fn fire_command(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    records: &[TraceRecord],
    old_name: &str,
    new_name: &str,
    op: &str,
) {
    if interp.trace_guard || records.is_empty() {
        return;
    }
    interp.trace_guard = true;
    let old_obj = host.intern(old_name);
    let new_obj = host.intern(new_name);
    let op_obj = host.intern(op);
    for rec in records {
        if rec.has_op(op) {
            let _ = invoke_prefix(interp, host, rec.script, &[old_obj, new_obj, op_obj]);
        }
    }
    interp.trace_guard = false;
}

/// Fire an execution "enter" trace: `script {cmdList} enter`.
pub fn fire_exec_enter(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    records: &[TraceRecord],
    cmd_list: ObjHandle,
) -> Result<(), TclError> {
    fire_exec(interp, host, records, cmd_list, None, "enter")
}

/// Fire an execution "leave" trace: `script {cmdList} code result leave`.
pub fn fire_exec_leave(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    records: &[TraceRecord],
    cmd_list: ObjHandle,
    code: i64,
    result: ObjHandle,
) -> Result<(), TclError> {
    let code_obj = host.int_new(code);
    fire_exec(interp, host, records, cmd_list, Some((code_obj, result)), "leave")
}

fn fire_exec(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    records: &[TraceRecord],
    cmd_list: ObjHandle,
    code_result: Option<(ObjHandle, ObjHandle)>,
    op: &str,
) -> Result<(), TclError> {
    if interp.trace_guard || records.is_empty() {
        return Ok(());
    }
    interp.trace_guard = true;
    let op_obj = host.intern(op);
    let mut first_err = None;
    for rec in records {
        if !rec.has_op(op) {
            continue;
        }
        let mut extra = vec![cmd_list];
        if let Some((c, r)) = code_result {
            extra.push(c);
            extra.push(r);
        }
        extra.push(op_obj);
        if let Err(e) = invoke_prefix(interp, host, rec.script, &extra) {
            if first_err.is_none() {
                first_err = Some(e);
            }
        }
    }
    interp.trace_guard = false;
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Evaluate a trace's command-prefix (itself a list object) with `extra`
/// words appended, as a single command invocation.
fn invoke_prefix(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    prefix: ObjHandle,
    extra: &[ObjHandle],
) -> Result<(), TclError> {
    let mut words = host.list_items(prefix).unwrap_or_default();
    words.extend_from_slice(extra);
    if words.is_empty() {
        return Ok(());
    }
    let cmd = words[0];
    let args = &words[1..];
    let ns = interp.current_namespace();
    match super::command_table::resolve_command(interp, ns, host.get_str(cmd).as_ref()) {
        Some((found_ns, entry)) => {
            super::command_table::dispatch(interp, host, found_ns, &entry, cmd, args)
                .map(|_| ())
                .map_err(|e| match e {
                    crate::result::Exception::Error(te) => te,
                    _ => crate::error::TclErrorKind::invariant("trace script exited via non-error control flow"),
                })
        }
        None => Err(crate::error::TclErrorKind::no_such_command(host.get_str(cmd).to_string())),
    }
}
