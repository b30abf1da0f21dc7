//! Command records, name resolution, and dispatch (§4.E).

use super::interp::Interp;
use super::types::NsId;
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

/// A builtin's native entry point. Object-safe: no generics, no associated
/// types, so it can be boxed behind `Rc<dyn Fn(...)>` and stored uniformly
/// alongside procs in one command table (§3 "Command records").
pub type BuiltinFn = Rc<dyn Fn(&mut Interp, &mut dyn HostOps, &[ObjHandle]) -> EvalResult>;

/// One formal parameter of a user `proc` (§4.E "Parameter binding").
#[derive(Clone)]
pub enum ProcParam {
    Required(Rc<str>),
    Optional(Rc<str>, ObjHandle),
    /// Must be last; receives remaining args as a list.
    Args,
}

#[derive(Clone)]
pub struct ProcDef {
    pub params: Vec<ProcParam>,
    pub body: ObjHandle,
    /// The namespace this proc was defined in; its body executes there.
    pub home_ns: NsId,
}

#[derive(Clone)]
pub enum CommandEntry {
    Builtin(BuiltinFn),
    Proc(Rc<ProcDef>),
}

/// Pretty-print a proc's formals for `"wrong # args"` messages.
pub fn pretty_params(name: &str, params: &[ProcParam]) -> String {
    let mut out = String::from(name);
    for p in params {
        out.push(' ');
        match p {
            ProcParam::Required(n) => out.push_str(n),
            ProcParam::Optional(n, _) => {
                out.push('?');
                out.push_str(n);
                out.push('?');
            }
            ProcParam::Args => out.push_str("?arg ...?"),
        }
    }
    out
}

/// Resolve a (possibly `::`-qualified) command name from a frame whose
/// namespace is `from_ns` (§4.E "Resolution order").
pub fn resolve_command(
    interp: &Interp,
    from_ns: NsId,
    name: &str,
) -> Option<(NsId, CommandEntry)> {
    if let Some((ns_path, tail)) = split_qualified(name) {
        let target_ns = if ns_path.is_empty() {
            Some(super::types::GLOBAL_NS)
        } else if name.starts_with("::") {
            interp.namespace_resolve_absolute(&ns_path)
        } else {
            // A relatively-qualified name resolves against the current
            // namespace first, falling back to an absolute lookup from the
            // root (e.g. `tcl::mathfunc::abs` called from inside `::app`).
            interp
                .namespace_resolve_relative(from_ns, &ns_path)
                .or_else(|| interp.namespace_resolve_absolute(&ns_path))
        };
        return target_ns.and_then(|ns| {
            interp
                .namespace(ns)
                .commands
                .get(tail)
                .cloned()
                .map(|e| (ns, e))
        });
    }
    if let Some(e) = interp.namespace(from_ns).commands.get(name).cloned() {
        return Some((from_ns, e));
    }
    if from_ns != super::types::GLOBAL_NS {
        if let Some(e) = interp
            .namespace(super::types::GLOBAL_NS)
            .commands
            .get(name)
            .cloned()
        {
            return Some((super::types::GLOBAL_NS, e));
        }
    }
    None
}

/// Split `"::a::b::foo"` or `"a::b::foo"` into (namespace-path, tail). Returns
/// `None` for an unqualified name.
fn split_qualified(name: &str) -> Option<(Vec<String>, &str)> {
    if !name.contains("::") {
        return None;
    }
    let mut parts: Vec<&str> = name.split("::").collect();
    // `"::a::b"`.split("::") yields ["", "a", "b"]; drop the leading empty.
    if parts.first() == Some(&"") {
        parts.remove(0);
    }
    let tail = parts.pop().unwrap_or("");
    Some((parts.into_iter().map(|s| s.to_string()).collect(), tail))
}

/// Invoke a resolved command with `cmd_obj` (the literal word used to call
/// it) and `args` (everything after it, not including `cmd_obj`).
///
/// Builtins run in the caller's own frame (§3 "Lifecycle": only procs and a
/// few special builtins like `namespace eval`/`apply` push frames; those
/// push their own explicitly in their implementation). Procs always push.
pub fn dispatch(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    ns: NsId,
    entry: &CommandEntry,
    cmd_obj: ObjHandle,
    args: &[ObjHandle],
) -> EvalResult {
    let cmd_list = interp.make_exec_trace_list(host, cmd_obj, args);
    let exec_traces = interp.exec_traces_for(ns, host.get_str(cmd_obj).as_ref());
    if let Some(ref records) = exec_traces {
        super::trace::fire_exec_enter(interp, host, records, cmd_list)
            .map_err(Exception::Error)?;
    }
    let r = match entry {
        CommandEntry::Builtin(f) => f(interp, host, args),
        CommandEntry::Proc(def) => invoke_proc(interp, host, ns, def, cmd_obj, args),
    };
    if let Some(ref records) = exec_traces {
        let (code, result_obj) = match &r {
            Ok(v) => (0i64, *v),
            Err(Exception::Error(_)) => (1, host.nil()),
            Err(Exception::Return(v)) => (2, *v),
            Err(Exception::Break) => (3, host.nil()),
            Err(Exception::Continue) => (4, host.nil()),
        };
        let _ = super::trace::fire_exec_leave(interp, host, records, cmd_list, code, result_obj);
    }
    r
}

fn invoke_proc(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    _lookup_ns: NsId,
    def: &Rc<ProcDef>,
    cmd_obj: ObjHandle,
    args: &[ObjHandle],
) -> EvalResult {
    if let Err(e) = interp.try_push_frame(cmd_obj, args.to_vec(), def.home_ns) {
        return Err(Exception::Error(e));
    }
    let bind_result = bind_params(interp, host, &def.params, args, host.get_str(cmd_obj).as_ref());
    let r = match bind_result {
        Ok(()) => {
            let body = def.body;
            match interp.eval_obj(host, body) {
                Ok(v) => Ok(v),
                Err(Exception::Return(v)) => Ok(v),
                Err(Exception::Break) | Err(Exception::Continue) => {
                    Err(Exception::error(TclErrorKind::invariant(
                        "invoked \"break\" or \"continue\" outside of a loop",
                    )))
                }
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    };
    interp.pop_frame();
    r
}

fn bind_params(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    params: &[ProcParam],
    args: &[ObjHandle],
    cmd_name: &str,
) -> Result<(), Exception> {
    let has_args_tail = matches!(params.last(), Some(ProcParam::Args));
    let required_count = params
        .iter()
        .take_while(|p| matches!(p, ProcParam::Required(_)))
        .count();
    if args.len() < required_count
        || (!has_args_tail && args.len() > params.len())
    {
        return Err(Exception::error(TclErrorKind::arity(pretty_params(
            cmd_name, params,
        ))));
    }
    // Required params precede optional params precede a trailing `args`, so
    // a left-to-right sequential fill is correct: every required slot is
    // guaranteed an argument by the arity check above.
    let mut i = 0;
    for p in params {
        match p {
            ProcParam::Required(name) => {
                interp.set_local(name.clone(), args[i]);
                i += 1;
            }
            ProcParam::Optional(name, default) => {
                let v = if i < args.len() { args[i] } else { *default };
                if i < args.len() {
                    i += 1;
                }
                interp.set_local(name.clone(), v);
            }
            ProcParam::Args => {
                let rest = &args[i..];
                let list = host.list_new(rest);
                interp.set_local(Rc::from("args"), list);
                i = args.len();
            }
        }
    }
    Ok(())
}
