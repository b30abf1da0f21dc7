//! The `trace` subcommand dispatcher: `add`/`remove`/`info` over
//! `variable`/`command`/`execution` (§4.I).

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::namespace::parse_ns_path;
use crate::interpreter::trace::TraceRecord;
use crate::interpreter::{CommandEntry, Interp, LinkTarget, NsId, GLOBAL_NS};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = GLOBAL_NS;
    interp.define_command(ns, "trace", CommandEntry::Builtin(Rc::new(cmd_trace)));
}

fn str_of(host: &mut dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

fn cmd_trace(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let Some((&sub, rest)) = args.split_first() else {
        return Err(Exception::error(TclErrorKind::arity("trace add|remove|info ...")));
    };
    match str_of(host, sub).as_str() {
        "add" => trace_add(interp, host, rest),
        "remove" => trace_remove(interp, host, rest),
        "info" => trace_info(interp, host, rest),
        other => Err(Exception::error(TclErrorKind::syntax(format!(
            "unknown or ambiguous subcommand \"{}\": must be add, info, or remove",
            other
        )))),
    }
}

enum Kind {
    Variable,
    Command,
    Execution,
}

fn kind_of(host: &mut dyn HostOps, o: ObjHandle) -> Result<Kind, Exception> {
    match str_of(host, o).as_str() {
        "variable" => Ok(Kind::Variable),
        "command" => Ok(Kind::Command),
        "execution" => Ok(Kind::Execution),
        other => Err(Exception::error(TclErrorKind::syntax(format!(
            "bad trace type \"{}\": must be variable, command, or execution",
            other
        )))),
    }
}

/// Where a bare variable name's trace list physically lives, mirroring the
/// precedence `frame_stack::write_var` uses to resolve the same name.
enum VarSlot {
    Local(usize, Rc<str>),
    Namespace(NsId, Rc<str>),
}

fn resolve_var_slot(interp: &Interp, name: &str) -> VarSlot {
    if name.contains("::") {
        let (absolute, mut parts) = parse_ns_path(name);
        let tail = parts.pop().unwrap_or_default();
        let cur = interp.current_namespace();
        let ns = if absolute {
            interp.namespace_resolve_absolute(&parts)
        } else {
            interp.namespace_resolve_relative(cur, &parts)
        }
        .unwrap_or(GLOBAL_NS);
        return VarSlot::Namespace(ns, Rc::from(tail.as_str()));
    }
    let cur = interp.active_frame_index();
    if let Some(target) = interp.frame(cur).links.get(name) {
        if let LinkTarget::Namespace { ns, name: n } = target {
            return VarSlot::Namespace(*ns, n.clone());
        }
    }
    VarSlot::Local(cur, Rc::from(name))
}

fn trace_add(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [kind, name, ops, script] = args else {
        return Err(Exception::error(TclErrorKind::arity(
            "trace add type name ops ?command?",
        )));
    };
    let record = TraceRecord { ops: str_of(host, *ops), script: *script };
    match kind_of(host, *kind)? {
        Kind::Variable => {
            let name_s = str_of(host, *name);
            match resolve_var_slot(interp, &name_s) {
                VarSlot::Local(level, alias) => {
                    interp.frame_mut(level).var_traces.entry(alias).or_default().push(record);
                }
                VarSlot::Namespace(ns, tail) => {
                    interp.namespace_mut(ns).var_traces.entry(tail).or_default().push(record);
                }
            }
        }
        Kind::Command => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            interp
                .namespace_mut(ns)
                .cmd_traces
                .entry(Rc::from(simple.as_str()))
                .or_default()
                .push(record);
        }
        Kind::Execution => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            interp
                .namespace_mut(ns)
                .exec_traces
                .entry(Rc::from(simple.as_str()))
                .or_default()
                .push(record);
        }
    }
    Ok(host.nil())
}

fn trace_remove(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [kind, name, ops, script] = args else {
        return Err(Exception::error(TclErrorKind::arity(
            "trace remove type name ops ?command?",
        )));
    };
    let ops_s = str_of(host, *ops);
    let matches = |r: &TraceRecord| r.ops == ops_s && r.script == *script;
    match kind_of(host, *kind)? {
        Kind::Variable => {
            let name_s = str_of(host, *name);
            match resolve_var_slot(interp, &name_s) {
                VarSlot::Local(level, alias) => {
                    if let Some(v) = interp.frame_mut(level).var_traces.get_mut(&alias) {
                        v.retain(|r| !matches(r));
                    }
                }
                VarSlot::Namespace(ns, tail) => {
                    if let Some(v) = interp.namespace_mut(ns).var_traces.get_mut(&tail) {
                        v.retain(|r| !matches(r));
                    }
                }
            }
        }
        Kind::Command => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            if let Some(v) = interp.namespace_mut(ns).cmd_traces.get_mut(simple.as_str()) {
                v.retain(|r| !matches(r));
            }
        }
        Kind::Execution => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            if let Some(v) = interp.namespace_mut(ns).exec_traces.get_mut(simple.as_str()) {
                v.retain(|r| !matches(r));
            }
        }
    }
    Ok(host.nil())
}

fn trace_info(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [kind, name] = args else {
        return Err(Exception::error(TclErrorKind::arity("trace info type name")));
    };
    let records = match kind_of(host, *kind)? {
        Kind::Variable => {
            let name_s = str_of(host, *name);
            match resolve_var_slot(interp, &name_s) {
                VarSlot::Local(level, alias) => {
                    interp.frame(level).var_traces.get(&alias).cloned().unwrap_or_default()
                }
                VarSlot::Namespace(ns, tail) => {
                    interp.namespace(ns).var_traces.get(&tail).cloned().unwrap_or_default()
                }
            }
        }
        Kind::Command => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            interp.namespace(ns).cmd_traces.get(simple.as_str()).cloned().unwrap_or_default()
        }
        Kind::Execution => {
            let name_s = str_of(host, *name);
            let cur = interp.current_namespace();
            let (ns, simple) = crate::commands::resolve_def_target(interp, cur, &name_s);
            interp.namespace(ns).exec_traces.get(simple.as_str()).cloned().unwrap_or_default()
        }
    };
    let items: Vec<ObjHandle> = records
        .iter()
        .map(|r| {
            let ops = host.intern(&r.ops);
            host.list_new(&[ops, r.script])
        })
        .collect();
    Ok(host.list_new(&items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn variable_write_trace_fires_on_set() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "proc logit {n1 n2 op} {set ::hit 1}").unwrap();
        interp.eval_str(&mut host, "set x 0").unwrap();
        interp.eval_str(&mut host, "trace add variable x write logit").unwrap();
        interp.eval_str(&mut host, "set x 5").unwrap();
        let r = interp.eval_str(&mut host, "set ::hit").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
    }

    #[test]
    fn info_reports_registered_traces() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "proc noop args {}").unwrap();
        interp.eval_str(&mut host, "set y 0").unwrap();
        interp.eval_str(&mut host, "trace add variable y {read write} noop").unwrap();
        let r = interp.eval_str(&mut host, "trace info variable y").unwrap();
        assert_eq!(host.list_len(r).unwrap(), 1);
    }
}
