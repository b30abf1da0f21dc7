//! `proc`, `rename`, `upvar`, `uplevel`, and `apply` (§4.E, §4.F).

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::{CommandEntry, Interp, ProcDef, ProcParam};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = crate::interpreter::GLOBAL_NS;
    macro_rules! def {
        ($name:expr, $f:expr) => {
            interp.define_command(ns, $name, CommandEntry::Builtin(Rc::new($f)));
        };
    }
    def!("proc", cmd_proc);
    def!("rename", cmd_rename);
    def!("upvar", cmd_upvar);
    def!("uplevel", cmd_uplevel);
    def!("apply", cmd_apply);
}

fn str_of(host: &mut dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

/// Parse a formal-parameter list (a Tcl list of names, each either a bare
/// name, `{name default}`, or the literal `args`) into `ProcParam`s.
fn parse_params(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    spec: ObjHandle,
) -> Result<Vec<ProcParam>, Exception> {
    let items = host.list_items(spec).map_err(Exception::Error)?;
    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let sub = host.list_items(*item).unwrap_or_else(|_| vec![*item]);
        match sub.len() {
            1 => {
                let name = str_of(host, sub[0]);
                if name == "args" && i == items.len() - 1 {
                    out.push(ProcParam::Args);
                } else {
                    out.push(ProcParam::Required(Rc::from(name.as_str())));
                }
            }
            2 => {
                let name = str_of(host, sub[0]);
                out.push(ProcParam::Optional(Rc::from(name.as_str()), sub[1]));
            }
            _ => {
                return Err(Exception::error(TclErrorKind::syntax(format!(
                    "too many fields in argument specifier \"{}\"",
                    str_of(host, *item)
                ))));
            }
        }
    }
    let _ = interp;
    Ok(out)
}

fn cmd_proc(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name, params, body] = args else {
        return Err(Exception::error(TclErrorKind::arity("proc name args body")));
    };
    let name_str = str_of(host, *name);
    let params = parse_params(interp, host, *params)?;
    let home_ns = interp.current_namespace();
    let (target_ns, simple) = crate::commands::resolve_def_target(interp, home_ns, &name_str);
    let def = ProcDef { params, body: *body, home_ns: target_ns };
    interp.define_command(target_ns, &simple, CommandEntry::Proc(Rc::new(def)));
    Ok(host.nil())
}

fn cmd_rename(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [old, new] = args else {
        return Err(Exception::error(TclErrorKind::arity("rename oldName newName")));
    };
    let old_name = str_of(host, *old);
    let new_name = str_of(host, *new);
    let cur_ns = _interp.current_namespace();
    let Some((_, entry)) = crate::interpreter::command_table::resolve_command(_interp, cur_ns, &old_name) else {
        return Err(Exception::error(TclErrorKind::no_such_command(old_name)));
    };
    let (old_ns, old_simple) = crate::commands::resolve_def_target(_interp, cur_ns, &old_name);
    _interp.namespace_mut(old_ns).commands.remove(old_simple.as_str());
    let cmd_traces = _interp.namespace(old_ns).cmd_traces.get(old_simple.as_str()).cloned();
    if new_name.is_empty() {
        if let Some(records) = cmd_traces {
            crate::interpreter::trace::fire_command(_interp, host, &records, &old_name, "", "delete");
        }
        return Ok(host.nil());
    }
    let (new_ns, new_simple) = crate::commands::resolve_def_target(_interp, cur_ns, &new_name);
    _interp.define_command(new_ns, &new_simple, entry);
    if let Some(records) = cmd_traces {
        crate::interpreter::trace::fire_command(_interp, host, &records, &old_name, &new_name, "rename");
    }
    Ok(host.nil())
}

fn cmd_upvar(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 || args.len() % 2 != 0 && args.len() < 3 {
        return Err(Exception::error(TclErrorKind::arity(
            "upvar ?level? otherVar localVar ?otherVar localVar ...?",
        )));
    }
    let first = str_of(host, args[0]);
    let (level, rest) = if first.starts_with('#') || first.parse::<i64>().is_ok() {
        (first, &args[1..])
    } else {
        ("1".to_string(), args)
    };
    if rest.len() % 2 != 0 || rest.is_empty() {
        return Err(Exception::error(TclErrorKind::arity(
            "upvar ?level? otherVar localVar ?otherVar localVar ...?",
        )));
    }
    for pair in rest.chunks(2) {
        let other = str_of(host, pair[0]);
        let local = str_of(host, pair[1]);
        crate::interpreter::frame_stack::upvar(interp, &level, &other, &local)
            .map_err(Exception::Error)?;
    }
    Ok(host.nil())
}

fn cmd_uplevel(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("uplevel ?level? command ?arg ...?")));
    }
    let first = str_of(host, args[0]);
    let (level_spec, body_words) = if args.len() >= 2 && (first.starts_with('#') || first.parse::<i64>().is_ok()) {
        (first, &args[1..])
    } else {
        ("1".to_string(), args)
    };
    if body_words.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("uplevel ?level? command ?arg ...?")));
    }
    let target = crate::interpreter::frame_stack::resolve_level(interp, &level_spec)
        .map_err(Exception::Error)?;
    let script = if body_words.len() == 1 {
        str_of(host, body_words[0])
    } else {
        body_words.iter().map(|a| str_of(host, *a)).collect::<Vec<_>>().join(" ")
    };
    let saved = interp.set_active_frame(target);
    let r = interp.eval_str(host, &script);
    interp.set_active_frame(saved);
    r
}

/// `apply {params body ?namespace?} arg ...`: a one-shot lambda. Pushes its
/// own call frame, same as a named proc invocation, since builtins
/// otherwise run in the caller's frame (§3 "Lifecycle").
fn cmd_apply(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let Some((&lambda, call_args)) = args.split_first() else {
        return Err(Exception::error(TclErrorKind::arity("apply lambdaExpr ?arg ...?")));
    };
    let parts = host.list_items(lambda).map_err(Exception::Error)?;
    if parts.len() < 2 || parts.len() > 3 {
        return Err(Exception::error(TclErrorKind::syntax(
            "can't interpret as a lambda expression",
        )));
    }
    let params = parse_params(interp, host, parts[0])?;
    let body = parts[1];
    let home_ns = if parts.len() == 3 {
        let ns_name = str_of(host, parts[2]);
        let (_, path) = crate::interpreter::namespace::parse_ns_path(&ns_name);
        interp
            .namespace_resolve_absolute(&path)
            .unwrap_or_else(|| interp.namespace_ensure(crate::interpreter::GLOBAL_NS, &path))
    } else {
        interp.current_namespace()
    };
    let def = ProcDef { params, body, home_ns };
    let cmd_obj = host.intern("apply");
    interp.try_push_frame(cmd_obj, call_args.to_vec(), home_ns).map_err(Exception::Error)?;
    let bind = bind_apply_params(interp, host, &def.params, call_args);
    let r = match bind {
        Ok(()) => match interp.eval_obj(host, body) {
            Ok(v) => Ok(v),
            Err(Exception::Return(v)) => Ok(v),
            Err(Exception::Break) | Err(Exception::Continue) => Err(Exception::error(
                TclErrorKind::invariant("invoked \"break\" or \"continue\" outside of a loop"),
            )),
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    };
    interp.pop_frame();
    r
}

fn bind_apply_params(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    params: &[ProcParam],
    args: &[ObjHandle],
) -> Result<(), Exception> {
    let has_args_tail = matches!(params.last(), Some(ProcParam::Args));
    let required_count = params
        .iter()
        .take_while(|p| matches!(p, ProcParam::Required(_)))
        .count();
    if args.len() < required_count || (!has_args_tail && args.len() > params.len()) {
        return Err(Exception::error(TclErrorKind::arity(
            crate::interpreter::command_table::pretty_params("apply", params),
        )));
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn proc_defines_a_callable_command() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "proc double {x} {expr {$x * 2}}").unwrap();
        let r = interp.eval_str(&mut host, "double 21").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "42");
    }

    #[test]
    fn apply_runs_a_lambda_with_its_own_frame() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let r = interp.eval_str(&mut host, "apply {{a b} {expr {$a + $b}}} 3 4").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "7");
    }

    #[test]
    fn rename_moves_a_command_to_a_new_name() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "proc greet {} {return hi}").unwrap();
        interp.eval_str(&mut host, "rename greet hello").unwrap();
        let r = interp.eval_str(&mut host, "hello").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "hi");
    }
}
