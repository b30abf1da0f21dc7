//! The `info` subcommand dispatcher (§4.E, §4.F introspection surface).

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::command_table::{CommandEntry, ProcParam};
use crate::interpreter::{Interp, GLOBAL_NS};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = GLOBAL_NS;
    interp.define_command(ns, "info", CommandEntry::Builtin(Rc::new(cmd_info)));
}

fn str_of(host: &mut dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

fn cmd_info(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let Some((&sub, rest)) = args.split_first() else {
        return Err(Exception::error(TclErrorKind::arity("info subcommand ?arg ...?")));
    };
    match str_of(host, sub).as_str() {
        "commands" => info_commands(interp, host, rest, false),
        "procs" => info_commands(interp, host, rest, true),
        "vars" => info_vars(interp, host, rest),
        "locals" => info_locals(interp, host, rest, false),
        "globals" => info_globals(interp, host, rest),
        "exists" => info_exists(interp, host, rest),
        "level" => info_level(interp, host, rest),
        "frame" => info_frame(interp, host, rest),
        "body" => info_body(interp, host, rest),
        "args" => info_args(interp, host, rest),
        "default" => info_default(interp, host, rest),
        "script" => info_script(interp, host, rest),
        "complete" => info_complete(host, rest),
        "namespace" => info_namespace(interp, host),
        other => Err(Exception::error(TclErrorKind::syntax(format!(
            "unknown or ambiguous subcommand \"{}\": must be args, body, commands, complete, default, exists, frame, globals, level, locals, namespace, procs, script, or vars",
            other
        )))),
    }
}

fn pattern_filter(host: &mut dyn HostOps, names: Vec<String>, pattern: Option<&str>) -> Vec<String> {
    match pattern {
        Some(p) => names.into_iter().filter(|n| host.glob_match(p, n, false)).collect(),
        None => names,
    }
}

fn info_commands(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle], procs_only: bool) -> EvalResult {
    let pattern = args.first().map(|a| str_of(host, *a));
    let cur = interp.current_namespace();
    let names: Vec<String> = interp
        .namespace(cur)
        .commands
        .iter()
        .filter(|(_, e)| !procs_only || matches!(e, CommandEntry::Proc(_)))
        .map(|(k, _)| k.to_string())
        .collect();
    let filtered = pattern_filter(host, names, pattern.as_deref());
    let items: Vec<ObjHandle> = filtered.iter().map(|n| host.intern(n)).collect();
    Ok(host.list_new(&items))
}

fn info_vars(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    // Frame locals and namespace vars are disjoint storage here (§3
    // "Frames"); a bare `set` at any scope always lands in the current
    // frame's locals, so listing the frame's locals/links is complete.
    info_locals(interp, host, args, false)
}

fn info_locals(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle], _unused: bool) -> EvalResult {
    let pattern = args.first().map(|a| str_of(host, *a));
    let cur = interp.active_frame_index();
    let mut names: Vec<String> = interp.frame(cur).locals.keys().map(|k| k.to_string()).collect();
    names.extend(interp.frame(cur).links.keys().map(|k| k.to_string()));
    names.sort();
    names.dedup();
    let filtered = pattern_filter(host, names, pattern.as_deref());
    let items: Vec<ObjHandle> = filtered.iter().map(|n| host.intern(n)).collect();
    Ok(host.list_new(&items))
}

fn info_globals(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let pattern = args.first().map(|a| str_of(host, *a));
    let names: Vec<String> = interp.namespace(GLOBAL_NS).vars.keys().map(|k| k.to_string()).collect();
    let filtered = pattern_filter(host, names, pattern.as_deref());
    let items: Vec<ObjHandle> = filtered.iter().map(|n| host.intern(n)).collect();
    Ok(host.list_new(&items))
}

fn info_exists(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("info exists varName")));
    };
    let name_s = str_of(host, *name);
    Ok(host.int_new(crate::interpreter::frame_stack::var_exists(interp, &name_s) as i64))
}

fn info_level(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Ok(host.int_new(interp.active_frame_index() as i64));
    }
    let [spec] = args else {
        return Err(Exception::error(TclErrorKind::arity("info level ?number?")));
    };
    let spec_s = str_of(host, *spec);
    let level = crate::interpreter::frame_stack::resolve_level(interp, &spec_s).map_err(Exception::Error)?;
    let frame = interp.frame(level);
    let mut words = vec![frame.cmd];
    words.extend_from_slice(&frame.args);
    Ok(host.list_new(&words))
}

fn info_frame(interp: &mut Interp, host: &mut dyn HostOps, _args: &[ObjHandle]) -> EvalResult {
    Ok(host.int_new(interp.frame_count() as i64))
}

fn lookup_proc(interp: &Interp, name: &str) -> Result<Rc<crate::interpreter::command_table::ProcDef>, Exception> {
    let cur = interp.current_namespace();
    match crate::interpreter::command_table::resolve_command(interp, cur, name) {
        Some((_, CommandEntry::Proc(def))) => Ok(def),
        Some((_, CommandEntry::Builtin(_))) => Err(Exception::error(TclErrorKind::domain(format!(
            "\"{}\" isn't a procedure",
            name
        )))),
        None => Err(Exception::error(TclErrorKind::no_such_command(name.to_string()))),
    }
}

fn info_body(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("info body procname")));
    };
    let name_s = str_of(host, *name);
    let def = lookup_proc(interp, &name_s)?;
    Ok(def.body)
}

fn info_args(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("info args procname")));
    };
    let name_s = str_of(host, *name);
    let def = lookup_proc(interp, &name_s)?;
    let items: Vec<ObjHandle> = def
        .params
        .iter()
        .map(|p| match p {
            ProcParam::Required(n) => host.intern(n),
            ProcParam::Optional(n, _) => host.intern(n),
            ProcParam::Args => host.intern("args"),
        })
        .collect();
    Ok(host.list_new(&items))
}

fn info_default(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name, param, var_name] = args else {
        return Err(Exception::error(TclErrorKind::arity("info default procname arg varname")));
    };
    let name_s = str_of(host, *name);
    let param_s = str_of(host, *param);
    let def = lookup_proc(interp, &name_s)?;
    let found = def.params.iter().find(|p| match p {
        ProcParam::Required(n) | ProcParam::Optional(n, _) => n.as_ref() == param_s,
        ProcParam::Args => param_s == "args",
    });
    match found {
        Some(ProcParam::Optional(_, default)) => {
            let var_name_s = str_of(host, *var_name);
            crate::interpreter::frame_stack::write_var(interp, host, &var_name_s, *default)?;
            Ok(host.int_new(1))
        }
        Some(_) => Ok(host.int_new(0)),
        None => Err(Exception::error(TclErrorKind::domain(format!(
            "procedure \"{}\" doesn't have an argument \"{}\"",
            name_s, param_s
        )))),
    }
}

fn info_script(interp: &mut Interp, host: &mut dyn HostOps, _args: &[ObjHandle]) -> EvalResult {
    match interp.get_script_path() {
        Some(p) => Ok(host.intern(p)),
        None => Ok(host.intern("")),
    }
}

fn info_complete(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [src] = args else {
        return Err(Exception::error(TclErrorKind::arity("info complete command")));
    };
    let s = str_of(host, *src);
    Ok(host.int_new(crate::parser::is_complete(&s) as i64))
}

fn info_namespace(interp: &mut Interp, host: &mut dyn HostOps) -> EvalResult {
    let cur = interp.current_namespace();
    Ok(host.intern(&format!("::{}", interp.namespace_full_path(cur))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn commands_lists_registered_builtins() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let r = interp.eval_str(&mut host, "info commands set").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "set");
    }

    #[test]
    fn args_and_body_reflect_a_defined_proc() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "proc add {a b} {expr {$a + $b}}").unwrap();
        let r = interp.eval_str(&mut host, "info args add").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "a b");
        let r = interp.eval_str(&mut host, "info body add").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "expr {$a + $b}");
    }

    #[test]
    fn exists_reports_variable_presence() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "set x 1").unwrap();
        let r = interp.eval_str(&mut host, "info exists x").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
        let r = interp.eval_str(&mut host, "info exists nope").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "0");
    }
}
