//! Scalar variable builtins (§4.F, §4.J): set/unset/incr/global/variable/
//! append/lappend.

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::frame_stack::{read_var, unset_var, variable_link, write_var};
use crate::interpreter::{CommandEntry, Interp};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = crate::interpreter::GLOBAL_NS;
    macro_rules! def {
        ($name:expr, $f:expr) => {
            interp.define_command(ns, $name, CommandEntry::Builtin(Rc::new($f)));
        };
    }
    def!("set", cmd_set);
    def!("unset", cmd_unset);
    def!("incr", cmd_incr);
    def!("global", cmd_global);
    def!("variable", cmd_variable);
    def!("append", cmd_append);
    def!("lappend", cmd_lappend);
}

fn str_of(host: &dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

/// `set varName ?value?`.
fn cmd_set(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(Exception::error(TclErrorKind::arity("set varName ?newValue?")));
    }
    let name = str_of(host, args[0]);
    if let Some(val) = args.get(1) {
        write_var(interp, host, &name, *val)
    } else {
        read_var(interp, host, &name)
    }
}

/// `unset ?-nocomplain? ?--? varName ...`.
fn cmd_unset(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let mut nocomplain = false;
    let mut i = 0;
    while i < args.len() {
        match str_of(host, args[i]).as_str() {
            "-nocomplain" => {
                nocomplain = true;
                i += 1;
            }
            "--" => {
                i += 1;
                break;
            }
            _ => break,
        }
    }
    for a in &args[i..] {
        let name = str_of(host, *a);
        if let Err(e) = unset_var(interp, host, &name) {
            if !nocomplain {
                return Err(Exception::Error(e));
            }
        }
    }
    Ok(host.intern(""))
}

/// `incr varName ?increment?`.
fn cmd_incr(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(Exception::error(TclErrorKind::arity("incr varName ?increment?")));
    }
    let name = str_of(host, args[0]);
    let delta = match args.get(1) {
        Some(v) => host.int_get(*v).map_err(Exception::Error)?,
        None => 1,
    };
    let current = match read_var(interp, host, &name) {
        Ok(v) => host.int_get(v).map_err(Exception::Error)?,
        Err(Exception::Error(e)) if matches!(e.kind, crate::error::TclErrorKind::NoSuchVariable(_)) => 0,
        Err(e) => return Err(e),
    };
    let next = host.int_new(current.wrapping_add(delta));
    write_var(interp, host, &name, next)
}

/// `global varName ...`.
fn cmd_global(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = interp.active_frame_index();
    let global = crate::interpreter::GLOBAL_NS;
    for a in args {
        let name = str_of(host, *a);
        if !interp.namespace(global).vars.contains_key(name.as_str()) {
            let nil = host.nil();
            interp.namespace_mut(global).vars.insert(Rc::from(name.as_str()), nil);
        }
        interp.frame_mut(cur).links.insert(
            Rc::from(name.as_str()),
            crate::interpreter::LinkTarget::Namespace { ns: global, name: Rc::from(name.as_str()) },
        );
    }
    Ok(host.intern(""))
}

/// `variable name ?value? ?name value ...?`.
fn cmd_variable(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("variable ?name value...? name ?value?")));
    }
    let mut i = 0;
    while i < args.len() {
        let name = str_of(host, args[i]);
        let value = if i + 1 < args.len() { Some(args[i + 1]) } else { None };
        variable_link(interp, host, &name, value)?;
        i += if value.is_some() { 2 } else { 1 };
    }
    Ok(host.intern(""))
}

/// `append varName ?value value ...?`.
fn cmd_append(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("append varName ?value ...?")));
    }
    let name = str_of(host, args[0]);
    let existing = match read_var(interp, host, &name) {
        Ok(v) => v,
        Err(Exception::Error(e)) if matches!(e.kind, crate::error::TclErrorKind::NoSuchVariable(_)) => host.intern(""),
        Err(e) => return Err(e),
    };
    let mut acc = existing;
    for v in &args[1..] {
        acc = host.concat(acc, *v);
    }
    write_var(interp, host, &name, acc)
}

/// `lappend varName ?value value ...?`.
fn cmd_lappend(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("lappend varName ?value ...?")));
    }
    let name = str_of(host, args[0]);
    let existing = match read_var(interp, host, &name) {
        Ok(v) => host.list_from(v).map_err(Exception::Error)?,
        Err(Exception::Error(e)) if matches!(e.kind, crate::error::TclErrorKind::NoSuchVariable(_)) => host.list_new(&[]),
        Err(e) => return Err(e),
    };
    let mut acc = existing;
    for v in &args[1..] {
        acc = host.list_push(acc, *v).map_err(Exception::Error)?;
    }
    write_var(interp, host, &name, acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    fn fresh() -> (Interp, DefaultHost) {
        let mut host = DefaultHost::new();
        let interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        (interp, host)
    }

    #[test]
    fn set_and_read_round_trip() {
        let (mut interp, mut host) = fresh();
        let v = host.intern("hello");
        let name = host.intern("x");
        cmd_set(&mut interp, &mut host, &[name, v]).unwrap();
        let r = cmd_set(&mut interp, &mut host, &[name]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "hello");
    }

    #[test]
    fn incr_defaults_to_one_and_creates_unset_var() {
        let (mut interp, mut host) = fresh();
        let name = host.intern("counter");
        let r = cmd_incr(&mut interp, &mut host, &[name]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
        let r2 = cmd_incr(&mut interp, &mut host, &[name]).unwrap();
        assert_eq!(host.get_str(r2).as_ref(), "2");
    }

    #[test]
    fn lappend_builds_a_list() {
        let (mut interp, mut host) = fresh();
        let name = host.intern("xs");
        let a = host.intern("a");
        let b = host.intern("b c");
        cmd_lappend(&mut interp, &mut host, &[name, a, b]).unwrap();
        let r = cmd_set(&mut interp, &mut host, &[name]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "a {b c}");
    }
}
