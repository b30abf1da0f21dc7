//! `dict` subcommand dispatcher (§4.K "Dicts").

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::frame_stack::{read_var, write_var};
use crate::interpreter::{CommandEntry, Interp};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = crate::interpreter::GLOBAL_NS;
    interp.define_command(ns, "dict", CommandEntry::Builtin(Rc::new(cmd_dict)));
}

fn str_of(host: &dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

fn arity_err() -> Exception {
    Exception::error(TclErrorKind::arity(
        "dict subcommand ?arg ...?",
    ))
}

fn cmd_dict(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(arity_err());
    }
    let sub = str_of(host, args[0]);
    let rest = &args[1..];
    match sub.as_str() {
        "create" => dict_create(host, rest),
        "get" => dict_get(host, rest),
        "set" => dict_set(interp, host, rest),
        "unset" => dict_unset(interp, host, rest),
        "exists" => dict_exists(host, rest),
        "keys" => dict_keys(host, rest),
        "values" => dict_values(host, rest),
        "merge" => dict_merge(host, rest),
        "size" => dict_size(host, rest),
        "for" => dict_for(interp, host, rest),
        "with" => dict_with(interp, host, rest),
        "filter" => dict_filter(interp, host, rest),
        "update" => dict_update(interp, host, rest),
        "incr" => dict_incr(interp, host, rest),
        "append" => dict_append(interp, host, rest),
        "lappend" => dict_lappend(interp, host, rest),
        _ => Err(Exception::error(TclErrorKind::no_such_command(format!("dict {}", sub)))),
    }
}

fn dict_create(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() % 2 != 0 {
        return Err(Exception::error(TclErrorKind::arity("dict create ?key value ...?")));
    }
    let mut d = host.dict_new();
    for pair in args.chunks(2) {
        d = host.dict_set(d, pair[0], pair[1]).map_err(Exception::Error)?;
    }
    Ok(d)
}

fn dict_get(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("dict get dictionary ?key ...?")));
    }
    let mut cur = host.dict_from(args[0]).map_err(Exception::Error)?;
    for key in &args[1..] {
        match host.dict_get(cur, *key).map_err(Exception::Error)? {
            Some(v) => cur = v,
            None => {
                return Err(Exception::error(TclErrorKind::no_such_variable(format!(
                    "key \"{}\" not known in dictionary",
                    str_of(host, *key)
                ))))
            }
        }
    }
    Ok(cur)
}

fn dict_set(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 3 {
        return Err(Exception::error(TclErrorKind::arity("dict set dictVarName key ?key ...? value")));
    }
    let name = str_of(host, args[0]);
    let value = *args.last().unwrap();
    let keys = &args[1..args.len() - 1];
    let existing = match read_var(interp, host, &name) {
        Ok(v) => v,
        Err(Exception::Error(_)) => host.dict_new(),
        Err(e) => return Err(e),
    };
    let updated = dict_set_path(host, existing, keys, value)?;
    write_var(interp, host, &name, updated)
}

fn dict_set_path(host: &mut dyn HostOps, d: ObjHandle, keys: &[ObjHandle], value: ObjHandle) -> EvalResult {
    let dict = host.dict_from(d).map_err(Exception::Error)?;
    if keys.len() == 1 {
        return host.dict_set(dict, keys[0], value).map_err(Exception::Error);
    }
    let inner_existing = host.dict_get(dict, keys[0]).map_err(Exception::Error)?.unwrap_or_else(|| host.dict_new());
    let inner = dict_set_path(host, inner_existing, &keys[1..], value)?;
    host.dict_set(dict, keys[0], inner).map_err(Exception::Error)
}

fn dict_unset(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict unset dictVarName key ?key ...?")));
    }
    let name = str_of(host, args[0]);
    let existing = read_var(interp, host, &name)?;
    let dict = host.dict_from(existing).map_err(Exception::Error)?;
    let updated = host.dict_unset(dict, args[1]).map_err(Exception::Error)?;
    write_var(interp, host, &name, updated)
}

fn dict_exists(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict exists dictionary key ?key ...?")));
    }
    let mut cur = host.dict_from(args[0]).map_err(Exception::Error)?;
    for key in &args[1..] {
        match host.dict_get(cur, *key).map_err(Exception::Error)? {
            Some(v) => cur = v,
            None => return Ok(host.int_new(0)),
        }
    }
    Ok(host.int_new(1))
}

fn dict_keys(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("dict keys dictionary ?pattern?")));
    }
    let dict = host.dict_from(args[0]).map_err(Exception::Error)?;
    let entries = host.dict_entries(dict).map_err(Exception::Error)?;
    let pattern = args.get(1).map(|v| str_of(host, *v));
    let keys: Vec<ObjHandle> = entries
        .into_iter()
        .filter(|(k, _)| match &pattern {
            Some(p) => host.glob_match(p, &str_of(host, *k), false),
            None => true,
        })
        .map(|(k, _)| k)
        .collect();
    Ok(host.list_new(&keys))
}

fn dict_values(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("dict values dictionary ?pattern?")));
    }
    let dict = host.dict_from(args[0]).map_err(Exception::Error)?;
    let entries = host.dict_entries(dict).map_err(Exception::Error)?;
    let vals: Vec<ObjHandle> = entries.into_iter().map(|(_, v)| v).collect();
    Ok(host.list_new(&vals))
}

fn dict_merge(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let mut acc = host.dict_new();
    for d in args {
        let dict = host.dict_from(*d).map_err(Exception::Error)?;
        for (k, v) in host.dict_entries(dict).map_err(Exception::Error)? {
            acc = host.dict_set(acc, k, v).map_err(Exception::Error)?;
        }
    }
    Ok(acc)
}

fn dict_size(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("dict size dictionary")));
    }
    let dict = host.dict_from(args[0]).map_err(Exception::Error)?;
    let n = host.dict_size(dict).map_err(Exception::Error)?;
    Ok(host.int_new(n as i64))
}

/// `dict for {keyVar valVar} dictionary body`.
fn dict_for(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 3 {
        return Err(Exception::error(TclErrorKind::arity("dict for {keyVar valVar} dictionary body")));
    }
    let vars = host.list_items(args[0]).map_err(Exception::Error)?;
    if vars.len() != 2 {
        return Err(Exception::error(TclErrorKind::syntax("must have exactly two variable names")));
    }
    let (key_var, val_var) = (str_of(host, vars[0]), str_of(host, vars[1]));
    let dict = host.dict_from(args[1]).map_err(Exception::Error)?;
    let entries = host.dict_entries(dict).map_err(Exception::Error)?;
    let body = args[2];
    let mut result = host.intern("");
    for (k, v) in entries {
        write_var(interp, host, &key_var, k)?;
        write_var(interp, host, &val_var, v)?;
        match interp.eval_obj(host, body) {
            Ok(r) => result = r,
            Err(Exception::Break) => break,
            Err(Exception::Continue) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(result)
}

/// `dict with dictVarName ?key ...? body`: bring the (nested) dict's keys
/// into scope as variables, running `body`, then writing them back.
fn dict_with(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict with dictVarName ?key ...? body")));
    }
    let name = str_of(host, args[0]);
    let body = *args.last().unwrap();
    let path = &args[1..args.len() - 1];
    let root = read_var(interp, host, &name)?;
    let mut cur = host.dict_from(root).map_err(Exception::Error)?;
    for key in path {
        cur = match host.dict_get(cur, *key).map_err(Exception::Error)? {
            Some(v) => host.dict_from(v).map_err(Exception::Error)?,
            None => host.dict_new(),
        };
    }
    let entries = host.dict_entries(cur).map_err(Exception::Error)?;
    let mut keys_used = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let kname = str_of(host, k);
        write_var(interp, host, &kname, v)?;
        keys_used.push((k, kname));
    }
    let r = interp.eval_obj(host, body);
    let mut new_inner = host.dict_new();
    for (k, kname) in keys_used {
        if let Ok(v) = read_var(interp, host, &kname) {
            new_inner = host.dict_set(new_inner, k, v).map_err(Exception::Error)?;
        }
    }
    let updated = dict_set_path(host, root, path, new_inner)?;
    write_var(interp, host, &name, updated)?;
    r
}

fn dict_filter(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict filter dictionary filterType arg ?arg ...?")));
    }
    let dict = host.dict_from(args[0]).map_err(Exception::Error)?;
    let kind = str_of(host, args[1]);
    let entries = host.dict_entries(dict).map_err(Exception::Error)?;
    let mut out = host.dict_new();
    match kind.as_str() {
        "key" if args.len() == 3 => {
            let pattern = str_of(host, args[2]);
            for (k, v) in entries {
                if host.glob_match(&pattern, &str_of(host, k), false) {
                    out = host.dict_set(out, k, v).map_err(Exception::Error)?;
                }
            }
        }
        "value" if args.len() == 3 => {
            let pattern = str_of(host, args[2]);
            for (k, v) in entries {
                if host.glob_match(&pattern, &str_of(host, v), false) {
                    out = host.dict_set(out, k, v).map_err(Exception::Error)?;
                }
            }
        }
        "script" if args.len() == 4 => {
            let vars = host.list_items(args[2]).map_err(Exception::Error)?;
            if vars.len() != 2 {
                return Err(Exception::error(TclErrorKind::syntax("must have exactly two variable names")));
            }
            let (kv, vv) = (str_of(host, vars[0]), str_of(host, vars[1]));
            let body = args[3];
            for (k, v) in entries {
                write_var(interp, host, &kv, k)?;
                write_var(interp, host, &vv, v)?;
                let r = interp.eval_obj(host, body)?;
                if host.int_get(r).map(|i| i != 0).unwrap_or(true) {
                    out = host.dict_set(out, k, v).map_err(Exception::Error)?;
                }
            }
        }
        _ => return Err(Exception::error(TclErrorKind::syntax(format!("unknown filter type \"{}\"", kind)))),
    }
    Ok(out)
}

fn dict_update(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 4 || (args.len() - 2) % 2 != 1 {
        return Err(Exception::error(TclErrorKind::arity(
            "dict update dictVarName key varName ?key varName ...? body",
        )));
    }
    let name = str_of(host, args[0]);
    let body = *args.last().unwrap();
    let pairs = &args[1..args.len() - 1];
    let root = read_var(interp, host, &name)?;
    let dict = host.dict_from(root).map_err(Exception::Error)?;
    let mut bound = Vec::new();
    for pair in pairs.chunks(2) {
        let (key, var) = (pair[0], str_of(host, pair[1]));
        let v = host.dict_get(dict, key).map_err(Exception::Error)?.unwrap_or_else(|| host.intern(""));
        write_var(interp, host, &var, v)?;
        bound.push((key, var));
    }
    let r = interp.eval_obj(host, body);
    let mut updated = dict;
    for (key, var) in bound {
        if let Ok(v) = read_var(interp, host, &var) {
            updated = host.dict_set(updated, key, v).map_err(Exception::Error)?;
        }
    }
    write_var(interp, host, &name, updated)?;
    r
}

fn dict_incr(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict incr dictVarName key ?increment?")));
    }
    let name = str_of(host, args[0]);
    let delta = match args.get(2) {
        Some(v) => host.int_get(*v).map_err(Exception::Error)?,
        None => 1,
    };
    let root = match read_var(interp, host, &name) {
        Ok(v) => v,
        Err(Exception::Error(_)) => host.dict_new(),
        Err(e) => return Err(e),
    };
    let dict = host.dict_from(root).map_err(Exception::Error)?;
    let current = match host.dict_get(dict, args[1]).map_err(Exception::Error)? {
        Some(v) => host.int_get(v).map_err(Exception::Error)?,
        None => 0,
    };
    let next = host.int_new(current.wrapping_add(delta));
    let updated = host.dict_set(dict, args[1], next).map_err(Exception::Error)?;
    write_var(interp, host, &name, updated)
}

fn dict_append(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict append dictVarName key ?value ...?")));
    }
    let name = str_of(host, args[0]);
    let root = match read_var(interp, host, &name) {
        Ok(v) => v,
        Err(Exception::Error(_)) => host.dict_new(),
        Err(e) => return Err(e),
    };
    let dict = host.dict_from(root).map_err(Exception::Error)?;
    let mut acc = host.dict_get(dict, args[1]).map_err(Exception::Error)?.unwrap_or_else(|| host.intern(""));
    for v in &args[2..] {
        acc = host.concat(acc, *v);
    }
    let updated = host.dict_set(dict, args[1], acc).map_err(Exception::Error)?;
    write_var(interp, host, &name, updated)
}

fn dict_lappend(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("dict lappend dictVarName key ?value ...?")));
    }
    let name = str_of(host, args[0]);
    let root = match read_var(interp, host, &name) {
        Ok(v) => v,
        Err(Exception::Error(_)) => host.dict_new(),
        Err(e) => return Err(e),
    };
    let dict = host.dict_from(root).map_err(Exception::Error)?;
    let existing = host.dict_get(dict, args[1]).map_err(Exception::Error)?.unwrap_or_else(|| host.list_new(&[]));
    let mut acc = host.list_from(existing).map_err(Exception::Error)?;
    for v in &args[2..] {
        acc = host.list_push(acc, *v).map_err(Exception::Error)?;
    }
    let updated = host.dict_set(dict, args[1], acc).map_err(Exception::Error)?;
    write_var(interp, host, &name, updated)
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
    fn create_get_set_roundtrip() {
        let (mut interp, mut host) = fresh();
        let k = host.intern("name");
        let v = host.intern("ada");
        let sub = host.intern("create");
        let d = cmd_dict(&mut interp, &mut host, &[sub, k, v]).unwrap();
        let sub = host.intern("get");
        let got = cmd_dict(&mut interp, &mut host, &[sub, d, k]).unwrap();
        assert_eq!(host.get_str(got).as_ref(), "ada");
    }

    #[test]
    fn nested_set_creates_intermediate_dicts() {
        let (mut interp, mut host) = fresh();
        let dv = host.intern("d");
        let a = host.intern("a");
        let b = host.intern("b");
        let v = host.intern("1");
        let sub = host.intern("set");
        cmd_dict(&mut interp, &mut host, &[sub, dv, a, b, v]).unwrap();
        let sub = host.intern("get");
        let root = crate::interpreter::frame_stack::read_var(&mut interp, &mut host, "d").unwrap();
        let got = cmd_dict(&mut interp, &mut host, &[sub, root, a, b]).unwrap();
        assert_eq!(host.get_str(got).as_ref(), "1");
    }
}
