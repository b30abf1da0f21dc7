//! The `namespace` subcommand dispatcher (§4.G).

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::namespace::parse_ns_path;
use crate::interpreter::{CommandEntry, Interp, NsId, GLOBAL_NS};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = GLOBAL_NS;
    interp.define_command(ns, "namespace", CommandEntry::Builtin(Rc::new(cmd_namespace)));
}

fn str_of(host: &mut dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

fn resolve_target(interp: &Interp, cur: NsId, name: &str) -> Option<NsId> {
    let (absolute, parts) = parse_ns_path(name);
    if absolute {
        interp.namespace_resolve_absolute(&parts)
    } else {
        interp.namespace_resolve_relative(cur, &parts)
    }
}

fn cmd_namespace(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let Some((&sub, rest)) = args.split_first() else {
        return Err(Exception::error(TclErrorKind::arity("namespace subcommand ?arg ...?")));
    };
    match str_of(host, sub).as_str() {
        "eval" => ns_eval(interp, host, rest),
        "current" => {
            let cur = interp.current_namespace();
            Ok(host.intern(&format!("::{}", interp.namespace_full_path(cur))))
        }
        "parent" => ns_parent(interp, host, rest),
        "children" => ns_children(interp, host, rest),
        "qualifiers" => ns_qualifiers(host, rest),
        "tail" => ns_tail(host, rest),
        "exists" => ns_exists(interp, host, rest),
        "delete" => ns_delete(interp, host, rest),
        "export" => ns_export(interp, host, rest),
        "import" => ns_import(interp, host, rest),
        "which" => ns_which(interp, host, rest),
        "origin" => ns_origin(interp, host, rest),
        other => Err(Exception::error(TclErrorKind::syntax(format!(
            "unknown or ambiguous subcommand \"{}\": must be children, current, delete, eval, exists, export, import, origin, parent, qualifiers, tail, or which",
            other
        )))),
    }
}

/// `namespace eval name body`: pushes a fresh frame rooted at `name`'s
/// namespace, since builtins otherwise run in the caller's frame (§3
/// "Lifecycle" — only procs and a few special builtins push their own).
fn ns_eval(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("namespace eval name arg ?arg ...?")));
    }
    let name = str_of(host, args[0]);
    let (absolute, parts) = parse_ns_path(&name);
    let target = if absolute {
        interp.namespace_ensure(GLOBAL_NS, &parts)
    } else {
        let cur = interp.current_namespace();
        interp.namespace_ensure(cur, &parts)
    };
    let body_words = &args[1..];
    let script = if body_words.len() == 1 {
        str_of(host, body_words[0])
    } else {
        body_words.iter().map(|a| str_of(host, *a)).collect::<Vec<_>>().join(" ")
    };
    let cmd_obj = host.intern("namespace");
    interp.try_push_frame(cmd_obj, Vec::new(), target).map_err(Exception::Error)?;
    let r = interp.eval_str(host, &script);
    interp.pop_frame();
    r
}

fn ns_parent(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = if args.is_empty() {
        interp.current_namespace()
    } else {
        let name = str_of(host, args[0]);
        resolve_target(interp, interp.current_namespace(), &name)
            .ok_or_else(|| Exception::error(TclErrorKind::no_such_namespace(name.clone())))?
    };
    match interp.namespace(cur).parent {
        Some(p) => Ok(host.intern(&format!("::{}", interp.namespace_full_path(p)))),
        None => Ok(host.intern("")),
    }
}

fn ns_children(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = if args.is_empty() {
        interp.current_namespace()
    } else {
        let name = str_of(host, args[0]);
        resolve_target(interp, interp.current_namespace(), &name)
            .ok_or_else(|| Exception::error(TclErrorKind::no_such_namespace(name.clone())))?
    };
    let mut names: Vec<ObjHandle> = interp
        .namespace_children(cur)
        .into_iter()
        .map(|id| host.intern(&format!("::{}", interp.namespace_full_path(id))))
        .collect();
    names.sort_by(|a, b| host.get_str(*a).cmp(&host.get_str(*b)));
    Ok(host.list_new(&names))
}

fn ns_qualifiers(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("namespace qualifiers string")));
    };
    let s = str_of(host, *name);
    match s.rfind("::") {
        Some(i) => Ok(host.intern(&s[..i])),
        None => Ok(host.intern("")),
    }
}

fn ns_tail(host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("namespace tail string")));
    };
    let s = str_of(host, *name);
    match s.rfind("::") {
        Some(i) => Ok(host.intern(&s[i + 2..])),
        None => Ok(host.intern(&s)),
    }
}

fn ns_exists(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("namespace exists name")));
    };
    let s = str_of(host, *name);
    let cur = interp.current_namespace();
    Ok(host.int_new(resolve_target(interp, cur, &s).is_some() as i64))
}

fn ns_delete(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = interp.current_namespace();
    for a in args {
        let name = str_of(host, *a);
        if let Some(id) = resolve_target(interp, cur, &name) {
            if id != GLOBAL_NS {
                interp.namespace_delete(id);
            }
        }
    }
    Ok(host.nil())
}

fn ns_export(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = interp.current_namespace();
    for a in args {
        let pat = str_of(host, *a);
        if pat == "-clear" {
            interp.namespace_mut(cur).exports.clear();
            continue;
        }
        interp.namespace_mut(cur).exports.push(pat);
    }
    Ok(host.nil())
}

fn ns_import(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let cur = interp.current_namespace();
    for a in args {
        let pat = str_of(host, *a);
        if pat == "-force" {
            continue;
        }
        let (ns_part, simple_pat) = match pat.rfind("::") {
            Some(i) => (&pat[..i], &pat[i + 2..]),
            None => {
                return Err(Exception::error(TclErrorKind::syntax(
                    "import pattern must be qualified",
                )))
            }
        };
        let (absolute, parts) = parse_ns_path(ns_part);
        let src_ns = if absolute {
            interp.namespace_resolve_absolute(&parts)
        } else {
            interp.namespace_resolve_relative(cur, &parts)
        }
        .ok_or_else(|| Exception::error(TclErrorKind::no_such_namespace(ns_part.to_string())))?;
        let exported = interp.namespace(src_ns).exports.clone();
        let names: Vec<String> = interp
            .namespace(src_ns)
            .commands
            .keys()
            .map(|k| k.to_string())
            .filter(|n| {
                host.glob_match(simple_pat, n, false)
                    && exported.iter().any(|pat| host.glob_match(pat, n, false))
            })
            .collect();
        for n in names {
            if let Some(entry) = interp.namespace(src_ns).commands.get(n.as_str()).cloned() {
                interp.define_command(cur, &n, entry);
            }
        }
    }
    Ok(host.nil())
}

fn ns_which(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let [name] = args else {
        return Err(Exception::error(TclErrorKind::arity("namespace which ?-command|-variable? name")));
    };
    let s = str_of(host, *name);
    let cur = interp.current_namespace();
    match crate::interpreter::command_table::resolve_command(interp, cur, &s) {
        Some((ns, _)) => Ok(host.intern(&format!("::{}::{}", interp.namespace_full_path(ns), s))),
        None => Ok(host.intern("")),
    }
}

fn ns_origin(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    ns_which(interp, host, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn eval_creates_and_scopes_into_a_namespace() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let r = interp
            .eval_str(&mut host, "namespace eval foo {set x 5; set x}")
            .unwrap();
        assert_eq!(host.get_str(r).as_ref(), "5");
        let cur = interp
            .eval_str(&mut host, "namespace eval foo {namespace current}")
            .unwrap();
        assert_eq!(host.get_str(cur).as_ref(), "::foo");
    }

    #[test]
    fn exists_reports_namespace_presence() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        interp.eval_str(&mut host, "namespace eval bar {}").unwrap();
        let r = interp.eval_str(&mut host, "namespace exists bar").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
        let r = interp.eval_str(&mut host, "namespace exists nope").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "0");
    }
}
