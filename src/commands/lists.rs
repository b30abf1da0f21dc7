//! List builtins (§4.K): list/llength/lindex/linsert/lrange/lreplace/
//! lrepeat/lreverse/lsort/lsearch/lassign/lset/join/split/concat.

use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::frame_stack::write_var;
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
    def!("list", cmd_list);
    def!("llength", cmd_llength);
    def!("lindex", cmd_lindex);
    def!("linsert", cmd_linsert);
    def!("lrange", cmd_lrange);
    def!("lreplace", cmd_lreplace);
    def!("lrepeat", cmd_lrepeat);
    def!("lreverse", cmd_lreverse);
    def!("lsort", cmd_lsort);
    def!("lsearch", cmd_lsearch);
    def!("lassign", cmd_lassign);
    def!("lset", cmd_lset);
    def!("join", cmd_join);
    def!("split", cmd_split);
    def!("concat", cmd_concat);
}

fn str_of(host: &dyn HostOps, o: ObjHandle) -> String {
    host.get_str(o).to_string()
}

/// Resolve a Tcl list index spec (`end`, `end-N`, plain integer) against a
/// length, saturating out-of-range results as the caller's contract allows.
fn parse_index(host: &dyn HostOps, o: ObjHandle, len: usize) -> Result<i64, crate::error::TclError> {
    let s = host.get_str(o);
    if let Some(rest) = s.strip_prefix("end") {
        if rest.is_empty() {
            return Ok(len as i64 - 1);
        }
        if let Some(off) = rest.strip_prefix('-') {
            let n: i64 = off.parse().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))?;
            return Ok(len as i64 - 1 - n);
        }
        if let Some(off) = rest.strip_prefix('+') {
            let n: i64 = off.parse().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))?;
            return Ok(len as i64 - 1 + n);
        }
    }
    s.parse::<i64>().map_err(|_| TclErrorKind::syntax(format!("bad index \"{}\"", s)))
}

fn cmd_list(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    Ok(host.list_new(args))
}

fn cmd_llength(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("llength list")));
    }
    let n = host.list_len(args[0]).map_err(Exception::Error)?;
    Ok(host.int_new(n as i64))
}

fn cmd_lindex(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("lindex list ?index ...?")));
    }
    let mut cur = args[0];
    for idx_obj in &args[1..] {
        let len = host.list_len(cur).map_err(Exception::Error)?;
        let idx = parse_index(host, *idx_obj, len).map_err(Exception::Error)?;
        cur = if idx < 0 || idx as usize >= len {
            host.intern("")
        } else {
            host.list_index(cur, idx as usize).map_err(Exception::Error)?.unwrap_or_else(|| host.intern(""))
        };
    }
    Ok(cur)
}

fn cmd_linsert(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("linsert list index ?element ...?")));
    }
    let mut items = host.list_items(args[0]).map_err(Exception::Error)?;
    let len = items.len();
    let idx = parse_index(host, args[1], len).map_err(Exception::Error)?;
    let at = idx.clamp(0, len as i64) as usize;
    for (i, e) in args[2..].iter().enumerate() {
        items.insert(at + i, *e);
    }
    Ok(host.list_new(&items))
}

fn cmd_lrange(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 3 {
        return Err(Exception::error(TclErrorKind::arity("lrange list first last")));
    }
    let len = host.list_len(args[0]).map_err(Exception::Error)?;
    let lo = parse_index(host, args[1], len).map_err(Exception::Error)?.clamp(0, len as i64) as usize;
    let hi_raw = parse_index(host, args[2], len).map_err(Exception::Error)?;
    if hi_raw < lo as i64 {
        return Ok(host.list_new(&[]));
    }
    let hi = (hi_raw + 1).clamp(0, len as i64) as usize;
    host.list_slice(args[0], lo, hi).map_err(Exception::Error)
}

fn cmd_lreplace(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 3 {
        return Err(Exception::error(TclErrorKind::arity("lreplace list first last ?element ...?")));
    }
    let mut items = host.list_items(args[0]).map_err(Exception::Error)?;
    let len = items.len();
    let lo = parse_index(host, args[1], len).map_err(Exception::Error)?.clamp(0, len as i64) as usize;
    let hi = (parse_index(host, args[2], len).map_err(Exception::Error)? + 1).clamp(lo as i64, len as i64) as usize;
    let tail = items.split_off(hi.max(lo));
    items.truncate(lo);
    items.extend_from_slice(&args[3..]);
    items.extend(tail);
    Ok(host.list_new(&items))
}

fn cmd_lrepeat(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("lrepeat count ?element ...?")));
    }
    let n = host.int_get(args[0]).map_err(Exception::Error)?;
    if n < 0 {
        return Err(Exception::error(TclErrorKind::bad_type(format!(
            "bad count \"{}\": must be a non-negative integer",
            n
        ))));
    }
    let mut out = Vec::with_capacity(args[1..].len() * n as usize);
    for _ in 0..n {
        out.extend_from_slice(&args[1..]);
    }
    Ok(host.list_new(&out))
}

fn cmd_lreverse(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() != 1 {
        return Err(Exception::error(TclErrorKind::arity("lreverse list")));
    }
    let mut items = host.list_items(args[0]).map_err(Exception::Error)?;
    items.reverse();
    Ok(host.list_new(&items))
}

/// `lsort ?-ascii|-integer|-real? ?-increasing|-decreasing? ?-unique? list`.
fn cmd_lsort(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("lsort ?options? list")));
    }
    #[derive(PartialEq)]
    enum Mode {
        Ascii,
        Integer,
        Real,
    }
    let mut mode = Mode::Ascii;
    let mut decreasing = false;
    let mut unique = false;
    for opt in &args[..args.len() - 1] {
        match str_of(host, *opt).as_str() {
            "-ascii" => mode = Mode::Ascii,
            "-integer" => mode = Mode::Integer,
            "-real" => mode = Mode::Real,
            "-increasing" => decreasing = false,
            "-decreasing" => decreasing = true,
            "-unique" => unique = true,
            _ => {}
        }
    }
    let list_obj = *args.last().unwrap();
    let mut items = host.list_items(list_obj).map_err(Exception::Error)?;
    let mut err = None;
    items.sort_by(|a, b| {
        if err.is_some() {
            return std::cmp::Ordering::Equal;
        }
        let ord = match mode {
            Mode::Ascii => host.compare(*a, *b),
            Mode::Integer => match (host.int_get(*a), host.int_get(*b)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => {
                    err = Some(TclErrorKind::bad_type("expected integer but got non-integer value"));
                    std::cmp::Ordering::Equal
                }
            },
            Mode::Real => match (host.double_get(*a), host.double_get(*b)) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                _ => {
                    err = Some(TclErrorKind::bad_type("expected floating-point number but got non-numeric value"));
                    std::cmp::Ordering::Equal
                }
            },
        };
        if decreasing {
            ord.reverse()
        } else {
            ord
        }
    });
    if let Some(e) = err {
        return Err(Exception::Error(e));
    }
    if unique {
        items.dedup_by(|a, b| host.str_equal(*a, *b));
    }
    Ok(host.list_new(&items))
}

/// `lsearch ?-exact|-glob|-regexp? ?-all? ?-inline? list pattern`.
fn cmd_lsearch(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 2 {
        return Err(Exception::error(TclErrorKind::arity("lsearch ?options? list pattern")));
    }
    #[derive(PartialEq)]
    enum Mode {
        Exact,
        Glob,
        Regexp,
    }
    let mut mode = Mode::Glob;
    let mut all = false;
    let mut inline = false;
    let opts = &args[..args.len() - 2];
    for opt in opts {
        match str_of(host, *opt).as_str() {
            "-exact" => mode = Mode::Exact,
            "-glob" => mode = Mode::Glob,
            "-regexp" => mode = Mode::Regexp,
            "-all" => all = true,
            "-inline" => inline = true,
            _ => {}
        }
    }
    let list_obj = args[args.len() - 2];
    let pattern = str_of(host, args[args.len() - 1]);
    let items = host.list_items(list_obj).map_err(Exception::Error)?;
    let mut hits = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let s = str_of(host, *item);
        let matched = match mode {
            Mode::Exact => s == pattern,
            Mode::Glob => host.glob_match(&pattern, &s, false),
            Mode::Regexp => host.regex_match(&pattern, &s, false).map_err(Exception::Error)?,
        };
        if matched {
            hits.push((i, *item));
            if !all {
                break;
            }
        }
    }
    if inline {
        let vals: Vec<ObjHandle> = hits.iter().map(|(_, v)| *v).collect();
        return if all {
            Ok(host.list_new(&vals))
        } else {
            Ok(vals.first().copied().unwrap_or_else(|| host.intern("")))
        };
    }
    let idxs: Vec<ObjHandle> = hits.iter().map(|(i, _)| host.int_new(*i as i64)).collect();
    if all {
        Ok(host.list_new(&idxs))
    } else {
        Ok(idxs.first().copied().unwrap_or_else(|| host.int_new(-1)))
    }
}

/// `lassign list varName ?varName ...?`.
fn cmd_lassign(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("lassign list ?varName ...?")));
    }
    let items = host.list_items(args[0]).map_err(Exception::Error)?;
    let vars = &args[1..];
    for (i, var) in vars.iter().enumerate() {
        let v = items.get(i).copied().unwrap_or_else(|| host.intern(""));
        let name = str_of(host, *var);
        write_var(interp, host, &name, v)?;
    }
    let rest: Vec<ObjHandle> = items.into_iter().skip(vars.len()).collect();
    Ok(host.list_new(&rest))
}

/// `lset varName index ?index ...? newValue` (single-index form).
fn cmd_lset(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.len() < 3 {
        return Err(Exception::error(TclErrorKind::arity("lset varName index ?index ...? value")));
    }
    let name = str_of(host, args[0]);
    let new_val = *args.last().unwrap();
    let idx_objs = &args[1..args.len() - 1];
    let existing = crate::interpreter::frame_stack::read_var(interp, host, &name)?;
    let mut items = host.list_items(existing).map_err(Exception::Error)?;
    if idx_objs.len() != 1 {
        return Err(Exception::error(TclErrorKind::bad_type(
            "multi-dimensional lset is not supported",
        )));
    }
    let len = items.len();
    let idx = parse_index(host, idx_objs[0], len).map_err(Exception::Error)?;
    if idx < 0 || idx as usize >= len {
        return Err(Exception::error(TclErrorKind::bad_type("list index out of range")));
    }
    items[idx as usize] = new_val;
    let updated = host.list_new(&items);
    write_var(interp, host, &name, updated)
}

fn cmd_join(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(Exception::error(TclErrorKind::arity("join list ?joinString?")));
    }
    let sep = match args.get(1) {
        Some(v) => str_of(host, *v),
        None => " ".to_string(),
    };
    let items = host.list_items(args[0]).map_err(Exception::Error)?;
    let parts: Vec<String> = items.iter().map(|o| str_of(host, *o)).collect();
    Ok(host.intern(&parts.join(&sep)))
}

/// `split string ?splitChars?`: default split is on whitespace, one
/// character at a time from `splitChars` otherwise, matching §4.K.
fn cmd_split(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() || args.len() > 2 {
        return Err(Exception::error(TclErrorKind::arity("split string ?splitChars?")));
    }
    let s = str_of(host, args[0]);
    let split_chars = match args.get(1) {
        Some(v) => str_of(host, *v),
        None => " \t\n\r".to_string(),
    };
    let pieces: Vec<&str> = if split_chars.is_empty() {
        s.split("").filter(|p| !p.is_empty()).collect()
    } else {
        s.split(|c| split_chars.contains(c)).collect()
    };
    let items: Vec<ObjHandle> = pieces.iter().map(|p| host.intern(p)).collect();
    Ok(host.list_new(&items))
}

fn cmd_concat(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let mut all = Vec::new();
    for a in args {
        let s = str_of(host, *a);
        if s.trim().is_empty() {
            continue;
        }
        all.extend(host.list_items(*a).map_err(Exception::Error)?);
    }
    Ok(host.list_new(&all))
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
    fn llength_and_lindex() {
        let (mut interp, mut host) = fresh();
        let a = host.intern("a");
        let b = host.intern("b");
        let c = host.intern("c");
        let l = cmd_list(&mut interp, &mut host, &[a, b, c]).unwrap();
        let len = cmd_llength(&mut interp, &mut host, &[l]).unwrap();
        assert_eq!(host.get_str(len).as_ref(), "3");
        let end = host.intern("end");
        let last = cmd_lindex(&mut interp, &mut host, &[l, end]).unwrap();
        assert_eq!(host.get_str(last).as_ref(), "c");
    }

    #[test]
    fn lsort_integer_mode() {
        let (mut interp, mut host) = fresh();
        let items: Vec<ObjHandle> = ["10", "2", "33"].iter().map(|s| host.intern(s)).collect();
        let l = host.list_new(&items);
        let flag = host.intern("-integer");
        let sorted = cmd_lsort(&mut interp, &mut host, &[flag, l]).unwrap();
        assert_eq!(host.get_str(sorted).as_ref(), "2 10 33");
    }

    #[test]
    fn lsearch_glob_returns_index() {
        let (mut interp, mut host) = fresh();
        let items: Vec<ObjHandle> = ["apple", "banana", "cherry"].iter().map(|s| host.intern(s)).collect();
        let l = host.list_new(&items);
        let pat = host.intern("ban*");
        let idx = cmd_lsearch(&mut interp, &mut host, &[l, pat]).unwrap();
        assert_eq!(host.get_str(idx).as_ref(), "1");
    }
}
