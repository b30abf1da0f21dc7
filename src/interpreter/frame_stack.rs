//! Variable name resolution, `upvar`, and level parsing (§4.F).

use super::interp::Interp;
use super::trace::TraceRecord;
use super::types::{LinkTarget, NsId, GLOBAL_NS};
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::result::Exception;
use std::rc::Rc;

/// Parse an `upvar`/`uplevel` level argument: a bare integer `N` means N
/// frames up from the caller (default 1); `#N` is absolute (0 = global).
/// Returns the *absolute* frame index into `Interp::frames`.
pub fn resolve_level(interp: &Interp, spec: &str) -> Result<usize, crate::error::TclError> {
    let caller = interp.active_frame_index();
    if let Some(rest) = spec.strip_prefix('#') {
        let n: i64 = rest
            .parse()
            .map_err(|_| TclErrorKind::syntax(format!("bad level \"{}\"", spec)))?;
        if n < 0 || n as usize >= interp.frame_count() {
            return Err(TclErrorKind::syntax(format!("bad level \"{}\"", spec)));
        }
        return Ok(n as usize);
    }
    let n: i64 = spec
        .parse()
        .map_err(|_| TclErrorKind::syntax(format!("bad level \"{}\"", spec)))?;
    if n < 0 || n as usize > caller {
        return Err(TclErrorKind::syntax(format!("bad level \"{}\"", spec)));
    }
    Ok(caller - n as usize)
}

/// Variable name resolution for a read (§4.F).
pub fn read_var(interp: &mut Interp, host: &mut dyn HostOps, name: &str) -> Result<ObjHandle, Exception> {
    if let Some((ns, tail)) = qualified(interp, name) {
        return read_ns_var(interp, host, ns, &tail);
    }
    let cur = interp.active_frame_index();
    if let Some(target) = interp.frame(cur).links.get(name).cloned() {
        match &target {
            LinkTarget::Frame { level, name: n } => {
                let v = read_frame_local(interp, *level, n)?;
                fire_local_read(interp, host, *level, n, name)?;
                return Ok(v);
            }
            LinkTarget::Namespace { ns, name: n } => {
                let ns = *ns;
                let n = n.clone();
                return read_ns_var_fire(interp, host, ns, &n, name);
            }
        }
    }
    match interp.frame(cur).locals.get(name).copied() {
        Some(v) => {
            fire_local_read(interp, host, cur, name, name)?;
            Ok(v)
        }
        None => Err(Exception::error(TclErrorKind::no_such_variable(name))),
    }
}

pub fn write_var(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    name: &str,
    value: ObjHandle,
) -> Result<ObjHandle, Exception> {
    if let Some((ns, tail)) = qualified(interp, name) {
        return write_ns_var_fire(interp, host, ns, &tail, value, name);
    }
    let cur = interp.active_frame_index();
    if let Some(target) = interp.frame(cur).links.get(name).cloned() {
        match target {
            LinkTarget::Frame { level, name: n } => {
                write_frame_local(interp, level, &n, value)?;
                fire_local_write(interp, host, level, &n, name)?;
            }
            LinkTarget::Namespace { ns, name: n } => {
                return write_ns_var_fire(interp, host, ns, &n, value, name);
            }
        }
        return Ok(value);
    }
    interp.frame_mut(cur).locals.insert(Rc::from(name), value);
    fire_local_write(interp, host, cur, name, name)?;
    Ok(value)
}

pub fn unset_var(interp: &mut Interp, host: &mut dyn HostOps, name: &str) -> Result<(), crate::error::TclError> {
    if let Some((ns, tail)) = qualified(interp, name) {
        return unset_ns_var(interp, host, ns, &tail);
    }
    let cur = interp.active_frame_index();
    if interp.frame_mut(cur).links.shift_remove(name).is_some() {
        // Unsetting an alias removes the link, not the target (§4.F "upvar").
        let _ = fire_local_unset(interp, host, cur, name, name);
        return Ok(());
    }
    if interp.frame_mut(cur).locals.shift_remove(name).is_none() {
        return Err(TclErrorKind::no_such_variable(name));
    }
    let _ = fire_local_unset(interp, host, cur, name, name);
    Ok(())
}

pub fn var_exists(interp: &Interp, name: &str) -> bool {
    if let Some((ns, tail)) = qualified_ro(interp, name) {
        return interp.namespace(ns).vars.contains_key(tail.as_str());
    }
    let cur = interp.active_frame_index();
    let f = interp.frame(cur);
    if let Some(target) = f.links.get(name) {
        return match target {
            LinkTarget::Frame { level, name: n } => interp.frame(*level).locals.contains_key(n.as_ref()),
            LinkTarget::Namespace { ns, name: n } => interp.namespace(*ns).vars.contains_key(n.as_ref()),
        };
    }
    f.locals.contains_key(name)
}

/// `upvar level other-name local-name …`: link `local-name` (in the current
/// frame) to the variable `other-name` in the frame at `level`.
pub fn upvar(
    interp: &mut Interp,
    level_spec: &str,
    other_name: &str,
    local_name: &str,
) -> Result<(), crate::error::TclError> {
    let target_frame = resolve_level(interp, level_spec)?;
    let cur = interp.active_frame_index();
    let target = if let Some((ns, tail)) = qualified_ro(interp, other_name) {
        LinkTarget::Namespace { ns, name: Rc::from(tail.as_str()) }
    } else {
        LinkTarget::Frame { level: target_frame, name: Rc::from(other_name) }
    };
    interp.frame_mut(cur).links.insert(Rc::from(local_name), target);
    Ok(())
}

/// `variable name ?value?`: link `name` in the current frame to the
/// namespace variable of the same simple name in the frame's namespace.
pub fn variable_link(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    name: &str,
    value: Option<ObjHandle>,
) -> Result<(), Exception> {
    let cur = interp.active_frame_index();
    let ns = interp.frame(cur).namespace;
    let simple: Rc<str> = Rc::from(name);
    if !interp.namespace(ns).vars.contains_key(simple.as_ref()) {
        let nil = host.nil();
        interp.namespace_mut(ns).vars.insert(simple.clone(), nil);
    }
    interp
        .frame_mut(cur)
        .links
        .insert(simple.clone(), LinkTarget::Namespace { ns, name: simple.clone() });
    if let Some(v) = value {
        write_ns_var_fire(interp, host, ns, &simple, v, name)?;
    }
    Ok(())
}

// --- internal helpers ----------------------------------------------------

fn qualified(interp: &Interp, name: &str) -> Option<(NsId, String)> {
    qualified_ro(interp, name)
}

fn qualified_ro(interp: &Interp, name: &str) -> Option<(NsId, String)> {
    if !name.contains("::") {
        return None;
    }
    let (absolute, mut parts) = super::namespace::parse_ns_path(name);
    let tail = parts.pop().unwrap_or_default();
    let from = interp.current_namespace();
    let ns = if absolute {
        interp.namespace_resolve_absolute(&parts)
    } else {
        interp.namespace_resolve_relative(from, &parts)
    };
    ns.map(|ns| (ns, tail)).or(Some((GLOBAL_NS, tail)))
}

fn read_frame_local(interp: &Interp, level: usize, name: &str) -> Result<ObjHandle, Exception> {
    interp
        .frame(level)
        .locals
        .get(name)
        .copied()
        .ok_or_else(|| Exception::error(TclErrorKind::no_such_variable(name)))
}

fn write_frame_local(interp: &mut Interp, level: usize, name: &str, value: ObjHandle) -> Result<(), Exception> {
    interp.frame_mut(level).locals.insert(Rc::from(name), value);
    Ok(())
}

fn read_ns_var(interp: &mut Interp, host: &mut dyn HostOps, ns: NsId, name: &str) -> Result<ObjHandle, Exception> {
    read_ns_var_fire(interp, host, ns, name, name)
}

fn read_ns_var_fire(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    ns: NsId,
    name: &str,
    local_alias: &str,
) -> Result<ObjHandle, Exception> {
    let v = interp
        .namespace(ns)
        .vars
        .get(name)
        .copied()
        .ok_or_else(|| Exception::error(TclErrorKind::no_such_variable(local_alias)))?;
    let records = traces_for(interp, ns, name);
    super::trace::fire_variable(interp, host, &records, local_alias, "read").map_err(Exception::Error)?;
    Ok(v)
}

fn write_ns_var_fire(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    ns: NsId,
    name: &str,
    value: ObjHandle,
    local_alias: &str,
) -> Result<ObjHandle, Exception> {
    interp.namespace_mut(ns).vars.insert(Rc::from(name), value);
    let records = traces_for(interp, ns, name);
    super::trace::fire_variable(interp, host, &records, local_alias, "write").map_err(Exception::Error)?;
    // Re-read: the trace script may have written the variable again, and
    // the caller (e.g. `set`) should report the post-trace value.
    Ok(interp.namespace(ns).vars.get(name).copied().unwrap_or(value))
}

fn unset_ns_var(interp: &mut Interp, host: &mut dyn HostOps, ns: NsId, name: &str) -> Result<(), crate::error::TclError> {
    if interp.namespace_mut(ns).vars.shift_remove(name).is_none() {
        return Err(TclErrorKind::no_such_variable(name));
    }
    let records = traces_for(interp, ns, name);
    let _ = super::trace::fire_variable(interp, host, &records, name, "unset");
    Ok(())
}

fn traces_for(interp: &Interp, ns: NsId, name: &str) -> Vec<TraceRecord> {
    let mut v: Vec<TraceRecord> = interp
        .namespace(ns)
        .var_traces
        .get(name)
        .cloned()
        .unwrap_or_default();
    v.reverse(); // stored oldest-first, fire newest-first (LIFO)
    v
}

fn local_traces_for(interp: &Interp, level: usize, name: &str) -> Vec<TraceRecord> {
    let mut v: Vec<TraceRecord> = interp
        .frame(level)
        .var_traces
        .get(name)
        .cloned()
        .unwrap_or_default();
    v.reverse();
    v
}

/// Fires the traces stored at `(level, name)` — the link target when `name`
/// is an upvar'd alias — but invokes the trace script with `alias`, the name
/// as used at the call site (§4.F).
fn fire_local_read(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    level: usize,
    name: &str,
    alias: &str,
) -> Result<(), Exception> {
    let records = local_traces_for(interp, level, name);
    super::trace::fire_variable(interp, host, &records, alias, "read").map_err(Exception::Error)
}

fn fire_local_write(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    level: usize,
    name: &str,
    alias: &str,
) -> Result<(), Exception> {
    let records = local_traces_for(interp, level, name);
    super::trace::fire_variable(interp, host, &records, alias, "write").map_err(Exception::Error)
}

fn fire_local_unset(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    level: usize,
    name: &str,
    alias: &str,
) -> Result<(), Exception> {
    let records = local_traces_for(interp, level, name);
    super::trace::fire_variable(interp, host, &records, alias, "unset").map_err(Exception::Error)
}
