//! The interpreter: frame stack, namespace tree, trace guard, and the
//! interpreter-wide result/return-options slots (§3, §4.D, §6 "Interpreter").

use super::command_table::CommandEntry;
use super::namespace::{Namespace, NamespaceTree};
use super::types::{Frame, NsId, GLOBAL_NS};
use crate::error::TclError;
use crate::host::{HostOps, ObjHandle};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

/// Construction-time options (§ambient stack: small typed builder, no
/// config-file crate — the core has no config file).
pub struct InterpBuilder {
    max_call_depth: usize,
    install_default_commands: bool,
}

impl Default for InterpBuilder {
    fn default() -> Self {
        InterpBuilder { max_call_depth: 1000, install_default_commands: true }
    }
}

impl InterpBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn max_call_depth(mut self, n: usize) -> Self {
        self.max_call_depth = n;
        self
    }
    pub fn without_default_commands(mut self) -> Self {
        self.install_default_commands = false;
        self
    }
    pub fn build(self, host: &mut dyn HostOps) -> Interp {
        let nil = host.nil();
        let empty = host.intern("");
        let mut interp = Interp {
            namespaces: NamespaceTree::new(),
            frames: vec![Frame::new(nil, Vec::new(), GLOBAL_NS, 0)],
            active_frame: 0,
            trace_guard: false,
            max_call_depth: self.max_call_depth,
            result: empty,
            return_opts: None,
            script_path: None,
        };
        if self.install_default_commands {
            crate::commands::install_all(&mut interp, host);
        }
        interp
    }
}

pub struct Interp {
    namespaces: NamespaceTree,
    frames: Vec<Frame>,
    /// What `uplevel`/`namespace eval` temporarily redirect lookups to;
    /// distinct from `frames.len() - 1`, the true top of stack (§3 "Frames").
    active_frame: usize,
    pub(crate) trace_guard: bool,
    max_call_depth: usize,
    result: ObjHandle,
    return_opts: Option<ObjHandle>,
    script_path: Option<String>,
}

impl Interp {
    pub fn new(host: &mut dyn HostOps) -> Self {
        InterpBuilder::default().build(host)
    }

    // ---- frame stack ----------------------------------------------------

    pub fn frame(&self, idx: usize) -> &Frame {
        &self.frames[idx]
    }
    pub fn frame_mut(&mut self, idx: usize) -> &mut Frame {
        &mut self.frames[idx]
    }
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
    pub fn active_frame_index(&self) -> usize {
        self.active_frame
    }
    pub fn top_frame_index(&self) -> usize {
        self.frames.len() - 1
    }
    pub fn current_namespace(&self) -> NsId {
        self.frames[self.active_frame].namespace
    }

    /// Push a new frame at the top of the stack, becoming both the top and
    /// the active frame. Returns `Err` on recursion-limit exhaustion without
    /// mutating the stack (§8 "Max-depth recursion").
    pub fn push_frame(&mut self, cmd: ObjHandle, args: Vec<ObjHandle>, namespace: NsId) {
        let level = self.frames.len();
        self.frames.push(Frame::new(cmd, args, namespace, level));
        self.active_frame = level;
    }

    pub fn try_push_frame(&mut self, cmd: ObjHandle, args: Vec<ObjHandle>, namespace: NsId) -> Result<(), TclError> {
        if self.frames.len() >= self.max_call_depth {
            return Err(crate::error::TclErrorKind::invariant(
                "too many nested evaluations (infinite loop?)",
            ));
        }
        self.push_frame(cmd, args, namespace);
        Ok(())
    }

    /// Pop the top frame. The active frame is restored to the new top
    /// unless it was redirected lower by an enclosing `uplevel` (frame
    /// balance is guaranteed by every caller using a scoped push/pop).
    pub fn pop_frame(&mut self) {
        self.frames.pop();
        if self.active_frame >= self.frames.len() {
            self.active_frame = self.frames.len() - 1;
        }
    }

    /// Temporarily redirect the active frame (for `uplevel`), returning the
    /// previous value so the caller can restore it on every exit path.
    pub fn set_active_frame(&mut self, idx: usize) -> usize {
        std::mem::replace(&mut self.active_frame, idx)
    }

    pub fn set_local(&mut self, name: Rc<str>, value: ObjHandle) {
        let cur = self.active_frame;
        self.frames[cur].locals.insert(name, value);
    }

    // ---- namespaces -------------------------------------------------------

    pub fn namespace(&self, id: NsId) -> &Namespace {
        self.namespaces.get(id)
    }
    pub fn namespace_mut(&mut self, id: NsId) -> &mut Namespace {
        self.namespaces.get_mut(id)
    }
    pub fn namespace_full_path(&self, id: NsId) -> String {
        self.namespaces.full_path(id)
    }
    pub fn namespace_resolve_absolute(&self, path: &[String]) -> Option<NsId> {
        self.namespaces.resolve_absolute(path)
    }
    pub fn namespace_resolve_relative(&self, from: NsId, path: &[String]) -> Option<NsId> {
        self.namespaces.resolve_relative(from, path)
    }
    pub fn namespace_ensure(&mut self, from: NsId, path: &[String]) -> NsId {
        self.namespaces.ensure(from, path)
    }
    pub fn namespace_children(&self, id: NsId) -> Vec<NsId> {
        self.namespaces.children_of(id)
    }
    pub fn namespace_delete(&mut self, id: NsId) -> Vec<NsId> {
        self.namespaces.delete_subtree(id)
    }

    pub fn define_command(&mut self, ns: NsId, name: &str, entry: CommandEntry) {
        self.namespace_mut(ns).commands.insert(Rc::from(name), entry);
    }

    // ---- exec trace plumbing ---------------------------------------------

    pub fn exec_traces_for(&self, ns: NsId, name: &str) -> Option<Vec<super::trace::TraceRecord>> {
        let recs = self.namespace(ns).exec_traces.get(name)?;
        if recs.is_empty() {
            None
        } else {
            Some(recs.clone())
        }
    }

    pub fn make_exec_trace_list(&self, host: &mut dyn HostOps, cmd: ObjHandle, args: &[ObjHandle]) -> ObjHandle {
        let mut words = Vec::with_capacity(args.len() + 1);
        words.push(cmd);
        words.extend_from_slice(args);
        host.list_new(&words)
    }

    // ---- result slot & return options --------------------------------------

    pub fn set_result(&mut self, v: ObjHandle) {
        self.result = v;
    }
    pub fn get_result(&self) -> ObjHandle {
        self.result
    }
    pub fn reset_result(&mut self, host: &mut dyn HostOps) {
        self.result = host.intern("");
    }
    pub fn set_return_options(&mut self, v: Option<ObjHandle>) {
        self.return_opts = v;
    }
    pub fn get_return_options(&self) -> Option<ObjHandle> {
        self.return_opts
    }
    pub fn set_script_path(&mut self, p: Option<String>) {
        self.script_path = p;
    }
    pub fn get_script_path(&self) -> Option<&str> {
        self.script_path.as_deref()
    }

    // ---- evaluation entry points (delegated to eval.rs) --------------------

    pub fn eval_str(&mut self, host: &mut dyn HostOps, src: &str) -> EvalResult {
        super::eval::eval_script(self, host, src)
    }

    /// Evaluate the string form of an object as a script (used by proc
    /// bodies, `namespace eval` bodies, `apply`, `uplevel`).
    pub fn eval_obj(&mut self, host: &mut dyn HostOps, body: ObjHandle) -> EvalResult {
        let src = host.get_str(body).to_string();
        super::eval::eval_script(self, host, &src)
    }
}

/// Convenience for builtins: wrap a plain value as an `Ok` evaluation.
pub fn ok(v: ObjHandle) -> EvalResult {
    Ok(v)
}

/// Convenience for builtins: produce the `-code error` exception.
pub fn err(e: TclError) -> EvalResult {
    Err(Exception::Error(e))
}
