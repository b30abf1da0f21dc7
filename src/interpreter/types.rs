//! Frame, link-table, and namespace-id types shared across the interpreter
//! submodules (§3 "Frames", §3 "Namespaces").

use crate::host::ObjHandle;
use indexmap::IndexMap;
use std::rc::Rc;

/// Index into `Interp::namespaces`. Namespace 0 is always the global `::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NsId(pub u32);

pub const GLOBAL_NS: NsId = NsId(0);

/// Where a local alias actually lives, installed by `upvar`/`variable`.
#[derive(Debug, Clone)]
pub enum LinkTarget {
    Frame { level: usize, name: Rc<str> },
    Namespace { ns: NsId, name: Rc<str> },
}

/// One call-stack record (§3 "Frames").
pub struct Frame {
    pub cmd: ObjHandle,
    pub args: Vec<ObjHandle>,
    pub locals: IndexMap<Rc<str>, ObjHandle>,
    pub links: IndexMap<Rc<str>, LinkTarget>,
    pub namespace: NsId,
    pub level: usize,
    pub var_traces: IndexMap<Rc<str>, Vec<crate::interpreter::trace::TraceRecord>>,
}

impl Frame {
    pub fn new(cmd: ObjHandle, args: Vec<ObjHandle>, namespace: NsId, level: usize) -> Self {
        Frame {
            cmd,
            args,
            locals: IndexMap::new(),
            links: IndexMap::new(),
            namespace,
            level,
            var_traces: IndexMap::new(),
        }
    }
}
