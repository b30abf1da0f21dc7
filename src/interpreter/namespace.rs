//! Namespace tree: storage and the operations behind the `namespace`
//! builtin (§4.G, §3 "Namespaces").

use super::command_table::CommandEntry;
use super::trace::TraceRecord;
use super::types::{NsId, GLOBAL_NS};
use crate::host::ObjHandle;
use indexmap::IndexMap;
use std::rc::Rc;

pub struct Namespace {
    pub simple_name: Rc<str>,
    pub parent: Option<NsId>,
    pub children: IndexMap<Rc<str>, NsId>,
    pub vars: IndexMap<Rc<str>, ObjHandle>,
    pub commands: IndexMap<Rc<str>, CommandEntry>,
    pub exports: Vec<String>,
    pub var_traces: IndexMap<Rc<str>, Vec<TraceRecord>>,
    pub cmd_traces: IndexMap<Rc<str>, Vec<TraceRecord>>,
    pub exec_traces: IndexMap<Rc<str>, Vec<TraceRecord>>,
}

impl Namespace {
    fn new(simple_name: Rc<str>, parent: Option<NsId>) -> Self {
        Namespace {
            simple_name,
            parent,
            children: IndexMap::new(),
            vars: IndexMap::new(),
            commands: IndexMap::new(),
            exports: Vec::new(),
            var_traces: IndexMap::new(),
            cmd_traces: IndexMap::new(),
            exec_traces: IndexMap::new(),
        }
    }
}

/// Owns the namespace arena; `NsId(0)` is always `::` and is never deleted.
pub struct NamespaceTree {
    arena: Vec<Namespace>,
}

impl NamespaceTree {
    pub fn new() -> Self {
        NamespaceTree { arena: vec![Namespace::new(Rc::from(""), None)] }
    }

    pub fn get(&self, id: NsId) -> &Namespace {
        &self.arena[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NsId) -> &mut Namespace {
        &mut self.arena[id.0 as usize]
    }

    /// Full `::`-qualified path of a namespace, `"::"` for the root.
    pub fn full_path(&self, id: NsId) -> String {
        if id == GLOBAL_NS {
            return "::".to_string();
        }
        let mut parts = Vec::new();
        let mut cur = id;
        loop {
            let ns = self.get(cur);
            parts.push(ns.simple_name.to_string());
            match ns.parent {
                Some(p) if p != GLOBAL_NS => cur = p,
                _ => break,
            }
        }
        parts.reverse();
        format!("::{}", parts.join("::"))
    }

    /// Resolve an absolute path (components with no leading `::` prefix
    /// stripped already), creating nothing. `[]` resolves to the root.
    pub fn resolve_absolute(&self, path: &[String]) -> Option<NsId> {
        let mut cur = GLOBAL_NS;
        for part in path {
            if part.is_empty() {
                continue;
            }
            cur = *self.get(cur).children.get(part.as_str())?;
        }
        Some(cur)
    }

    /// Resolve a path relative to `from`, falling back to absolute-from-root
    /// if no matching child chain exists relative to `from` (Tcl searches
    /// the current namespace, then ancestors are NOT searched for relative
    /// namespace paths — only variable/command *names* fall back to global).
    pub fn resolve_relative(&self, from: NsId, path: &[String]) -> Option<NsId> {
        let mut cur = from;
        for part in path {
            if part.is_empty() {
                cur = GLOBAL_NS;
                continue;
            }
            cur = *self.get(cur).children.get(part.as_str())?;
        }
        Some(cur)
    }

    /// Ensure `path` (relative to `from`) exists, creating intermediate
    /// namespaces as needed (§4.G "namespace eval").
    pub fn ensure(&mut self, from: NsId, path: &[String]) -> NsId {
        let mut cur = if path.first().map(|s| s.is_empty()).unwrap_or(false) {
            GLOBAL_NS
        } else {
            from
        };
        for part in path {
            if part.is_empty() {
                continue;
            }
            let existing = self.get(cur).children.get(part.as_str()).copied();
            cur = match existing {
                Some(id) => id,
                None => {
                    let id = NsId(self.arena.len() as u32);
                    self.arena.push(Namespace::new(Rc::from(part.as_str()), Some(cur)));
                    self.get_mut(cur).children.insert(Rc::from(part.as_str()), id);
                    id
                }
            };
        }
        cur
    }

    pub fn children_of(&self, id: NsId) -> Vec<NsId> {
        self.get(id).children.values().copied().collect()
    }

    /// Recursively delete `id` and all descendants. Returns the list of
    /// deleted command full-names (for command-delete trace firing by the
    /// caller, which also needs host/interp access this module doesn't have).
    pub fn delete_subtree(&mut self, id: NsId) -> Vec<NsId> {
        let mut all = vec![id];
        let mut frontier = vec![id];
        while let Some(cur) = frontier.pop() {
            for child in self.children_of(cur) {
                all.push(child);
                frontier.push(child);
            }
        }
        if let Some(parent) = self.get(id).parent {
            let name = self.get(id).simple_name.clone();
            self.get_mut(parent).children.shift_remove(&name);
        }
        all
    }
}

/// Split a (possibly empty-leading) `::`-path string into components,
/// distinguishing absolute (`::a::b`) from relative (`a::b`) forms.
pub fn parse_ns_path(path: &str) -> (bool, Vec<String>) {
    let absolute = path.starts_with("::");
    let trimmed = path.trim_start_matches("::");
    if trimmed.is_empty() {
        return (absolute, Vec::new());
    }
    (absolute, trimmed.split("::").map(|s| s.to_string()).collect())
}
