// src/commands/mod.rs
pub mod control_flow;
pub mod dicts;
pub mod expr_cmd;
pub mod introspection;
pub mod lists;
pub mod mathfunc;
pub mod metaprogramming;
pub mod namespace_cmd;
pub mod strings;
pub mod trace_cmd;
pub mod variables;

use crate::host::HostOps;
use crate::interpreter::namespace::parse_ns_path;
use crate::interpreter::{Interp, NsId};

/// Resolve where a definition (`proc`, `rename`'s destination, ...) under
/// `name` should land: a bare name stays in `current_ns`; a `::`-qualified
/// name's namespace prefix is created on demand (§4.G "namespace eval").
pub(crate) fn resolve_def_target(interp: &mut Interp, current_ns: NsId, name: &str) -> (NsId, String) {
    let (absolute, parts) = parse_ns_path(name);
    if parts.is_empty() {
        return (current_ns, String::new());
    }
    if parts.len() == 1 && !absolute {
        return (current_ns, parts[0].clone());
    }
    let simple = parts.last().cloned().unwrap();
    let prefix = &parts[..parts.len() - 1];
    let ns = if absolute {
        interp.namespace_ensure(crate::interpreter::GLOBAL_NS, prefix)
    } else {
        interp.namespace_ensure(current_ns, prefix)
    };
    (ns, simple)
}

/// Install every builtin command into `interp`'s global namespace. Called
/// once by [`crate::interpreter::InterpBuilder::build`] unless the builder
/// opts out via `without_default_commands` (§3 "Bootstrapping").
pub fn install_all(interp: &mut Interp, host: &mut dyn HostOps) {
    control_flow::install(interp, host);
    variables::install(interp, host);
    lists::install(interp, host);
    dicts::install(interp, host);
    strings::install(interp, host);
    expr_cmd::install(interp, host);
    mathfunc::install(interp, host);
    metaprogramming::install(interp, host);
    namespace_cmd::install(interp, host);
    trace_cmd::install(interp, host);
    introspection::install(interp, host);
}
