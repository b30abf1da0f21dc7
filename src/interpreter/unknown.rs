//! Default `unknown` hook (§4.E "Resolution order" step 3).
//!
//! When a name fails to resolve in the namespace chain, the interpreter
//! looks for a command literally named `unknown` (in the global namespace)
//! and calls it with `(name, args…)`. If no `unknown` command has been
//! installed, resolution fails with "invalid command name".

use super::interp::Interp;
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::result::{EvalResult, Exception};

pub fn invoke_unknown(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    cmd_obj: ObjHandle,
    args: &[ObjHandle],
) -> EvalResult {
    let ns = super::types::GLOBAL_NS;
    let name = host.get_str(cmd_obj).to_string();
    if name == "unknown" {
        return Err(Exception::error(TclErrorKind::no_such_command(name)));
    }
    match super::command_table::resolve_command(interp, ns, "unknown") {
        Some((found_ns, entry)) => {
            let mut full_args = Vec::with_capacity(args.len() + 1);
            full_args.push(cmd_obj);
            full_args.extend_from_slice(args);
            let unknown_obj = host.intern("unknown");
            super::command_table::dispatch(interp, host, found_ns, &entry, unknown_obj, &full_args)
        }
        None => Err(Exception::error(TclErrorKind::no_such_command(name))),
    }
}
