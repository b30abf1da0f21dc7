//! The `expr` builtin: wraps [`crate::expr::eval_str`] over the
//! space-joined argument words, matching Tcl's "expr takes one or more
//! words and concatenates them" convention.

use crate::host::{HostOps, ObjHandle};
use crate::interpreter::{CommandEntry, Interp};
use crate::result::EvalResult;
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let ns = crate::interpreter::GLOBAL_NS;
    interp.define_command(ns, "expr", CommandEntry::Builtin(Rc::new(cmd_expr)));
}

fn cmd_expr(interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let src = args
        .iter()
        .map(|a| host.get_str(*a).to_string())
        .collect::<Vec<_>>()
        .join(" ");
    crate::expr::eval_str(interp, host, &src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn arithmetic_and_comparison() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let src = host.intern("1 + 2 * 3 == 7");
        let r = cmd_expr(&mut interp, &mut host, &[src]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "1");
    }
}
