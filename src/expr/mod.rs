//! The `expr` sublanguage: a Pratt-style operator-precedence evaluator
//! (§4.H).

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

use crate::host::{HostOps, ObjHandle};
use crate::interpreter::interp::Interp;
use crate::result::Exception;

/// Parse and evaluate an `expr` source string in one step; the entry point
/// used by the `expr` builtin and by `if`/`while`/`for` conditions.
pub fn eval_str(interp: &mut Interp, host: &mut dyn HostOps, src: &str) -> Result<ObjHandle, Exception> {
    let ast = parser::Parser::parse(src).map_err(Exception::Error)?;
    eval::eval(interp, host, &ast)
}
