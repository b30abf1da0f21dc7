//! The five-way result code (§4.D, §8) and the control-flow sum type that
//! carries it through the evaluator.

use crate::error::TclError;
use crate::host::ObjHandle;

/// The wire-encodable result code. Exactly five values (§6 "Result Codes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResultCode {
    Ok = 0,
    Error = 1,
    Return = 2,
    Break = 3,
    Continue = 4,
}

impl ResultCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Everything that is not a plain `Ok` result. Every evaluation in the core
/// returns `EvalResult`, never panics or throws a host-language exception
/// (§4.D, §9 "Control flow as sum-type codes, not exceptions").
#[derive(Debug, Clone)]
pub enum Exception {
    /// `ERROR`: message + return-options are tracked on `Interp`, not here,
    /// since the options dict is an `ObjHandle` owned by the host.
    Error(TclError),
    /// `RETURN`: carries the returned value.
    Return(ObjHandle),
    /// `BREAK`: no payload.
    Break,
    /// `CONTINUE`: no payload.
    Continue,
}

impl Exception {
    pub fn code(&self) -> ResultCode {
        match self {
            Exception::Error(_) => ResultCode::Error,
            Exception::Return(_) => ResultCode::Return,
            Exception::Break => ResultCode::Break,
            Exception::Continue => ResultCode::Continue,
        }
    }

    pub fn error(e: impl Into<TclError>) -> Exception {
        Exception::Error(e.into())
    }
}

impl From<TclError> for Exception {
    fn from(e: TclError) -> Self {
        Exception::Error(e)
    }
}

/// The result of evaluating a command, a script, or an expression: either a
/// value (`Ok` result code) or one of the four exceptional codes.
pub type EvalResult = Result<ObjHandle, Exception>;
