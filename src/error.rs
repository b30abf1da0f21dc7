//! Error taxonomy (§7). Every builtin and every core routine that can fail
//! produces one of these; `catch`/`try` observe them via [`crate::result::Exception`].
//!
//! Error strings match the Tcl-conventional wording named in §7 so that
//! scripts written against this core see familiar messages.

use thiserror::Error;

/// A structured error plus the bits needed to populate the `-errorcode` /
/// `-errorinfo` return options (§7 "Return options").
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct TclError {
    pub kind: TclErrorKind,
    /// `errorInfo`-style trace, accumulated one frame at a time as the
    /// error unwinds (§7 "Propagation").
    pub info: Vec<String>,
    /// The `-errorcode` list, space-joined; `NONE` unless a builtin set one.
    pub error_code: String,
}

impl TclError {
    pub fn new(kind: TclErrorKind) -> Self {
        TclError { kind, info: Vec::new(), error_code: "NONE".to_string() }
    }

    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = code.into();
        self
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Prepend a frame description while the error unwinds through a proc
    /// or script boundary.
    pub fn push_trace(&mut self, frame_desc: impl Into<String>) {
        self.info.push(frame_desc.into());
    }
}

/// The taxonomy named in §7: syntax, arity, type, lookup, domain, invariant, user.
#[derive(Debug, Clone, Error)]
pub enum TclErrorKind {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("wrong # args: should be \"{0}\"")]
    Arity(String),

    #[error("{0}")]
    Type(String),

    #[error("can't read \"{0}\": no such variable")]
    NoSuchVariable(String),

    #[error("can't set \"{0}\": {1}")]
    CantSet(String, String),

    #[error("invalid command name \"{0}\"")]
    NoSuchCommand(String),

    #[error("namespace \"{0}\" not found")]
    NoSuchNamespace(String),

    #[error("{0}")]
    Domain(String),

    #[error("divide by zero")]
    DivideByZero,

    #[error("{0}")]
    Invariant(String),

    #[error("{0}")]
    User(String),
}

impl TclErrorKind {
    pub fn syntax(msg: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::Syntax(msg.into()))
    }
    pub fn arity(usage: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::Arity(usage.into()))
    }
    pub fn bad_type(msg: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::Type(msg.into()))
    }
    pub fn no_such_variable(name: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::NoSuchVariable(name.into()))
    }
    pub fn cant_set(name: impl Into<String>, reason: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::CantSet(name.into(), reason.into()))
    }
    pub fn no_such_command(name: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::NoSuchCommand(name.into()))
    }
    pub fn no_such_namespace(name: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::NoSuchNamespace(name.into()))
    }
    pub fn domain(msg: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::Domain(msg.into()))
    }
    pub fn divide_by_zero() -> TclError {
        TclError::new(TclErrorKind::DivideByZero)
    }
    pub fn invariant(msg: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::Invariant(msg.into()))
    }
    pub fn user(msg: impl Into<String>) -> TclError {
        TclError::new(TclErrorKind::User(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_matches_tcl_convention() {
        let e = TclErrorKind::arity("set varName ?newValue?");
        assert_eq!(e.message(), "wrong # args: should be \"set varName ?newValue?\"");
    }

    #[test]
    fn divide_by_zero_message() {
        let e = TclErrorKind::divide_by_zero();
        assert_eq!(e.message(), "divide by zero");
    }
}
