//! just-tcl - An embeddable core interpreter for a small Tcl-like language
//!
//! The interpreter owns no user data itself: strings, numbers, lists, and
//! dicts are opaque [`host::ObjHandle`]s minted and interpreted by whatever
//! implements [`host::HostOps`]. This crate supplies a complete default
//! implementation ([`host::DefaultHost`]) alongside the trait, so it is
//! usable standalone, but an embedder can swap in its own object model
//! (interning, GC, whatever) by implementing `HostOps` itself.

pub mod commands;
pub mod error;
pub mod expr;
pub mod host;
pub mod interpreter;
pub mod numeric;
pub mod parser;
pub mod result;

pub use error::{TclError, TclErrorKind};
pub use host::{DefaultHost, HostOps, ObjHandle};
pub use interpreter::{CommandEntry, Interp, InterpBuilder, ProcDef, ProcParam};
pub use parser::{is_complete, ParseOutcome, Parser, RawWord, WordKind};
pub use result::{EvalResult, Exception, ResultCode};
