//! The interpreter: script evaluation, frame/variable resolution, the
//! namespace tree, command dispatch, and the trace subsystem (§3, §4.D–§4.I).

pub mod command_table;
pub mod eval;
pub mod frame_stack;
pub mod interp;
pub mod namespace;
pub mod substitution;
pub mod trace;
pub mod types;
pub mod unknown;

pub use command_table::{CommandEntry, ProcDef, ProcParam};
pub use interp::{Interp, InterpBuilder};
pub use namespace::Namespace;
pub use types::{LinkTarget, NsId, GLOBAL_NS};
