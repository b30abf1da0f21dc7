//! Host Operations Interface (§6).
//!
//! The core never owns a byte of user data: every string, number, list, and
//! dict is an opaque [`ObjHandle`] minted and interpreted by whatever
//! implements this trait. The interpreter (`crate::interpreter`) is built
//! entirely on top of these primitives and a mock implementation is enough
//! to unit-test it without a real backing store (§9 "Opaque handle ABI").
//!
//! Frames, namespaces, commands, and traces are *not* routed through this
//! trait — §3 "Lifecycle" only calls out Objects as host-owned ("the host
//! decides whether handles are reference-counted, arena-allocated, or
//! GC-managed"); frames/traces/procs are described by their own lifecycle
//! rules with no host-ownership qualifier, so this crate keeps them as
//! `Interp`-internal bookkeeping built on top of `ObjHandle`s. See
//! DESIGN.md for the grounding and the tradeoff this avoids.

mod default_host;
mod types;

pub use default_host::DefaultHost;
pub use types::{CharClass, DoubleClass, MathOp, ObjHandle, ObjKind};

use crate::error::TclError;
use std::rc::Rc;

/// The value-storage half of the embedding contract (§6).
pub trait HostOps {
    // ---- Strings ---------------------------------------------------
    /// Intern a string, returning a handle to a string-only object.
    fn intern(&mut self, s: &str) -> ObjHandle;
    /// The canonical string representation. Every object has one (§3).
    fn get_str(&self, o: ObjHandle) -> Rc<str>;
    /// The distinguished "no such value" sentinel (§3 "Nil object").
    fn nil(&self) -> ObjHandle;
    fn is_nil(&self, o: ObjHandle) -> bool;
    fn byte_len(&self, o: ObjHandle) -> usize;
    fn concat(&mut self, a: ObjHandle, b: ObjHandle) -> ObjHandle;
    /// Three-way string compare, used by `string compare`/`lsort`.
    fn compare(&self, a: ObjHandle, b: ObjHandle) -> std::cmp::Ordering;
    fn str_equal(&self, a: ObjHandle, b: ObjHandle) -> bool {
        self.compare(a, b) == std::cmp::Ordering::Equal
    }
    /// Glob-style matching (`string match`, `switch -glob`, namespace
    /// export patterns).
    fn glob_match(&self, pattern: &str, s: &str, nocase: bool) -> bool;
    /// Regex matching (`string match -regexp` equivalents, `switch -regexp`).
    fn regex_match(&self, pattern: &str, s: &str, nocase: bool) -> Result<bool, TclError>;

    // ---- Runes (grapheme-naive, codepoint-based) --------------------
    fn rune_len(&self, o: ObjHandle) -> usize;
    fn rune_at(&self, o: ObjHandle, i: usize) -> Option<char>;
    fn rune_range(&mut self, o: ObjHandle, lo: usize, hi: usize) -> ObjHandle;
    fn to_upper(&mut self, o: ObjHandle) -> ObjHandle;
    fn to_lower(&mut self, o: ObjHandle) -> ObjHandle;
    fn to_title(&mut self, o: ObjHandle) -> ObjHandle;
    fn is_class(&self, ch: char, class: CharClass) -> bool;

    // ---- Integers ----------------------------------------------------
    fn int_new(&mut self, v: i64) -> ObjHandle;
    fn int_get(&self, o: ObjHandle) -> Result<i64, TclError>;

    // ---- Doubles -------------------------------------------------------
    fn double_new(&mut self, v: f64) -> ObjHandle;
    fn double_get(&self, o: ObjHandle) -> Result<f64, TclError>;
    fn double_classify(&self, v: f64) -> DoubleClass;
    fn math(&self, op: MathOp, a: f64, b: f64) -> f64;

    // ---- Lists -----------------------------------------------------
    fn list_new(&mut self, items: &[ObjHandle]) -> ObjHandle;
    /// Parse `o`'s string form as a list if it is not already list-backed.
    fn list_from(&mut self, o: ObjHandle) -> Result<ObjHandle, TclError>;
    fn list_len(&mut self, o: ObjHandle) -> Result<usize, TclError>;
    fn list_index(&mut self, o: ObjHandle, i: usize) -> Result<Option<ObjHandle>, TclError>;
    fn list_slice(&mut self, o: ObjHandle, lo: usize, hi: usize) -> Result<ObjHandle, TclError>;
    fn list_push(&mut self, o: ObjHandle, item: ObjHandle) -> Result<ObjHandle, TclError>;
    fn list_unshift(&mut self, o: ObjHandle, item: ObjHandle) -> Result<ObjHandle, TclError>;
    /// Convenience: the full element vector, materializing a list parse if needed.
    fn list_items(&mut self, o: ObjHandle) -> Result<Vec<ObjHandle>, TclError> {
        let parsed = self.list_from(o)?;
        let len = self.list_len(parsed)?;
        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            out.push(self.list_index(parsed, i)?.expect("index within len"));
        }
        Ok(out)
    }

    // ---- Dicts -------------------------------------------------------
    fn dict_new(&mut self) -> ObjHandle;
    fn dict_from(&mut self, o: ObjHandle) -> Result<ObjHandle, TclError>;
    fn dict_get(&mut self, o: ObjHandle, key: ObjHandle) -> Result<Option<ObjHandle>, TclError>;
    fn dict_set(&mut self, o: ObjHandle, key: ObjHandle, val: ObjHandle) -> Result<ObjHandle, TclError>;
    fn dict_unset(&mut self, o: ObjHandle, key: ObjHandle) -> Result<ObjHandle, TclError>;
    fn dict_size(&mut self, o: ObjHandle) -> Result<usize, TclError>;
    fn dict_entries(&mut self, o: ObjHandle) -> Result<Vec<(ObjHandle, ObjHandle)>, TclError>;

    fn kind(&self, o: ObjHandle) -> ObjKind;
}
