//! Handle and enum types shared by the [`super::HostOps`] trait.

use std::fmt;

/// An opaque handle to a host-owned value (§3 "Values", §9 "Opaque handle ABI").
///
/// The core never inspects the bits; it is a machine word the host mints
/// and interprets. All core logic goes through [`super::HostOps`] to act on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjHandle(pub u32);

impl fmt::Debug for ObjHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Obj({})", self.0)
    }
}

/// Classification of a double, mirroring `fpclassify` (§6 "Doubles").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoubleClass {
    Normal,
    Subnormal,
    Zero,
    Inf,
    NegInf,
    Nan,
}

/// Math operations the host is asked to perform on doubles (§6 "Doubles").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Sqrt,
    Pow,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Round,
    Abs,
    Fmod,
    Hypot,
}

/// Character classes for `string is` / rune classification (§6 "Runes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Alnum,
    Alpha,
    Ascii,
    Control,
    Digit,
    Graph,
    Lower,
    Print,
    Punct,
    Space,
    Upper,
    Wordchar,
    Xdigit,
}

/// A value's preferred representation tag, exposed for introspection
/// builtins (`string is`, diagnostics) — not used for branching in core
/// algorithms, which always go through [`super::HostOps`] accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Str,
    Int,
    Double,
    List,
    Dict,
}
