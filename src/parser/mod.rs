//! Command parsing (§4.B): splits source text into one command's worth of
//! raw, unsubstituted words at a time.

pub mod lexer;
pub mod parser;
pub mod types;

pub use lexer::decode_backslash;
pub use parser::{is_complete, Parser};
pub use types::{ParseOutcome, RawWord, WordKind};
