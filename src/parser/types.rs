//! Parser output types (§4.B).

/// How a word's raw text must be treated once it reaches the substitution
/// engine. Words carry no further provenance — `Brace` text is taken
/// completely literally; everything else goes through backslash/variable/
/// command substitution (§4.B "Word objects carry no provenance tags").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    Brace,
    Substituted,
}

/// One unsubstituted word, as extracted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawWord {
    pub kind: WordKind,
    pub text: String,
}

impl RawWord {
    pub fn brace(text: impl Into<String>) -> Self {
        RawWord { kind: WordKind::Brace, text: text.into() }
    }
    pub fn substituted(text: impl Into<String>) -> Self {
        RawWord { kind: WordKind::Substituted, text: text.into() }
    }
}

/// The result of asking the parser for the next command (§4.B "Output").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A complete command was extracted (possibly zero words, e.g. a blank
    /// line, a run of `;;;`, or a comment line).
    Complete(Vec<RawWord>),
    /// Input ended mid-word (unclosed brace/quote/bracket); the caller may
    /// supply more input and retry (§4.B "Failure model").
    Incomplete,
}
