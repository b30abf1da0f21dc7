//! Expression AST (§4.H grammar). Built by `expr::parser`, walked by
//! `expr::eval`. Leaves that require substitution (variables, command
//! brackets, quoted strings) carry their raw source text and are resolved
//! against the interpreter only at evaluation time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    Shr,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrEq,
    StrNe,
    StrLt,
    StrLe,
    StrGt,
    StrGe,
    In,
    Ni,
    BitAnd,
    BitOr,
    BitXor,
    LogAnd,
    LogOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    BitNot,
    LogNot,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64),
    DoubleLit(f64),
    BoolLit(bool),
    /// `$name` or `${name}`.
    Variable(String),
    /// `[...]`: raw enclosed source, evaluated as a script at use-time.
    CommandSubst(String),
    /// `{...}`: literal, no substitution.
    BracedString(String),
    /// `"..."`: raw text, substituted (backslash/variable/command) at use-time.
    QuotedString(String),
    /// `name(args...)` — dispatches to `tcl::mathfunc::name`.
    FunctionCall(String, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : else` (right-associative).
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
}
