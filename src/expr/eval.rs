//! AST evaluator (§4.H "Arithmetic rules", "Short-circuit & ternary").

use super::ast::{BinOp, Expr, UnaryOp};
use crate::error::TclErrorKind;
use crate::host::{HostOps, ObjHandle};
use crate::interpreter::interp::Interp;
use crate::result::Exception;

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Double(f64),
}

struct Val {
    obj: ObjHandle,
    num: Option<Num>,
}

pub fn eval(interp: &mut Interp, host: &mut dyn HostOps, expr: &Expr) -> Result<ObjHandle, Exception> {
    let v = eval_node(interp, host, expr, false)?;
    Ok(v.obj)
}

fn eval_node(interp: &mut Interp, host: &mut dyn HostOps, expr: &Expr, skip: bool) -> Result<Val, Exception> {
    match expr {
        Expr::IntLit(i) => Ok(lit_int(host, *i)),
        Expr::DoubleLit(d) => Ok(lit_double(host, *d)),
        Expr::BoolLit(b) => Ok(lit_int(host, if *b { 1 } else { 0 })),
        Expr::Variable(name) => {
            if skip {
                return Ok(lit_int(host, 0));
            }
            let obj = crate::interpreter::frame_stack::read_var(interp, host, name)?;
            Ok(classify(host, obj))
        }
        Expr::CommandSubst(src) => {
            if skip {
                return Ok(lit_int(host, 0));
            }
            let obj = interp.eval_str(host, src)?;
            Ok(classify_command_result(host, obj))
        }
        Expr::BracedString(s) => {
            let obj = host.intern(s);
            Ok(classify(host, obj))
        }
        Expr::QuotedString(s) => {
            if skip {
                let obj = host.intern(s);
                return Ok(Val { obj, num: None });
            }
            let obj = crate::interpreter::substitution::substitute_span(interp, host, s)?;
            Ok(classify(host, obj))
        }
        Expr::FunctionCall(name, args) => eval_function(interp, host, name, args, skip),
        Expr::Unary(op, inner) => eval_unary(interp, host, *op, inner, skip),
        Expr::Binary(op, lhs, rhs) => eval_binary(interp, host, *op, lhs, rhs, skip),
        Expr::Ternary(cond, then_e, else_e) => {
            let c = eval_node(interp, host, cond, skip)?;
            let truthy = is_truthy(host, &c)?;
            if skip {
                let _ = eval_node(interp, host, then_e, true)?;
                let _ = eval_node(interp, host, else_e, true)?;
                return Ok(lit_int(host, 0));
            }
            if truthy {
                let _ = eval_node(interp, host, else_e, true)?;
                eval_node(interp, host, then_e, false)
            } else {
                let _ = eval_node(interp, host, then_e, true)?;
                eval_node(interp, host, else_e, false)
            }
        }
    }
}

fn lit_int(host: &mut dyn HostOps, v: i64) -> Val {
    Val { obj: host.int_new(v), num: Some(Num::Int(v)) }
}
fn lit_double(host: &mut dyn HostOps, v: f64) -> Val {
    Val { obj: host.double_new(v), num: Some(Num::Double(v)) }
}

fn classify(host: &mut dyn HostOps, obj: ObjHandle) -> Val {
    if let Ok(i) = host.int_get(obj) {
        return Val { obj, num: Some(Num::Int(i)) };
    }
    if let Ok(d) = host.double_get(obj) {
        return Val { obj, num: Some(Num::Double(d)) };
    }
    Val { obj, num: None }
}

/// §4.H "Command" primary: classify the *result string* per its textual
/// form rather than trying int-then-double.
fn classify_command_result(host: &mut dyn HostOps, obj: ObjHandle) -> Val {
    let s = host.get_str(obj).to_string();
    if crate::numeric::looks_like_double(&s) {
        if let Some(d) = crate::numeric::parse_tcl_double(&s) {
            return Val { obj, num: Some(Num::Double(d)) };
        }
    }
    if let Some(i) = crate::numeric::parse_tcl_int(&s) {
        return Val { obj, num: Some(Num::Int(i)) };
    }
    if let Some(d) = crate::numeric::parse_tcl_double(&s) {
        return Val { obj, num: Some(Num::Double(d)) };
    }
    Val { obj, num: None }
}

fn is_truthy(host: &mut dyn HostOps, v: &Val) -> Result<bool, Exception> {
    match v.num {
        Some(Num::Int(i)) => Ok(i != 0),
        Some(Num::Double(d)) => Ok(d != 0.0),
        None => {
            let s = host.get_str(v.obj).to_string();
            crate::numeric::bareword_bool(&s)
                .ok_or_else(|| Exception::error(TclErrorKind::bad_type(format!("expected boolean value but got \"{}\"", s))))
        }
    }
}

fn require_num(host: &mut dyn HostOps, v: &Val) -> Result<Num, Exception> {
    v.num.ok_or_else(|| {
        Exception::error(TclErrorKind::bad_type(format!(
            "expected number but got \"{}\"",
            host.get_str(v.obj)
        )))
    })
}

fn require_int(host: &mut dyn HostOps, v: &Val) -> Result<i64, Exception> {
    match require_num(host, v)? {
        Num::Int(i) => Ok(i),
        Num::Double(_) => Err(Exception::error(TclErrorKind::bad_type(format!(
            "expected integer but got \"{}\"",
            host.get_str(v.obj)
        )))),
    }
}

fn eval_unary(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    op: UnaryOp,
    inner: &Expr,
    skip: bool,
) -> Result<Val, Exception> {
    let v = eval_node(interp, host, inner, skip)?;
    if skip {
        return Ok(lit_int(host, 0));
    }
    match op {
        UnaryOp::Pos => {
            require_num(host, &v)?;
            Ok(v)
        }
        UnaryOp::Neg => match require_num(host, &v)? {
            Num::Int(i) => Ok(lit_int(host, i.wrapping_neg())),
            Num::Double(d) => Ok(lit_double(host, -d)),
        },
        UnaryOp::BitNot => Ok(lit_int(host, !require_int(host, &v)?)),
        UnaryOp::LogNot => Ok(lit_int(host, if is_truthy(host, &v)? { 0 } else { 1 })),
    }
}

fn eval_binary(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    op: BinOp,
    lhs_e: &Expr,
    rhs_e: &Expr,
    skip: bool,
) -> Result<Val, Exception> {
    match op {
        BinOp::LogAnd => {
            let lhs = eval_node(interp, host, lhs_e, skip)?;
            if skip {
                let _ = eval_node(interp, host, rhs_e, true)?;
                return Ok(lit_int(host, 0));
            }
            if !is_truthy(host, &lhs)? {
                let _ = eval_node(interp, host, rhs_e, true)?;
                return Ok(lit_int(host, 0));
            }
            let rhs = eval_node(interp, host, rhs_e, false)?;
            Ok(lit_int(host, if is_truthy(host, &rhs)? { 1 } else { 0 }))
        }
        BinOp::LogOr => {
            let lhs = eval_node(interp, host, lhs_e, skip)?;
            if skip {
                let _ = eval_node(interp, host, rhs_e, true)?;
                return Ok(lit_int(host, 0));
            }
            if is_truthy(host, &lhs)? {
                let _ = eval_node(interp, host, rhs_e, true)?;
                return Ok(lit_int(host, 1));
            }
            let rhs = eval_node(interp, host, rhs_e, false)?;
            Ok(lit_int(host, if is_truthy(host, &rhs)? { 1 } else { 0 }))
        }
        _ => {
            let lhs = eval_node(interp, host, lhs_e, skip)?;
            let rhs = eval_node(interp, host, rhs_e, skip)?;
            if skip {
                return Ok(lit_int(host, 0));
            }
            eval_binary_values(host, op, lhs, rhs)
        }
    }
}

fn eval_binary_values(host: &mut dyn HostOps, op: BinOp, lhs: Val, rhs: Val) -> Result<Val, Exception> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Pow => {
            arithmetic(host, op, lhs, rhs)
        }
        BinOp::Shl | BinOp::Shr | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => {
            let a = require_int(host, &lhs)?;
            let b = require_int(host, &rhs)?;
            let r = match op {
                BinOp::Shl => a.wrapping_shl(b as u32 & 63),
                BinOp::Shr => a.wrapping_shr(b as u32 & 63),
                BinOp::BitAnd => a & b,
                BinOp::BitOr => a | b,
                BinOp::BitXor => a ^ b,
                _ => unreachable!(),
            };
            Ok(lit_int(host, r))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
            let ord = numeric_or_string_cmp(host, &lhs, &rhs);
            let b = match op {
                BinOp::Lt => ord == std::cmp::Ordering::Less,
                BinOp::Le => ord != std::cmp::Ordering::Greater,
                BinOp::Gt => ord == std::cmp::Ordering::Greater,
                BinOp::Ge => ord != std::cmp::Ordering::Less,
                BinOp::Eq => ord == std::cmp::Ordering::Equal,
                BinOp::Ne => ord != std::cmp::Ordering::Equal,
                _ => unreachable!(),
            };
            Ok(lit_int(host, b as i64))
        }
        BinOp::StrEq | BinOp::StrNe | BinOp::StrLt | BinOp::StrLe | BinOp::StrGt | BinOp::StrGe => {
            let ord = host.compare(lhs.obj, rhs.obj);
            let b = match op {
                BinOp::StrEq => ord == std::cmp::Ordering::Equal,
                BinOp::StrNe => ord != std::cmp::Ordering::Equal,
                BinOp::StrLt => ord == std::cmp::Ordering::Less,
                BinOp::StrLe => ord != std::cmp::Ordering::Greater,
                BinOp::StrGt => ord == std::cmp::Ordering::Greater,
                BinOp::StrGe => ord != std::cmp::Ordering::Less,
                _ => unreachable!(),
            };
            Ok(lit_int(host, b as i64))
        }
        BinOp::In | BinOp::Ni => {
            let items = host.list_items(rhs.obj).map_err(Exception::Error)?;
            let found = items.iter().any(|it| host.str_equal(*it, lhs.obj));
            let b = if op == BinOp::In { found } else { !found };
            Ok(lit_int(host, b as i64))
        }
        BinOp::LogAnd | BinOp::LogOr => unreachable!("handled in eval_binary"),
    }
}

fn numeric_or_string_cmp(host: &mut dyn HostOps, lhs: &Val, rhs: &Val) -> std::cmp::Ordering {
    match (lhs.num, rhs.num) {
        (Some(a), Some(b)) => cmp_num(a, b),
        _ => host.compare(lhs.obj, rhs.obj),
    }
}

fn cmp_num(a: Num, b: Num) -> std::cmp::Ordering {
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => x.cmp(&y),
        (Num::Double(x), Num::Double(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Num::Int(x), Num::Double(y)) => (x as f64).partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Num::Double(x), Num::Int(y)) => x.partial_cmp(&(y as f64)).unwrap_or(std::cmp::Ordering::Equal),
    }
}

fn arithmetic(host: &mut dyn HostOps, op: BinOp, lhs: Val, rhs: Val) -> Result<Val, Exception> {
    let a = require_num(host, &lhs)?;
    let b = require_num(host, &rhs)?;
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => arithmetic_int(host, op, x, y),
        _ => {
            let x = as_f64(a);
            let y = as_f64(b);
            arithmetic_double(host, op, x, y)
        }
    }
}

fn as_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Double(d) => d,
    }
}

fn arithmetic_int(host: &mut dyn HostOps, op: BinOp, a: i64, b: i64) -> Result<Val, Exception> {
    match op {
        BinOp::Add => Ok(lit_int(host, a.wrapping_add(b))),
        BinOp::Sub => Ok(lit_int(host, a.wrapping_sub(b))),
        BinOp::Mul => Ok(lit_int(host, a.wrapping_mul(b))),
        BinOp::Div => {
            if b == 0 {
                return Err(Exception::error(TclErrorKind::divide_by_zero()));
            }
            Ok(lit_int(host, tcl_idiv(a, b)))
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(Exception::error(TclErrorKind::divide_by_zero()));
            }
            Ok(lit_int(host, tcl_imod(a, b)))
        }
        BinOp::Pow => Ok(lit_int(host, int_pow(a, b))),
        _ => unreachable!(),
    }
}

fn arithmetic_double(host: &mut dyn HostOps, op: BinOp, a: f64, b: f64) -> Result<Val, Exception> {
    let r = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => {
            // Float modulo always goes via `fmod` (§4.H "Arithmetic rules").
            host.math(crate::host::MathOp::Fmod, a, b)
        }
        BinOp::Pow => host.math(crate::host::MathOp::Pow, a, b),
        _ => unreachable!(),
    };
    if r.is_nan() && !a.is_nan() && !b.is_nan() {
        return Err(Exception::error(TclErrorKind::domain(
            "domain error: argument not in valid range",
        )));
    }
    Ok(lit_double(host, r))
}

fn tcl_idiv(a: i64, b: i64) -> i64 {
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn tcl_imod(a: i64, b: i64) -> i64 {
    let r = a.wrapping_rem(b);
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

/// Integer exponentiation by repeated squaring; negative exponents yield 0
/// unless the base is ±1 (Open Question resolution: the observed, non-Tcl
/// behavior is preserved literally).
fn int_pow(base: i64, exp: i64) -> i64 {
    if exp < 0 {
        return match base {
            1 => 1,
            -1 => if exp % 2 == 0 { 1 } else { -1 },
            _ => 0,
        };
    }
    let mut result: i64 = 1;
    let mut b = base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = result.wrapping_mul(b);
        }
        b = b.wrapping_mul(b);
        e >>= 1;
    }
    result
}

fn eval_function(
    interp: &mut Interp,
    host: &mut dyn HostOps,
    name: &str,
    args: &[Expr],
    skip: bool,
) -> Result<Val, Exception> {
    if skip {
        for a in args {
            let _ = eval_node(interp, host, a, true)?;
        }
        return Ok(lit_int(host, 0));
    }
    let mut arg_objs = Vec::with_capacity(args.len());
    for a in args {
        let v = eval_node(interp, host, a, false)?;
        arg_objs.push(v.obj);
    }
    let cmd_name = format!("tcl::mathfunc::{}", name);
    let cmd_obj = host.intern(&cmd_name);
    let result = crate::interpreter::eval::eval_one_command(interp, host, cmd_obj, &arg_objs)?;
    Ok(classify(host, result))
}
