//! `tcl::mathfunc::*` builtins dispatched by `expr`'s function-call syntax
//! (§4.H "Functions").

use crate::error::TclErrorKind;
use crate::host::{HostOps, MathOp, ObjHandle};
use crate::interpreter::{CommandEntry, Interp};
use crate::result::{EvalResult, Exception};
use std::rc::Rc;

pub fn install(interp: &mut Interp, _host: &mut dyn HostOps) {
    let global = crate::interpreter::GLOBAL_NS;
    let ns = interp.namespace_ensure(global, &["tcl".to_string(), "mathfunc".to_string()]);
    macro_rules! def {
        ($name:expr, $f:expr) => {
            interp.define_command(ns, $name, CommandEntry::Builtin(Rc::new($f)));
        };
    }
    def!("abs", f_abs);
    def!("acos", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Acos));
    def!("asin", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Asin));
    def!("atan", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Atan));
    def!("atan2", f_atan2);
    def!("bool", f_bool);
    def!("ceil", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Ceil));
    def!("cos", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Cos));
    def!("cosh", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Cosh));
    def!("double", f_double);
    def!("entier", f_entier);
    def!("exp", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Exp));
    def!("floor", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Floor));
    def!("fmod", f_fmod);
    def!("hypot", f_hypot);
    def!("int", f_int);
    def!("isfinite", f_isfinite);
    def!("isinf", f_isinf);
    def!("isnan", f_isnan);
    def!("isnormal", f_isnormal);
    def!("issubnormal", f_issubnormal);
    def!("isunordered", f_isunordered);
    def!("log", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Log));
    def!("log10", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Log10));
    def!("max", f_max);
    def!("min", f_min);
    def!("pow", f_pow);
    def!("round", f_round);
    def!("sin", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Sin));
    def!("sinh", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Sinh));
    def!("sqrt", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Sqrt));
    def!("tan", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Tan));
    def!("tanh", |_: &mut Interp, h: &mut dyn HostOps, a: &[ObjHandle]| unary_math(h, a, MathOp::Tanh));
    def!("wide", f_wide);
}

fn one_arg(args: &[ObjHandle]) -> Result<ObjHandle, crate::error::TclError> {
    match args {
        [a] => Ok(*a),
        _ => Err(TclErrorKind::arity("too many arguments for math function")),
    }
}

fn as_f64(host: &dyn HostOps, o: ObjHandle) -> Result<f64, crate::error::TclError> {
    host.double_get(o).or_else(|_| host.int_get(o).map(|i| i as f64))
}

fn unary_math(host: &mut dyn HostOps, args: &[ObjHandle], op: MathOp) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.double_new(host.math(op, v, 0.0)))
}

fn f_abs(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    if let Ok(i) = host.int_get(a) {
        return Ok(host.int_new(i.wrapping_abs()));
    }
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.double_new(v.abs()))
}

fn f_atan2(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    match args {
        [a, b] => {
            let x = as_f64(host, *a).map_err(Exception::Error)?;
            let y = as_f64(host, *b).map_err(Exception::Error)?;
            Ok(host.double_new(host.math(MathOp::Atan2, x, y)))
        }
        _ => Err(Exception::error(TclErrorKind::arity("atan2 y x"))),
    }
}

fn f_bool(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let s = host.get_str(a).to_string();
    let truthy = if let Ok(i) = host.int_get(a) {
        i != 0
    } else {
        crate::numeric::bareword_bool(&s).ok_or_else(|| Exception::error(TclErrorKind::bad_type(format!("expected boolean value but got \"{}\"", s))))?
    };
    Ok(host.int_new(truthy as i64))
}

fn f_double(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.double_new(v))
}

fn f_entier(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    if let Ok(i) = host.int_get(a) {
        return Ok(host.int_new(i));
    }
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.trunc() as i64))
}

fn f_fmod(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    match args {
        [a, b] => {
            let x = as_f64(host, *a).map_err(Exception::Error)?;
            let y = as_f64(host, *b).map_err(Exception::Error)?;
            if y == 0.0 {
                return Err(Exception::error(TclErrorKind::divide_by_zero()));
            }
            Ok(host.double_new(host.math(MathOp::Fmod, x, y)))
        }
        _ => Err(Exception::error(TclErrorKind::arity("fmod x y"))),
    }
}

fn f_hypot(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    match args {
        [a, b] => {
            let x = as_f64(host, *a).map_err(Exception::Error)?;
            let y = as_f64(host, *b).map_err(Exception::Error)?;
            Ok(host.double_new(host.math(MathOp::Hypot, x, y)))
        }
        _ => Err(Exception::error(TclErrorKind::arity("hypot x y"))),
    }
}

fn f_int(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    if let Ok(i) = host.int_get(a) {
        return Ok(host.int_new(i));
    }
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.trunc() as i64))
}

fn f_isfinite(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.is_finite() as i64))
}

fn f_isinf(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.is_infinite() as i64))
}

fn f_isnan(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.is_nan() as i64))
}

fn f_isnormal(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new((host.double_classify(v) == crate::host::DoubleClass::Normal) as i64))
}

fn f_issubnormal(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new((host.double_classify(v) == crate::host::DoubleClass::Subnormal) as i64))
}

fn f_isunordered(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    match args {
        [a, b] => {
            let x = as_f64(host, *a).map_err(Exception::Error)?;
            let y = as_f64(host, *b).map_err(Exception::Error)?;
            Ok(host.int_new((x.is_nan() || y.is_nan()) as i64))
        }
        _ => Err(Exception::error(TclErrorKind::arity("isunordered x y"))),
    }
}

fn f_max(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("max arg ?arg ...?")));
    }
    let mut best = as_f64(host, args[0]).map_err(Exception::Error)?;
    let mut best_obj = args[0];
    for a in &args[1..] {
        let v = as_f64(host, *a).map_err(Exception::Error)?;
        if v > best {
            best = v;
            best_obj = *a;
        }
    }
    Ok(best_obj)
}

fn f_min(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    if args.is_empty() {
        return Err(Exception::error(TclErrorKind::arity("min arg ?arg ...?")));
    }
    let mut best = as_f64(host, args[0]).map_err(Exception::Error)?;
    let mut best_obj = args[0];
    for a in &args[1..] {
        let v = as_f64(host, *a).map_err(Exception::Error)?;
        if v < best {
            best = v;
            best_obj = *a;
        }
    }
    Ok(best_obj)
}

fn f_pow(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    match args {
        [a, b] => {
            let x = as_f64(host, *a).map_err(Exception::Error)?;
            let y = as_f64(host, *b).map_err(Exception::Error)?;
            Ok(host.double_new(host.math(MathOp::Pow, x, y)))
        }
        _ => Err(Exception::error(TclErrorKind::arity("pow x y"))),
    }
}

fn f_round(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    if let Ok(i) = host.int_get(a) {
        return Ok(host.int_new(i));
    }
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(host.math(MathOp::Round, v, 0.0) as i64))
}

fn f_wide(_interp: &mut Interp, host: &mut dyn HostOps, args: &[ObjHandle]) -> EvalResult {
    let a = one_arg(args).map_err(Exception::Error)?;
    if let Ok(i) = host.int_get(a) {
        return Ok(host.int_new(i));
    }
    let v = as_f64(host, a).map_err(Exception::Error)?;
    Ok(host.int_new(v.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::DefaultHost;

    #[test]
    fn abs_handles_int_and_double() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let neg = host.int_new(-5);
        let r = f_abs(&mut interp, &mut host, &[neg]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "5");
    }

    #[test]
    fn max_returns_the_larger_value() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let a = host.int_new(3);
        let b = host.int_new(9);
        let r = f_max(&mut interp, &mut host, &[a, b]).unwrap();
        assert_eq!(host.get_str(r).as_ref(), "9");
    }

    #[test]
    fn reachable_through_expr_dispatch() {
        let mut host = DefaultHost::new();
        let mut interp = crate::interpreter::InterpBuilder::new().build(&mut host);
        let r = crate::expr::eval_str(&mut interp, &mut host, "sqrt(16)").unwrap();
        assert_eq!(host.get_str(r).as_ref(), "4.0");
    }
}
