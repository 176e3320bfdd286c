//! The `Math` namespace object (§15.8).

use crate::intrinsics::{add_frozen_value, add_method, arg};
use crate::objects::JsObject;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let object_proto = interp.intrinsics.object_prototype;
    let math = interp
        .heap
        .allocate(JsObject::ordinary("Math", Some(object_proto)));

    add_frozen_value(interp, math, "E", Value::Number(std::f64::consts::E));
    add_frozen_value(interp, math, "LN10", Value::Number(std::f64::consts::LN_10));
    add_frozen_value(interp, math, "LN2", Value::Number(std::f64::consts::LN_2));
    add_frozen_value(interp, math, "LOG2E", Value::Number(std::f64::consts::LOG2_E));
    add_frozen_value(
        interp,
        math,
        "LOG10E",
        Value::Number(std::f64::consts::LOG10_E),
    );
    add_frozen_value(interp, math, "PI", Value::Number(std::f64::consts::PI));
    add_frozen_value(
        interp,
        math,
        "SQRT1_2",
        Value::Number(std::f64::consts::FRAC_1_SQRT_2),
    );
    add_frozen_value(interp, math, "SQRT2", Value::Number(std::f64::consts::SQRT_2));

    add_method(interp, math, "abs", 1, |i, _, a| unary(i, a, f64::abs));
    add_method(interp, math, "floor", 1, |i, _, a| unary(i, a, f64::floor));
    add_method(interp, math, "ceil", 1, |i, _, a| unary(i, a, f64::ceil));
    add_method(interp, math, "round", 1, math_round);
    add_method(interp, math, "sqrt", 1, |i, _, a| unary(i, a, f64::sqrt));
    add_method(interp, math, "exp", 1, |i, _, a| unary(i, a, f64::exp));
    add_method(interp, math, "log", 1, |i, _, a| unary(i, a, f64::ln));
    add_method(interp, math, "sin", 1, |i, _, a| unary(i, a, f64::sin));
    add_method(interp, math, "cos", 1, |i, _, a| unary(i, a, f64::cos));
    add_method(interp, math, "tan", 1, |i, _, a| unary(i, a, f64::tan));
    add_method(interp, math, "asin", 1, |i, _, a| unary(i, a, f64::asin));
    add_method(interp, math, "acos", 1, |i, _, a| unary(i, a, f64::acos));
    add_method(interp, math, "atan", 1, |i, _, a| unary(i, a, f64::atan));
    add_method(interp, math, "atan2", 2, math_atan2);
    add_method(interp, math, "pow", 2, math_pow);
    add_method(interp, math, "min", 2, math_min);
    add_method(interp, math, "max", 2, math_max);
    add_method(interp, math, "random", 0, math_random);

    let global = interp.global_object;
    interp
        .heap
        .get_mut(global)
        .set_builtin_property("Math", Value::Object(math));
}

fn unary(
    interp: &mut Interpreter,
    args: &[Value],
    f: impl Fn(f64) -> f64,
) -> Result<Value, Value> {
    let x = interp.to_number(&arg(args, 0))?;
    Ok(Value::Number(f(x)))
}

/// §15.8.2.15: halfway cases round toward +∞ (`Math.round(-1.5)` is `-1`),
/// unlike `f64::round`.
fn math_round(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let x = interp.to_number(&arg(args, 0))?;
    if x.is_nan() || x.is_infinite() || x == 0.0 {
        return Ok(Value::Number(x));
    }
    Ok(Value::Number((x + 0.5).floor()))
}

fn math_atan2(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let y = interp.to_number(&arg(args, 0))?;
    let x = interp.to_number(&arg(args, 1))?;
    Ok(Value::Number(y.atan2(x)))
}

/// §15.8.2.13: `pow(1, Infinity)` and friends are NaN, where `f64::powf`
/// follows IEEE-754 2008 and returns 1.
fn math_pow(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let x = interp.to_number(&arg(args, 0))?;
    let y = interp.to_number(&arg(args, 1))?;
    if y.is_infinite() && x.abs() == 1.0 {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(x.powf(y)))
}

fn math_min(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let mut result = f64::INFINITY;
    for a in args {
        let n = interp.to_number(a)?;
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        // -0 < +0 for min purposes (§15.8.2.12).
        if n < result || (n == 0.0 && result == 0.0 && n.is_sign_negative()) {
            result = n;
        }
    }
    Ok(Value::Number(result))
}

fn math_max(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let mut result = f64::NEG_INFINITY;
    for a in args {
        let n = interp.to_number(a)?;
        if n.is_nan() {
            return Ok(Value::Number(f64::NAN));
        }
        if n > result || (n == 0.0 && result == 0.0 && result.is_sign_negative()) {
            result = n;
        }
    }
    Ok(Value::Number(result))
}

fn math_random(interp: &mut Interpreter, _this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(interp.next_random()))
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_rounding_family() {
        assert_eq!(eval("Math.floor(1.9);").as_number(), Some(1.0));
        assert_eq!(eval("Math.ceil(1.1);").as_number(), Some(2.0));
        assert_eq!(eval("Math.round(1.5);").as_number(), Some(2.0));
        assert_eq!(eval("Math.round(-1.5);").as_number(), Some(-1.0));
        assert_eq!(eval("Math.abs(-3);").as_number(), Some(3.0));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(eval("Math.min(3, 1, 2);").as_number(), Some(1.0));
        assert_eq!(eval("Math.max(3, 1, 2);").as_number(), Some(3.0));
        assert_eq!(eval("Math.min();").as_number(), Some(f64::INFINITY));
        assert_eq!(eval("Math.max();").as_number(), Some(f64::NEG_INFINITY));
        assert!(eval("Math.min(1, NaN);").as_number().unwrap().is_nan());
    }

    #[test]
    fn test_pow_edge_cases() {
        assert_eq!(eval("Math.pow(2, 10);").as_number(), Some(1024.0));
        assert!(eval("Math.pow(1, Infinity);").as_number().unwrap().is_nan());
        assert!(eval("Math.pow(-1, Infinity);").as_number().unwrap().is_nan());
    }

    #[test]
    fn test_random_range() {
        let v = eval("Math.random();").as_number().unwrap();
        assert!((0.0..1.0).contains(&v));
    }

    #[test]
    fn test_constants() {
        assert_eq!(eval("Math.PI;").as_number(), Some(std::f64::consts::PI));
        assert_eq!(eval("Math.E;").as_number(), Some(std::f64::consts::E));
    }
}
