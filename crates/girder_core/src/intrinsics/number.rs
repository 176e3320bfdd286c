//! The `Number` constructor and `Number.prototype` (§15.7).

use crate::intrinsics::{add_frozen_value, add_method, arg, make_constructor};
use crate::objects::{JsObject, ObjectData};
use crate::runtime::conversions::{number_to_string_radix, to_integer_f};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.number_prototype;
    add_method(interp, proto, "toString", 1, proto_to_string);
    add_method(interp, proto, "toLocaleString", 0, proto_to_string);
    add_method(interp, proto, "valueOf", 0, proto_value_of);
    add_method(interp, proto, "toFixed", 1, proto_to_fixed);

    let ctor = make_constructor(interp, "Number", 1, ctor_call, ctor_construct, proto);
    add_frozen_value(interp, ctor, "MAX_VALUE", Value::Number(f64::MAX));
    add_frozen_value(interp, ctor, "MIN_VALUE", Value::Number(5e-324));
    add_frozen_value(interp, ctor, "NaN", Value::Number(f64::NAN));
    add_frozen_value(
        interp,
        ctor,
        "POSITIVE_INFINITY",
        Value::Number(f64::INFINITY),
    );
    add_frozen_value(
        interp,
        ctor,
        "NEGATIVE_INFINITY",
        Value::Number(f64::NEG_INFINITY),
    );
}

fn ctor_call(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    if args.is_empty() {
        return Ok(Value::Number(0.0));
    }
    Ok(Value::Number(interp.to_number(&args[0])?))
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let n = if args.is_empty() {
        0.0
    } else {
        interp.to_number(&args[0])?
    };
    let proto = interp.intrinsics.number_prototype;
    Ok(Value::Object(interp.heap.allocate(JsObject::with_data(
        "Number",
        Some(proto),
        ObjectData::Number(n),
    ))))
}

/// The primitive value of a number `this`, or a TypeError for anything
/// else (§15.7.4: the methods are not generic).
fn this_number(interp: &mut Interpreter, this: &Value) -> Result<f64, Value> {
    match this {
        Value::Number(n) => Ok(*n),
        Value::Object(h) => {
            if let ObjectData::Number(n) = &interp.heap.get(*h).data {
                return Ok(*n);
            }
            interp.throw_type_error("Number.prototype method called on a non-number")
        }
        _ => interp.throw_type_error("Number.prototype method called on a non-number"),
    }
}

fn proto_to_string(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let n = this_number(interp, &this)?;
    let radix = match arg(args, 0) {
        Value::Undefined => 10.0,
        other => to_integer_f(interp.to_number(&other)?),
    };
    if !(2.0..=36.0).contains(&radix) {
        return interp.throw_range_error("toString() radix must be between 2 and 36");
    }
    Ok(Value::string(number_to_string_radix(n, radix as u32)))
}

fn proto_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(this_number(interp, &this)?))
}

/// §15.7.4.5 toFixed.
fn proto_to_fixed(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let n = this_number(interp, &this)?;
    let digits = to_integer_f(interp.to_number(&arg(args, 0))?);
    if !(0.0..=20.0).contains(&digits) {
        return interp.throw_range_error("toFixed() digits must be between 0 and 20");
    }
    if n.is_nan() {
        return Ok(Value::string("NaN"));
    }
    if n.abs() >= 1e21 {
        return Ok(Value::string(
            crate::runtime::conversions::number_to_string(n),
        ));
    }
    Ok(Value::string(format!("{:.*}", digits as usize, n)))
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_to_string_radix() {
        assert_eq!(eval("(255).toString(16);").as_str(), Some("ff"));
        assert_eq!(eval("(8).toString(2);").as_str(), Some("1000"));
        assert_eq!(eval("(1.5).toString();").as_str(), Some("1.5"));
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(eval("(1.005).toFixed(2);").as_str(), Some("1.00"));
        assert_eq!(eval("(1.5).toFixed(0);").as_str(), Some("2"));
        assert_eq!(eval("(0.1).toFixed(3);").as_str(), Some("0.100"));
    }

    #[test]
    fn test_constants() {
        assert_eq!(eval("Number.MAX_VALUE;").as_number(), Some(f64::MAX));
        assert!(eval("Number.NaN;").as_number().unwrap().is_nan());
        assert_eq!(
            eval("Number.NEGATIVE_INFINITY;").as_number(),
            Some(f64::NEG_INFINITY)
        );
    }

    #[test]
    fn test_wrapper() {
        assert_eq!(eval("new Number(7).valueOf();").as_number(), Some(7.0));
        assert_eq!(eval("Number('0x10');").as_number(), Some(16.0));
        assert_eq!(eval("new Number(7) + 1;").as_number(), Some(8.0));
    }
}
