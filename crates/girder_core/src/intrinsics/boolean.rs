//! The `Boolean` constructor and `Boolean.prototype` (§15.6).

use crate::intrinsics::{add_method, arg, make_constructor};
use crate::objects::{JsObject, ObjectData};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.boolean_prototype;
    add_method(interp, proto, "toString", 0, proto_to_string);
    add_method(interp, proto, "valueOf", 0, proto_value_of);
    make_constructor(interp, "Boolean", 1, ctor_call, ctor_construct, proto);
}

fn ctor_call(_interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Boolean(arg(args, 0).to_boolean()))
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let b = arg(args, 0).to_boolean();
    let proto = interp.intrinsics.boolean_prototype;
    Ok(Value::Object(interp.heap.allocate(JsObject::with_data(
        "Boolean",
        Some(proto),
        ObjectData::Boolean(b),
    ))))
}

fn this_boolean(interp: &mut Interpreter, this: &Value) -> Result<bool, Value> {
    match this {
        Value::Boolean(b) => Ok(*b),
        Value::Object(h) => {
            if let ObjectData::Boolean(b) = &interp.heap.get(*h).data {
                return Ok(*b);
            }
            interp.throw_type_error("Boolean.prototype method called on a non-boolean")
        }
        _ => interp.throw_type_error("Boolean.prototype method called on a non-boolean"),
    }
}

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let b = this_boolean(interp, &this)?;
    Ok(Value::string(if b { "true" } else { "false" }))
}

fn proto_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Boolean(this_boolean(interp, &this)?))
}
