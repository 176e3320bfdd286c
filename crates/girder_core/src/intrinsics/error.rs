//! `Error` and the native error subclasses (§15.11).

use crate::intrinsics::{add_method, add_value, arg};
use crate::objects::function::NativeFn;
use crate::objects::{JsObject, ObjectData, ObjectHandle, Property, PropertyAttributes};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let base_proto = interp.intrinsics.error_prototype;
    add_value(interp, base_proto, "name", Value::string("Error"));
    add_value(interp, base_proto, "message", Value::string(""));
    add_method(interp, base_proto, "toString", 0, proto_to_string);
    install_constructor(interp, "Error", base_proto, ctor_error);

    let subclasses: [(&str, ObjectHandle, NativeFn); 6] = [
        ("EvalError", interp.intrinsics.eval_error_prototype, ctor_eval_error),
        ("RangeError", interp.intrinsics.range_error_prototype, ctor_range_error),
        (
            "ReferenceError",
            interp.intrinsics.reference_error_prototype,
            ctor_reference_error,
        ),
        (
            "SyntaxError",
            interp.intrinsics.syntax_error_prototype,
            ctor_syntax_error,
        ),
        ("TypeError", interp.intrinsics.type_error_prototype, ctor_type_error),
        ("URIError", interp.intrinsics.uri_error_prototype, ctor_uri_error),
    ];
    for (name, proto, ctor) in subclasses {
        add_value(interp, proto, "name", Value::string(name));
        add_value(interp, proto, "message", Value::string(""));
        install_constructor(interp, name, proto, ctor);
    }
}

/// Error constructors behave identically called or constructed (§15.11.1).
fn install_constructor(
    interp: &mut Interpreter,
    name: &str,
    prototype: ObjectHandle,
    ctor: NativeFn,
) {
    let f = interp.new_native_function_with_construct(name, 1, ctor, Some(ctor));
    interp.heap.get_mut(f).define_property_raw(
        "prototype",
        Property::data(Value::Object(prototype), PropertyAttributes::empty()),
    );
    interp
        .heap
        .get_mut(prototype)
        .set_builtin_property("constructor", Value::Object(f));
    let global = interp.global_object;
    interp
        .heap
        .get_mut(global)
        .set_builtin_property(name, Value::Object(f));
}

fn make(interp: &mut Interpreter, prototype: ObjectHandle, args: &[Value]) -> Result<Value, Value> {
    let message = match arg(args, 0) {
        Value::Undefined => None,
        other => Some(interp.to_string_value(&other)?),
    };
    let mut obj = JsObject::with_data("Error", Some(prototype), ObjectData::Error);
    if let Some(message) = message {
        obj.set_builtin_property("message", Value::string(message));
    }
    Ok(Value::Object(interp.heap.allocate(obj)))
}

fn ctor_error(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let proto = interp.intrinsics.error_prototype;
    make(interp, proto, args)
}

fn ctor_eval_error(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let proto = interp.intrinsics.eval_error_prototype;
    make(interp, proto, args)
}

fn ctor_range_error(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let proto = interp.intrinsics.range_error_prototype;
    make(interp, proto, args)
}

fn ctor_reference_error(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let proto = interp.intrinsics.reference_error_prototype;
    make(interp, proto, args)
}

fn ctor_syntax_error(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let proto = interp.intrinsics.syntax_error_prototype;
    make(interp, proto, args)
}

fn ctor_type_error(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let proto = interp.intrinsics.type_error_prototype;
    make(interp, proto, args)
}

fn ctor_uri_error(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let proto = interp.intrinsics.uri_error_prototype;
    make(interp, proto, args)
}

/// §15.11.4.4 Error.prototype.toString.
fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let Some(obj) = this.as_object() else {
        return interp.throw_type_error("Error.prototype.toString called on a non-object");
    };
    let name = match interp.get_property(obj, "name", &this)? {
        Value::Undefined => "Error".to_string(),
        other => interp.to_string_value(&other)?,
    };
    let message = match interp.get_property(obj, "message", &this)? {
        Value::Undefined => String::new(),
        other => interp.to_string_value(&other)?,
    };
    Ok(Value::string(match (name.is_empty(), message.is_empty()) {
        (true, _) => message,
        (false, true) => name,
        (false, false) => format!("{name}: {message}"),
    }))
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_error_shapes() {
        assert_eq!(
            eval("new TypeError('oops').message;").as_str(),
            Some("oops")
        );
        assert_eq!(eval("new TypeError('x').name;").as_str(), Some("TypeError"));
        assert_eq!(
            eval("new RangeError('r').toString();").as_str(),
            Some("RangeError: r")
        );
        assert_eq!(eval("new Error().toString();").as_str(), Some("Error"));
    }

    #[test]
    fn test_instanceof_chain() {
        assert!(eval("new TypeError('x') instanceof TypeError;").to_boolean());
        assert!(eval("new TypeError('x') instanceof Error;").to_boolean());
        assert!(!eval("new TypeError('x') instanceof RangeError;").to_boolean());
    }

    #[test]
    fn test_engine_errors_are_instances() {
        assert!(eval("try { null.x; } catch (e) { e instanceof TypeError; }").to_boolean());
        assert!(eval("try { missing; } catch (e) { e instanceof ReferenceError; }").to_boolean());
    }

    #[test]
    fn test_call_and_construct_agree() {
        assert_eq!(
            eval("TypeError('m').message;").as_str(),
            Some("m")
        );
    }
}
