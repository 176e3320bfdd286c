//! The `Function` constructor and `Function.prototype` (§15.3).

use std::rc::Rc;

use crate::intrinsics::{add_method, arg, make_constructor};
use crate::objects::function::{BoundFunction, FunctionData};
use crate::objects::{JsObject, ObjectData, Property, PropertyAttributes, PropertyKind};
use crate::parser::ast::{FnLiteral, Stmt};
use crate::parser::parse_string;
use crate::parser::scanner::{is_id_continue, is_id_start};
use crate::runtime::conversions::to_uint32_f;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.function_prototype;
    add_method(interp, proto, "toString", 0, proto_to_string);
    add_method(interp, proto, "apply", 2, proto_apply);
    add_method(interp, proto, "call", 1, proto_call);
    add_method(interp, proto, "bind", 1, proto_bind);
    interp
        .heap
        .get_mut(proto)
        .define_property_raw(
            "length",
            Property::data(Value::Number(0.0), PropertyAttributes::empty()),
        );

    make_constructor(interp, "Function", 1, ctor, ctor, proto);
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor (§15.3.1 / §15.3.2)
// ─────────────────────────────────────────────────────────────────────────────

/// `Function(p1, …, pn, body)`: assemble the canonical
/// `function anonymous(…) { … }` source, parse it whole (so the body is
/// function-body code: `return` is legal, parameters go through the real
/// grammar), and close over the global environment. `[[Call]]` and
/// `[[Construct]]` behave identically (§15.3.1.1).
fn ctor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let (param_src, body_src) = match args {
        [] => (String::new(), String::new()),
        [body] => (String::new(), interp.to_string_value(body)?),
        [params @ .., body] => {
            let mut rendered = Vec::with_capacity(params.len());
            for p in params {
                rendered.push(interp.to_string_value(p)?);
            }
            (rendered.join(","), interp.to_string_value(body)?)
        }
    };
    // Reject parameter spellings the assembled source would misparse
    // (e.g. "a) {} function ugh(" smuggling a second body).
    for piece in param_src.split(',') {
        let name = piece.trim();
        if name.is_empty() && param_src.trim().is_empty() {
            continue;
        }
        if !is_identifier(name) {
            return interp
                .throw_syntax_error(&format!("invalid formal parameter name '{name}'"));
        }
    }

    let assembled = format!("function anonymous({param_src}) {{\n{body_src}\n}}");
    let program = match parse_string(&assembled, Some("<function constructor>")) {
        Ok(p) => p,
        Err(e) => {
            let message = e.to_string();
            return interp.throw_syntax_error(&message);
        }
    };
    let literal: Rc<FnLiteral> = match program.body.first() {
        Some(Stmt::FnDecl(f)) if program.body.len() == 1 => Rc::clone(f),
        _ => return interp.throw_syntax_error("invalid function body"),
    };
    let global_env = interp.global_env;
    let f = interp.create_function(literal, global_env);
    Ok(Value::Object(f))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_id_start(c) => chars.all(is_id_continue),
        _ => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Function.prototype.* (§15.3.4)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let Some(handle) = this.as_object() else {
        return interp.throw_type_error("Function.prototype.toString is not generic");
    };
    let rendered = {
        let obj = interp.heap.get(handle);
        match obj.function_data() {
            None => None,
            Some(FunctionData::Script(s)) => {
                let name = s.literal.name.clone().unwrap_or_default();
                let params = s.literal.params.join(", ");
                Some(format!("function {name}({params}) {{ [script code] }}"))
            }
            Some(FunctionData::Native(n)) => {
                Some(format!("function {}() {{ [native code] }}", n.name))
            }
            Some(FunctionData::Bound(_)) => {
                Some("function () { [native code] }".to_string())
            }
        }
    };
    match rendered {
        Some(s) => Ok(Value::string(s)),
        None => interp.throw_type_error("Function.prototype.toString is not generic"),
    }
}

fn proto_apply(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    if !interp.is_callable(&this) {
        return interp.throw_type_error("Function.prototype.apply called on a non-function");
    }
    let this_arg = arg(args, 0);
    let arg_array = arg(args, 1);
    let call_args = match &arg_array {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(h) => {
            let this_list = Value::Object(*h);
            let length = interp.get_property(*h, "length", &this_list)?;
            let n = to_uint32_f(interp.to_number(&length)?);
            let mut list = Vec::with_capacity(n as usize);
            for i in 0..n {
                list.push(interp.get_property(*h, &i.to_string(), &this_list)?);
            }
            list
        }
        _ => {
            return interp
                .throw_type_error("Function.prototype.apply arguments list is not an object")
        }
    };
    interp.call_value(&this, this_arg, &call_args)
}

fn proto_call(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    if !interp.is_callable(&this) {
        return interp.throw_type_error("Function.prototype.call called on a non-function");
    }
    let this_arg = arg(args, 0);
    let rest = if args.is_empty() { &[] } else { &args[1..] };
    interp.call_value(&this, this_arg, rest)
}

/// §15.3.4.5 bind.
fn proto_bind(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let Some(target) = this.as_object() else {
        return interp.throw_type_error("Function.prototype.bind called on a non-function");
    };
    if !interp.heap.get(target).is_callable() {
        return interp.throw_type_error("Function.prototype.bind called on a non-function");
    }
    let bound_this = arg(args, 0);
    let bound_args: Vec<Value> = if args.is_empty() {
        Vec::new()
    } else {
        args[1..].to_vec()
    };

    // length = max(target.length - bound args, 0).
    let this_target = Value::Object(target);
    let target_length = interp.get_property(target, "length", &this_target)?;
    let length = (interp.to_number(&target_length)?.max(0.0) - bound_args.len() as f64).max(0.0);

    let fn_proto = interp.intrinsics.function_prototype;
    let mut obj = JsObject::with_data(
        "Function",
        Some(fn_proto),
        ObjectData::Function(FunctionData::Bound(BoundFunction {
            target,
            bound_this,
            bound_args,
        })),
    );
    obj.define_property_raw(
        "length",
        Property::data(Value::Number(length), PropertyAttributes::empty()),
    );
    let thrower = interp.intrinsics.throw_type_error;
    for poisoned in ["caller", "arguments"] {
        obj.define_property_raw(
            poisoned,
            Property {
                kind: PropertyKind::Accessor {
                    get: Some(thrower),
                    set: Some(thrower),
                },
                attributes: PropertyAttributes::empty(),
            },
        );
    }
    Ok(Value::Object(interp.heap.allocate(obj)))
}
