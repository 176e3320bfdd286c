//! The `Object` constructor and `Object.prototype` (§15.2).

use crate::intrinsics::{add_method, arg, make_constructor};
use crate::objects::{JsObject, ObjectHandle, Property, PropertyDescriptor, PropertyKind};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.object_prototype;
    add_method(interp, proto, "toString", 0, proto_to_string);
    add_method(interp, proto, "toLocaleString", 0, proto_to_locale_string);
    add_method(interp, proto, "valueOf", 0, proto_value_of);
    add_method(interp, proto, "hasOwnProperty", 1, proto_has_own_property);
    add_method(interp, proto, "isPrototypeOf", 1, proto_is_prototype_of);
    add_method(
        interp,
        proto,
        "propertyIsEnumerable",
        1,
        proto_property_is_enumerable,
    );

    let ctor = make_constructor(interp, "Object", 1, ctor_call, ctor_construct, proto);
    add_method(interp, ctor, "getPrototypeOf", 1, get_prototype_of);
    add_method(
        interp,
        ctor,
        "getOwnPropertyDescriptor",
        2,
        get_own_property_descriptor,
    );
    add_method(interp, ctor, "getOwnPropertyNames", 1, get_own_property_names);
    add_method(interp, ctor, "create", 2, create);
    add_method(interp, ctor, "defineProperty", 3, define_property);
    add_method(interp, ctor, "defineProperties", 2, define_properties);
    add_method(interp, ctor, "seal", 1, seal);
    add_method(interp, ctor, "freeze", 1, freeze);
    add_method(interp, ctor, "preventExtensions", 1, prevent_extensions);
    add_method(interp, ctor, "isSealed", 1, is_sealed);
    add_method(interp, ctor, "isFrozen", 1, is_frozen);
    add_method(interp, ctor, "isExtensible", 1, is_extensible);
    add_method(interp, ctor, "keys", 1, keys);
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor (§15.2.1 / §15.2.2)
// ─────────────────────────────────────────────────────────────────────────────

fn ctor_call(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let value = arg(args, 0);
    if value.is_nullish() {
        return Ok(Value::Object(interp.make_object()));
    }
    Ok(Value::Object(interp.to_object(&value)?))
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let value = arg(args, 0);
    match value {
        Value::Object(h) => Ok(Value::Object(h)),
        Value::Undefined | Value::Null => Ok(Value::Object(interp.make_object())),
        primitive => Ok(Value::Object(interp.to_object(&primitive)?)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Object.* (§15.2.3)
// ─────────────────────────────────────────────────────────────────────────────

fn require_object(
    interp: &mut Interpreter,
    value: &Value,
    who: &str,
) -> Result<ObjectHandle, Value> {
    match value.as_object() {
        Some(h) => Ok(h),
        None => interp.throw_type_error(&format!("{who} called on a non-object")),
    }
}

fn get_prototype_of(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.getPrototypeOf")?;
    Ok(match interp.heap.get(obj).prototype() {
        Some(p) => Value::Object(p),
        None => Value::Null,
    })
}

fn get_own_property_descriptor(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.getOwnPropertyDescriptor")?;
    let key = arg(args, 1);
    let name = interp.to_string_value(&key)?;
    match interp.get_own_property(obj, &name) {
        None => Ok(Value::Undefined),
        Some(prop) => Ok(from_property_descriptor(interp, &prop)),
    }
}

/// §8.10.4 FromPropertyDescriptor.
fn from_property_descriptor(interp: &mut Interpreter, prop: &Property) -> Value {
    let result = interp.make_object();
    let mut obj = interp.heap.get_mut(result);
    match &prop.kind {
        PropertyKind::Data(value) => {
            obj.set_simple_property("value", value.clone());
            obj.set_simple_property("writable", Value::Boolean(prop.is_writable()));
        }
        PropertyKind::Accessor { get, set } => {
            obj.set_simple_property(
                "get",
                get.map(Value::Object).unwrap_or(Value::Undefined),
            );
            obj.set_simple_property(
                "set",
                set.map(Value::Object).unwrap_or(Value::Undefined),
            );
        }
    }
    obj.set_simple_property("enumerable", Value::Boolean(prop.is_enumerable()));
    obj.set_simple_property("configurable", Value::Boolean(prop.is_configurable()));
    drop(obj);
    Value::Object(result)
}

/// §8.10.5 ToPropertyDescriptor.
pub(crate) fn to_property_descriptor(
    interp: &mut Interpreter,
    value: &Value,
) -> Result<PropertyDescriptor, Value> {
    let Some(obj) = value.as_object() else {
        return interp.throw_type_error("property descriptor must be an object");
    };
    let mut desc = PropertyDescriptor::default();
    let this = Value::Object(obj);

    if interp.has_property(obj, "enumerable") {
        let v = interp.get_property(obj, "enumerable", &this)?;
        desc.enumerable = Some(v.to_boolean());
    }
    if interp.has_property(obj, "configurable") {
        let v = interp.get_property(obj, "configurable", &this)?;
        desc.configurable = Some(v.to_boolean());
    }
    if interp.has_property(obj, "value") {
        desc.value = Some(interp.get_property(obj, "value", &this)?);
    }
    if interp.has_property(obj, "writable") {
        let v = interp.get_property(obj, "writable", &this)?;
        desc.writable = Some(v.to_boolean());
    }
    if interp.has_property(obj, "get") {
        let v = interp.get_property(obj, "get", &this)?;
        desc.get = Some(match &v {
            Value::Undefined => None,
            _ if interp.is_callable(&v) => v.as_object(),
            _ => return interp.throw_type_error("getter must be callable"),
        });
    }
    if interp.has_property(obj, "set") {
        let v = interp.get_property(obj, "set", &this)?;
        desc.set = Some(match &v {
            Value::Undefined => None,
            _ if interp.is_callable(&v) => v.as_object(),
            _ => return interp.throw_type_error("setter must be callable"),
        });
    }
    if (desc.get.is_some() || desc.set.is_some())
        && (desc.value.is_some() || desc.writable.is_some())
    {
        return interp
            .throw_type_error("property descriptor cannot be both data and accessor");
    }
    Ok(desc)
}

fn get_own_property_names(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.getOwnPropertyNames")?;
    let names: Vec<Value> = interp
        .heap
        .get(obj)
        .own_keys()
        .into_iter()
        .map(Value::String)
        .collect();
    Ok(Value::Object(interp.make_array(names)))
}

fn keys(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.keys")?;
    let names: Vec<Value> = interp
        .heap
        .get(obj)
        .own_enumerable_keys()
        .into_iter()
        .map(Value::String)
        .collect();
    Ok(Value::Object(interp.make_array(names)))
}

fn create(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let proto = arg(args, 0);
    let prototype = match &proto {
        Value::Object(h) => Some(*h),
        Value::Null => None,
        _ => return interp.throw_type_error("Object.create prototype must be an object or null"),
    };
    let obj = interp.heap.allocate(JsObject::ordinary("Object", prototype));
    let props = arg(args, 1);
    if !props.is_undefined() {
        define_properties(interp, this, &[Value::Object(obj), props])?;
    }
    Ok(Value::Object(obj))
}

fn define_property(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let target = arg(args, 0);
    let obj = require_object(interp, &target, "Object.defineProperty")?;
    let key = arg(args, 1);
    let name = interp.to_string_value(&key)?;
    let desc = to_property_descriptor(interp, &arg(args, 2))?;
    interp.define_own_property(obj, &name, &desc, true)?;
    Ok(target)
}

fn define_properties(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let target = arg(args, 0);
    let obj = require_object(interp, &target, "Object.defineProperties")?;
    let props_value = arg(args, 1);
    let props = interp.to_object(&props_value)?;
    let names = interp.heap.get(props).own_enumerable_keys();
    let this_props = Value::Object(props);
    // Descriptors are all read before any is applied (§15.2.3.7).
    let mut pending = Vec::with_capacity(names.len());
    for name in names {
        let desc_value = interp.get_property(props, &name, &this_props)?;
        let desc = to_property_descriptor(interp, &desc_value)?;
        pending.push((name, desc));
    }
    for (name, desc) in pending {
        interp.define_own_property(obj, &name, &desc, true)?;
    }
    Ok(target)
}

fn seal(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let target = arg(args, 0);
    let obj = require_object(interp, &target, "Object.seal")?;
    let names = interp.heap.get(obj).own_keys();
    for name in names {
        let desc = PropertyDescriptor {
            configurable: Some(false),
            ..PropertyDescriptor::default()
        };
        interp.define_own_property(obj, &name, &desc, true)?;
    }
    interp.heap.get_mut(obj).prevent_extensions();
    Ok(target)
}

fn freeze(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let target = arg(args, 0);
    let obj = require_object(interp, &target, "Object.freeze")?;
    let names = interp.heap.get(obj).own_keys();
    for name in names {
        let is_data = interp
            .get_own_property(obj, &name)
            .map(|p| p.is_data())
            .unwrap_or(false);
        let desc = PropertyDescriptor {
            writable: if is_data { Some(false) } else { None },
            configurable: Some(false),
            ..PropertyDescriptor::default()
        };
        interp.define_own_property(obj, &name, &desc, true)?;
    }
    interp.heap.get_mut(obj).prevent_extensions();
    Ok(target)
}

fn prevent_extensions(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let target = arg(args, 0);
    let obj = require_object(interp, &target, "Object.preventExtensions")?;
    interp.heap.get_mut(obj).prevent_extensions();
    Ok(target)
}

fn is_sealed(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.isSealed")?;
    let o = interp.heap.get(obj);
    let sealed = !o.is_extensible()
        && o.own_keys()
            .iter()
            .all(|k| !o.get_own_property(k).map(Property::is_configurable).unwrap_or(false));
    Ok(Value::Boolean(sealed))
}

fn is_frozen(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.isFrozen")?;
    let o = interp.heap.get(obj);
    let frozen = !o.is_extensible()
        && o.own_keys().iter().all(|k| {
            o.get_own_property(k)
                .map(|p| !p.is_configurable() && (!p.is_data() || !p.is_writable()))
                .unwrap_or(true)
        });
    Ok(Value::Boolean(frozen))
}

fn is_extensible(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = require_object(interp, &arg(args, 0), "Object.isExtensible")?;
    let extensible = interp.heap.get(obj).is_extensible();
    Ok(Value::Boolean(extensible))
}

// ─────────────────────────────────────────────────────────────────────────────
// Object.prototype.* (§15.2.4)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let class = match &this {
        Value::Undefined => return Ok(Value::string("[object Undefined]")),
        Value::Null => return Ok(Value::string("[object Null]")),
        other => {
            let obj = interp.to_object(other)?;
            interp.heap.get(obj).class()
        }
    };
    Ok(Value::string(format!("[object {class}]")))
}

fn proto_to_locale_string(
    interp: &mut Interpreter,
    this: Value,
    _args: &[Value],
) -> Result<Value, Value> {
    // §15.2.4.3: defers to this.toString().
    let obj = interp.to_object(&this)?;
    let method = interp.get_property(obj, "toString", &this)?;
    interp.call_value(&method, this, &[])
}

fn proto_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Object(interp.to_object(&this)?))
}

fn proto_has_own_property(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let key = arg(args, 0);
    let name = interp.to_string_value(&key)?;
    let obj = interp.to_object(&this)?;
    Ok(Value::Boolean(interp.get_own_property(obj, &name).is_some()))
}

fn proto_is_prototype_of(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let Some(candidate) = arg(args, 0).as_object() else {
        return Ok(Value::Boolean(false));
    };
    let this_obj = interp.to_object(&this)?;
    let mut current = interp.heap.get(candidate).prototype();
    while let Some(p) = current {
        if p == this_obj {
            return Ok(Value::Boolean(true));
        }
        current = interp.heap.get(p).prototype();
    }
    Ok(Value::Boolean(false))
}

fn proto_property_is_enumerable(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let key = arg(args, 0);
    let name = interp.to_string_value(&key)?;
    let obj = interp.to_object(&this)?;
    let enumerable = interp
        .get_own_property(obj, &name)
        .map(|p| p.is_enumerable())
        .unwrap_or(false);
    Ok(Value::Boolean(enumerable))
}
