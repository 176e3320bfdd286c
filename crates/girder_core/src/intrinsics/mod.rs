//! The built-in library (§15): the minimum set of intrinsics that makes the
//! evaluator observable, installed onto a fresh global object.
//!
//! Bootstrapping happens in two phases. [`Intrinsics::bootstrap`] allocates
//! the bare prototype objects and the global object so that every later
//! allocation can point at its prototype; [`install`] then populates
//! prototypes, creates the constructors, and wires the global properties,
//! in the same order the original runtime set itself up.

/// `Array` and `Array.prototype`.
pub mod array;
/// `Boolean` and `Boolean.prototype`.
pub mod boolean;
/// The `console` host hook object.
pub mod console;
/// The `Date` stub.
pub mod date;
/// `Error` and the native error subclasses.
pub mod error;
/// `Function` and `Function.prototype`.
pub mod function;
/// Global functions (`eval`, `parseInt`, URI coding, …).
pub mod global;
/// The `Math` namespace object.
pub mod math;
/// `Number` and `Number.prototype`.
pub mod number;
/// `Object` and `Object.prototype`.
pub mod object;
/// `RegExp` objects over the backing regex engine.
pub mod regexp;
/// `String` and `String.prototype`.
pub mod string;

use crate::objects::function::{FunctionData, NativeFn, NativeFunction};
use crate::objects::{
    Heap, JsObject, ObjectData, ObjectHandle, Property, PropertyAttributes,
};
use crate::runtime::value::Value;
use crate::runtime::{ErrorKind, Interpreter};

/// Handles to every intrinsic object the engine needs by identity.
pub struct Intrinsics {
    /// The global object itself.
    pub global: ObjectHandle,
    pub object_prototype: ObjectHandle,
    pub function_prototype: ObjectHandle,
    pub array_prototype: ObjectHandle,
    pub string_prototype: ObjectHandle,
    pub number_prototype: ObjectHandle,
    pub boolean_prototype: ObjectHandle,
    pub date_prototype: ObjectHandle,
    pub regexp_prototype: ObjectHandle,
    pub error_prototype: ObjectHandle,
    pub eval_error_prototype: ObjectHandle,
    pub range_error_prototype: ObjectHandle,
    pub reference_error_prototype: ObjectHandle,
    pub syntax_error_prototype: ObjectHandle,
    pub type_error_prototype: ObjectHandle,
    pub uri_error_prototype: ObjectHandle,
    /// The intrinsic `eval` function (identity matters for direct-eval
    /// detection).
    pub eval_function: ObjectHandle,
    /// The `[[ThrowTypeError]]` function (§13.2.3).
    pub throw_type_error: ObjectHandle,
}

/// `[[ThrowTypeError]]` (§13.2.3).
fn thrower(interp: &mut Interpreter, _this: Value, _args: &[Value]) -> Result<Value, Value> {
    interp.throw_type_error("access to 'caller' and 'arguments' is restricted")
}

/// `Function.prototype` is itself callable and returns undefined (§15.3.4).
fn function_prototype_call(
    _interp: &mut Interpreter,
    _this: Value,
    _args: &[Value],
) -> Result<Value, Value> {
    Ok(Value::Undefined)
}

impl Intrinsics {
    /// Allocate the skeleton: every prototype object, the global object,
    /// and the two primordial functions. Properties come later in
    /// [`install`].
    pub fn bootstrap(heap: &mut Heap) -> Self {
        let object_prototype = heap.allocate(JsObject::ordinary("Object", None));
        let function_prototype = heap.allocate(JsObject::with_data(
            "Function",
            Some(object_prototype),
            ObjectData::Function(FunctionData::Native(NativeFunction {
                name: String::new(),
                func: function_prototype_call,
                construct: None,
            })),
        ));

        let proto = |heap: &mut Heap, class: &'static str| {
            heap.allocate(JsObject::ordinary(class, Some(object_prototype)))
        };
        let array_prototype = heap.allocate({
            // Array.prototype is itself an array with length 0 (§15.4.4).
            let mut obj = JsObject::ordinary("Array", Some(object_prototype));
            obj.define_property_raw(
                "length",
                Property::data(Value::Number(0.0), PropertyAttributes::WRITABLE),
            );
            obj
        });
        let string_prototype = heap.allocate(JsObject::with_data(
            "String",
            Some(object_prototype),
            ObjectData::String(String::new()),
        ));
        let number_prototype = heap.allocate(JsObject::with_data(
            "Number",
            Some(object_prototype),
            ObjectData::Number(0.0),
        ));
        let boolean_prototype = heap.allocate(JsObject::with_data(
            "Boolean",
            Some(object_prototype),
            ObjectData::Boolean(false),
        ));
        let date_prototype = proto(heap, "Date");
        let regexp_prototype = proto(heap, "RegExp");

        let error_prototype = heap.allocate(JsObject::with_data(
            "Error",
            Some(object_prototype),
            ObjectData::Error,
        ));
        let error_proto = |heap: &mut Heap| {
            heap.allocate(JsObject::with_data(
                "Error",
                Some(error_prototype),
                ObjectData::Error,
            ))
        };
        let eval_error_prototype = error_proto(heap);
        let range_error_prototype = error_proto(heap);
        let reference_error_prototype = error_proto(heap);
        let syntax_error_prototype = error_proto(heap);
        let type_error_prototype = error_proto(heap);
        let uri_error_prototype = error_proto(heap);

        let global = heap.allocate(JsObject::ordinary("Object", Some(object_prototype)));

        let throw_type_error = heap.allocate(JsObject::with_data(
            "Function",
            Some(function_prototype),
            ObjectData::Function(FunctionData::Native(NativeFunction {
                name: String::new(),
                func: thrower,
                construct: None,
            })),
        ));

        Intrinsics {
            global,
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            date_prototype,
            regexp_prototype,
            error_prototype,
            eval_error_prototype,
            range_error_prototype,
            reference_error_prototype,
            syntax_error_prototype,
            type_error_prototype,
            uri_error_prototype,
            // Patched by `global::install`.
            eval_function: throw_type_error,
            throw_type_error,
        }
    }

    /// The prototype handle for an [`ErrorKind`].
    pub fn error_prototype_for(&self, kind: ErrorKind) -> ObjectHandle {
        match kind {
            ErrorKind::Base => self.error_prototype,
            ErrorKind::Eval => self.eval_error_prototype,
            ErrorKind::Range => self.range_error_prototype,
            ErrorKind::Reference => self.reference_error_prototype,
            ErrorKind::Syntax => self.syntax_error_prototype,
            ErrorKind::Type => self.type_error_prototype,
            ErrorKind::Uri => self.uri_error_prototype,
        }
    }
}

/// Populate every intrinsic and wire the global object.
pub fn install(interp: &mut Interpreter) {
    object::install(interp);
    function::install(interp);
    array::install(interp);
    string::install(interp);
    boolean::install(interp);
    number::install(interp);
    math::install(interp);
    date::install(interp);
    regexp::install(interp);
    error::install(interp);
    global::install(interp);
    console::install(interp);
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared installation helpers
// ─────────────────────────────────────────────────────────────────────────────

/// The `i`-th argument, or undefined (§15's "if argument is not supplied").
pub(crate) fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Undefined)
}

/// Install a builtin method (`{writable, configurable}`, non-enumerable).
pub(crate) fn add_method(
    interp: &mut Interpreter,
    target: ObjectHandle,
    name: &str,
    length: u32,
    func: NativeFn,
) {
    let f = interp.new_native_function(name, length, func);
    interp
        .heap
        .get_mut(target)
        .set_builtin_property(name, Value::Object(f));
}

/// Install a non-enumerable data property.
pub(crate) fn add_value(interp: &mut Interpreter, target: ObjectHandle, name: &str, value: Value) {
    interp.heap.get_mut(target).set_builtin_property(name, value);
}

/// Install a fully frozen (`{!writable, !enumerable, !configurable}`) data
/// property, the shape of `NaN`, `Infinity`, `undefined`, and the numeric
/// constants.
pub(crate) fn add_frozen_value(
    interp: &mut Interpreter,
    target: ObjectHandle,
    name: &str,
    value: Value,
) {
    interp
        .heap
        .get_mut(target)
        .define_property_raw(name, Property::data(value, PropertyAttributes::empty()));
}

/// Create a builtin constructor: a native function object wired to its
/// prototype (`ctor.prototype` frozen, `proto.constructor` builtin-shaped)
/// and installed on the global object under `name`.
pub(crate) fn make_constructor(
    interp: &mut Interpreter,
    name: &str,
    length: u32,
    call: NativeFn,
    construct: NativeFn,
    prototype: ObjectHandle,
) -> ObjectHandle {
    let ctor = interp.new_native_function_with_construct(name, length, call, Some(construct));
    interp
        .heap
        .get_mut(ctor)
        .define_property_raw(
            "prototype",
            Property::data(Value::Object(prototype), PropertyAttributes::empty()),
        );
    interp
        .heap
        .get_mut(prototype)
        .set_builtin_property("constructor", Value::Object(ctor));
    let global = interp.global_object;
    interp
        .heap
        .get_mut(global)
        .set_builtin_property(name, Value::Object(ctor));
    ctor
}
