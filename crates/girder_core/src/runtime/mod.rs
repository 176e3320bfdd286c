//! The tree-walking evaluator and its supporting machinery.
//!
//! [`Interpreter`] owns the object arena, the environment arena, the
//! execution-context stack, and the intrinsics table. Multiple interpreters
//! are fully independent; everything allocated during evaluation belongs to
//! the owning interpreter and is swept when it drops.

/// The Completion specification type.
pub mod completion;
/// Pure §9 numeric conversions.
pub mod conversions;
/// Environment records and the environment arena.
pub mod environment;
/// §11 expression semantics.
pub mod expressions;
/// The Reference specification type.
pub mod reference;
/// §12 statement semantics.
pub mod statements;
/// ECMAScript language values.
pub mod value;

use std::rc::Rc;

use crate::error::EngineResult;
use crate::intrinsics::{self, Intrinsics};
use crate::objects::function::{
    BoundFunction, FunctionData, NativeFn, NativeFunction, ScriptFunction,
};
use crate::objects::{
    ArgumentsData, Heap, JsObject, ObjectData, ObjectHandle, Property, PropertyAttributes,
    PropertyDescriptor, PropertyKind,
};
use crate::parser::ast::{FnLiteral, Program, ScopeData};
use crate::parser::parse_string;
use completion::Completion;
use conversions::{
    array_index_of, number_to_string, string_to_number, to_int32_f, to_integer_f, to_uint16_f,
    to_uint32_f,
};
use environment::{EnvHandle, EnvRecord, Environments};
use reference::{Evaluated, RefBase, Reference, ValueResult};
use value::Value;

/// The preferred type passed to `ToPrimitive` (§9.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveHint {
    /// No preference (`Number` behavior, except for Date objects).
    Default,
    /// Prefer `valueOf`.
    Number,
    /// Prefer `toString`.
    String,
}

/// One entry of the execution-context stack (§10.3).
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Identifier resolution starts here.
    pub lexical_env: EnvHandle,
    /// `var` and function declarations bind here.
    pub variable_env: EnvHandle,
    /// The `this` value.
    pub this_binding: Value,
    /// Whether the code of this context is strict.
    pub strict: bool,
}

/// The kinds of code declaration binding instantiation distinguishes
/// (§10.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeKind {
    Global,
    Eval,
    Function,
}

/// A self-contained ES5.1 engine instance.
///
/// ```
/// use girder_core::runtime::Interpreter;
///
/// let mut interp = Interpreter::new();
/// let value = interp.execute_string("6 * 7", None).unwrap();
/// assert_eq!(value.as_number(), Some(42.0));
/// ```
pub struct Interpreter {
    pub(crate) heap: Heap,
    pub(crate) envs: Environments,
    pub(crate) intrinsics: Intrinsics,
    pub(crate) global_object: ObjectHandle,
    pub(crate) global_env: EnvHandle,
    contexts: Vec<ExecutionContext>,
    /// Where `console.log` output goes.
    pub(crate) console_sink: Box<dyn FnMut(&str)>,
    call_depth: usize,
    max_call_depth: usize,
    /// splitmix64 state for `Math.random`.
    pub(crate) rng_state: u64,
}

impl Interpreter {
    /// A fresh interpreter with all intrinsics installed and `console.log`
    /// writing to stdout.
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let mut envs = Environments::new();
        let intrinsics = Intrinsics::bootstrap(&mut heap);
        let global_object = intrinsics.global;
        let global_env = envs.new_object(global_object, false, None);

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E3779B97F4A7C15);

        let mut interp = Interpreter {
            heap,
            envs,
            intrinsics,
            global_object,
            global_env,
            contexts: vec![ExecutionContext {
                lexical_env: global_env,
                variable_env: global_env,
                this_binding: Value::Object(global_object),
                strict: false,
            }],
            console_sink: Box::new(|line| println!("{line}")),
            call_depth: 0,
            max_call_depth: 256,
            rng_state: seed,
        };
        intrinsics::install(&mut interp);
        interp
    }

    /// Replace the `console.log` sink. The sink receives one
    /// already-stringified line per call.
    pub fn set_console_sink(&mut self, sink: Box<dyn FnMut(&str)>) {
        self.console_sink = sink;
    }

    /// The global object handle.
    pub fn global_object(&self) -> ObjectHandle {
        self.global_object
    }

    /// Install a host function as a property of the global object.
    pub fn define_native(&mut self, name: &str, length: u32, func: NativeFn) {
        let f = self.new_native_function(name, length, func);
        self.heap
            .get_mut(self.global_object)
            .set_builtin_property(name, Value::Object(f));
    }

    // ── Public execution API ────────────────────────────────────────────────

    /// Parse and execute `source` in this interpreter's shared global
    /// context.
    ///
    /// Parse failures surface as [`EngineError`][crate::error::EngineError];
    /// an uncaught `throw` comes back as `Ok` with the thrown value (an ES
    /// `Error` object for engine-raised conditions), mirroring the original
    /// embedding contract. Use [`Interpreter::run_program`] to distinguish.
    pub fn execute_string(&mut self, source: &str, filename: Option<&str>) -> EngineResult<Value> {
        let program = parse_string(source, filename)?;
        Ok(self.execute_program(&program))
    }

    /// Execute a parsed program; uncaught throws come back as the thrown
    /// value.
    pub fn execute_program(&mut self, program: &Program) -> Value {
        match self.run_program(program) {
            Completion::Normal(v) => v.unwrap_or(Value::Undefined),
            Completion::Return(v) | Completion::Throw(v) => v,
            Completion::Break(_) | Completion::Continue(_) => Value::Undefined,
        }
    }

    /// Execute a parsed program and return the raw [`Completion`], letting
    /// the host distinguish normal completion from an uncaught throw.
    pub fn run_program(&mut self, program: &Program) -> Completion {
        // Global code runs in the single shared bottom context (§10.4.1);
        // its strictness follows the program being executed.
        self.contexts.truncate(1);
        self.contexts[0].strict = program.strict;
        if let Err(thrown) = self.declaration_binding_instantiation(
            CodeKind::Global,
            &program.scope,
            None,
            &[],
            program.strict,
        ) {
            return Completion::Throw(thrown);
        }
        self.eval_statements(&program.body)
    }

    /// Render any value to a display string, as the REPL and `console.log`
    /// do (ToString semantics; may run user `toString` methods).
    pub fn to_display_string(&mut self, value: &Value) -> String {
        match self.to_string_value(value) {
            Ok(s) => s,
            Err(thrown) => format!("<uncaught {}>", thrown.debug_render()),
        }
    }

    // ── Execution contexts ──────────────────────────────────────────────────

    pub(crate) fn context(&self) -> &ExecutionContext {
        self.contexts.last().expect("context stack never empty")
    }

    pub(crate) fn strict(&self) -> bool {
        self.context().strict
    }

    fn push_context(&mut self, context: ExecutionContext) {
        self.contexts.push(context);
    }

    fn pop_context(&mut self) {
        debug_assert!(self.contexts.len() > 1, "global context must survive");
        self.contexts.pop();
    }

    // ── Error construction ──────────────────────────────────────────────────

    /// Construct an ES error object of the named intrinsic kind.
    pub(crate) fn make_error(&mut self, kind: ErrorKind, message: &str) -> Value {
        let prototype = self.intrinsics.error_prototype_for(kind);
        let mut obj = JsObject::with_data("Error", Some(prototype), ObjectData::Error);
        obj.set_builtin_property("message", Value::string(message));
        Value::Object(self.heap.allocate(obj))
    }

    pub(crate) fn throw_type_error<T>(&mut self, message: &str) -> Result<T, Value> {
        Err(self.make_error(ErrorKind::Type, message))
    }

    pub(crate) fn throw_range_error<T>(&mut self, message: &str) -> Result<T, Value> {
        Err(self.make_error(ErrorKind::Range, message))
    }

    pub(crate) fn throw_reference_error<T>(&mut self, message: &str) -> Result<T, Value> {
        Err(self.make_error(ErrorKind::Reference, message))
    }

    pub(crate) fn throw_syntax_error<T>(&mut self, message: &str) -> Result<T, Value> {
        Err(self.make_error(ErrorKind::Syntax, message))
    }

    // ── Identifier resolution (§10.2.2.1, §10.3.1) ──────────────────────────

    /// Walk the lexical-environment chain for `name`.
    pub(crate) fn resolve_identifier(&self, name: &str) -> Reference {
        let strict = self.strict();
        let mut env = Some(self.context().lexical_env);
        while let Some(handle) = env {
            if self.env_has_binding(handle, name) {
                return Reference {
                    base: RefBase::Env(handle),
                    name: name.to_string(),
                    strict,
                };
            }
            env = self.envs.outer_of(handle);
        }
        Reference::unresolvable(name, strict)
    }

    // ── Environment-record operations (§10.2.1) ─────────────────────────────

    pub(crate) fn env_has_binding(&self, env: EnvHandle, name: &str) -> bool {
        match &self.envs.get(env).record {
            EnvRecord::Declarative(bindings) => bindings.contains_key(name),
            EnvRecord::Object { object, .. } => self.has_property(*object, name),
        }
    }

    pub(crate) fn env_create_mutable_binding(
        &mut self,
        env: EnvHandle,
        name: &str,
        deletable: bool,
    ) {
        let object = match &self.envs.get(env).record {
            EnvRecord::Declarative(_) => None,
            EnvRecord::Object { object, .. } => Some(*object),
        };
        match object {
            None => self
                .envs
                .get_mut(env)
                .record
                .create_mutable_binding(name, deletable),
            Some(object) => {
                // §10.2.1.2.2: configurability mirrors deletability.
                let desc = PropertyDescriptor {
                    value: Some(Value::Undefined),
                    writable: Some(true),
                    enumerable: Some(true),
                    configurable: Some(deletable),
                    ..PropertyDescriptor::default()
                };
                // Creation on the binding object is infallible here: the
                // property does not exist (HasBinding was consulted first).
                let _ = self.heap.get_mut(object).define_own_property(name, &desc);
            }
        }
    }

    pub(crate) fn env_set_mutable_binding(
        &mut self,
        env: EnvHandle,
        name: &str,
        value: Value,
        strict: bool,
    ) -> Result<(), Value> {
        let object = match &mut self.envs.get_mut(env).record {
            EnvRecord::Declarative(bindings) => {
                if let Some(binding) = bindings.get_mut(name) {
                    if binding.mutable {
                        binding.value = value;
                        return Ok(());
                    }
                } else {
                    // CreateMutableBinding precedes SetMutableBinding in
                    // every §10 path; a miss means an immutable peer.
                    return Ok(());
                }
                None
            }
            EnvRecord::Object { object, .. } => Some(*object),
        };
        match object {
            Some(object) => self.put_property(object, name, value, strict),
            None => {
                // Immutable binding write.
                if strict {
                    self.throw_type_error(&format!("assignment to constant '{name}'"))
                } else {
                    Ok(())
                }
            }
        }
    }

    pub(crate) fn env_get_binding_value(
        &mut self,
        env: EnvHandle,
        name: &str,
        strict: bool,
    ) -> ValueResult {
        enum Looked {
            Found(Value),
            Uninitialized,
            Missing,
            Object(ObjectHandle),
        }
        let looked = {
            let env_ref = self.envs.get(env);
            match &env_ref.record {
                EnvRecord::Declarative(bindings) => match bindings.get(name) {
                    Some(binding) if binding.initialized => Looked::Found(binding.value.clone()),
                    // Uninitialized immutable binding (§10.2.1.1.4).
                    Some(_) => Looked::Uninitialized,
                    None => Looked::Missing,
                },
                EnvRecord::Object { object, .. } => Looked::Object(*object),
            }
        };
        match looked {
            Looked::Found(value) => Ok(value),
            Looked::Uninitialized | Looked::Missing => {
                if strict {
                    self.throw_reference_error(&format!("{name} is not defined"))
                } else {
                    Ok(Value::Undefined)
                }
            }
            Looked::Object(object) => {
                if !self.has_property(object, name) {
                    return if strict {
                        self.throw_reference_error(&format!("{name} is not defined"))
                    } else {
                        Ok(Value::Undefined)
                    };
                }
                self.get_property(object, name, &Value::Object(object))
            }
        }
    }

    pub(crate) fn env_delete_binding(&mut self, env: EnvHandle, name: &str) -> bool {
        let object = match &mut self.envs.get_mut(env).record {
            EnvRecord::Declarative(bindings) => {
                return match bindings.get(name) {
                    None => true,
                    Some(binding) if binding.deletable => {
                        bindings.remove(name);
                        true
                    }
                    Some(_) => false,
                };
            }
            EnvRecord::Object { object, .. } => *object,
        };
        self.heap.get_mut(object).delete_own_property(name)
    }

    pub(crate) fn env_implicit_this(&self, env: EnvHandle) -> Value {
        match &self.envs.get(env).record {
            EnvRecord::Object {
                object,
                provide_this: true,
            } => Value::Object(*object),
            _ => Value::Undefined,
        }
    }

    // ── GetValue / PutValue (§8.7.1, §8.7.2) ────────────────────────────────

    pub(crate) fn get_value(&mut self, evaluated: Evaluated) -> ValueResult {
        match evaluated {
            Evaluated::Value(v) => Ok(v),
            Evaluated::Ref(r) => self.get_reference_value(&r),
        }
    }

    pub(crate) fn get_reference_value(&mut self, reference: &Reference) -> ValueResult {
        match &reference.base {
            RefBase::Unresolvable => {
                let name = reference.name.clone();
                self.throw_reference_error(&format!("{name} is not defined"))
            }
            RefBase::Env(env) => {
                let env = *env;
                let name = reference.name.clone();
                self.env_get_binding_value(env, &name, reference.strict)
            }
            RefBase::Value(base) => {
                let base = base.clone();
                let name = reference.name.clone();
                match &base {
                    Value::Object(h) => self.get_property(*h, &name, &base),
                    _ => {
                        // Primitive base (§8.7.1 special [[Get]]): box
                        // transiently, read through the wrapper's chain
                        // with the primitive as `this`.
                        let boxed = self.to_object(&base)?;
                        self.get_property(boxed, &name, &base)
                    }
                }
            }
        }
    }

    pub(crate) fn put_value(&mut self, reference: &Reference, value: Value) -> Result<(), Value> {
        match &reference.base {
            RefBase::Unresolvable => {
                if reference.strict {
                    let name = reference.name.clone();
                    return self.throw_reference_error(&format!("{name} is not defined"));
                }
                let global = self.global_object;
                let name = reference.name.clone();
                self.put_property(global, &name, value, false)
            }
            RefBase::Env(env) => {
                let env = *env;
                let name = reference.name.clone();
                self.env_set_mutable_binding(env, &name, value, reference.strict)
            }
            RefBase::Value(base) => {
                let base = base.clone();
                let name = reference.name.clone();
                match &base {
                    Value::Object(h) => self.put_property(*h, &name, value, reference.strict),
                    _ => self.put_primitive_base(&base, &name, value, reference.strict),
                }
            }
        }
    }

    /// §8.7.2's special [[Put]] for primitive bases: writes always miss
    /// (the wrapper is transient) but setters on the prototype chain run.
    fn put_primitive_base(
        &mut self,
        base: &Value,
        name: &str,
        value: Value,
        strict: bool,
    ) -> Result<(), Value> {
        let boxed = self.to_object(base)?;
        if let Some(prop) = self.find_property(boxed, name) {
            match prop.kind {
                PropertyKind::Accessor { set: Some(setter), .. } => {
                    self.call_function(setter, base.clone(), &[value])?;
                    return Ok(());
                }
                PropertyKind::Accessor { set: None, .. } => {
                    if strict {
                        return self.throw_type_error(&format!(
                            "cannot set property '{name}' which has only a getter"
                        ));
                    }
                    return Ok(());
                }
                PropertyKind::Data(_) => {}
            }
        }
        if strict {
            self.throw_type_error(&format!("cannot create property '{name}' on a primitive"))
        } else {
            Ok(())
        }
    }

    // ── Object internal methods (§8.12) ─────────────────────────────────────

    /// `[[GetOwnProperty]]` including the String object index
    /// virtualization (§15.5.5.2) and the arguments parameter-map
    /// indirection (§10.6). Returns an owned copy.
    pub(crate) fn get_own_property(&self, handle: ObjectHandle, name: &str) -> Option<Property> {
        let obj = self.heap.get(handle);
        if let Some(prop) = obj.get_own_property(name) {
            let mut prop = prop.clone();
            // A mapped arguments index reads through to the parameter
            // binding, so writes to the named parameter are observable.
            if prop.is_data() {
                if let ObjectData::Arguments(data) = &obj.data {
                    if let Some((_, param)) =
                        data.parameter_map.iter().find(|(key, _)| key == name)
                    {
                        if let Some(value) = self.read_declarative_binding(data.env, param) {
                            prop.kind = PropertyKind::Data(value);
                        }
                    }
                }
            }
            return Some(prop);
        }
        if let ObjectData::String(s) = &obj.data {
            if let Some(index) = array_index_of(name) {
                if let Some(c) = s.chars().nth(index as usize) {
                    return Some(Property {
                        kind: PropertyKind::Data(Value::string(c.to_string())),
                        attributes: PropertyAttributes::ENUMERABLE,
                    });
                }
            }
        }
        None
    }

    /// Read a declarative binding's value without the strict-mode error
    /// paths (the arguments map consult).
    fn read_declarative_binding(&self, env: EnvHandle, name: &str) -> Option<Value> {
        match &self.envs.get(env).record {
            EnvRecord::Declarative(bindings) => bindings.get(name).map(|b| b.value.clone()),
            EnvRecord::Object { .. } => None,
        }
    }

    /// The environment and parameter a mapped arguments index aliases, if
    /// `handle` is an arguments object and `name` is still mapped.
    fn arguments_mapped_param(
        &self,
        handle: ObjectHandle,
        name: &str,
    ) -> Option<(EnvHandle, String)> {
        match &self.heap.get(handle).data {
            ObjectData::Arguments(data) => data
                .parameter_map
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, param)| (data.env, param.clone())),
            _ => None,
        }
    }

    /// Sever an arguments alias (§10.6: delete, accessor redefinition, or
    /// a write-protecting redefinition all remove the map entry).
    fn arguments_unmap(&mut self, handle: ObjectHandle, name: &str) {
        if let ObjectData::Arguments(data) = &mut self.heap.get_mut(handle).data {
            data.parameter_map.retain(|(key, _)| key != name);
        }
    }

    /// `[[GetProperty]]`: own property or nearest prototype-chain hit.
    pub(crate) fn find_property(&self, handle: ObjectHandle, name: &str) -> Option<Property> {
        let mut current = Some(handle);
        while let Some(h) = current {
            if let Some(prop) = self.get_own_property(h, name) {
                return Some(prop);
            }
            current = self.heap.get(h).prototype();
        }
        None
    }

    /// §8.12.6 `[[HasProperty]]`.
    pub(crate) fn has_property(&self, handle: ObjectHandle, name: &str) -> bool {
        self.find_property(handle, name).is_some()
    }

    /// §8.12.3 `[[Get]]`, with an explicit `this` for the primitive-base
    /// case (getters see the primitive, not the transient wrapper).
    pub(crate) fn get_property(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        this_value: &Value,
    ) -> ValueResult {
        match self.find_property(handle, name) {
            None => Ok(Value::Undefined),
            Some(prop) => match prop.kind {
                PropertyKind::Data(value) => Ok(value),
                PropertyKind::Accessor { get: None, .. } => Ok(Value::Undefined),
                PropertyKind::Accessor {
                    get: Some(getter), ..
                } => self.call_function(getter, this_value.clone(), &[]),
            },
        }
    }

    /// §8.12.5 `[[Put]]`.
    pub(crate) fn put_property(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        value: Value,
        throw: bool,
    ) -> Result<(), Value> {
        // Own property first.
        if let Some(own) = self.get_own_property(handle, name) {
            match own.kind {
                PropertyKind::Data(_) => {
                    if !own.is_writable() {
                        if throw {
                            return self.throw_type_error(&format!(
                                "cannot assign to read-only property '{name}'"
                            ));
                        }
                        return Ok(());
                    }
                    // Array `length` keeps its invariant through the
                    // exotic define path.
                    if self.heap.get(handle).class() == "Array" && name == "length" {
                        let desc = PropertyDescriptor {
                            value: Some(value),
                            ..PropertyDescriptor::default()
                        };
                        return self.define_own_property(handle, name, &desc, throw).map(|_| ());
                    }
                    // A mapped arguments index writes through to the
                    // parameter binding (§10.6).
                    if let Some((env, param)) = self.arguments_mapped_param(handle, name) {
                        self.env_set_mutable_binding(env, &param, value.clone(), false)?;
                    }
                    self.heap.get_mut(handle).set_data_value(name, value);
                    return Ok(());
                }
                PropertyKind::Accessor { set, .. } => {
                    return self.put_through_accessor(handle, name, set, value, throw);
                }
            }
        }
        // Inherited property gates creation (§8.12.4).
        if let Some(inherited) = self.find_property(handle, name) {
            match inherited.kind {
                PropertyKind::Accessor { set, .. } => {
                    return self.put_through_accessor(handle, name, set, value, throw);
                }
                PropertyKind::Data(_) => {
                    if !inherited.is_writable() {
                        if throw {
                            return self.throw_type_error(&format!(
                                "cannot assign to read-only property '{name}'"
                            ));
                        }
                        return Ok(());
                    }
                }
            }
        }
        if !self.heap.get(handle).is_extensible() {
            if throw {
                return self.throw_type_error(&format!(
                    "cannot add property '{name}' to a non-extensible object"
                ));
            }
            return Ok(());
        }
        let desc = PropertyDescriptor {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..PropertyDescriptor::default()
        };
        self.define_own_property(handle, name, &desc, throw).map(|_| ())
    }

    fn put_through_accessor(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        set: Option<ObjectHandle>,
        value: Value,
        throw: bool,
    ) -> Result<(), Value> {
        match set {
            Some(setter) => {
                self.call_function(setter, Value::Object(handle), &[value])?;
                Ok(())
            }
            None => {
                if throw {
                    self.throw_type_error(&format!(
                        "cannot set property '{name}' which has only a getter"
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// §8.12.7 `[[Delete]]`, plus the §10.6 map removal for arguments
    /// objects.
    pub(crate) fn delete_property(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        throw: bool,
    ) -> Result<bool, Value> {
        let deleted = self.heap.get_mut(handle).delete_own_property(name);
        if deleted {
            self.arguments_unmap(handle, name);
        } else if throw {
            return self.throw_type_error(&format!("cannot delete property '{name}'"));
        }
        Ok(deleted)
    }

    /// `[[DefineOwnProperty]]` with the Array override (§15.4.5.1) layered
    /// over the ordinary algorithm.
    pub(crate) fn define_own_property(
        &mut self,
        handle: ObjectHandle,
        name: &str,
        desc: &PropertyDescriptor,
        throw: bool,
    ) -> Result<bool, Value> {
        let is_array = self.heap.get(handle).class() == "Array";
        if is_array {
            if name == "length" {
                if let Some(len_value) = &desc.value {
                    let len_value = len_value.clone();
                    return self.array_set_length(handle, desc, len_value, throw);
                }
                // Attribute-only change follows the ordinary path below.
            } else if let Some(index) = array_index_of(name) {
                return self.array_define_index(handle, index, desc, throw);
            }
        }
        let ok = self.heap.get_mut(handle).define_own_property(name, desc);
        if !ok {
            if throw {
                return self.throw_type_error(&format!("cannot redefine property '{name}'"));
            }
            return Ok(false);
        }
        // §10.6 [[DefineOwnProperty]]: keep the arguments parameter map
        // coherent. An accessor redefinition severs the alias outright; a
        // data redefinition writes through, then severs if it also makes
        // the index non-writable.
        if let Some((env, param)) = self.arguments_mapped_param(handle, name) {
            if desc.is_accessor_descriptor() {
                self.arguments_unmap(handle, name);
            } else {
                if let Some(value) = &desc.value {
                    self.env_set_mutable_binding(env, &param, value.clone(), false)?;
                }
                if desc.writable == Some(false) {
                    self.arguments_unmap(handle, name);
                }
            }
        }
        Ok(true)
    }

    /// §15.4.5.1 steps 3: assigning the `length` property of an array.
    fn array_set_length(
        &mut self,
        handle: ObjectHandle,
        desc: &PropertyDescriptor,
        len_value: Value,
        throw: bool,
    ) -> Result<bool, Value> {
        let new_len_num = self.to_number(&len_value)?;
        let new_len = to_uint32_f(new_len_num);
        if new_len as f64 != new_len_num {
            return self.throw_range_error("invalid array length");
        }
        let old_len = self.array_length(handle);
        let len_writable = self
            .heap
            .get(handle)
            .get_own_property("length")
            .map(|p| p.is_writable())
            .unwrap_or(true);
        if new_len >= old_len {
            let mut applied = desc.clone();
            applied.value = Some(Value::Number(new_len as f64));
            let ok = self.heap.get_mut(handle).define_own_property("length", &applied);
            if !ok && throw {
                return self.throw_type_error("cannot redefine array length");
            }
            return Ok(ok);
        }
        if !len_writable {
            if throw {
                return self.throw_type_error("cannot assign to read-only array length");
            }
            return Ok(false);
        }
        // Shrinking: delete indices from the top; stop at the first
        // undeletable one.
        let doomed: Vec<(u32, String)> = {
            let obj = self.heap.get(handle);
            let mut indices: Vec<(u32, String)> = obj
                .own_keys()
                .into_iter()
                .filter_map(|k| array_index_of(&k).map(|i| (i, k)))
                .filter(|(i, _)| *i >= new_len)
                .collect();
            indices.sort_by(|a, b| b.0.cmp(&a.0));
            indices
        };
        let mut final_len = new_len;
        let mut ok = true;
        for (index, key) in doomed {
            if !self.heap.get_mut(handle).delete_own_property(&key) {
                final_len = index + 1;
                ok = false;
                break;
            }
        }
        let mut applied = desc.clone();
        applied.value = Some(Value::Number(final_len as f64));
        self.heap.get_mut(handle).define_own_property("length", &applied);
        if !ok && throw {
            return self.throw_type_error("cannot delete array elements while truncating");
        }
        Ok(ok)
    }

    /// §15.4.5.1 steps 4: defining an index property of an array.
    fn array_define_index(
        &mut self,
        handle: ObjectHandle,
        index: u32,
        desc: &PropertyDescriptor,
        throw: bool,
    ) -> Result<bool, Value> {
        let old_len = self.array_length(handle);
        let len_writable = self
            .heap
            .get(handle)
            .get_own_property("length")
            .map(|p| p.is_writable())
            .unwrap_or(true);
        if index >= old_len && !len_writable {
            if throw {
                return self.throw_type_error("cannot extend array with read-only length");
            }
            return Ok(false);
        }
        let name = index.to_string();
        let ok = self.heap.get_mut(handle).define_own_property(&name, desc);
        if !ok {
            if throw {
                return self.throw_type_error(&format!("cannot redefine property '{name}'"));
            }
            return Ok(false);
        }
        if index >= old_len {
            let new_len = Value::Number(index as f64 + 1.0);
            self.heap.get_mut(handle).set_data_value("length", new_len);
        }
        Ok(true)
    }

    /// The current `length` of an array object.
    pub(crate) fn array_length(&self, handle: ObjectHandle) -> u32 {
        self.heap
            .get(handle)
            .get_own_property("length")
            .and_then(|p| p.value().and_then(Value::as_number))
            .map(to_uint32_f)
            .unwrap_or(0)
    }

    // ── Conversions that may run user code (§9) ─────────────────────────────

    /// §8.12.8 `[[DefaultValue]]`.
    fn default_value(&mut self, handle: ObjectHandle, hint: PrimitiveHint) -> ValueResult {
        let hint = match hint {
            PrimitiveHint::Default => {
                if self.heap.get(handle).class() == "Date" {
                    PrimitiveHint::String
                } else {
                    PrimitiveHint::Number
                }
            }
            other => other,
        };
        let order: [&str; 2] = match hint {
            PrimitiveHint::String => ["toString", "valueOf"],
            _ => ["valueOf", "toString"],
        };
        for method_name in order {
            let this = Value::Object(handle);
            let method = self.get_property(handle, method_name, &this)?;
            if let Some(m) = method.as_object() {
                if self.heap.get(m).is_callable() {
                    let result = self.call_function(m, this, &[])?;
                    if result.is_primitive() {
                        return Ok(result);
                    }
                }
            }
        }
        self.throw_type_error("cannot convert object to a primitive value")
    }

    /// §9.1 ToPrimitive.
    pub(crate) fn to_primitive(&mut self, value: &Value, hint: PrimitiveHint) -> ValueResult {
        match value {
            Value::Object(h) => self.default_value(*h, hint),
            primitive => Ok(primitive.clone()),
        }
    }

    /// §9.3 ToNumber.
    pub(crate) fn to_number(&mut self, value: &Value) -> Result<f64, Value> {
        match value {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(string_to_number(s)),
            Value::Object(_) => {
                let prim = self.to_primitive(value, PrimitiveHint::Number)?;
                self.to_number(&prim)
            }
        }
    }

    /// §9.4 ToInteger.
    pub(crate) fn to_integer(&mut self, value: &Value) -> Result<f64, Value> {
        Ok(to_integer_f(self.to_number(value)?))
    }

    /// §9.5 ToInt32.
    pub(crate) fn to_int32(&mut self, value: &Value) -> Result<i32, Value> {
        Ok(to_int32_f(self.to_number(value)?))
    }

    /// §9.6 ToUint32.
    pub(crate) fn to_uint32(&mut self, value: &Value) -> Result<u32, Value> {
        Ok(to_uint32_f(self.to_number(value)?))
    }

    /// §9.7 ToUint16.
    pub(crate) fn to_uint16(&mut self, value: &Value) -> Result<u16, Value> {
        Ok(to_uint16_f(self.to_number(value)?))
    }

    /// §9.8 ToString.
    pub(crate) fn to_string_value(&mut self, value: &Value) -> Result<String, Value> {
        match value {
            Value::Undefined => Ok("undefined".to_string()),
            Value::Null => Ok("null".to_string()),
            Value::Boolean(b) => Ok(b.to_string()),
            Value::Number(n) => Ok(number_to_string(*n)),
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) => {
                let prim = self.to_primitive(value, PrimitiveHint::String)?;
                self.to_string_value(&prim)
            }
        }
    }

    /// §9.9 ToObject.
    pub(crate) fn to_object(&mut self, value: &Value) -> Result<ObjectHandle, Value> {
        match value {
            Value::Undefined => self.throw_type_error("cannot convert undefined to an object"),
            Value::Null => self.throw_type_error("cannot convert null to an object"),
            Value::Boolean(b) => {
                let proto = self.intrinsics.boolean_prototype;
                Ok(self.heap.allocate(JsObject::with_data(
                    "Boolean",
                    Some(proto),
                    ObjectData::Boolean(*b),
                )))
            }
            Value::Number(n) => {
                let proto = self.intrinsics.number_prototype;
                Ok(self.heap.allocate(JsObject::with_data(
                    "Number",
                    Some(proto),
                    ObjectData::Number(*n),
                )))
            }
            Value::String(s) => Ok(self.make_string_object(s.clone())),
            Value::Object(h) => Ok(*h),
        }
    }

    /// §9.10 CheckObjectCoercible.
    pub(crate) fn check_object_coercible(&mut self, value: &Value) -> Result<(), Value> {
        match value {
            Value::Undefined => self.throw_type_error("cannot read properties of undefined"),
            Value::Null => self.throw_type_error("cannot read properties of null"),
            _ => Ok(()),
        }
    }

    /// §9.11 IsCallable.
    pub(crate) fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .map(|h| self.heap.get(h).is_callable())
            .unwrap_or(false)
    }

    /// The `typeof` operator's answer for a value (§11.4.3).
    pub(crate) fn typeof_value(&self, value: &Value) -> &'static str {
        match value {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(h) => {
                if self.heap.get(*h).is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    // ── Object construction helpers ─────────────────────────────────────────

    /// Allocate a plain object with `Object.prototype`.
    pub(crate) fn make_object(&mut self) -> ObjectHandle {
        let proto = self.intrinsics.object_prototype;
        self.heap.allocate(JsObject::ordinary("Object", Some(proto)))
    }

    /// Allocate an array object with the given elements.
    pub(crate) fn make_array(&mut self, elements: Vec<Value>) -> ObjectHandle {
        let proto = self.intrinsics.array_prototype;
        let mut obj = JsObject::ordinary("Array", Some(proto));
        obj.define_property_raw(
            "length",
            Property::data(
                Value::Number(elements.len() as f64),
                PropertyAttributes::WRITABLE,
            ),
        );
        let handle = self.heap.allocate(obj);
        for (i, element) in elements.into_iter().enumerate() {
            self.heap
                .get_mut(handle)
                .set_simple_property(&i.to_string(), element);
        }
        handle
    }

    /// Allocate a String wrapper object.
    pub(crate) fn make_string_object(&mut self, s: String) -> ObjectHandle {
        let proto = self.intrinsics.string_prototype;
        let mut obj = JsObject::with_data("String", Some(proto), ObjectData::String(s.clone()));
        obj.define_property_raw(
            "length",
            Property::data(
                Value::Number(s.chars().count() as f64),
                PropertyAttributes::empty(),
            ),
        );
        self.heap.allocate(obj)
    }

    /// Allocate a native function object.
    pub(crate) fn new_native_function(
        &mut self,
        name: &str,
        length: u32,
        func: NativeFn,
    ) -> ObjectHandle {
        self.new_native_function_with_construct(name, length, func, None)
    }

    /// Allocate a native function object with a distinct `[[Construct]]`.
    pub(crate) fn new_native_function_with_construct(
        &mut self,
        name: &str,
        length: u32,
        func: NativeFn,
        construct: Option<NativeFn>,
    ) -> ObjectHandle {
        let proto = self.intrinsics.function_prototype;
        let mut obj = JsObject::with_data(
            "Function",
            Some(proto),
            ObjectData::Function(FunctionData::Native(NativeFunction {
                name: name.to_string(),
                func,
                construct,
            })),
        );
        obj.define_property_raw(
            "length",
            Property::data(Value::Number(length as f64), PropertyAttributes::empty()),
        );
        self.heap.allocate(obj)
    }

    /// §13.2 Creating Function Objects.
    pub(crate) fn create_function(
        &mut self,
        literal: Rc<FnLiteral>,
        scope: EnvHandle,
    ) -> ObjectHandle {
        let fn_proto = self.intrinsics.function_prototype;
        let mut obj = JsObject::with_data(
            "Function",
            Some(fn_proto),
            ObjectData::Function(FunctionData::Script(ScriptFunction {
                literal: Rc::clone(&literal),
                scope,
            })),
        );
        obj.define_property_raw(
            "length",
            Property::data(
                Value::Number(literal.params.len() as f64),
                PropertyAttributes::empty(),
            ),
        );
        let handle = self.heap.allocate(obj);

        // The `prototype` property and its back-reference.
        let proto_obj = self.make_object();
        self.heap.get_mut(proto_obj).define_property_raw(
            "constructor",
            Property::data(Value::Object(handle), PropertyAttributes::builtin()),
        );
        self.heap.get_mut(handle).define_property_raw(
            "prototype",
            Property::data(Value::Object(proto_obj), PropertyAttributes::WRITABLE),
        );

        // §13.2 steps 19: strict functions poison `caller` and `arguments`.
        if literal.strict {
            let thrower = self.intrinsics.throw_type_error;
            for poisoned in ["caller", "arguments"] {
                self.heap.get_mut(handle).define_property_raw(
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
        }
        handle
    }

    /// Evaluate a function expression or declaration literal in the
    /// current context (§13): named function expressions get the extra
    /// immutable self-binding.
    pub(crate) fn instantiate_function_literal(
        &mut self,
        literal: &Rc<FnLiteral>,
        is_expression: bool,
    ) -> ObjectHandle {
        let outer = self.context().lexical_env;
        match (&literal.name, is_expression) {
            (Some(name), true) => {
                let func_env = self.envs.new_declarative(Some(outer));
                self.envs
                    .get_mut(func_env)
                    .record
                    .create_immutable_binding(name);
                let f = self.create_function(Rc::clone(literal), func_env);
                self.envs
                    .get_mut(func_env)
                    .record
                    .initialize_immutable_binding(name, Value::Object(f));
                f
            }
            _ => self.create_function(Rc::clone(literal), outer),
        }
    }

    // ── [[Call]] / [[Construct]] (§13.2.1, §13.2.2) ─────────────────────────

    /// Call the value in `callee` position, raising TypeError when it is
    /// not callable.
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        this_value: Value,
        args: &[Value],
    ) -> ValueResult {
        match callee.as_object() {
            Some(h) if self.heap.get(h).is_callable() => {
                self.call_function(h, this_value, args)
            }
            _ => {
                let shown = self.typeof_value(callee);
                self.throw_type_error(&format!("{shown} is not a function"))
            }
        }
    }

    /// `[[Call]]` on a function object.
    pub(crate) fn call_function(
        &mut self,
        callee: ObjectHandle,
        this_value: Value,
        args: &[Value],
    ) -> ValueResult {
        if self.call_depth >= self.max_call_depth {
            return self.throw_range_error("maximum call stack size exceeded");
        }

        enum Plan {
            Native(NativeFn),
            Bound(ObjectHandle, Value, Vec<Value>),
            Script(Rc<FnLiteral>, EnvHandle),
        }
        let plan = {
            let obj = self.heap.get(callee);
            match obj.function_data() {
                None => None,
                Some(FunctionData::Native(n)) => Some(Plan::Native(n.func)),
                Some(FunctionData::Bound(b)) => Some(Plan::Bound(
                    b.target,
                    b.bound_this.clone(),
                    b.bound_args.clone(),
                )),
                Some(FunctionData::Script(s)) => {
                    Some(Plan::Script(Rc::clone(&s.literal), s.scope))
                }
            }
        };

        let Some(plan) = plan else {
            return self.throw_type_error("value is not a function");
        };

        self.call_depth += 1;
        let result = match plan {
            Plan::Native(func) => func(self, this_value, args),
            Plan::Bound(target, bound_this, mut bound_args) => {
                bound_args.extend_from_slice(args);
                self.call_function(target, bound_this, &bound_args)
            }
            Plan::Script(literal, scope) => {
                self.call_script_function(callee, &literal, scope, this_value, args)
            }
        };
        self.call_depth -= 1;
        result
    }

    fn call_script_function(
        &mut self,
        callee: ObjectHandle,
        literal: &Rc<FnLiteral>,
        scope: EnvHandle,
        this_value: Value,
        args: &[Value],
    ) -> ValueResult {
        // §10.4.3 Entering Function Code: this coercion.
        let this_binding = if literal.strict {
            this_value
        } else {
            match this_value {
                Value::Undefined | Value::Null => Value::Object(self.global_object),
                Value::Object(_) => this_value,
                primitive => Value::Object(self.to_object(&primitive)?),
            }
        };

        let local_env = self.envs.new_declarative(Some(scope));
        self.push_context(ExecutionContext {
            lexical_env: local_env,
            variable_env: local_env,
            this_binding,
            strict: literal.strict,
        });

        let instantiated = self.declaration_binding_instantiation(
            CodeKind::Function,
            &literal.scope,
            Some((literal, callee)),
            args,
            literal.strict,
        );
        let completion = match instantiated {
            Err(thrown) => Completion::Throw(thrown),
            Ok(()) => self.eval_statements(&literal.body),
        };
        self.pop_context();

        match completion {
            Completion::Return(v) => Ok(v),
            Completion::Throw(v) => Err(v),
            _ => Ok(Value::Undefined),
        }
    }

    /// `[[Construct]]` on a function object.
    pub(crate) fn construct(&mut self, callee: ObjectHandle, args: &[Value]) -> ValueResult {
        enum Plan {
            Native(NativeFn),
            NotConstructor,
            Bound(ObjectHandle, Vec<Value>),
            Script,
        }
        let plan = {
            let obj = self.heap.get(callee);
            match obj.function_data() {
                None => Plan::NotConstructor,
                Some(FunctionData::Native(n)) => match n.construct {
                    Some(c) => Plan::Native(c),
                    None => Plan::NotConstructor,
                },
                Some(FunctionData::Bound(b)) => Plan::Bound(b.target, b.bound_args.clone()),
                Some(FunctionData::Script(_)) => Plan::Script,
            }
        };
        match plan {
            Plan::NotConstructor => self.throw_type_error("value is not a constructor"),
            Plan::Native(ctor) => ctor(self, Value::Undefined, args),
            Plan::Bound(target, mut bound_args) => {
                bound_args.extend_from_slice(args);
                self.construct(target, &bound_args)
            }
            Plan::Script => {
                // §13.2.2: the new object's prototype is the function's
                // `prototype` property when that is an object.
                let this_callee = Value::Object(callee);
                let proto_value = self.get_property(callee, "prototype", &this_callee)?;
                let proto = proto_value
                    .as_object()
                    .unwrap_or(self.intrinsics.object_prototype);
                let obj = self
                    .heap
                    .allocate(JsObject::ordinary("Object", Some(proto)));
                let result = self.call_function(callee, Value::Object(obj), args)?;
                Ok(match result {
                    Value::Object(h) => Value::Object(h),
                    _ => Value::Object(obj),
                })
            }
        }
    }

    /// §15.3.5.3 `[[HasInstance]]` (bound functions delegate, §15.3.4.5.3).
    pub(crate) fn has_instance(
        &mut self,
        callee: ObjectHandle,
        value: &Value,
    ) -> Result<bool, Value> {
        let target = {
            match self.heap.get(callee).function_data() {
                None => None,
                Some(FunctionData::Bound(b)) => Some(Err(b.target)),
                Some(_) => Some(Ok(())),
            }
        };
        match target {
            None => self.throw_type_error("right-hand side of instanceof is not callable"),
            Some(Err(bound_target)) => self.has_instance(bound_target, value),
            Some(Ok(())) => {
                let Some(mut current) = value.as_object() else {
                    return Ok(false);
                };
                let this_callee = Value::Object(callee);
                let proto_value = self.get_property(callee, "prototype", &this_callee)?;
                let Some(proto) = proto_value.as_object() else {
                    return self
                        .throw_type_error("function prototype is not an object in instanceof");
                };
                loop {
                    match self.heap.get(current).prototype() {
                        None => return Ok(false),
                        Some(p) if p == proto => return Ok(true),
                        Some(p) => current = p,
                    }
                }
            }
        }
    }

    // ── Declaration binding instantiation (§10.5) ───────────────────────────

    fn declaration_binding_instantiation(
        &mut self,
        kind: CodeKind,
        scope: &ScopeData,
        function: Option<(&Rc<FnLiteral>, ObjectHandle)>,
        args: &[Value],
        strict: bool,
    ) -> Result<(), Value> {
        let env = self.context().variable_env;
        let configurable = kind == CodeKind::Eval;

        // Step 4: formal parameters.
        if let Some((literal, _)) = function {
            for (i, param) in literal.params.iter().enumerate() {
                let value = args.get(i).cloned().unwrap_or(Value::Undefined);
                if !self.env_has_binding(env, param) {
                    self.env_create_mutable_binding(env, param, configurable);
                }
                self.env_set_mutable_binding(env, param, value, strict)?;
            }
        }

        // Step 5: function declarations (in source order; later wins).
        for decl in &scope.fn_decls {
            let name = decl
                .name
                .clone()
                .expect("function declarations always have a name");
            let f = self.create_function(Rc::clone(decl), self.context().lexical_env);
            if !self.env_has_binding(env, &name) {
                self.env_create_mutable_binding(env, &name, configurable);
            }
            self.env_set_mutable_binding(env, &name, Value::Object(f), strict)?;
        }

        // Steps 6–7: the arguments object.
        if let Some((literal, callee)) = function {
            if !self.env_has_binding(env, "arguments") {
                let args_obj = self.make_arguments_object(literal, callee, env, args);
                if strict {
                    self.envs
                        .get_mut(env)
                        .record
                        .create_immutable_binding("arguments");
                    self.envs
                        .get_mut(env)
                        .record
                        .initialize_immutable_binding("arguments", Value::Object(args_obj));
                } else {
                    self.env_create_mutable_binding(env, "arguments", false);
                    self.env_set_mutable_binding(
                        env,
                        "arguments",
                        Value::Object(args_obj),
                        false,
                    )?;
                }
            }
        }

        // Step 8: var declarations initialize to undefined unless already
        // bound.
        for name in &scope.var_names {
            if !self.env_has_binding(env, name) {
                self.env_create_mutable_binding(env, name, configurable);
                self.env_set_mutable_binding(env, name, Value::Undefined, strict)?;
            }
        }
        Ok(())
    }

    /// §10.6: the arguments exotic object. Non-strict activations get the
    /// parameter map aliasing index properties to the named parameters;
    /// strict activations get the unmapped form with poisoned
    /// `callee`/`caller`.
    fn make_arguments_object(
        &mut self,
        literal: &Rc<FnLiteral>,
        callee: ObjectHandle,
        env: EnvHandle,
        args: &[Value],
    ) -> ObjectHandle {
        let proto = self.intrinsics.object_prototype;
        // §10.6 step 11: map each supplied index to its formal; with
        // duplicate parameter names the last occurrence wins.
        let mut parameter_map: Vec<(String, String)> = Vec::new();
        if !literal.strict {
            let mapped = literal.params.len().min(args.len());
            for i in (0..mapped).rev() {
                let param = &literal.params[i];
                if parameter_map.iter().any(|(_, p)| p == param) {
                    continue;
                }
                parameter_map.push((i.to_string(), param.clone()));
            }
        }
        let mut obj = JsObject::with_data(
            "Arguments",
            Some(proto),
            ObjectData::Arguments(ArgumentsData { env, parameter_map }),
        );
        obj.define_property_raw(
            "length",
            Property::data(Value::Number(args.len() as f64), PropertyAttributes::builtin()),
        );
        for (i, arg) in args.iter().enumerate() {
            obj.set_simple_property(&i.to_string(), arg.clone());
        }
        if literal.strict {
            let thrower = self.intrinsics.throw_type_error;
            for poisoned in ["callee", "caller"] {
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
        } else {
            obj.set_builtin_property("callee", Value::Object(callee));
        }
        self.heap.allocate(obj)
    }

    // ── eval (§15.1.2.1, §10.4.2) ───────────────────────────────────────────

    /// Run eval code. `direct` selects the caller's environments and
    /// `this`; indirect eval runs as global code.
    pub(crate) fn eval_code(&mut self, source: &str, direct: bool) -> ValueResult {
        let program = match parse_string(source, Some("<eval>")) {
            Ok(p) => p,
            Err(e) => {
                let message = e.to_string();
                return self.throw_syntax_error(&message);
            }
        };
        let caller_strict = self.strict();
        let strict_eval = program.strict || (direct && caller_strict);

        let (mut lexical, mut variable, this_binding) = if direct {
            let ctx = self.context().clone();
            (ctx.lexical_env, ctx.variable_env, ctx.this_binding)
        } else {
            (
                self.global_env,
                self.global_env,
                Value::Object(self.global_object),
            )
        };
        if strict_eval {
            // §10.4.2.1: strict eval gets its own environment so its
            // bindings do not leak into the caller.
            let fresh = self.envs.new_declarative(Some(lexical));
            lexical = fresh;
            variable = fresh;
        }

        self.push_context(ExecutionContext {
            lexical_env: lexical,
            variable_env: variable,
            this_binding,
            strict: strict_eval,
        });
        let instantiated = self.declaration_binding_instantiation(
            CodeKind::Eval,
            &program.scope,
            None,
            &[],
            strict_eval,
        );
        let completion = match instantiated {
            Err(thrown) => Completion::Throw(thrown),
            Ok(()) => self.eval_statements(&program.body),
        };
        self.pop_context();

        match completion {
            Completion::Normal(v) => Ok(v.unwrap_or(Value::Undefined)),
            Completion::Throw(v) => Err(v),
            Completion::Return(v) => Ok(v),
            _ => Ok(Value::Undefined),
        }
    }

    // ── with / catch environments ───────────────────────────────────────────

    pub(crate) fn push_with_environment(&mut self, object: ObjectHandle) -> EnvHandle {
        let outer = self.context().lexical_env;
        let env = self.envs.new_object(object, true, Some(outer));
        self.contexts
            .last_mut()
            .expect("context stack never empty")
            .lexical_env = env;
        env
    }

    pub(crate) fn push_catch_environment(&mut self, name: &str, value: Value) -> EnvHandle {
        let outer = self.context().lexical_env;
        let env = self.envs.new_declarative(Some(outer));
        {
            let mut e = self.envs.get_mut(env);
            e.record.create_mutable_binding(name, false);
            if let EnvRecord::Declarative(bindings) = &mut e.record {
                if let Some(binding) = bindings.get_mut(name) {
                    binding.value = value;
                }
            }
        }
        self.contexts
            .last_mut()
            .expect("context stack never empty")
            .lexical_env = env;
        env
    }

    pub(crate) fn restore_lexical_environment(&mut self, env: EnvHandle) {
        self.contexts
            .last_mut()
            .expect("context stack never empty")
            .lexical_env = env;
    }

    pub(crate) fn current_lexical_environment(&self) -> EnvHandle {
        self.context().lexical_env
    }

    // ── Misc helpers shared by the evaluator and intrinsics ────────────────

    /// splitmix64 step for `Math.random`.
    pub(crate) fn next_random(&mut self) -> f64 {
        self.rng_state = self.rng_state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.rng_state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^= z >> 31;
        // 53 random bits into [0, 1).
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// The native error kinds of §15.11.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `Error`
    Base,
    /// `EvalError`
    Eval,
    /// `RangeError`
    Range,
    /// `ReferenceError`
    Reference,
    /// `SyntaxError`
    Syntax,
    /// `TypeError`
    Type,
    /// `URIError`
    Uri,
}
