//! Function object payloads.
//!
//! A callable object's internal slots come in three shapes: script
//! functions created from a [`FnLiteral`] with a captured `[[Scope]]`,
//! native functions backed by a Rust function pointer, and bound functions
//! produced by `Function.prototype.bind`.

use std::rc::Rc;

use crate::objects::heap::ObjectHandle;
use crate::parser::ast::FnLiteral;
use crate::runtime::environment::EnvHandle;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

/// The calling convention for native (host-provided) functions.
///
/// `this_value` and `arguments` arrive fully evaluated. A native signals a
/// runtime error by returning `Err(thrown)` with the ES error value; it
/// must never panic across the evaluator boundary.
pub type NativeFn = fn(
    interp: &mut Interpreter,
    this_value: Value,
    arguments: &[Value],
) -> Result<Value, Value>;

/// Internal slots of a callable object.
#[derive(Debug)]
pub enum FunctionData {
    /// A function created from source code (§13.2): `[[FormalParameters]]`
    /// and `[[Code]]` live in the shared literal, `[[Scope]]` is the
    /// captured environment.
    Script(ScriptFunction),
    /// A function implemented by the host.
    Native(NativeFunction),
    /// A function produced by `Function.prototype.bind` (§15.3.4.5):
    /// `[[TargetFunction]]`, `[[BoundThis]]`, `[[BoundArgs]]`.
    Bound(BoundFunction),
}

/// `[[Code]]`, `[[FormalParameters]]`, `[[Scope]]` of a script function.
pub struct ScriptFunction {
    /// The shared function literal (parameters, body, strictness).
    pub literal: Rc<FnLiteral>,
    /// The captured defining environment.
    pub scope: EnvHandle,
}

impl std::fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("name", &self.literal.name)
            .field("params", &self.literal.params)
            .field("strict", &self.literal.strict)
            .finish_non_exhaustive()
    }
}

/// A host-implemented function.
pub struct NativeFunction {
    /// Diagnostic name (`Function.prototype.toString` shows it).
    pub name: String,
    /// The `[[Call]]` implementation.
    pub func: NativeFn,
    /// The `[[Construct]]` implementation; `None` makes `new f()` a
    /// TypeError (most builtins are not constructors).
    pub construct: Option<NativeFn>,
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The slots of a bound function.
#[derive(Debug)]
pub struct BoundFunction {
    /// `[[TargetFunction]]`.
    pub target: ObjectHandle,
    /// `[[BoundThis]]`.
    pub bound_this: Value,
    /// `[[BoundArgs]]`.
    pub bound_args: Vec<Value>,
}
