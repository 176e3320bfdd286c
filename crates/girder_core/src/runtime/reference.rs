//! The Reference specification type (§8.7).
//!
//! Expression evaluation yields either a plain value or a reference; the
//! distinction is what makes `typeof missing`, `delete o.p`, and assignment
//! observable. References are never eagerly dereferenced — `GetValue` and
//! `PutValue` are interpreter methods because property access can run user
//! code.

use crate::runtime::environment::EnvHandle;
use crate::runtime::value::Value;

/// The base of a [`Reference`].
#[derive(Debug, Clone)]
pub enum RefBase {
    /// The name did not resolve anywhere (§8.7: base is *undefined*).
    Unresolvable,
    /// A property reference: the base is a language value (an object, or a
    /// primitive that will be boxed on access).
    Value(Value),
    /// An environment-record binding.
    Env(EnvHandle),
}

/// A resolved or unresolved name binding: `{ base, name, strict }`.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Where the name resolved.
    pub base: RefBase,
    /// The referenced name.
    pub name: String,
    /// Whether the reference originated in strict-mode code.
    pub strict: bool,
}

impl Reference {
    /// A reference whose base could not be resolved.
    pub fn unresolvable(name: impl Into<String>, strict: bool) -> Reference {
        Reference {
            base: RefBase::Unresolvable,
            name: name.into(),
            strict,
        }
    }

    /// §8.7 IsUnresolvableReference.
    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, RefBase::Unresolvable)
    }

    /// §8.7 IsPropertyReference: the base is a value (object or primitive).
    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, RefBase::Value(_))
    }

    /// §8.7 HasPrimitiveBase.
    pub fn has_primitive_base(&self) -> bool {
        matches!(&self.base, RefBase::Value(v) if v.is_primitive())
    }
}

/// What an expression evaluates to: a value, or a reference to one.
#[derive(Debug, Clone)]
pub enum Evaluated {
    /// A plain language value.
    Value(Value),
    /// A reference (identifier or property access).
    Ref(Reference),
}

impl Evaluated {
    /// Wrap a value.
    pub fn value(v: Value) -> Evaluated {
        Evaluated::Value(v)
    }
}

/// Expression evaluation result: `Err` carries a thrown ES value in
/// flight (converted to [`Completion::Throw`][crate::runtime::completion::Completion]
/// at statement level).
pub type ExprResult = Result<Evaluated, Value>;

/// Value-only expression result for helpers past the GetValue boundary.
pub type ValueResult = Result<Value, Value>;
