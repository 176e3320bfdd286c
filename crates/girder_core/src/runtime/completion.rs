//! The Completion specification type (§8.9).
//!
//! Every statement evaluator returns one of these; propagation is explicit
//! (never a Rust panic or error path) because `finally` must be able to
//! observe an abrupt completion and override it.

use crate::runtime::value::Value;

/// The result of evaluating a statement.
#[derive(Debug, Clone)]
pub enum Completion {
    /// Normal completion, with the statement's value if it produced one
    /// (statement values feed the REPL and `eval`'s result).
    Normal(Option<Value>),
    /// `break`, optionally targeting a label.
    Break(Option<String>),
    /// `continue`, optionally targeting a label.
    Continue(Option<String>),
    /// `return value`.
    Return(Value),
    /// An uncaught `throw` in flight.
    Throw(Value),
}

impl Completion {
    /// The empty normal completion.
    pub fn empty() -> Completion {
        Completion::Normal(None)
    }

    /// `true` for anything but Normal.
    pub fn is_abrupt(&self) -> bool {
        !matches!(self, Completion::Normal(_))
    }

    /// The completion's value, if it carries one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Completion::Normal(v) => v.as_ref(),
            Completion::Return(v) | Completion::Throw(v) => Some(v),
            Completion::Break(_) | Completion::Continue(_) => None,
        }
    }

    /// §12.1: a statement list's value is the last value-producing
    /// statement's value. This merges `self`'s value slot into an abrupt
    /// or empty successor, mirroring the "V" threading in §12.
    pub fn update_value(self, value: Option<Value>) -> Completion {
        match self {
            Completion::Normal(v) => Completion::Normal(v.or(value)),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abruptness() {
        assert!(!Completion::empty().is_abrupt());
        assert!(!Completion::Normal(Some(Value::Null)).is_abrupt());
        assert!(Completion::Break(None).is_abrupt());
        assert!(Completion::Throw(Value::Undefined).is_abrupt());
    }

    #[test]
    fn test_update_value_keeps_existing() {
        let c = Completion::Normal(Some(Value::Number(1.0)));
        match c.update_value(Some(Value::Number(2.0))) {
            Completion::Normal(Some(Value::Number(n))) => assert_eq!(n, 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }
}
