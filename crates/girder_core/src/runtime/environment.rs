//! Environment records and lexical environments (§10.2).
//!
//! Environments live in their own arena, addressed by [`EnvHandle`]s, for
//! the same reason objects do: closures capture environments, environments
//! reference the closures bound inside them, and the cycles dissolve when
//! the interpreter is dropped.
//!
//! The binding operations that need heap access (object environment
//! records delegate to their binding object) are interpreter methods; this
//! module owns the storage and the declarative-record operations.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;

use crate::objects::heap::ObjectHandle;
use crate::runtime::value::Value;

/// An index into the interpreter's environment arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvHandle(u32);

impl EnvHandle {
    /// The arena slot this handle names.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single binding in a declarative environment record.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The bound value. Immutable bindings hold `Undefined` until
    /// initialized.
    pub value: Value,
    /// `false` for immutable bindings (named function expressions).
    pub mutable: bool,
    /// Whether `delete` may remove the binding (`false` for everything
    /// declaration-instantiated).
    pub deletable: bool,
    /// Immutable bindings start uninitialized (§10.2.1.1.7/8).
    pub initialized: bool,
}

/// An environment record (§10.2.1).
#[derive(Debug)]
pub enum EnvRecord {
    /// Bindings held directly (function activations, `catch`, named
    /// function expressions).
    Declarative(HashMap<String, Binding>),
    /// Bindings backed by an object's properties (the global environment
    /// and `with`).
    Object {
        /// The binding object.
        object: ObjectHandle,
        /// `true` only for `with` environments: supplies the implicit
        /// `this` for method calls through the environment (§10.2.1.2.6).
        provide_this: bool,
    },
}

/// A lexical environment: a record plus an outer link (§10.2).
#[derive(Debug)]
pub struct LexicalEnv {
    /// This environment's record.
    pub record: EnvRecord,
    /// The enclosing environment, `None` only for the global environment.
    pub outer: Option<EnvHandle>,
}

/// The environment arena.
pub struct Environments {
    envs: Vec<RefCell<LexicalEnv>>,
}

impl Environments {
    /// An empty arena.
    pub fn new() -> Self {
        Environments {
            envs: Vec::with_capacity(64),
        }
    }

    /// §10.2.2.2 NewDeclarativeEnvironment.
    pub fn new_declarative(&mut self, outer: Option<EnvHandle>) -> EnvHandle {
        self.push(LexicalEnv {
            record: EnvRecord::Declarative(HashMap::new()),
            outer,
        })
    }

    /// §10.2.2.3 NewObjectEnvironment.
    pub fn new_object(
        &mut self,
        object: ObjectHandle,
        provide_this: bool,
        outer: Option<EnvHandle>,
    ) -> EnvHandle {
        self.push(LexicalEnv {
            record: EnvRecord::Object {
                object,
                provide_this,
            },
            outer,
        })
    }

    fn push(&mut self, env: LexicalEnv) -> EnvHandle {
        let index = self.envs.len();
        assert!(index < u32::MAX as usize, "environment arena exhausted");
        self.envs.push(RefCell::new(env));
        EnvHandle(index as u32)
    }

    /// Borrow an environment.
    pub fn get(&self, handle: EnvHandle) -> Ref<'_, LexicalEnv> {
        self.envs[handle.index()].borrow()
    }

    /// Mutably borrow an environment.
    pub fn get_mut(&self, handle: EnvHandle) -> RefMut<'_, LexicalEnv> {
        self.envs[handle.index()].borrow_mut()
    }

    /// The outer link of `handle`.
    pub fn outer_of(&self, handle: EnvHandle) -> Option<EnvHandle> {
        self.get(handle).outer
    }
}

impl Default for Environments {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Declarative-record operations (§10.2.1.1)
// ─────────────────────────────────────────────────────────────────────────────

impl EnvRecord {
    /// §10.2.1.1.2 CreateMutableBinding.
    ///
    /// # Panics
    ///
    /// Panics on an object record; the interpreter routes those through
    /// the binding object.
    pub fn create_mutable_binding(&mut self, name: &str, deletable: bool) {
        match self {
            EnvRecord::Declarative(bindings) => {
                bindings.insert(
                    name.to_string(),
                    Binding {
                        value: Value::Undefined,
                        mutable: true,
                        deletable,
                        initialized: true,
                    },
                );
            }
            EnvRecord::Object { .. } => {
                unreachable!("object records create bindings through their object")
            }
        }
    }

    /// §10.2.1.1.7 CreateImmutableBinding.
    pub fn create_immutable_binding(&mut self, name: &str) {
        match self {
            EnvRecord::Declarative(bindings) => {
                bindings.insert(
                    name.to_string(),
                    Binding {
                        value: Value::Undefined,
                        mutable: false,
                        deletable: false,
                        initialized: false,
                    },
                );
            }
            EnvRecord::Object { .. } => {
                unreachable!("object records have no immutable bindings")
            }
        }
    }

    /// §10.2.1.1.8 InitializeImmutableBinding.
    pub fn initialize_immutable_binding(&mut self, name: &str, value: Value) {
        if let EnvRecord::Declarative(bindings) = self {
            if let Some(binding) = bindings.get_mut(name) {
                if !binding.initialized {
                    binding.value = value;
                    binding.initialized = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarative_binding_lifecycle() {
        let mut envs = Environments::new();
        let env = envs.new_declarative(None);
        {
            let mut e = envs.get_mut(env);
            e.record.create_mutable_binding("x", false);
            if let EnvRecord::Declarative(b) = &mut e.record {
                b.get_mut("x").unwrap().value = Value::Number(7.0);
            }
        }
        let e = envs.get(env);
        if let EnvRecord::Declarative(b) = &e.record {
            assert_eq!(b["x"].value.as_number(), Some(7.0));
            assert!(b["x"].mutable);
            assert!(!b["x"].deletable);
        } else {
            panic!("expected declarative record");
        }
    }

    #[test]
    fn test_immutable_binding_initializes_once() {
        let mut envs = Environments::new();
        let env = envs.new_declarative(None);
        let mut e = envs.get_mut(env);
        e.record.create_immutable_binding("f");
        e.record.initialize_immutable_binding("f", Value::Number(1.0));
        e.record.initialize_immutable_binding("f", Value::Number(2.0));
        if let EnvRecord::Declarative(b) = &e.record {
            assert_eq!(b["f"].value.as_number(), Some(1.0));
        }
    }

    #[test]
    fn test_outer_chain() {
        let mut envs = Environments::new();
        let global = envs.new_declarative(None);
        let inner = envs.new_declarative(Some(global));
        assert_eq!(envs.outer_of(inner), Some(global));
        assert_eq!(envs.outer_of(global), None);
    }
}
