//! The object arena.
//!
//! Objects live in a flat arena owned by the interpreter and are addressed
//! by copyable [`ObjectHandle`]s; nothing is reference-counted, cycles are
//! harmless, and the whole heap is swept when the interpreter is dropped.
//! Interior mutability is per-object (`RefCell`), so two objects can be
//! borrowed simultaneously, while Rust's borrow rules statically prevent
//! allocation from invalidating an outstanding borrow.

use std::cell::{Ref, RefCell, RefMut};

use crate::objects::object::JsObject;

/// An index into the interpreter's object arena.
///
/// Handles are never reused within one interpreter; equality of handles is
/// object identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(u32);

impl ObjectHandle {
    /// The arena slot this handle names.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The object arena.
pub struct Heap {
    objects: Vec<RefCell<JsObject>>,
}

impl Heap {
    /// An empty heap.
    pub fn new() -> Self {
        Heap {
            objects: Vec::with_capacity(256),
        }
    }

    /// Move `object` into the arena and return its handle.
    pub fn allocate(&mut self, object: JsObject) -> ObjectHandle {
        let index = self.objects.len();
        assert!(index < u32::MAX as usize, "object arena exhausted");
        self.objects.push(RefCell::new(object));
        ObjectHandle(index as u32)
    }

    /// Borrow the object `handle` names.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed (an interpreter
    /// bug, not a program error).
    pub fn get(&self, handle: ObjectHandle) -> Ref<'_, JsObject> {
        self.objects[handle.index()].borrow()
    }

    /// Mutably borrow the object `handle` names.
    pub fn get_mut(&self, handle: ObjectHandle) -> RefMut<'_, JsObject> {
        self.objects[handle.index()].borrow_mut()
    }

    /// Number of objects allocated over the heap's lifetime.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::value::Value;

    #[test]
    fn test_allocate_and_read_back() {
        let mut heap = Heap::new();
        let h = heap.allocate(JsObject::ordinary("Object", None));
        heap.get_mut(h).set_simple_property("x", Value::Number(1.0));
        assert_eq!(
            heap.get(h).get_own_property("x").and_then(|p| p.value().cloned()),
            Some(Value::Number(1.0))
        );
    }

    #[test]
    fn test_handles_are_identity() {
        let mut heap = Heap::new();
        let a = heap.allocate(JsObject::ordinary("Object", None));
        let b = heap.allocate(JsObject::ordinary("Object", None));
        assert_ne!(a, b);
        assert_eq!(a, a);
    }

    #[test]
    fn test_two_objects_borrowable_at_once() {
        let mut heap = Heap::new();
        let a = heap.allocate(JsObject::ordinary("Object", None));
        let b = heap.allocate(JsObject::ordinary("Object", None));
        let ra = heap.get(a);
        let mut rb = heap.get_mut(b);
        rb.set_simple_property("via", Value::Boolean(true));
        assert_eq!(ra.class(), "Object");
    }
}
