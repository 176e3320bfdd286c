//! The ES5.1 object model: property records, ordinary objects, function
//! payloads, and the handle-addressed arena they live in.

/// Function object payloads (script / native / bound).
pub mod function;
/// The object arena and [`heap::ObjectHandle`].
pub mod heap;
/// Ordinary objects with insertion-ordered properties.
pub mod object;
/// Property records and §8.10 descriptors.
pub mod property;

pub use function::{FunctionData, NativeFn};
pub use heap::{Heap, ObjectHandle};
pub use object::{ArgumentsData, JsObject, ObjectData};
pub use property::{Property, PropertyAttributes, PropertyDescriptor, PropertyKind};
