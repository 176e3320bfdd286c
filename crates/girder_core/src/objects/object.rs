//! The ES5.1 ordinary object: insertion-ordered own properties, prototype
//! link, extensibility, and the call-free internal methods.
//!
//! Everything here is pure storage and bookkeeping. Internal methods that
//! can run user code — `[[Get]]`/`[[Put]]` through accessors, the Array
//! `length` invariant (whose ToUint32 may call `valueOf`), `[[Call]]`,
//! `[[Construct]]`, `[[DefaultValue]]` — live on the interpreter and bottom
//! out in the operations defined here.
//!
//! # Property storage
//!
//! Own properties sit in a [`SmallVec`] in insertion order (spilling to the
//! heap past [`INLINE_PROPERTIES`] entries). `for-in` and `Object.keys`
//! observe exactly this order, so it is part of the engine's observable
//! behavior, not an implementation detail.

use smallvec::SmallVec;

use crate::objects::function::FunctionData;
use crate::objects::heap::ObjectHandle;
use crate::objects::property::{
    Property, PropertyAttributes, PropertyDescriptor, PropertyKind,
};
use crate::runtime::environment::EnvHandle;
use crate::runtime::value::Value;

/// Named-property slots stored inline before spilling to the heap.
pub const INLINE_PROPERTIES: usize = 8;

/// Internal-slot payload distinguishing the exotic object kinds the engine
/// knows about. `[[PrimitiveValue]]` carriers hold their primitive inline.
#[derive(Debug)]
pub enum ObjectData {
    /// A plain object with no extra internal state.
    Ordinary,
    /// A Boolean wrapper object.
    Boolean(bool),
    /// A Number wrapper object.
    Number(f64),
    /// A String wrapper object (index properties are virtualized by the
    /// interpreter).
    String(String),
    /// A Date object; the primitive value is milliseconds since the epoch.
    Date(f64),
    /// A callable object.
    Function(FunctionData),
    /// A RegExp object.
    RegExp(RegExpData),
    /// An arguments object.
    Arguments(ArgumentsData),
    /// An Error (or native error subclass) object.
    Error,
}

/// Internal state of an arguments object (§10.6).
///
/// In a non-strict activation, index properties within the formal-parameter
/// count are live-aliased to the named parameters: reads and writes through
/// either side observe the other. The map records the surviving aliases;
/// deleting an index or redefining it incompatibly severs that entry. A
/// strict activation carries an empty map.
#[derive(Debug)]
pub struct ArgumentsData {
    /// The activation environment holding the parameter bindings.
    pub env: EnvHandle,
    /// `(index key, parameter name)` pairs still aliased.
    pub parameter_map: Vec<(String, String)>,
}

/// Internal state of a RegExp object (§15.10.7).
#[derive(Debug)]
pub struct RegExpData {
    /// The pattern source text.
    pub source: String,
    /// `g` flag.
    pub global: bool,
    /// `i` flag.
    pub ignore_case: bool,
    /// `m` flag.
    pub multiline: bool,
    /// The compiled matcher; `None` when the pattern used constructs the
    /// backing engine cannot express (construction throws SyntaxError, so
    /// this is only `None` transiently).
    pub matcher: Option<regex::Regex>,
}

/// An ECMAScript object (§8.6).
pub struct JsObject {
    /// The `[[Class]]` internal property.
    class: &'static str,
    /// The `[[Prototype]]` internal property.
    prototype: Option<ObjectHandle>,
    /// The `[[Extensible]]` internal property. Once `false`, forever
    /// `false`, and no own property may be added.
    extensible: bool,
    /// Own properties in insertion order.
    properties: SmallVec<[(String, Property); INLINE_PROPERTIES]>,
    /// Exotic internal slots.
    pub data: ObjectData,
}

impl JsObject {
    /// A plain extensible object.
    pub fn ordinary(class: &'static str, prototype: Option<ObjectHandle>) -> Self {
        JsObject {
            class,
            prototype,
            extensible: true,
            properties: SmallVec::new(),
            data: ObjectData::Ordinary,
        }
    }

    /// An object with exotic internal slots.
    pub fn with_data(
        class: &'static str,
        prototype: Option<ObjectHandle>,
        data: ObjectData,
    ) -> Self {
        JsObject {
            class,
            prototype,
            extensible: true,
            properties: SmallVec::new(),
            data,
        }
    }

    /// The `[[Class]]` string (`"Object"`, `"Array"`, `"Function"`, …).
    pub fn class(&self) -> &'static str {
        self.class
    }

    /// The `[[Prototype]]` link.
    pub fn prototype(&self) -> Option<ObjectHandle> {
        self.prototype
    }

    /// Replace the `[[Prototype]]` link.
    pub fn set_prototype(&mut self, prototype: Option<ObjectHandle>) {
        self.prototype = prototype;
    }

    /// The `[[Extensible]]` flag.
    pub fn is_extensible(&self) -> bool {
        self.extensible
    }

    /// Clear `[[Extensible]]` (one-way).
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// `true` when the object is callable.
    pub fn is_callable(&self) -> bool {
        matches!(self.data, ObjectData::Function(_))
    }

    /// Borrow the function payload, if this object is callable.
    pub fn function_data(&self) -> Option<&FunctionData> {
        match &self.data {
            ObjectData::Function(f) => Some(f),
            _ => None,
        }
    }

    // ── Own-property primitives ─────────────────────────────────────────────

    /// §8.12.1 `[[GetOwnProperty]]` (the stored form; String index
    /// virtualization happens in the interpreter).
    pub fn get_own_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, p)| p)
    }

    fn get_own_property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .find(|(k, _)| k == name)
            .map(|(_, p)| p)
    }

    /// `true` when `name` is an own property.
    pub fn has_own_property(&self, name: &str) -> bool {
        self.properties.iter().any(|(k, _)| k == name)
    }

    /// All own property names, in insertion order.
    pub fn own_keys(&self) -> Vec<String> {
        self.properties.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Own enumerable property names, in insertion order.
    pub fn own_enumerable_keys(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|(_, p)| p.is_enumerable())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of own properties.
    pub fn own_property_count(&self) -> usize {
        self.properties.len()
    }

    /// Install or overwrite a property wholesale, bypassing the §8.12.9
    /// checks. Setup-path only (intrinsics, fresh objects the caller owns).
    pub fn define_property_raw(&mut self, name: &str, property: Property) {
        match self.get_own_property_mut(name) {
            Some(slot) => *slot = property,
            None => self.properties.push((name.to_string(), property)),
        }
    }

    /// Install a `{writable, enumerable, configurable}` data property,
    /// bypassing checks. Setup-path only.
    pub fn set_simple_property(&mut self, name: &str, value: Value) {
        self.define_property_raw(name, Property::data(value, PropertyAttributes::full()));
    }

    /// Install a `{writable, configurable}` (non-enumerable) data property,
    /// the §15 builtin-method shape. Setup-path only.
    pub fn set_builtin_property(&mut self, name: &str, value: Value) {
        self.define_property_raw(name, Property::data(value, PropertyAttributes::builtin()));
    }

    /// Overwrite the value of an existing own data property without
    /// touching its attributes. Used by `[[Put]]` after its checks passed.
    pub fn set_data_value(&mut self, name: &str, value: Value) {
        if let Some(prop) = self.get_own_property_mut(name) {
            if let PropertyKind::Data(slot) = &mut prop.kind {
                *slot = value;
            }
        }
    }

    /// §8.12.7 `[[Delete]]` minus the throw decision: `true` when `name`
    /// is gone afterwards, `false` when it survives (non-configurable).
    pub fn delete_own_property(&mut self, name: &str) -> bool {
        match self.get_own_property(name) {
            None => true,
            Some(p) if p.is_configurable() => {
                self.properties.retain(|(k, _)| k != name);
                true
            }
            Some(_) => false,
        }
    }

    // ── §8.12.9 [[DefineOwnProperty]] (ordinary) ────────────────────────────

    /// Ordinary `[[DefineOwnProperty]]`: applies `desc` to `name`,
    /// enforcing the §8.12.9 compatibility table. Returns `false` to
    /// signal rejection; the caller decides whether that throws.
    pub fn define_own_property(&mut self, name: &str, desc: &PropertyDescriptor) -> bool {
        let Some(current) = self.get_own_property(name) else {
            if !self.extensible {
                return false;
            }
            let attributes = build_attributes(desc);
            let property = if desc.is_accessor_descriptor() {
                Property {
                    kind: PropertyKind::Accessor {
                        get: desc.get.flatten(),
                        set: desc.set.flatten(),
                    },
                    attributes,
                }
            } else {
                Property {
                    kind: PropertyKind::Data(
                        desc.value.clone().unwrap_or(Value::Undefined),
                    ),
                    attributes,
                }
            };
            self.properties.push((name.to_string(), property));
            return true;
        };

        // Step 5/6: nothing to change.
        if desc.is_unchanged_on(current) {
            return true;
        }

        let cfg = current.is_configurable();

        // Step 7: non-configurable gatekeeping.
        if !cfg {
            if desc.configurable == Some(true) {
                return false;
            }
            if let Some(enumerable) = desc.enumerable {
                if enumerable != current.is_enumerable() {
                    return false;
                }
            }
        }

        // Steps 9–11: kind changes and per-kind constraints.
        if !desc.is_generic() {
            let current_is_data = current.is_data();
            if current_is_data != desc.is_data_descriptor() {
                // Converting between data and accessor requires
                // configurability.
                if !cfg {
                    return false;
                }
            } else if current_is_data {
                if !cfg && !current.is_writable() {
                    if desc.writable == Some(true) {
                        return false;
                    }
                    if let Some(value) = &desc.value {
                        let unchanged = current
                            .value()
                            .is_some_and(|cur| Value::same_value(value, cur));
                        if !unchanged {
                            return false;
                        }
                    }
                }
            } else if !cfg {
                if let PropertyKind::Accessor { get, set } = &current.kind {
                    if let Some(new_get) = &desc.get {
                        if new_get != get {
                            return false;
                        }
                    }
                    if let Some(new_set) = &desc.set {
                        if new_set != set {
                            return false;
                        }
                    }
                }
            }
        }

        // Step 12: apply every present field.
        let converting = !desc.is_generic() && current.is_data() != desc.is_data_descriptor();
        let prop = self
            .get_own_property_mut(name)
            .expect("property exists; checked above");

        if converting {
            // §8.12.9 steps 9.b/9.c: flipping kind resets the other side's
            // fields to their defaults; enumerable/configurable survive.
            prop.attributes.remove(PropertyAttributes::WRITABLE);
            prop.kind = if desc.is_accessor_descriptor() {
                PropertyKind::Accessor {
                    get: None,
                    set: None,
                }
            } else {
                PropertyKind::Data(Value::Undefined)
            };
        }

        if let Some(enumerable) = desc.enumerable {
            prop.attributes
                .set(PropertyAttributes::ENUMERABLE, enumerable);
        }
        if let Some(configurable) = desc.configurable {
            prop.attributes
                .set(PropertyAttributes::CONFIGURABLE, configurable);
        }
        match &mut prop.kind {
            PropertyKind::Data(slot) => {
                if let Some(value) = &desc.value {
                    *slot = value.clone();
                }
                if let Some(writable) = desc.writable {
                    prop.attributes.set(PropertyAttributes::WRITABLE, writable);
                }
            }
            PropertyKind::Accessor { get, set } => {
                if let Some(new_get) = desc.get {
                    *get = new_get;
                }
                if let Some(new_set) = desc.set {
                    *set = new_set;
                }
            }
        }
        true
    }
}

/// Attribute flags for a freshly created property: absent fields default to
/// `false` (§8.6.1, table 7).
fn build_attributes(desc: &PropertyDescriptor) -> PropertyAttributes {
    let mut attributes = PropertyAttributes::empty();
    if desc.writable == Some(true) {
        attributes |= PropertyAttributes::WRITABLE;
    }
    if desc.enumerable == Some(true) {
        attributes |= PropertyAttributes::ENUMERABLE;
    }
    if desc.configurable == Some(true) {
        attributes |= PropertyAttributes::CONFIGURABLE;
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_data(value: f64) -> PropertyDescriptor {
        PropertyDescriptor::data_full(Value::Number(value), PropertyAttributes::full())
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.set_simple_property("b", Value::Number(1.0));
        obj.set_simple_property("a", Value::Number(2.0));
        obj.set_simple_property("0", Value::Number(3.0));
        assert_eq!(obj.own_keys(), vec!["b", "a", "0"]);
        // Overwriting does not move a key.
        obj.set_simple_property("b", Value::Number(4.0));
        assert_eq!(obj.own_keys(), vec!["b", "a", "0"]);
    }

    #[test]
    fn test_delete_preserves_remaining_order() {
        let mut obj = JsObject::ordinary("Object", None);
        for key in ["x", "y", "z"] {
            obj.set_simple_property(key, Value::Null);
        }
        assert!(obj.delete_own_property("y"));
        assert_eq!(obj.own_keys(), vec!["x", "z"]);
    }

    #[test]
    fn test_define_on_non_extensible_rejected() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.prevent_extensions();
        assert!(!obj.define_own_property("x", &full_data(1.0)));
        assert!(!obj.has_own_property("x"));
        // Existing properties can still be updated.
        let mut obj2 = JsObject::ordinary("Object", None);
        obj2.define_own_property("x", &full_data(1.0));
        obj2.prevent_extensions();
        assert!(obj2.define_own_property("x", &full_data(2.0)));
    }

    #[test]
    fn test_absent_fields_default_false() {
        let mut obj = JsObject::ordinary("Object", None);
        let desc = PropertyDescriptor {
            value: Some(Value::Number(1.0)),
            ..PropertyDescriptor::default()
        };
        assert!(obj.define_own_property("x", &desc));
        let prop = obj.get_own_property("x").unwrap();
        assert!(!prop.is_writable());
        assert!(!prop.is_enumerable());
        assert!(!prop.is_configurable());
    }

    #[test]
    fn test_non_configurable_cannot_become_configurable() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                writable: Some(true),
                ..PropertyDescriptor::default()
            },
        );
        let reconfig = PropertyDescriptor {
            configurable: Some(true),
            ..PropertyDescriptor::default()
        };
        assert!(!obj.define_own_property("x", &reconfig));
    }

    #[test]
    fn test_non_writable_value_change_rejected() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                ..PropertyDescriptor::default()
            },
        );
        let change = PropertyDescriptor {
            value: Some(Value::Number(2.0)),
            ..PropertyDescriptor::default()
        };
        assert!(!obj.define_own_property("x", &change));
        // Same value is fine (§8.12.9 allows a no-op).
        let same = PropertyDescriptor {
            value: Some(Value::Number(1.0)),
            ..PropertyDescriptor::default()
        };
        assert!(obj.define_own_property("x", &same));
    }

    #[test]
    fn test_writable_true_to_false_allowed_one_way() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                writable: Some(true),
                ..PropertyDescriptor::default()
            },
        );
        assert!(obj.define_own_property(
            "x",
            &PropertyDescriptor {
                writable: Some(false),
                ..PropertyDescriptor::default()
            }
        ));
        assert!(!obj.define_own_property(
            "x",
            &PropertyDescriptor {
                writable: Some(true),
                ..PropertyDescriptor::default()
            }
        ));
    }

    #[test]
    fn test_data_accessor_conversion_requires_configurable() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                configurable: Some(true),
                ..PropertyDescriptor::default()
            },
        );
        let accessor = PropertyDescriptor {
            get: Some(None),
            ..PropertyDescriptor::default()
        };
        assert!(obj.define_own_property("x", &accessor));
        assert!(!obj.get_own_property("x").unwrap().is_data());

        let mut frozen = JsObject::ordinary("Object", None);
        frozen.define_own_property(
            "y",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                ..PropertyDescriptor::default()
            },
        );
        assert!(!frozen.define_own_property("y", &accessor));
    }

    #[test]
    fn test_conversion_preserves_enumerability() {
        let mut obj = JsObject::ordinary("Object", None);
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                value: Some(Value::Number(1.0)),
                enumerable: Some(true),
                configurable: Some(true),
                ..PropertyDescriptor::default()
            },
        );
        obj.define_own_property(
            "x",
            &PropertyDescriptor {
                get: Some(None),
                ..PropertyDescriptor::default()
            },
        );
        let prop = obj.get_own_property("x").unwrap();
        assert!(prop.is_enumerable());
        assert!(prop.is_configurable());
    }
}
