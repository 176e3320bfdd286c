//! Property storage records and descriptors (ES5.1 §8.6.1, §8.10).

use bitflags::bitflags;

use crate::objects::heap::ObjectHandle;
use crate::runtime::value::Value;

bitflags! {
    /// Attribute flags for a stored [`Property`].
    ///
    /// These correspond directly to the ECMAScript property attribute fields
    /// `[[Writable]]`, `[[Enumerable]]`, and `[[Configurable]]`.
    /// `WRITABLE` is meaningful only for data properties.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct PropertyAttributes: u8 {
        /// The property value may be changed with an assignment.
        const WRITABLE     = 0b001;
        /// The property shows up during enumeration (`for-in`, `Object.keys`).
        const ENUMERABLE   = 0b010;
        /// The descriptor may be changed and the property deleted.
        const CONFIGURABLE = 0b100;
    }
}

impl PropertyAttributes {
    /// `writable | enumerable | configurable` — what plain assignment
    /// creates (§8.12.5 step 6).
    pub fn full() -> Self {
        Self::WRITABLE | Self::ENUMERABLE | Self::CONFIGURABLE
    }

    /// Shorthand for builtin-function properties: writable and
    /// configurable but not enumerable (§15, "every other property").
    pub fn builtin() -> Self {
        Self::WRITABLE | Self::CONFIGURABLE
    }
}

/// The payload of a stored property: a data slot or an accessor pair.
#[derive(Debug, Clone)]
pub enum PropertyKind {
    /// `[[Value]]`.
    Data(Value),
    /// `[[Get]]` / `[[Set]]` function objects; `None` is *undefined*.
    Accessor {
        /// The getter, if any.
        get: Option<ObjectHandle>,
        /// The setter, if any.
        set: Option<ObjectHandle>,
    },
}

/// A fully-populated own property as stored on an object.
#[derive(Debug, Clone)]
pub struct Property {
    /// Data or accessor payload.
    pub kind: PropertyKind,
    /// Attribute flags.
    pub attributes: PropertyAttributes,
}

impl Property {
    /// A data property with the given attributes.
    pub fn data(value: Value, attributes: PropertyAttributes) -> Self {
        Property {
            kind: PropertyKind::Data(value),
            attributes,
        }
    }

    /// Returns `true` for data properties.
    pub fn is_data(&self) -> bool {
        matches!(self.kind, PropertyKind::Data(_))
    }

    /// Returns the data value, or `None` for accessors.
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            PropertyKind::Data(v) => Some(v),
            PropertyKind::Accessor { .. } => None,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::WRITABLE)
    }

    pub fn is_enumerable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::ENUMERABLE)
    }

    pub fn is_configurable(&self) -> bool {
        self.attributes.contains(PropertyAttributes::CONFIGURABLE)
    }

    /// Convert to the partial-descriptor form (for `Object.getOwnPropertyDescriptor`).
    pub fn to_descriptor(&self) -> PropertyDescriptor {
        let mut desc = PropertyDescriptor {
            enumerable: Some(self.is_enumerable()),
            configurable: Some(self.is_configurable()),
            ..PropertyDescriptor::default()
        };
        match &self.kind {
            PropertyKind::Data(v) => {
                desc.value = Some(v.clone());
                desc.writable = Some(self.is_writable());
            }
            PropertyKind::Accessor { get, set } => {
                desc.get = Some(*get);
                desc.set = Some(*set);
            }
        }
        desc
    }
}

/// A partial property descriptor per §8.10: every field may be absent.
///
/// For `get`/`set`, the outer `Option` is presence and the inner is
/// *undefined* vs. a function object.
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    /// `[[Value]]`, if present.
    pub value: Option<Value>,
    /// `[[Writable]]`, if present.
    pub writable: Option<bool>,
    /// `[[Get]]`, if present.
    pub get: Option<Option<ObjectHandle>>,
    /// `[[Set]]`, if present.
    pub set: Option<Option<ObjectHandle>>,
    /// `[[Enumerable]]`, if present.
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`, if present.
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A full data descriptor.
    pub fn data_full(value: Value, attributes: PropertyAttributes) -> Self {
        PropertyDescriptor {
            value: Some(value),
            writable: Some(attributes.contains(PropertyAttributes::WRITABLE)),
            enumerable: Some(attributes.contains(PropertyAttributes::ENUMERABLE)),
            configurable: Some(attributes.contains(PropertyAttributes::CONFIGURABLE)),
            ..PropertyDescriptor::default()
        }
    }

    /// §8.10.2: has `[[Value]]` or `[[Writable]]`.
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// §8.10.1: has `[[Get]]` or `[[Set]]`.
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// §8.10.3: neither data nor accessor.
    pub fn is_generic(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }

    /// Returns `true` when every present field would be unchanged on `prop`
    /// (the "same value for every field" escape in §8.12.9 step 6).
    pub fn is_unchanged_on(&self, prop: &Property) -> bool {
        if let Some(enumerable) = self.enumerable {
            if enumerable != prop.is_enumerable() {
                return false;
            }
        }
        if let Some(configurable) = self.configurable {
            if configurable != prop.is_configurable() {
                return false;
            }
        }
        match &prop.kind {
            PropertyKind::Data(current) => {
                if self.is_accessor_descriptor() {
                    return false;
                }
                if let Some(writable) = self.writable {
                    if writable != prop.is_writable() {
                        return false;
                    }
                }
                match &self.value {
                    Some(v) => Value::same_value(v, current),
                    None => true,
                }
            }
            PropertyKind::Accessor { get, set } => {
                if self.is_data_descriptor() {
                    return false;
                }
                if let Some(new_get) = &self.get {
                    if new_get != get {
                        return false;
                    }
                }
                match &self.set {
                    Some(new_set) => new_set == set,
                    None => true,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_classification() {
        let mut d = PropertyDescriptor::default();
        assert!(d.is_generic());
        d.writable = Some(true);
        assert!(d.is_data_descriptor());
        assert!(!d.is_accessor_descriptor());

        let mut a = PropertyDescriptor::default();
        a.get = Some(None);
        assert!(a.is_accessor_descriptor());
        assert!(!a.is_data_descriptor());
    }

    #[test]
    fn test_property_to_descriptor_round_trip() {
        let prop = Property::data(Value::Number(1.0), PropertyAttributes::full());
        let desc = prop.to_descriptor();
        assert_eq!(desc.value.as_ref().and_then(Value::as_number), Some(1.0));
        assert_eq!(desc.writable, Some(true));
        assert_eq!(desc.enumerable, Some(true));
        assert_eq!(desc.configurable, Some(true));
    }

    #[test]
    fn test_unchanged_on_data() {
        let prop = Property::data(Value::Number(1.0), PropertyAttributes::full());
        let mut d = PropertyDescriptor::default();
        assert!(d.is_unchanged_on(&prop));
        d.value = Some(Value::Number(1.0));
        assert!(d.is_unchanged_on(&prop));
        d.value = Some(Value::Number(2.0));
        assert!(!d.is_unchanged_on(&prop));
    }
}
