//! Incremental JSON object assembly.
//!
//! Mappers never hold a `serde_json::Value` directly; they address named
//! slots through [`JsonObjectBuilder::field`] and fill them step by step.
//! Asking for the same slot twice returns the same slot, so several events
//! can contribute to one nested object (`_links`, `operations`, ...).

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Empty,
    Scalar(Value),
    Object(JsonObjectBuilder),
    Array(Vec<Element>),
}

#[derive(Debug)]
enum Element {
    Value(Value),
    Object(JsonObjectBuilder),
}

/// Mutable tree of named slots, consumed once by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct JsonObjectBuilder {
    slots: BTreeMap<String, Slot>,
}

impl JsonObjectBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to slot `name`, created empty on first use.
    pub fn field(&mut self, name: &str) -> FieldStep<'_> {
        FieldStep {
            slot: self.slots.entry(name.to_owned()).or_default(),
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Merge another builder into this one, slot by slot. Objects merge
    /// recursively, arrays append and anything else is overwritten.
    pub fn merge(&mut self, other: JsonObjectBuilder) {
        for (name, slot) in other.slots {
            match (self.slots.get_mut(&name), slot) {
                (Some(Slot::Object(mine)), Slot::Object(theirs)) => mine.merge(theirs),
                (Some(Slot::Array(mine)), Slot::Array(theirs)) => mine.extend(theirs),
                (Some(_), Slot::Empty) => {}
                (_, slot) => {
                    self.slots.insert(name, slot);
                }
            }
        }
    }

    /// Produce the JSON object. Slots that never received a value are
    /// dropped.
    #[must_use]
    pub fn build(self) -> Value {
        Value::Object(self.into_map())
    }

    fn into_map(self) -> Map<String, Value> {
        self.slots
            .into_iter()
            .filter_map(|(name, slot)| {
                let value = match slot {
                    Slot::Empty => return None,
                    Slot::Scalar(value) => value,
                    Slot::Object(object) => object.build(),
                    Slot::Array(elements) => Value::Array(
                        elements
                            .into_iter()
                            .map(|e| match e {
                                Element::Value(v) => v,
                                Element::Object(o) => o.build(),
                            })
                            .collect(),
                    ),
                };
                Some((name, value))
            })
            .collect()
    }
}

/// Handle to one named slot.
pub struct FieldStep<'a> {
    slot: &'a mut Slot,
}

impl<'a> FieldStep<'a> {
    pub fn string_value(self, value: impl Into<String>) {
        *self.slot = Slot::Scalar(Value::String(value.into()));
    }

    pub fn number_value(self, value: impl Into<Number>) {
        *self.slot = Slot::Scalar(Value::Number(value.into()));
    }

    pub fn boolean_value(self, value: bool) {
        *self.slot = Slot::Scalar(Value::Bool(value));
    }

    pub fn null_value(self) {
        *self.slot = Slot::Scalar(Value::Null);
    }

    /// Store an already-built JSON value as-is.
    pub fn value(self, value: Value) {
        *self.slot = Slot::Scalar(value);
    }

    /// Place `object` in the slot, merging with an object already there.
    pub fn object_value(self, object: JsonObjectBuilder) {
        if let Slot::Object(existing) = self.slot {
            existing.merge(object);
        } else {
            *self.slot = Slot::Object(object);
        }
    }

    /// Turn the slot into an array and return an appender. An existing array
    /// keeps its elements.
    pub fn array_value(self) -> ArrayStep<'a> {
        if !matches!(self.slot, Slot::Array(_)) {
            *self.slot = Slot::Array(Vec::new());
        }
        match self.slot {
            Slot::Array(elements) => ArrayStep { elements },
            _ => unreachable!("slot was just made an array"),
        }
    }

    /// Nested slot. A scalar or array in this slot is discarded and the slot
    /// becomes an object.
    pub fn field(self, name: &str) -> FieldStep<'a> {
        self.object().field(name)
    }

    /// The slot as an object builder, promoting it if needed.
    pub fn object(self) -> &'a mut JsonObjectBuilder {
        if !matches!(self.slot, Slot::Object(_)) {
            *self.slot = Slot::Object(JsonObjectBuilder::new());
        }
        match self.slot {
            Slot::Object(object) => object,
            _ => unreachable!("slot was just made an object"),
        }
    }
}

/// Append-only handle to an array slot.
pub struct ArrayStep<'a> {
    elements: &'a mut Vec<Element>,
}

impl<'a> ArrayStep<'a> {
    pub fn push_string(&mut self, value: impl Into<String>) {
        self.elements.push(Element::Value(Value::String(value.into())));
    }

    pub fn push_number(&mut self, value: impl Into<Number>) {
        self.elements.push(Element::Value(Value::Number(value.into())));
    }

    pub fn push_boolean(&mut self, value: bool) {
        self.elements.push(Element::Value(Value::Bool(value)));
    }

    pub fn push_value(&mut self, value: Value) {
        self.elements.push(Element::Value(value));
    }

    pub fn push_object(&mut self, object: JsonObjectBuilder) {
        self.elements.push(Element::Object(object));
    }

    /// Append an empty object and return it for filling in. Consumes the
    /// step so the object can outlive a chained `array_value()`.
    pub fn object(self) -> &'a mut JsonObjectBuilder {
        self.elements.push(Element::Object(JsonObjectBuilder::new()));
        match self.elements.last_mut() {
            Some(Element::Object(object)) => object,
            _ => unreachable!("an object was just pushed"),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
