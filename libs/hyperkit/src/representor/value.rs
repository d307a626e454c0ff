use serde::Serialize;
use serde_json::{Number, Value};

use crate::projection::{AcceptLanguage, LocalizedString};

/// Declared type of a resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Boolean,
    Number,
    String,
    StringList,
    NumberList,
    BooleanList,
    Binary,
    LocalizedString,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::StringList => "string_list",
            Self::NumberList => "number_list",
            Self::BooleanList => "boolean_list",
            Self::Binary => "binary",
            Self::LocalizedString => "localized_string",
        }
    }

    /// Whether `value` has the JSON shape this kind expects.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Number => value.is_number(),
            Self::String | Self::Binary => value.is_string(),
            Self::StringList => all_items(value, Value::is_string),
            Self::NumberList => all_items(value, Value::is_number),
            Self::BooleanList => all_items(value, Value::is_boolean),
            Self::LocalizedString => {
                value.is_string()
                    || value
                        .as_object()
                        .is_some_and(|m| m.values().all(Value::is_string))
            }
        }
    }
}

fn all_items(value: &Value, check: fn(&Value) -> bool) -> bool {
    value.as_array().is_some_and(|items| items.iter().all(check))
}

/// A field value read from a model.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Number(Number),
    String(String),
    StringList(Vec<String>),
    NumberList(Vec<Number>),
    BooleanList(Vec<bool>),
    Localized(LocalizedString),
}

impl FieldValue {
    /// JSON rendering; localized strings collapse to the best language match.
    #[must_use]
    pub fn to_json(&self, languages: &AcceptLanguage) -> Option<Value> {
        Some(match self {
            Self::Boolean(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::StringList(items) => items.iter().cloned().map(Value::String).collect(),
            Self::NumberList(items) => items.iter().cloned().map(Value::Number).collect(),
            Self::BooleanList(items) => items.iter().copied().map(Value::Bool).collect(),
            Self::Localized(text) => Value::String(languages.resolve(text)?.to_owned()),
        })
    }
}

/// Conversion from model attribute types into [`FieldValue`].
///
/// `Option<T>` maps `None` to an absent field.
pub trait IntoFieldValue {
    const KIND: FieldKind;

    fn into_field_value(self) -> Option<FieldValue>;
}

impl IntoFieldValue for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn into_field_value(self) -> Option<FieldValue> {
        Some(FieldValue::Boolean(self))
    }
}

impl IntoFieldValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn into_field_value(self) -> Option<FieldValue> {
        Some(FieldValue::String(self))
    }
}

impl IntoFieldValue for Vec<String> {
    const KIND: FieldKind = FieldKind::StringList;

    fn into_field_value(self) -> Option<FieldValue> {
        Some(FieldValue::StringList(self))
    }
}

impl IntoFieldValue for Vec<bool> {
    const KIND: FieldKind = FieldKind::BooleanList;

    fn into_field_value(self) -> Option<FieldValue> {
        Some(FieldValue::BooleanList(self))
    }
}

impl IntoFieldValue for LocalizedString {
    const KIND: FieldKind = FieldKind::LocalizedString;

    fn into_field_value(self) -> Option<FieldValue> {
        (!self.is_empty()).then_some(FieldValue::Localized(self))
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn into_field_value(self) -> Option<FieldValue> {
        self.and_then(IntoFieldValue::into_field_value)
    }
}

/// Numeric types that render as JSON numbers. Non-finite floats have no
/// JSON form and yield `None`.
pub trait IntoNumber {
    fn into_number(self) -> Option<Number>;
}

macro_rules! integer_fields {
    ($($t:ty),+) => {$(
        impl IntoNumber for $t {
            fn into_number(self) -> Option<Number> {
                Some(Number::from(self))
            }
        }
    )+};
}

integer_fields!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl IntoNumber for f64 {
    fn into_number(self) -> Option<Number> {
        Number::from_f64(self)
    }
}

impl IntoNumber for f32 {
    fn into_number(self) -> Option<Number> {
        Number::from_f64(f64::from(self))
    }
}

macro_rules! number_fields {
    ($($t:ty),+) => {$(
        impl IntoFieldValue for $t {
            const KIND: FieldKind = FieldKind::Number;

            fn into_field_value(self) -> Option<FieldValue> {
                self.into_number().map(FieldValue::Number)
            }
        }

        impl IntoFieldValue for Vec<$t> {
            const KIND: FieldKind = FieldKind::NumberList;

            fn into_field_value(self) -> Option<FieldValue> {
                self.into_iter()
                    .map(IntoNumber::into_number)
                    .collect::<Option<Vec<_>>>()
                    .map(FieldValue::NumberList)
            }
        }
    )+};
}

number_fields!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn kinds_follow_rust_types() {
        assert_eq!(<u32 as IntoFieldValue>::KIND, FieldKind::Number);
        assert_eq!(<Option<String> as IntoFieldValue>::KIND, FieldKind::String);
        assert_eq!(<Vec<f64> as IntoFieldValue>::KIND, FieldKind::NumberList);
        assert_eq!(<LocalizedString as IntoFieldValue>::KIND, FieldKind::LocalizedString);
    }

    #[test]
    fn absent_values() {
        assert_eq!(None::<String>.into_field_value(), None);
        assert_eq!(f64::NAN.into_field_value(), None);
        assert_eq!(vec![1.0, f64::INFINITY].into_field_value(), None);
        assert_eq!(LocalizedString::new().into_field_value(), None);
    }

    #[test]
    fn json_rendering() {
        let languages = AcceptLanguage::from_tags(&["de"]);
        let title = LocalizedString::new().with("en", "Engineer").with("de", "Ingenieur");

        let render = |v: FieldValue| v.to_json(&languages).unwrap();

        assert_eq!(render(42_u8.into_field_value().unwrap()), json!(42));
        assert_eq!(render(vec![true, false].into_field_value().unwrap()), json!([true, false]));
        assert_eq!(render(vec![1_i32, 2].into_field_value().unwrap()), json!([1, 2]));
        assert_eq!(render(title.into_field_value().unwrap()), json!("Ingenieur"));
    }

    #[test]
    fn kind_accepts_matching_json() {
        assert!(FieldKind::String.accepts(&json!("x")));
        assert!(!FieldKind::String.accepts(&json!(1)));
        assert!(FieldKind::NumberList.accepts(&json!([1, 2.5])));
        assert!(!FieldKind::NumberList.accepts(&json!([1, "2"])));
        assert!(FieldKind::LocalizedString.accepts(&json!({"en": "Hi", "de": "Hallo"})));
        assert!(!FieldKind::BooleanList.accepts(&json!(true)));
    }
}
