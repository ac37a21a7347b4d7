use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::Reflect;

/// Raw payload bytes held by a request or response (e.g. a model invocation body).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Blob {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A value read from a field, borrowed from the object it came from.
pub enum FieldValue<'a> {
    Str(Cow<'a, str>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(&'a [u8]),
    List(Vec<FieldValue<'a>>),
    /// Keyed mapping, reduced to its key set.
    Map(Vec<Cow<'a, str>>),
    Object(&'a dyn Reflect),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(keys) => f.debug_tuple("Map").field(keys).finish(),
            Self::Object(obj) => write!(f, "Object({})", obj.type_name()),
        }
    }
}

/// Conversion from a getter's return value. `None` means the field holds no value.
pub trait ToField<'a> {
    fn to_field(self) -> Option<FieldValue<'a>>;
}

impl<'a> ToField<'a> for FieldValue<'a> {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(self)
    }
}

impl<'a> ToField<'a> for &'a str {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Str(Cow::Borrowed(self)))
    }
}

impl<'a> ToField<'a> for &'a String {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Str(Cow::Borrowed(self.as_str())))
    }
}

impl<'a> ToField<'a> for String {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Str(Cow::Owned(self)))
    }
}

macro_rules! int_to_field {
    ($($t:ty),*) => {
        $(
            impl<'a> ToField<'a> for $t {
                fn to_field(self) -> Option<FieldValue<'a>> {
                    Some(FieldValue::Int(i64::from(self)))
                }
            }
        )*
    };
}

int_to_field!(i8, i16, i32, i64, u8, u16, u32);

impl<'a> ToField<'a> for u64 {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(match i64::try_from(self) {
            Ok(v) => FieldValue::Int(v),
            Err(_) => FieldValue::Float(self as f64),
        })
    }
}

impl<'a> ToField<'a> for usize {
    fn to_field(self) -> Option<FieldValue<'a>> {
        (self as u64).to_field()
    }
}

impl<'a> ToField<'a> for f64 {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Float(self))
    }
}

impl<'a> ToField<'a> for f32 {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Float(f64::from(self)))
    }
}

impl<'a> ToField<'a> for bool {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Bool(self))
    }
}

impl<'a> ToField<'a> for &'a Blob {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Bytes(self.as_bytes()))
    }
}

impl<'a> ToField<'a> for &'a dyn Reflect {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Object(self))
    }
}

impl<'a, T: ToField<'a>> ToField<'a> for Option<T> {
    fn to_field(self) -> Option<FieldValue<'a>> {
        self.and_then(|value| value.to_field())
    }
}

impl<'a, T> ToField<'a> for &'a [T]
where
    &'a T: ToField<'a>,
{
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::List(
            self.iter().filter_map(|item| item.to_field()).collect(),
        ))
    }
}

impl<'a, T> ToField<'a> for &'a Vec<T>
where
    &'a T: ToField<'a>,
{
    fn to_field(self) -> Option<FieldValue<'a>> {
        self.as_slice().to_field()
    }
}

impl<'a, V> ToField<'a> for &'a BTreeMap<String, V> {
    fn to_field(self) -> Option<FieldValue<'a>> {
        Some(FieldValue::Map(
            self.keys().map(|k| Cow::Borrowed(k.as_str())).collect(),
        ))
    }
}

impl<'a, V, S> ToField<'a> for &'a HashMap<String, V, S> {
    fn to_field(self) -> Option<FieldValue<'a>> {
        let mut keys: Vec<&str> = self.keys().map(String::as_str).collect();
        keys.sort_unstable();
        Some(FieldValue::Map(keys.into_iter().map(Cow::Borrowed).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_none_is_absent() {
        let value: Option<&str> = None;
        assert!(value.to_field().is_none());
    }

    #[test]
    fn test_hash_map_keys_are_sorted() {
        let mut map = HashMap::new();
        map.insert("orders".to_string(), 1);
        map.insert("customers".to_string(), 2);
        let Some(FieldValue::Map(keys)) = (&map).to_field() else {
            panic!("expected map");
        };
        assert_eq!(keys, vec!["customers", "orders"]);
    }

    #[test]
    fn test_u64_overflow_becomes_float() {
        let Some(FieldValue::Float(v)) = u64::MAX.to_field() else {
            panic!("expected float");
        };
        assert!(v > 9.0e18);
    }

    #[test]
    fn test_debug_hides_bytes() {
        let blob = Blob::from("{\"secret\":1}");
        let value = (&blob).to_field();
        assert_eq!(format!("{:?}", value), "Some(Bytes(12 bytes))");
    }
}
