// Variant: the value exchanged through the dispatch surface's argument and
// result slots.

use gdbind_ffi::VariantType;

use crate::gd::GdObject;
use crate::string_name::StringName;

/// A dynamically typed value.
///
/// Only the kinds the object bridge exchanges are modelled. `Object` holds a
/// strong wrapper, so a result slot keeps a freshly created object alive
/// until the engine has taken its own reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Variant {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringName(StringName),
    Object(GdObject),
    PackedStringArray(Vec<String>),
}

impl Variant {
    /// The engine value-kind tag of this value.
    pub fn variant_type(&self) -> VariantType {
        match self {
            Variant::Nil => VariantType::Nil,
            Variant::Bool(_) => VariantType::Bool,
            Variant::Int(_) => VariantType::Int,
            Variant::Float(_) => VariantType::Float,
            Variant::String(_) => VariantType::String,
            Variant::StringName(_) => VariantType::StringName,
            Variant::Object(_) => VariantType::Object,
            Variant::PackedStringArray(_) => VariantType::PackedStringArray,
        }
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Variant::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Variant::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Variant::Float(f) => Some(*f),
            Variant::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the text of a `String` or `StringName` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            Variant::StringName(n) => Some(n.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&GdObject> {
        match self {
            Variant::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl From<bool> for Variant {
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}

impl From<i64> for Variant {
    fn from(v: i64) -> Self {
        Variant::Int(v)
    }
}

impl From<f64> for Variant {
    fn from(v: f64) -> Self {
        Variant::Float(v)
    }
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_owned())
    }
}

impl From<String> for Variant {
    fn from(v: String) -> Self {
        Variant::String(v)
    }
}

impl From<StringName> for Variant {
    fn from(v: StringName) -> Self {
        Variant::StringName(v)
    }
}

impl From<GdObject> for Variant {
    fn from(v: GdObject) -> Self {
        Variant::Object(v)
    }
}

impl From<Vec<String>> for Variant {
    fn from(v: Vec<String>) -> Self {
        Variant::PackedStringArray(v)
    }
}
