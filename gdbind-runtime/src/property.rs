// PropertyInfo: owned property descriptor exchanged through the dispatch surface.

use gdbind_ffi::{GdPropertyInfo, GdStr, PropertyHint, VariantType};

use crate::string_name::StringName;

/// Property descriptor: `{name, kind, hint, hint_string}`. Data only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: StringName,
    pub kind: VariantType,
    pub hint: PropertyHint,
    pub hint_string: String,
}

impl PropertyInfo {
    pub fn new(name: impl Into<StringName>, kind: VariantType) -> Self {
        PropertyInfo {
            name: name.into(),
            kind,
            hint: PropertyHint::None,
            hint_string: String::new(),
        }
    }

    pub fn with_hint(mut self, hint: PropertyHint, hint_string: impl Into<String>) -> Self {
        self.hint = hint;
        self.hint_string = hint_string.into();
        self
    }

    /// A string property edited as a project directory path.
    pub fn export_dir(name: impl Into<StringName>) -> Self {
        PropertyInfo::new(name, VariantType::String).with_hint(PropertyHint::Dir, "")
    }

    /// Borrowing wire view. Valid only while `self` is alive and unmoved-from.
    pub fn to_raw(&self) -> GdPropertyInfo {
        GdPropertyInfo {
            name: GdStr::new(self.name.as_str()),
            kind: self.kind.to_raw(),
            hint: self.hint.to_raw(),
            hint_string: GdStr::new(&self.hint_string),
        }
    }

    /// Copy a wire descriptor into an owned one. Unknown tags decode as
    /// `Nil` / `None`; invalid UTF-8 decodes as an empty string.
    ///
    /// # Safety
    /// The string pointers in `raw` must be null or valid for their lengths.
    pub unsafe fn from_raw(raw: &GdPropertyInfo) -> Self {
        let name = unsafe { raw.name.as_str() }.unwrap_or_default();
        let hint_string = unsafe { raw.hint_string.as_str() }.unwrap_or_default();
        PropertyInfo {
            name: StringName::from(name),
            kind: VariantType::from_raw(raw.kind).unwrap_or(VariantType::Nil),
            hint: PropertyHint::from_raw(raw.hint).unwrap_or(PropertyHint::None),
            hint_string: hint_string.to_owned(),
        }
    }
}

impl Default for PropertyInfo {
    fn default() -> Self {
        PropertyInfo::new(StringName::default(), VariantType::Nil)
    }
}
