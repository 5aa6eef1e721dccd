// Script objects created by the Rust language.

use crate::gdclass;
use crate::runtime::{ObjectHooks, PropertyHint, PropertyInfo, StringName, Variant, VariantType};

const SOURCE_CODE: &str = "source_code";
const PATH: &str = "path";

/// A Rust script resource: its source text and the file it was loaded from.
#[gdclass(refcounted)]
#[derive(Default)]
pub struct RustScript {
    source_code: String,
    path: String,
}

impl RustScript {
    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    pub fn set_source_code(&mut self, source: impl Into<String>) {
        self.source_code = source.into();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn field(&self, property: &StringName) -> Option<&String> {
        match property.as_str() {
            SOURCE_CODE => Some(&self.source_code),
            PATH => Some(&self.path),
            _ => None,
        }
    }

    fn field_mut(&mut self, property: &StringName) -> Option<&mut String> {
        match property.as_str() {
            SOURCE_CODE => Some(&mut self.source_code),
            PATH => Some(&mut self.path),
            _ => None,
        }
    }
}

impl ObjectHooks for RustScript {
    fn property_count(&self) -> usize {
        2
    }

    fn get_property_list(&self, list: &mut [PropertyInfo]) {
        let all = [
            PropertyInfo::new(SOURCE_CODE, VariantType::String)
                .with_hint(PropertyHint::MultilineText, ""),
            PropertyInfo::new(PATH, VariantType::String).with_hint(PropertyHint::File, "*.rs"),
        ];
        for (slot, info) in list.iter_mut().zip(all) {
            *slot = info;
        }
    }

    fn set(&mut self, property: &StringName, value: &Variant) -> bool {
        let Some(text) = value.as_str() else {
            return false;
        };
        match self.field_mut(property) {
            Some(field) => {
                *field = text.to_string();
                true
            }
            None => false,
        }
    }

    fn get(&self, property: &StringName, value: &mut Variant) -> bool {
        match self.field(property) {
            Some(field) => {
                *value = Variant::from(field.as_str());
                true
            }
            None => false,
        }
    }

    fn property_can_revert(&self, property: &StringName) -> bool {
        self.field(property).is_some_and(|field| !field.is_empty())
    }

    fn property_get_revert(&self, property: &StringName, ret: &mut Variant) -> bool {
        if self.field(property).is_none() {
            return false;
        }
        *ret = Variant::from(String::new());
        true
    }
}
