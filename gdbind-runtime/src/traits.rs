// Traits implemented by Rust-defined engine classes. `#[gdclass]` generates the
// `GodotClass` impl; users write the `ObjectHooks` impl.

use crate::property::PropertyInfo;
use crate::string_name::StringName;
use crate::variant::Variant;

/// Reflective hooks the engine invokes on an object to implement dynamic
/// property and method access.
///
/// Every hook has a default that reports "not handled". Override only what
/// the class needs. A panicking override is caught at the dispatch boundary
/// and treated as "not handled" for that call.
pub trait ObjectHooks {
    /// Number of dynamic properties currently exposed.
    fn property_count(&self) -> usize {
        0
    }

    /// Fill `list` with descriptors. `list.len()` never exceeds the value
    /// most recently returned by [`property_count`](Self::property_count).
    fn get_property_list(&self, list: &mut [PropertyInfo]) {
        let _ = list;
    }

    /// Dynamic method call. Leave `ret` untouched for unknown methods.
    fn call(&mut self, method: &StringName, arg: &Variant, ret: &mut Variant) {
        let _ = (method, arg, ret);
    }

    /// Returns true if `property` was recognized and written.
    fn set(&mut self, property: &StringName, value: &Variant) -> bool {
        let _ = (property, value);
        false
    }

    /// Returns true if `property` was recognized and read into `value`.
    fn get(&self, property: &StringName, value: &mut Variant) -> bool {
        let _ = (property, value);
        false
    }

    /// Rewrite a descriptor before the inspector sees it. Returns true if it changed.
    fn validate_property(&self, info: &mut PropertyInfo) -> bool {
        let _ = info;
        false
    }

    fn property_can_revert(&self, property: &StringName) -> bool {
        let _ = property;
        false
    }

    fn property_get_revert(&self, property: &StringName, ret: &mut Variant) -> bool {
        let _ = (property, ret);
        false
    }

    fn notification(&mut self, what: i32, reversed: bool) -> bool {
        let _ = (what, reversed);
        false
    }

    /// Teardown hook, run once per object. `finalizing` is true when the last
    /// `Gd` was dropped without an explicit `dispose()`.
    fn on_dispose(&mut self, finalizing: bool) {
        let _ = finalizing;
    }
}

/// Implemented for every Rust-defined engine class (usually by `#[gdclass]`).
pub trait GodotClass: ObjectHooks + Send + 'static {
    /// Class name the engine's class database knows this type by.
    const CLASS_NAME: &'static str;

    /// Whether the native counterpart uses intrusive reference counting.
    const REFCOUNTED: bool = false;
}
