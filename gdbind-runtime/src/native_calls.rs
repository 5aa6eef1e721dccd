// Marshalling between raw callback arguments and the dispatch surface.
//
// The facade's `extern "C"` callbacks are one-line wrappers around these
// functions inside `ffi_boundary`. Value slots are `*const/*mut c_void`
// pointing at `Variant`s owned by the host glue.

use std::ffi::c_void;

use gdbind_ffi::{BindingHandle, GdPropertyInfo, GdStr, ObjectHandle};

use crate::class_registry;
use crate::dispatch;
use crate::logging::{log_message, LOG_ERROR, LOG_WARNING};
use crate::property::PropertyInfo;
use crate::string_name::StringName;
use crate::variant::Variant;

static NIL: Variant = Variant::Nil;

/// Decode a name argument. Invalid UTF-8 is logged and treated as no name.
unsafe fn read_name(raw: GdStr, op: &str) -> Option<StringName> {
    match unsafe { raw.as_str() } {
        Some(s) => Some(StringName::from(s)),
        None => {
            log_message(LOG_WARNING, &format!("[gdbind] {op}: name is not valid UTF-8"));
            None
        }
    }
}

unsafe fn read_variant<'a>(ptr: *const c_void) -> &'a Variant {
    if ptr.is_null() {
        &NIL
    } else {
        unsafe { &*(ptr as *const Variant) }
    }
}

// SAFETY (all functions below): pointers are null or valid for the duration
// of the call, as the callback table documents; `buf` holds `len` entries.

pub unsafe fn property_count(obj: ObjectHandle) -> u64 {
    dispatch::property_count(obj) as u64
}

/// Fill `buf[..len]`. Returns the number of entries written. The strings
/// referenced by the written entries stay valid until the next list call for
/// `obj` or until it is disposed.
pub unsafe fn get_property_list(obj: ObjectHandle, buf: *mut GdPropertyInfo, len: u64) -> u64 {
    if buf.is_null() || len == 0 {
        return 0;
    }
    // Size the scratch list by the object's own count, not by `len`.
    let Some(last) = dispatch::with_cache(obj, |cache| cache.last_count) else {
        return 0;
    };
    let count = last.unwrap_or_else(|| dispatch::property_count(obj));
    let capacity = usize::try_from(len).map_or(count, |len| len.min(count));
    if capacity == 0 {
        return 0;
    }
    let mut list = vec![PropertyInfo::default(); capacity];
    let written = dispatch::get_property_list(obj, &mut list);
    list.truncate(written);

    let views = dispatch::with_cache(obj, |cache| {
        cache.listed = list;
        cache.listed.iter().map(PropertyInfo::to_raw).collect::<Vec<_>>()
    });
    let Some(views) = views else {
        return 0;
    };
    // SAFETY: views.len() == written <= len, so every write is inside buf.
    let out = unsafe { std::slice::from_raw_parts_mut(buf, views.len()) };
    out.copy_from_slice(&views);
    views.len() as u64
}

pub unsafe fn call(obj: ObjectHandle, method: GdStr, arg: *const c_void, ret: *mut c_void) {
    let Some(method) = (unsafe { read_name(method, "call") }) else {
        return;
    };
    let arg = unsafe { read_variant(arg) };
    if ret.is_null() {
        let mut scratch = Variant::Nil;
        dispatch::call(obj, &method, arg, &mut scratch);
    } else {
        dispatch::call(obj, &method, arg, unsafe { &mut *(ret as *mut Variant) });
    }
}

pub unsafe fn set(obj: ObjectHandle, property: GdStr, value: *const c_void) -> bool {
    let Some(property) = (unsafe { read_name(property, "set") }) else {
        return false;
    };
    dispatch::set(obj, &property, unsafe { read_variant(value) })
}

pub unsafe fn get(obj: ObjectHandle, property: GdStr, value: *mut c_void) -> bool {
    if value.is_null() {
        return false;
    }
    let Some(property) = (unsafe { read_name(property, "get") }) else {
        return false;
    };
    dispatch::get(obj, &property, unsafe { &mut *(value as *mut Variant) })
}

/// Rewrite `*info` in place when the object changes it. The new strings stay
/// valid until the same property is validated again or `obj` is disposed.
pub unsafe fn validate_property(obj: ObjectHandle, info: *mut GdPropertyInfo) -> bool {
    if info.is_null() {
        return false;
    }
    let mut owned = unsafe { PropertyInfo::from_raw(&*info) };
    if !dispatch::validate_property(obj, &mut owned) {
        return false;
    }
    let view = dispatch::with_cache(obj, |cache| {
        let key = owned.name.clone();
        let entry = cache.validated.entry(key).or_default();
        *entry = owned;
        entry.to_raw()
    });
    match view {
        Some(view) => {
            unsafe { *info = view };
            true
        }
        None => false,
    }
}

pub unsafe fn property_can_revert(obj: ObjectHandle, property: GdStr) -> bool {
    let Some(property) = (unsafe { read_name(property, "property_can_revert") }) else {
        return false;
    };
    dispatch::property_can_revert(obj, &property)
}

pub unsafe fn property_get_revert(obj: ObjectHandle, property: GdStr, ret: *mut c_void) -> bool {
    if ret.is_null() {
        return false;
    }
    let Some(property) = (unsafe { read_name(property, "property_get_revert") }) else {
        return false;
    };
    dispatch::property_get_revert(obj, &property, unsafe { &mut *(ret as *mut Variant) })
}

pub unsafe fn notification(obj: ObjectHandle, what: i32, reversed: bool) -> bool {
    dispatch::notification(obj, what, reversed)
}

/// Shadow `obj` with the registered Rust class named `class_name`.
/// Returns a null binding (and logs) on failure.
pub unsafe fn create_instance(class_name: GdStr, obj: ObjectHandle) -> BindingHandle {
    let Some(class_name) = (unsafe { read_name(class_name, "create_instance") }) else {
        return BindingHandle::NULL;
    };
    match class_registry::instantiate_by_name(class_name.as_str(), obj) {
        Ok(instance) => instance.binding(),
        Err(err) => {
            log_message(
                LOG_ERROR,
                &format!("[gdbind] create_instance({class_name}): {err}"),
            );
            BindingHandle::NULL
        }
    }
}

pub unsafe fn free_instance(obj: ObjectHandle) {
    dispatch::free_instance(obj);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_registry::{create_shadow, ClassRegistration};
    use crate::dispatch::tests::spawn_props;
    use crate::gd::GdObject;
    use crate::mock_engine;
    use crate::traits::{GodotClass, ObjectHooks};
    use gdbind_ffi::{PropertyHint, VariantType};

    #[derive(Default)]
    struct Shadowed;
    impl ObjectHooks for Shadowed {}
    impl GodotClass for Shadowed {
        const CLASS_NAME: &'static str = "NativeCallsShadowed";
    }

    inventory::submit! {
        ClassRegistration {
            class_name: "NativeCallsShadowed",
            refcounted: false,
            create: create_shadow::<Shadowed>,
        }
    }

    fn slot(v: &Variant) -> *const c_void {
        v as *const Variant as *const c_void
    }

    fn slot_mut(v: &mut Variant) -> *mut c_void {
        v as *mut Variant as *mut c_void
    }

    #[test]
    fn raw_property_list_stays_inside_the_buffer() {
        let gd = spawn_props();
        let h = gd.handle();
        unsafe {
            assert_eq!(property_count(h), 2);

            let mut buf = vec![GdPropertyInfo::default(); 4];
            assert_eq!(get_property_list(h, buf.as_mut_ptr(), buf.len() as u64), 2);
            assert_eq!(buf[0].name.as_str(), Some("speed"));
            assert_eq!(buf[1].kind, VariantType::String.to_raw());
            assert_eq!(buf[2].name.len, 0);

            let mut one = [GdPropertyInfo::default(); 1];
            assert_eq!(get_property_list(h, one.as_mut_ptr(), 1), 1);
            assert_eq!(get_property_list(h, std::ptr::null_mut(), 4), 0);
        }
        gd.dispose();
    }

    #[test]
    fn oversized_list_length_is_bounded_by_the_property_count() {
        let gd = spawn_props();
        let h = gd.handle();
        unsafe {
            // The hook reports 2 properties; the declared length is never allocated.
            let mut buf = [GdPropertyInfo::default(); 2];
            assert_eq!(get_property_list(h, buf.as_mut_ptr(), u64::MAX), 2);
            assert_eq!(buf[0].name.as_str(), Some("speed"));
            assert_eq!(buf[1].name.as_str(), Some("title"));
        }
        gd.dispose();
        unsafe {
            let mut buf = [GdPropertyInfo::default(); 1];
            assert_eq!(get_property_list(h, buf.as_mut_ptr(), u64::MAX), 0);
        }
    }

    #[test]
    fn raw_validate_rewrites_descriptor() {
        let gd = spawn_props();
        let h = gd.handle();
        let original = PropertyInfo::new("title", VariantType::String);
        let mut raw = original.to_raw();
        unsafe {
            assert!(validate_property(h, &mut raw));
            assert_eq!(raw.hint, PropertyHint::MultilineText.to_raw());
            assert_eq!(raw.name.as_str(), Some("title"));
            assert!(!validate_property(h, std::ptr::null_mut()));
        }
        gd.dispose();
    }

    #[test]
    fn raw_variant_slots() {
        let gd = spawn_props();
        let h = gd.handle();
        unsafe {
            let arg = Variant::Int(4);
            let mut ret = Variant::Nil;
            call(h, GdStr::new("double"), slot(&arg), slot_mut(&mut ret));
            assert_eq!(ret, Variant::Int(8));

            // A null argument reads as Nil.
            call(h, GdStr::new("double"), std::ptr::null(), slot_mut(&mut ret));
            assert_eq!(ret, Variant::Int(0));

            let title = Variant::from(String::from("Hello"));
            assert!(set(h, GdStr::new("title"), slot(&title)));
            let mut out = Variant::Nil;
            assert!(get(h, GdStr::new("title"), slot_mut(&mut out)));
            assert_eq!(out.as_str(), Some("Hello"));
            assert!(!get(h, GdStr::new("title"), std::ptr::null_mut()));

            assert!(property_can_revert(h, GdStr::new("speed")));
            assert!(property_get_revert(h, GdStr::new("speed"), slot_mut(&mut out)));
            assert_eq!(out, Variant::Int(10));
        }
        gd.dispose();
    }

    #[test]
    fn create_and_free_instance() {
        mock_engine::install();
        let h = mock_engine::spawn_native("NativeCallsShadowed");
        unsafe {
            let binding = create_instance(GdStr::new("NativeCallsShadowed"), h);
            assert!(!binding.is_null());
            let found = GdObject::lookup(h).unwrap();
            assert_eq!(found.binding(), binding);
            assert_eq!(found.class_name(), "NativeCallsShadowed");

            free_instance(h);
            assert!(GdObject::lookup(h).is_none());
            assert!(!found.is_instance_valid());
        }
    }

    #[test]
    fn create_instance_for_unknown_class_logs() {
        mock_engine::install();
        let h = mock_engine::spawn_native("Object");
        unsafe {
            let binding = create_instance(GdStr::new("NoSuchRustClass"), h);
            assert!(binding.is_null());
        }
        assert!(!mock_engine::logs_containing("create_instance(NoSuchRustClass)").is_empty());
    }
}
