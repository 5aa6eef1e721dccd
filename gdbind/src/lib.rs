// gdbind: User-facing library crate. Users depend on this and use `gdbind::entry!()`
// to generate the library entry points in their own cdylib crate.
//
//! ## Feature Flags
//!
//! | Feature           | Effect                                                   |
//! |-------------------|----------------------------------------------------------|
//! | `script-language` | Built-in "Rust" script language, registered at init      |

// `#[gdclass]` expands to `::gdbind::...` paths, including inside this crate.
extern crate self as gdbind;

// Re-exports for proc macro path resolution and user access.
pub use gdbind_ffi as ffi;
pub use gdbind_runtime as runtime;
pub use gdbind_macros::gdclass;
pub use gdbind_runtime::gdlog;

// For proc macro generated inventory::submit! invocations.
#[doc(hidden)]
pub extern crate inventory as __inventory;

pub mod prelude;

#[cfg(feature = "script-language")]
pub mod rust_language;
#[cfg(feature = "script-language")]
pub mod rust_script;

use runtime::native_calls;

// ---------------------------------------------------------------------------
// Callbacks (shared between init and entry! macro)
// ---------------------------------------------------------------------------

extern "C" fn real_property_count(obj: ffi::ObjectHandle) -> u64 {
    runtime::ffi_boundary(0, || unsafe { native_calls::property_count(obj) })
}

extern "C" fn real_get_property_list(
    obj: ffi::ObjectHandle,
    buf: *mut ffi::GdPropertyInfo,
    len: u64,
) -> u64 {
    runtime::ffi_boundary(0, || unsafe { native_calls::get_property_list(obj, buf, len) })
}

extern "C" fn real_call(
    obj: ffi::ObjectHandle,
    method: ffi::GdStr,
    arg: *const std::ffi::c_void,
    ret: *mut std::ffi::c_void,
) {
    runtime::ffi_boundary((), || unsafe { native_calls::call(obj, method, arg, ret) })
}

extern "C" fn real_set(
    obj: ffi::ObjectHandle,
    property: ffi::GdStr,
    value: *const std::ffi::c_void,
) -> bool {
    runtime::ffi_boundary(false, || unsafe { native_calls::set(obj, property, value) })
}

extern "C" fn real_get(
    obj: ffi::ObjectHandle,
    property: ffi::GdStr,
    value: *mut std::ffi::c_void,
) -> bool {
    runtime::ffi_boundary(false, || unsafe { native_calls::get(obj, property, value) })
}

extern "C" fn real_validate_property(obj: ffi::ObjectHandle, info: *mut ffi::GdPropertyInfo) -> bool {
    runtime::ffi_boundary(false, || unsafe { native_calls::validate_property(obj, info) })
}

extern "C" fn real_property_can_revert(obj: ffi::ObjectHandle, property: ffi::GdStr) -> bool {
    runtime::ffi_boundary(false, || unsafe { native_calls::property_can_revert(obj, property) })
}

extern "C" fn real_property_get_revert(
    obj: ffi::ObjectHandle,
    property: ffi::GdStr,
    ret: *mut std::ffi::c_void,
) -> bool {
    runtime::ffi_boundary(false, || unsafe {
        native_calls::property_get_revert(obj, property, ret)
    })
}

extern "C" fn real_notification(obj: ffi::ObjectHandle, what: i32, reversed: bool) -> bool {
    runtime::ffi_boundary(false, || unsafe { native_calls::notification(obj, what, reversed) })
}

extern "C" fn real_create_instance(
    class_name: ffi::GdStr,
    obj: ffi::ObjectHandle,
) -> ffi::BindingHandle {
    runtime::ffi_boundary(ffi::BindingHandle::NULL, || unsafe {
        native_calls::create_instance(class_name, obj)
    })
}

extern "C" fn real_free_instance(obj: ffi::ObjectHandle) {
    runtime::ffi_boundary((), || unsafe { native_calls::free_instance(obj) })
}

extern "C" fn real_frame() {
    runtime::ffi_boundary((), || {
        #[cfg(feature = "script-language")]
        rust_language::RUST_LANGUAGE.frame();
    });
}

extern "C" fn real_on_shutdown() {
    runtime::ffi_boundary((), || {
        #[cfg(feature = "script-language")]
        if let Err(err) = rust_language::unregister_language() {
            gdlog!(runtime::LOG_WARNING, "[gdbind] failed to unregister Rust language: {err}");
        }
        runtime::binding_registry::clear_all();
    });
}

#[doc(hidden)]
pub static __CALLBACKS: ffi::GdRustCallbacks = ffi::GdRustCallbacks {
    property_count: real_property_count,
    get_property_list: real_get_property_list,
    call: real_call,
    set: real_set,
    get: real_get,
    validate_property: real_validate_property,
    property_can_revert: real_property_can_revert,
    property_get_revert: real_property_get_revert,
    notification: real_notification,
    create_instance: real_create_instance,
    free_instance: real_free_instance,
    frame: real_frame,
    on_shutdown: real_on_shutdown,
};

// ---------------------------------------------------------------------------
// Init / Shutdown (called from entry!() generated code)
// ---------------------------------------------------------------------------

/// Initialize the gdbind runtime. Called by the `entry!()` generated `gdbind_init`.
///
/// Stores the API table, registers all `#[gdclass]` types, registers the
/// built-in script language (feature `script-language`), and returns the
/// callback table pointer. Returns null on failure.
pub fn init(api_table: *const ffi::GdApiTable) -> *const ffi::GdRustCallbacks {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        if api_table.is_null() {
            return std::ptr::null();
        }

        runtime::init_api(api_table);
        check_api_version();
        log_greeting();
        runtime::class_registry::register_all_from_inventory();

        #[cfg(feature = "script-language")]
        if let Err(err) = rust_language::register_language() {
            gdlog!(runtime::LOG_ERROR, "[gdbind] failed to register Rust language: {err}");
        }

        &__CALLBACKS as *const ffi::GdRustCallbacks
    }))
    .unwrap_or(std::ptr::null())
}

fn check_api_version() {
    let version = runtime::api().version;
    if version != ffi::GDBIND_API_VERSION {
        gdlog!(
            runtime::LOG_WARNING,
            "[gdbind] API table version {version} does not match expected {}",
            ffi::GDBIND_API_VERSION
        );
    }
}

/// Build a greeting string listing all compiled feature flags.
fn build_feature_greeting(prefix: &str) -> String {
    macro_rules! collect_features {
        ($s:expr, $($feat:literal),+ $(,)?) => {{
            $(
                #[cfg(feature = $feat)]
                $s.push_str(concat!(" ", $feat));
            )+
        }};
    }
    let mut s = format!("[gdbind] {} (features:", prefix);
    collect_features!(s, "script-language");
    s.push(')');
    s
}

fn log_greeting() {
    runtime::logging::log_message(
        runtime::LOG_DISPLAY,
        &build_feature_greeting("Rust side initialized"),
    );
}

/// Shut down the gdbind runtime. Called by the `entry!()` generated `gdbind_shutdown`.
pub fn shutdown() {
    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        (__CALLBACKS.on_shutdown)();
    }));
}

/// Generates library exports for the gdbind runtime entry points.
///
/// Place this at the top of your cdylib crate's `lib.rs`:
/// ```ignore
/// gdbind::entry!();
/// ```
///
/// Generates `gdbind_init` / `gdbind_shutdown` exports.
#[macro_export]
macro_rules! entry {
    () => {
        mod __gdbind_native_entry {
            #[unsafe(no_mangle)]
            pub extern "C" fn gdbind_init(
                api_table: *const $crate::ffi::GdApiTable,
            ) -> *const $crate::ffi::GdRustCallbacks {
                $crate::init(api_table)
            }

            #[unsafe(no_mangle)]
            pub extern "C" fn gdbind_shutdown() {
                $crate::shutdown()
            }
        }
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::ffi::c_void;
    use std::sync::OnceLock;

    use runtime::mock_engine;
    use runtime::{GdObject, Variant};

    /// Initialize against the mock engine once per test binary.
    pub(crate) fn callbacks() -> &'static ffi::GdRustCallbacks {
        static CALLBACKS: OnceLock<usize> = OnceLock::new();
        let ptr = *CALLBACKS.get_or_init(|| init(mock_engine::table()) as usize);
        assert_ne!(ptr, 0, "gdbind::init failed");
        unsafe { &*(ptr as *const ffi::GdRustCallbacks) }
    }

    pub(crate) fn call(
        obj: ffi::ObjectHandle,
        method: &str,
        arg: &Variant,
        ret: &mut Variant,
    ) {
        (callbacks().call)(
            obj,
            ffi::GdStr::new(method),
            arg as *const Variant as *const c_void,
            ret as *mut Variant as *mut c_void,
        );
    }

    #[test]
    fn init_returns_the_callback_table() {
        let cb = callbacks();
        assert!(std::ptr::eq(cb, &__CALLBACKS));
        assert!(init(std::ptr::null()).is_null());
        assert!(!mock_engine::logs_containing("Rust side initialized (features: script-language)").is_empty());
    }

    #[test]
    fn gdclass_types_are_registered_with_the_engine() {
        callbacks();
        assert!(mock_engine::is_class_registered("RustLanguage"));
        assert!(mock_engine::is_class_registered("RustScript"));
    }

    #[test]
    fn engine_created_instances_round_trip() {
        let cb = callbacks();
        let h = mock_engine::spawn_native("RustScript");
        let binding = (cb.create_instance)(ffi::GdStr::new("RustScript"), h);
        assert!(!binding.is_null());
        assert_eq!(GdObject::lookup(h).unwrap().binding(), binding);
        assert_eq!((cb.property_count)(h), 2);

        (cb.free_instance)(h);
        assert!(GdObject::lookup(h).is_none());
        assert_eq!((cb.property_count)(h), 0);
    }

    #[test]
    fn unknown_handles_are_harmless() {
        let cb = callbacks();
        let stray = mock_engine::spawn_native("Object");
        let mut ret = Variant::from(1i64);
        call(stray, "_get_name", &Variant::Nil, &mut ret);
        assert_eq!(ret, Variant::from(1i64));
        assert!(!(cb.notification)(stray, ffi::NOTIFICATION_PREDELETE, false));
        (cb.free_instance)(stray);
    }
}
