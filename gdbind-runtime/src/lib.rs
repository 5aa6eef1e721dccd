// gdbind-runtime: Safe Rust API wrapping gdbind-ffi.
// All unsafe FFI calls are confined to this crate. Macro-generated code and
// user code interact only with the safe types exported here.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod api;
pub mod error;
pub mod logging;
pub mod ffi_guard;
pub(crate) mod ffi_dispatch;
pub mod string_name;
pub mod variant;
pub mod property;
pub mod traits;
pub mod binding_registry;
pub mod gd;
pub mod dispatch;
pub mod native_calls;
pub mod class_registry;
pub mod type_db;
pub mod script_language;

#[cfg(any(test, feature = "mock-engine"))]
pub mod mock_engine;

// Re-export the primary public API surface.
pub use api::{api, init_api, is_api_initialized};
pub use error::{check_ffi, check_ffi_ctx, GdError, GdResult};
pub use logging::{LOG_DISPLAY, LOG_ERROR, LOG_WARNING};
pub use ffi_guard::ffi_boundary;
pub use string_name::StringName;
pub use variant::Variant;
pub use property::PropertyInfo;
pub use traits::{GodotClass, ObjectHooks};
pub use gd::{handle_of, is_instance_valid, Gd, GdObject};
pub use script_language::{LanguageMethod, LanguageSlot, Registration, ScriptLanguageExtension};

// Re-export FFI types that appear in the public API.
pub use gdbind_ffi::{
    BindingHandle, ClassHandle, GdErrorCode, ObjectHandle, PropertyHint, VariantType,
};

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// User hooks run behind panic guards, so a poisoned lock only means a hook
/// unwound mid-call; the protected bookkeeping is still consistent.
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
