// Class registry: Rust-defined classes and the engine's class database.
//
// `#[gdclass]` submits one `ClassRegistration` per struct through inventory.
// At init, every registration is announced to the engine. Afterwards the
// engine can ask for a Rust shadow of a native object by class name.

use gdbind_ffi::{ClassHandle, ObjectHandle};

use crate::api::is_api_initialized;
use crate::error::{check_ffi_ctx, GdError, GdResult};
use crate::ffi_dispatch;
use crate::gd::{Gd, GdObject};
use crate::logging::{log_message, LOG_DISPLAY, LOG_ERROR};
use crate::traits::GodotClass;

// ---------------------------------------------------------------------------
// Inventory-based auto-registration
// ---------------------------------------------------------------------------

/// Submitted by `#[gdclass]`.
pub struct ClassRegistration {
    pub class_name: &'static str,
    pub refcounted: bool,
    /// Shadow an existing native object with a default-initialized instance.
    pub create: fn(ObjectHandle) -> GdResult<GdObject>,
}
inventory::collect!(ClassRegistration);

/// Announce every submitted class to the engine. Returns how many were accepted.
pub fn register_all_from_inventory() -> usize {
    let mut accepted = 0usize;
    let mut total = 0usize;
    for reg in inventory::iter::<ClassRegistration> {
        total += 1;
        // SAFETY: called from init after the API table was installed.
        let code = unsafe { ffi_dispatch::class_db_register_class(reg.class_name, reg.refcounted) };
        match check_ffi_ctx(code, reg.class_name) {
            Ok(()) => accepted += 1,
            Err(err) => log_message(
                LOG_ERROR,
                &format!("[gdbind] failed to register class {}: {err}", reg.class_name),
            ),
        }
    }
    log_message(
        LOG_DISPLAY,
        &format!("[gdbind] register_all_from_inventory: {accepted}/{total} classes"),
    );
    accepted
}

/// Find the registration for a Rust-defined class.
pub fn find_registration(class_name: &str) -> Option<&'static ClassRegistration> {
    inventory::iter::<ClassRegistration>
        .into_iter()
        .find(|reg| reg.class_name == class_name)
}

// ---------------------------------------------------------------------------
// Class database boundary
// ---------------------------------------------------------------------------

/// Resolve the native type a class is constructible as.
pub fn resolve_constructible_type(class_name: &str) -> GdResult<ClassHandle> {
    if !is_api_initialized() {
        return Err(GdError::InvalidOperation("gdbind API not initialized".into()));
    }
    // SAFETY: API is initialized.
    let class = unsafe { ffi_dispatch::class_db_resolve_constructible_type(class_name) };
    if class.is_null() {
        Err(GdError::ClassNotFound(class_name.to_string()))
    } else {
        Ok(class)
    }
}

/// Construct a new default instance of `T`, backed by a fresh native object.
pub fn instantiate_managed<T: GodotClass + Default>() -> GdResult<Gd<T>> {
    Gd::new(T::default())
}

/// Default `ClassRegistration::create` for classes with a `Default` impl.
/// The engine owns the native object; the shadow lives until `free_instance`.
pub fn create_shadow<T: GodotClass + Default>(handle: ObjectHandle) -> GdResult<GdObject> {
    Gd::<T>::shadow(handle, T::default).map(|gd| gd.upcast())
}

/// Shadow an existing native object with the registered Rust class `class_name`.
pub fn instantiate_by_name(class_name: &str, handle: ObjectHandle) -> GdResult<GdObject> {
    let reg = find_registration(class_name)
        .ok_or_else(|| GdError::ClassNotFound(class_name.to_string()))?;
    (reg.create)(handle)
}
