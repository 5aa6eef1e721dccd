use std::ffi::c_void;

use crate::handles::*;
use crate::wire::GdPropertyInfo;

/// Callback table filled by Rust and returned to the engine from `gdbind_init`.
/// The engine calls into Rust through these function pointers, addressing the
/// target wrapper by its native handle.
///
/// Value slots (`arg`, `value`, `ret`) are opaque pointers to runtime
/// `Variant`s allocated by the host glue; Rust never frees them.
#[repr(C)]
pub struct GdRustCallbacks {
    /// Number of dynamic properties the object currently exposes.
    pub property_count: extern "C" fn(obj: ObjectHandle) -> u64,

    /// Fill `buf[..len]` with property descriptors. Returns the number of
    /// entries written. Strings stay valid until the next call for this object.
    pub get_property_list:
        extern "C" fn(obj: ObjectHandle, buf: *mut GdPropertyInfo, len: u64) -> u64,

    /// Dynamic method call with a single argument slot and a single result slot.
    pub call: extern "C" fn(obj: ObjectHandle, method: GdStr, arg: *const c_void, ret: *mut c_void),

    pub set: extern "C" fn(obj: ObjectHandle, property: GdStr, value: *const c_void) -> bool,

    pub get: extern "C" fn(obj: ObjectHandle, property: GdStr, value: *mut c_void) -> bool,

    /// Lets the object rewrite a descriptor in place. Returns true if it changed.
    pub validate_property: extern "C" fn(obj: ObjectHandle, info: *mut GdPropertyInfo) -> bool,

    pub property_can_revert: extern "C" fn(obj: ObjectHandle, property: GdStr) -> bool,

    pub property_get_revert:
        extern "C" fn(obj: ObjectHandle, property: GdStr, ret: *mut c_void) -> bool,

    pub notification: extern "C" fn(obj: ObjectHandle, what: i32, reversed: bool) -> bool,

    /// Engine asks Rust to shadow an existing native object with a registered
    /// Rust class. Returns the new binding, or a null binding on failure.
    pub create_instance: extern "C" fn(class_name: GdStr, obj: ObjectHandle) -> BindingHandle,

    /// The engine freed a native object that has a Rust wrapper.
    pub free_instance: extern "C" fn(obj: ObjectHandle),

    /// Called once per engine tick.
    pub frame: extern "C" fn(),

    /// Shutdown notification. Rust should release all resources.
    pub on_shutdown: extern "C" fn(),
}
