// Thin unsafe wrappers over the API table: one function per table entry.
// Everything above this module goes through these; nothing else dereferences
// sub-table pointers.
//
// SAFETY (all functions): the API table must be initialized, and handle
// arguments must be values the engine handed out (or null where allowed).

use gdbind_ffi::{BindingHandle, ClassHandle, GdErrorCode, GdStr, ObjectHandle};

use crate::api::api;

// -- core --

#[inline]
pub unsafe fn core_get_class_name(
    obj: ObjectHandle,
    buf: *mut u8,
    buf_len: u32,
    out_len: *mut u32,
) -> GdErrorCode {
    unsafe { ((*api().core).get_class_name)(obj, buf, buf_len, out_len) }
}

// -- class_db --

#[inline]
pub unsafe fn class_db_register_class(name: &str, refcounted: bool) -> GdErrorCode {
    unsafe { ((*api().class_db).register_class)(GdStr::new(name), refcounted) }
}

#[inline]
pub unsafe fn class_db_resolve_constructible_type(name: &str) -> ClassHandle {
    unsafe { ((*api().class_db).resolve_constructible_type)(GdStr::new(name)) }
}

#[inline]
pub unsafe fn class_db_make_handle_for_managed(
    class: ClassHandle,
    binding: BindingHandle,
) -> ObjectHandle {
    unsafe { ((*api().class_db).make_handle_for_managed)(class, binding) }
}

// -- refcount --

#[inline]
pub unsafe fn refcount_reference(obj: ObjectHandle) -> bool {
    unsafe { ((*api().refcount).reference)(obj) }
}

#[inline]
pub unsafe fn refcount_unreference(obj: ObjectHandle) -> bool {
    unsafe { ((*api().refcount).unreference)(obj) }
}

#[inline]
pub unsafe fn refcount_get_reference_count(obj: ObjectHandle) -> i64 {
    unsafe { ((*api().refcount).get_reference_count)(obj) }
}

// -- type_db --

#[inline]
pub unsafe fn type_db_search(name: &str, out_class: *mut ClassHandle) -> bool {
    unsafe { ((*api().type_db).search)(GdStr::new(name), out_class) }
}

// -- engine --

#[inline]
pub unsafe fn engine_register_script_language(language: ObjectHandle) -> GdErrorCode {
    unsafe { ((*api().engine).register_script_language)(language) }
}

#[inline]
pub unsafe fn engine_unregister_script_language(language: ObjectHandle) -> GdErrorCode {
    unsafe { ((*api().engine).unregister_script_language)(language) }
}

// -- logging --

#[inline]
pub unsafe fn logging_log(level: u8, msg: *const u8, msg_len: u32) {
    unsafe { ((*api().logging).log)(level, msg, msg_len) }
}
