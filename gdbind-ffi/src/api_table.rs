use crate::error::GdErrorCode;
use crate::handles::*;

/// Bumped whenever a sub-table layout changes. The engine glue writes the
/// version it was built against into [`GdApiTable::version`].
pub const GDBIND_API_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Main API table
// ---------------------------------------------------------------------------

/// The top-level table passed from the engine glue to Rust at init time.
/// Every sub-table pointer is non-null and lives for the whole library lifetime.
#[repr(C)]
pub struct GdApiTable {
    pub version: u32,

    pub core: *const GdCoreApi,
    pub class_db: *const GdClassDbApi,
    pub refcount: *const GdRefCountApi,
    pub type_db: *const GdTypeDbApi,
    pub engine: *const GdEngineApi,
    pub logging: *const GdLoggingApi,
}

unsafe impl Send for GdApiTable {}
unsafe impl Sync for GdApiTable {}

// ---------------------------------------------------------------------------
// GdCoreApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdCoreApi {
    /// Write the object's native class name into a caller-supplied buffer (UTF-8).
    pub get_class_name: unsafe extern "C" fn(
        obj: ObjectHandle,
        buf: *mut u8,
        buf_len: u32,
        out_len: *mut u32,
    ) -> GdErrorCode,
}

// ---------------------------------------------------------------------------
// GdClassDbApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdClassDbApi {
    /// Announce a Rust-defined class so the engine can construct it by name.
    pub register_class: unsafe extern "C" fn(name: GdStr, refcounted: bool) -> GdErrorCode,

    /// Find the native type a managed class is constructible as.
    /// Returns a null handle if the class is unknown.
    pub resolve_constructible_type: unsafe extern "C" fn(name: GdStr) -> ClassHandle,

    /// Create a fresh native object of `class` bound to `binding`.
    /// Returns a null handle on failure.
    pub make_handle_for_managed:
        unsafe extern "C" fn(class: ClassHandle, binding: BindingHandle) -> ObjectHandle,
}

// ---------------------------------------------------------------------------
// GdRefCountApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdRefCountApi {
    /// Increment the intrusive reference count. Returns false if the object
    /// is not reference-counted.
    pub reference: unsafe extern "C" fn(obj: ObjectHandle) -> bool,
    /// Decrement the intrusive reference count. Returns true when the count
    /// reached zero (the engine frees the object afterwards).
    pub unreference: unsafe extern "C" fn(obj: ObjectHandle) -> bool,
    /// Current reference count, or -1 if the object is not reference-counted.
    pub get_reference_count: unsafe extern "C" fn(obj: ObjectHandle) -> i64,
}

// ---------------------------------------------------------------------------
// GdTypeDbApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdTypeDbApi {
    /// Look up a global class by name. Writes the descriptor into `out_class`
    /// and returns true when found.
    pub search: unsafe extern "C" fn(name: GdStr, out_class: *mut ClassHandle) -> bool,
}

// ---------------------------------------------------------------------------
// GdEngineApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdEngineApi {
    pub register_script_language: unsafe extern "C" fn(language: ObjectHandle) -> GdErrorCode,
    pub unregister_script_language: unsafe extern "C" fn(language: ObjectHandle) -> GdErrorCode,
}

// ---------------------------------------------------------------------------
// GdLoggingApi
// ---------------------------------------------------------------------------

#[repr(C)]
pub struct GdLoggingApi {
    /// Bridge to the engine log. `level`: 0=Display, 1=Warning, 2=Error.
    /// `msg` is a UTF-8 byte slice (not null-terminated).
    pub log: unsafe extern "C" fn(level: u8, msg: *const u8, msg_len: u32),
}
