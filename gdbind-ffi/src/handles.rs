use std::ffi::c_void;

/// Opaque handle to an engine object. Rust never dereferences it; it is an
/// engine-side identifier. Null means "no object".
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectHandle(pub *mut c_void);

/// Opaque handle to a native class descriptor from the engine's class database.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClassHandle(pub *mut c_void);

/// Stable self-reference of a Rust wrapper, handed to the engine so it can
/// call back into the right instance. Zero is never allocated.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct BindingHandle(pub u64);

macro_rules! pointer_handle {
    ($ty:ident) => {
        impl $ty {
            #[inline]
            pub const fn null() -> Self {
                $ty(std::ptr::null_mut())
            }

            #[inline]
            pub fn is_null(&self) -> bool {
                self.0.is_null()
            }

            /// Integer value of the handle, used as a map key.
            #[inline]
            pub fn to_addr(&self) -> u64 {
                self.0 as usize as u64
            }

            #[inline]
            pub fn from_addr(addr: u64) -> Self {
                $ty(addr as usize as *mut c_void)
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty::null()
            }
        }
    };
}

pointer_handle!(ObjectHandle);
pointer_handle!(ClassHandle);

impl BindingHandle {
    pub const NULL: BindingHandle = BindingHandle(0);

    #[inline]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Borrowed UTF-8 string crossing the boundary (not null-terminated).
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct GdStr {
    pub ptr: *const u8,
    pub len: u32,
}

impl GdStr {
    pub const EMPTY: GdStr = GdStr {
        ptr: std::ptr::null(),
        len: 0,
    };

    /// Borrow a Rust string. The result is only valid while `s` is.
    #[inline]
    pub fn new(s: &str) -> Self {
        GdStr {
            ptr: s.as_ptr(),
            len: s.len() as u32,
        }
    }

    /// View the bytes as `&str`. Returns `None` for invalid UTF-8.
    /// A null pointer is read as the empty string.
    ///
    /// # Safety
    /// `ptr` must be null or point to `len` readable bytes that outlive `'a`.
    pub unsafe fn as_str<'a>(&self) -> Option<&'a str> {
        if self.ptr.is_null() || self.len == 0 {
            return Some("");
        }
        let bytes = unsafe { std::slice::from_raw_parts(self.ptr, self.len as usize) };
        std::str::from_utf8(bytes).ok()
    }
}

impl Default for GdStr {
    fn default() -> Self {
        GdStr::EMPTY
    }
}

// Handles are raw FFI identifiers. They can be sent across threads
// (but must only be *used* on the engine thread).
// Sync is needed for OnceLock / static storage.
unsafe impl Send for ObjectHandle {}
unsafe impl Sync for ObjectHandle {}
unsafe impl Send for ClassHandle {}
unsafe impl Sync for ClassHandle {}
unsafe impl Send for GdStr {}
unsafe impl Sync for GdStr {}
