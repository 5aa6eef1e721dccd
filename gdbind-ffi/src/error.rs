/// FFI error codes shared between Rust and the engine glue.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GdErrorCode {
    Ok = 0,
    ObjectDisposed = 1,
    InvalidCast = 2,
    ClassNotFound = 3,
    NullArgument = 4,
    InvalidOperation = 5,
    InternalError = 6,
    BufferTooSmall = 7,
    AlreadyBound = 8,
}
