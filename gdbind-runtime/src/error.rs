// Error types for the gdbind runtime.

use std::fmt;

use gdbind_ffi::GdErrorCode;

/// Rich error type for gdbind operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GdError {
    ObjectDisposed,
    InvalidCast,
    /// The class registry could not resolve a constructible native type.
    ClassNotFound(String),
    NullHandle,
    AlreadyBound,
    InvalidOperation(String),
    Internal(String),
    BufferTooSmall,
}

impl fmt::Display for GdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GdError::ObjectDisposed => write!(f, "object has been disposed"),
            GdError::InvalidCast => write!(f, "invalid cast"),
            GdError::ClassNotFound(name) => write!(f, "class not found: {name}"),
            GdError::NullHandle => write!(f, "null object handle"),
            GdError::AlreadyBound => write!(f, "native object already has a wrapper"),
            GdError::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
            GdError::Internal(msg) => write!(f, "internal error: {msg}"),
            GdError::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

impl std::error::Error for GdError {}

/// Convenience alias used throughout the runtime.
pub type GdResult<T> = Result<T, GdError>;

/// Convert an FFI error code to a `GdResult<()>`.
pub fn check_ffi(code: GdErrorCode) -> GdResult<()> {
    match code {
        GdErrorCode::Ok => Ok(()),
        other => Err(GdError::from(other)),
    }
}

/// Like `check_ffi`, but enriches errors that carry a name or message.
pub fn check_ffi_ctx(code: GdErrorCode, context: &str) -> GdResult<()> {
    match code {
        GdErrorCode::Ok => Ok(()),
        GdErrorCode::ClassNotFound => Err(GdError::ClassNotFound(context.into())),
        GdErrorCode::InvalidOperation => Err(GdError::InvalidOperation(context.into())),
        other => Err(GdError::from(other)),
    }
}

impl From<GdErrorCode> for GdError {
    fn from(code: GdErrorCode) -> Self {
        match code {
            GdErrorCode::Ok => {
                // Callers should not convert Ok into an error. If they do,
                // treat it as an internal logic bug.
                GdError::Internal("unexpected Ok error code".into())
            }
            GdErrorCode::ObjectDisposed => GdError::ObjectDisposed,
            GdErrorCode::InvalidCast => GdError::InvalidCast,
            GdErrorCode::ClassNotFound => GdError::ClassNotFound(String::new()),
            GdErrorCode::NullArgument => GdError::NullHandle,
            GdErrorCode::InvalidOperation => GdError::InvalidOperation(String::new()),
            GdErrorCode::InternalError => GdError::Internal(String::new()),
            GdErrorCode::BufferTooSmall => GdError::BufferTooSmall,
            GdErrorCode::AlreadyBound => GdError::AlreadyBound,
        }
    }
}

impl From<&GdError> for GdErrorCode {
    fn from(err: &GdError) -> Self {
        match err {
            GdError::ObjectDisposed => GdErrorCode::ObjectDisposed,
            GdError::InvalidCast => GdErrorCode::InvalidCast,
            GdError::ClassNotFound(_) => GdErrorCode::ClassNotFound,
            GdError::NullHandle => GdErrorCode::NullArgument,
            GdError::AlreadyBound => GdErrorCode::AlreadyBound,
            GdError::InvalidOperation(_) => GdErrorCode::InvalidOperation,
            GdError::Internal(_) => GdErrorCode::InternalError,
            GdError::BufferTooSmall => GdErrorCode::BufferTooSmall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_ffi_ok_returns_ok() {
        assert!(check_ffi(GdErrorCode::Ok).is_ok());
    }

    #[test]
    fn check_ffi_errors_map_correctly() {
        let cases = [
            (GdErrorCode::ObjectDisposed, "ObjectDisposed"),
            (GdErrorCode::InvalidCast, "InvalidCast"),
            (GdErrorCode::ClassNotFound, "ClassNotFound"),
            (GdErrorCode::NullArgument, "NullHandle"),
            (GdErrorCode::InvalidOperation, "InvalidOperation"),
            (GdErrorCode::InternalError, "Internal"),
            (GdErrorCode::BufferTooSmall, "BufferTooSmall"),
            (GdErrorCode::AlreadyBound, "AlreadyBound"),
        ];
        for (code, expected_variant) in cases {
            let err = check_ffi(code).unwrap_err();
            let debug = format!("{err:?}");
            assert!(
                debug.starts_with(expected_variant),
                "expected {expected_variant}, got {debug}"
            );
            assert_eq!(GdErrorCode::from(&err), code);
        }
    }

    #[test]
    fn check_ffi_ctx_names_the_class() {
        let err = check_ffi_ctx(GdErrorCode::ClassNotFound, "Player").unwrap_err();
        assert_eq!(err, GdError::ClassNotFound("Player".into()));
        assert_eq!(err.to_string(), "class not found: Player");
    }
}
