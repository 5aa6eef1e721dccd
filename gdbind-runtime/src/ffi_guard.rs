// FFI boundary guard: wraps Rust callbacks to catch panics before they
// cross the FFI boundary (which is undefined behavior).

use std::any::Any;
use std::panic::{catch_unwind, UnwindSafe};

use crate::logging::{log_message, LOG_ERROR};

/// Execute `f` and catch any panic, returning `default` on failure.
///
/// All `extern "C"` functions called by the engine should wrap their body in
/// this guard. A panic that escapes across FFI is instant UB; this prevents that.
///
/// If the API table is initialized, the panic message is logged.
pub fn ffi_boundary<F, R>(default: R, f: F) -> R
where
    F: FnOnce() -> R + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(value) => value,
        Err(payload) => {
            log_message(LOG_ERROR, &format!("[gdbind] Rust panic: {}", panic_message(&payload)));
            default
        }
    }
}

/// Run a user hook, isolating a panic to this one call.
///
/// `op` and `class` only feed the diagnostic. The hook's own state may be
/// left half-updated by the panic; lifecycle fields are never touched here.
pub(crate) fn guard_hook<F, R>(op: &str, class: &str, default: R, f: F) -> R
where
    F: FnOnce() -> R,
{
    match catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            log_message(
                LOG_ERROR,
                &format!(
                    "[gdbind] hook '{op}' panicked on {class}: {}",
                    panic_message(&payload)
                ),
            );
            default
        }
    }
}

/// Extract a human-readable message from a panic payload.
pub(crate) fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ffi_boundary_returns_value_on_success() {
        let result = ffi_boundary(0i32, || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn ffi_boundary_returns_default_on_panic() {
        let result = ffi_boundary(-1i32, || {
            panic!("test panic");
        });
        assert_eq!(result, -1);
    }

    #[test]
    fn guard_hook_returns_default_on_string_panic() {
        let result = guard_hook("get", "Player", false, || -> bool {
            panic!("{}", "formatted panic");
        });
        assert!(!result);
    }

    #[test]
    fn panic_message_reads_both_payload_kinds() {
        let a: Box<dyn Any + Send> = Box::new("static");
        let b: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let c: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&a), "static");
        assert_eq!(panic_message(&b), "owned");
        assert_eq!(panic_message(&c), "unknown payload");
    }
}
