// Logging bridge to the engine log.

use crate::api::is_api_initialized;
use crate::ffi_dispatch;

/// Log level constants for the `gdlog!` macro.
pub const LOG_DISPLAY: u8 = 0;
pub const LOG_WARNING: u8 = 1;
pub const LOG_ERROR: u8 = 2;

/// Send one message to the engine log. Dropped if the API table is not
/// installed yet (nothing to log to).
pub fn log_message(level: u8, msg: &str) {
    if !is_api_initialized() {
        return;
    }
    let bytes = msg.as_bytes();
    // SAFETY: the API table is initialized, and the logging sub-table pointer
    // is always valid after init.
    unsafe {
        ffi_dispatch::logging_log(level, bytes.as_ptr(), bytes.len() as u32);
    }
}

/// Log a message through the engine log.
///
/// Usage:
/// ```ignore
/// gdlog!(LOG_DISPLAY, "Player {} has {} health", name, hp);
/// gdlog!(LOG_WARNING, "something suspicious");
/// gdlog!(LOG_ERROR, "fatal: {err}");
/// ```
///
/// Level constants: `LOG_DISPLAY` (0), `LOG_WARNING` (1), `LOG_ERROR` (2).
#[macro_export]
macro_rules! gdlog {
    ($level:expr, $($arg:tt)*) => {{
        $crate::logging::log_message($level, &format!($($arg)*));
    }};
}
