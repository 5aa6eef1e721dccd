// Global API table storage. Initialized once during library load, then read-only.

use std::sync::OnceLock;

use gdbind_ffi::GdApiTable;

/// Wrapper so a raw pointer can live inside OnceLock (which requires Send+Sync).
/// SAFETY: The API table is created by the engine glue before gdbind_init and
/// lives for the entire library lifetime. Access is read-only after init.
struct ApiRef(*const GdApiTable);
unsafe impl Send for ApiRef {}
unsafe impl Sync for ApiRef {}

static API: OnceLock<ApiRef> = OnceLock::new();

/// Store the API table pointer. Called once by `gdbind_init`.
/// Panics if called more than once.
pub fn init_api(table: *const GdApiTable) {
    assert!(!table.is_null(), "init_api called with null pointer");
    if API.set(ApiRef(table)).is_err() {
        panic!("init_api called more than once");
    }
}

/// Access the global API table. Panics if called before `init_api`.
#[inline(always)]
pub fn api() -> &'static GdApiTable {
    // SAFETY: The pointer was validated non-null in init_api, and the engine
    // glue guarantees the table outlives the library.
    unsafe { &*API.get().expect("gdbind API not initialized").0 }
}

/// Returns true if the API table has been initialized.
#[inline]
pub fn is_api_initialized() -> bool {
    API.get().is_some()
}
