// Global type lookup through the engine's type database.

use gdbind_ffi::ClassHandle;

use crate::api::is_api_initialized;
use crate::ffi_dispatch;

/// Look up a global class by name. `None` if unknown or if the API is not
/// initialized yet.
pub fn search(name: &str) -> Option<ClassHandle> {
    if !is_api_initialized() {
        return None;
    }
    let mut class = ClassHandle::null();
    // SAFETY: API is initialized; `class` is a valid out-pointer.
    let found = unsafe { ffi_dispatch::type_db_search(name, &mut class) };
    found.then_some(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_engine;

    #[test]
    fn search_finds_declared_globals_only() {
        mock_engine::install();
        mock_engine::declare_global_type("TypeDbGlobal");
        let found = search("TypeDbGlobal").unwrap();
        assert!(!found.is_null());
        assert!(search("TypeDbMissing").is_none());
    }
}
