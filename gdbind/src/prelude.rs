// Prelude: one-import access to the most commonly used gdbind types.
//
// Usage: `use gdbind::prelude::*;`

// Core runtime types
pub use gdbind_runtime::{
    Gd, GdObject, GdResult, GdError, GodotClass, ObjectHooks,
    StringName, Variant, PropertyInfo,
    ScriptLanguageExtension, LanguageSlot,
    handle_of, is_instance_valid,
    LOG_DISPLAY, LOG_WARNING, LOG_ERROR,
};
pub use gdbind_runtime::gdlog;

// FFI types that show up in hook signatures
pub use gdbind_runtime::{ObjectHandle, PropertyHint, VariantType};

// Proc macros
pub use gdbind_macros::gdclass;

// Built-in script language (feature-gated)
#[cfg(feature = "script-language")]
pub use crate::rust_language::RustLanguage;
#[cfg(feature = "script-language")]
pub use crate::rust_script::RustScript;
