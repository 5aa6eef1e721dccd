// gdbind-macros: proc macros for #[gdclass].

mod gdclass;

/// Attribute macro for declaring a Rust struct as an engine class.
///
/// Implements `GodotClass` for the struct and registers it so the engine can
/// construct it by name. The struct itself is left unchanged; implement
/// `ObjectHooks` for it (an empty impl is enough) and `Default`.
///
/// Arguments:
/// - `refcounted`: the native counterpart is reference-counted.
/// - `name = "..."`: class name seen by the engine (defaults to the struct name).
///
/// # Example
/// ```ignore
/// #[gdclass(refcounted)]
/// #[derive(Default)]
/// pub struct Inventory {
///     slots: Vec<String>,
/// }
///
/// impl ObjectHooks for Inventory {}
/// ```
#[proc_macro_attribute]
pub fn gdclass(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    match gdclass::expand_gdclass(attr.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
