// gdbind-ffi: #[repr(C)] types, handle types, API table and callback table.
// Zero external dependencies. This crate defines the complete Rust <-> engine contract.

pub mod handles;
pub mod error;
pub mod wire;
pub mod api_table;
pub mod callbacks;

pub use handles::*;
pub use error::*;
pub use wire::*;
pub use api_table::*;
pub use callbacks::*;
