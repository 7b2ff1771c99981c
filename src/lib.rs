// Tue Jan 15 2026 - Alex

//! Name-to-address resolution over Go's runtime function metadata
//! (`pclntab`, 1.16/1.17 layout), plus a guarded way to call what was found.

pub mod config;
pub mod layout;
pub mod memory;
pub mod output;
pub mod symbol;
pub mod ui;

pub use config::Config;
pub use layout::{decode_header, FunctionTable, Header, LayoutError};
pub use memory::{Address, MetadataBlob};
pub use symbol::{resolve, synthesize, SymbolError, SymbolResolver};
