// Tue Jan 13 2026 - Alex

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod functab;
pub mod header;
pub mod verify;

pub use builder::ImageBuilder;
pub use descriptor::{decode_name, decode_name_offset, name_at, FunctionDescriptor};
pub use error::LayoutError;
pub use functab::{FunctionEntries, FunctionSlot, FunctionTable, FunctionTableEntry};
pub use header::{decode_header, Header, TableKind, HEADER_PREFIX_SIZE, MAGIC};
pub use verify::{verify, LayoutIssue, VerifyReport};
