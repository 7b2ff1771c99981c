// Tue Jan 13 2026 - Alex

pub mod address;
pub mod binary;
pub mod blob;
pub mod error;
pub mod mmap;
pub mod range;
pub mod traits;

pub use address::Address;
pub use binary::{BinaryImage, MetadataSection, DEFAULT_SECTION_NAMES};
pub use blob::MetadataBlob;
pub use error::MemoryError;
pub use mmap::MmapMemory;
pub use range::MemoryRange;
pub use traits::MemoryReader;
