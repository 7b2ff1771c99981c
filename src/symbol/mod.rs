// Tue Jan 13 2026 - Alex

pub mod callable;
pub mod error;
pub mod index;
pub mod resolver;
pub mod symbol_info;

pub use callable::{synthesize, CallableError, FunctionPointer};
pub use error::SymbolError;
pub use index::SymbolIndex;
pub use resolver::{resolve, SymbolResolver};
pub use symbol_info::{FunctionSpan, ResolvedSymbol};
