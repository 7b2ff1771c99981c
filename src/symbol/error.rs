// Tue Jan 13 2026 - Alex

use crate::layout::LayoutError;
use crate::symbol::CallableError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("Symbol not found: {0}")]
    NotFound(String),
    #[error("Incompatible metadata layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("Cannot synthesize callable: {0}")]
    Callable(#[from] CallableError),
}

impl SymbolError {
    /// A missing name is the one outcome callers are expected to handle,
    /// e.g. by trying another name.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SymbolError::NotFound(_))
    }
}
