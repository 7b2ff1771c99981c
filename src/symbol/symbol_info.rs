// Tue Jan 13 2026 - Alex

use crate::memory::{Address, MemoryRange};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedSymbol {
    pub name: String,
    pub address: Address,
}

impl ResolvedSymbol {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

impl fmt::Display for ResolvedSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.name, self.address)
    }
}

/// A function located by address: its symbol and the code range it spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSpan {
    pub symbol: ResolvedSymbol,
    pub range: MemoryRange,
}

impl FunctionSpan {
    pub fn offset_of(&self, pc: Address) -> u64 {
        pc.checked_sub(self.range.start()).unwrap_or(0)
    }

    pub fn format_pc(&self, pc: Address) -> String {
        match self.offset_of(pc) {
            0 => self.symbol.name.clone(),
            offset => format!("{}+0x{:x}", self.symbol.name, offset),
        }
    }
}
