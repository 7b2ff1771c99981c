// Tue Jan 13 2026 - Alex

use crate::memory::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open address range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRange {
    start: Address,
    end: Address,
}

impl MemoryRange {
    pub fn try_new(start: Address, end: Address) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    pub fn from_start_size(start: Address, size: u64) -> Self {
        Self {
            start,
            end: Address::new(start.as_u64().saturating_add(size)),
        }
    }

    pub fn start(&self) -> Address {
        self.start
    }

    pub fn end(&self) -> Address {
        self.end
    }

    pub fn size(&self) -> u64 {
        self.end.as_u64() - self.start.as_u64()
    }

    pub fn contains(&self, addr: Address) -> bool {
        addr.is_within_range(self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
