// Tue Jan 13 2026 - Alex

use crate::layout::{decode_header, decode_name, FunctionDescriptor, FunctionTable, Header, LayoutError};
use crate::memory::{Address, MetadataBlob};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutIssue {
    Unordered { index: usize, previous: Address, entry: Address },
    EntryMismatch { index: usize, table: Address, descriptor: Address },
    BadDescriptor { index: usize, reason: String },
    BadName { index: usize, reason: String },
    MissingSentinel { reason: String },
    SentinelBeforeLastEntry { sentinel: Address, last: Address },
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::Unordered { index, previous, entry } => {
                write!(f, "record {} entry {} precedes previous entry {}", index, entry, previous)
            }
            LayoutIssue::EntryMismatch { index, table, descriptor } => write!(
                f,
                "record {} table entry {} differs from descriptor entry {}",
                index, table, descriptor
            ),
            LayoutIssue::BadDescriptor { index, reason } => {
                write!(f, "record {} descriptor unreadable: {}", index, reason)
            }
            LayoutIssue::BadName { index, reason } => {
                write!(f, "record {} name unreadable: {}", index, reason)
            }
            LayoutIssue::MissingSentinel { reason } => write!(f, "end-of-text record unreadable: {}", reason),
            LayoutIssue::SentinelBeforeLastEntry { sentinel, last } => {
                write!(f, "end of text {} precedes last entry {}", sentinel, last)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub header: Header,
    pub checked: usize,
    pub issues: Vec<LayoutIssue>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Cross-checks a blob for signs of layout drift the magic alone cannot catch.
///
/// A bad header or a truncated table is returned as an error; problems with
/// individual records are collected into the report.
pub fn verify(blob: &MetadataBlob<'_>) -> Result<VerifyReport, LayoutError> {
    let header = decode_header(blob)?;
    let table = FunctionTable::new(*blob, header);
    let mut issues = Vec::new();
    let mut previous: Option<Address> = None;
    let mut checked = 0;

    for (index, entry) in table.entries().enumerate() {
        let entry = entry?;
        checked += 1;

        if let Some(previous) = previous {
            if entry.entry < previous {
                issues.push(LayoutIssue::Unordered {
                    index,
                    previous,
                    entry: entry.entry,
                });
            }
        }
        previous = Some(entry.entry);

        match FunctionDescriptor::decode(blob, &header, entry.metadata_offset) {
            Ok(descriptor) if descriptor.entry != entry.entry => {
                issues.push(LayoutIssue::EntryMismatch {
                    index,
                    table: entry.entry,
                    descriptor: descriptor.entry,
                });
            }
            Ok(_) => {}
            Err(err) => issues.push(LayoutIssue::BadDescriptor {
                index,
                reason: err.to_string(),
            }),
        }

        if let Err(err) = decode_name(blob, &header, entry.metadata_offset) {
            issues.push(LayoutIssue::BadName {
                index,
                reason: err.to_string(),
            });
        }
    }

    match table.end_of_text() {
        Ok(sentinel) => {
            if let Some(last) = previous.filter(|last| sentinel < *last) {
                issues.push(LayoutIssue::SentinelBeforeLastEntry { sentinel, last });
            }
        }
        Err(err) => issues.push(LayoutIssue::MissingSentinel {
            reason: err.to_string(),
        }),
    }

    for issue in &issues {
        log::warn!("Layout issue: {}", issue);
    }

    Ok(VerifyReport {
        header,
        checked,
        issues,
    })
}
