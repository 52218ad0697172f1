//! Sequential number allocation.
//!
//! Numbers have the shape `PREFIX-YEAR-NNNN` and are unique within an
//! (organization, kind, year) scope. Allocation is max-based: the next
//! number is the highest existing trailing integer plus one, so gaps left
//! by deleted records are never re-filled.
//!
//! Allocation itself has no side effects. The caller persists the owning
//! record under a unique index; under concurrent allocation two callers can
//! compute the same number and the storage layer rejects the second write
//! as a conflict, which the caller detects and retries with a fresh
//! allocation.

use serde::{Deserialize, Serialize};

/// Document kinds that own a numbering sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Order,
    Quote,
    Invoice,
    CombinedInvoice,
    WorkOrder,
    /// Fallback prefix for ad-hoc documents outside the fixed kinds.
    Generic,
}

impl SequenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Order => "ORD",
            SequenceKind::Quote => "OFF",
            SequenceKind::Invoice => "FACT",
            SequenceKind::CombinedInvoice => "FACT",
            SequenceKind::WorkOrder => "WB",
            SequenceKind::Generic => "DOC",
        }
    }

    /// SQL LIKE pattern matching every number of this kind in `year`.
    pub fn pattern(&self, year: i32) -> String {
        format!("{}-{}-%", self.prefix(), year)
    }

    /// Format a number in this sequence, zero-padded to at least 4 digits.
    pub fn format_number(&self, year: i32, n: u32) -> String {
        format!("{}-{}-{:04}", self.prefix(), year, n)
    }
}

/// Compute the next number in a sequence given the lexicographically
/// maximal existing number for the scope (or `None` when the scope is
/// empty). The trailing field of the current maximum is parsed as an
/// integer; on absence or parse failure the sequence restarts at 1.
pub fn next_in_sequence(kind: SequenceKind, year: i32, current_max: Option<&str>) -> String {
    let next = current_max
        .and_then(|number| number.rsplit('-').next())
        .and_then(|tail| tail.parse::<u32>().ok())
        .map(|n| n + 1)
        .unwrap_or(1);
    kind.format_number(year, next)
}
