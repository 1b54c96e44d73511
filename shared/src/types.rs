//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Unit counts of a batch, partitioned by asset disposition.
///
/// `sold + pending + scrapped == total` holds for every value produced by
/// [`crate::finance::compute_unit_counts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCounts {
    pub total: u32,
    pub sold: u32,
    pub pending: u32,
    pub scrapped: u32,
}

impl UnitCounts {
    /// Units that reached a final disposition (sold or scrapped)
    pub fn closed(&self) -> u32 {
        self.sold + self.scrapped
    }
}

/// Which batch-level total a quick edit adjusts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchTotalKind {
    /// Acquisition cost of the whole batch
    Cost,
    /// Gross sale revenue override
    Revenue,
    /// Revenue from scrapped units
    Scrap,
}

impl BatchTotalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchTotalKind::Cost => "cost",
            BatchTotalKind::Revenue => "revenue",
            BatchTotalKind::Scrap => "scrap",
        }
    }
}

impl std::fmt::Display for BatchTotalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
