//! Asset models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recovered IT asset belonging to a batch.
///
/// Cost and status are written by the reception, repair and sales workflows;
/// the settlement engine only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetRecord {
    pub id: Uuid,
    pub batch_id: Uuid,
    /// Acquisition cost attributed to this unit
    pub cost_amount: Decimal,
    /// Final sale price, `None` until the unit is sold
    pub sale_price: Option<Decimal>,
    pub status: AssetStatus,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub asset_type: Option<String>,
}

impl AssetRecord {
    /// Revenue this asset contributes to its batch
    pub fn realized_revenue(&self) -> Decimal {
        if self.status.is_sold() {
            self.sale_price.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// Lifecycle status of an asset as far as settlement is concerned.
///
/// The store holds many workflow statuses (received, in_repair, wiped, ...).
/// Anything that is not sold or scrapped is still pending; unknown values are
/// kept verbatim so they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetStatus {
    Pending,
    Sold,
    Scrapped,
    Other(String),
}

impl AssetStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AssetStatus::Pending => "pending",
            AssetStatus::Sold => "sold",
            AssetStatus::Scrapped => "scrapped",
            AssetStatus::Other(raw) => raw,
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, AssetStatus::Sold)
    }

    pub fn is_scrapped(&self) -> bool {
        matches!(self, AssetStatus::Scrapped)
    }
}

impl From<&str> for AssetStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => AssetStatus::Pending,
            "sold" => AssetStatus::Sold,
            "scrapped" => AssetStatus::Scrapped,
            other => AssetStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for AssetStatus {
    fn from(raw: String) -> Self {
        AssetStatus::from(raw.as_str())
    }
}

impl From<AssetStatus> for String {
    fn from(status: AssetStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(AssetStatus::from("sold"), AssetStatus::Sold);
        assert_eq!(AssetStatus::from("scrapped"), AssetStatus::Scrapped);
        assert_eq!(AssetStatus::from("pending"), AssetStatus::Pending);
        assert_eq!(
            AssetStatus::from("in_repair"),
            AssetStatus::Other("in_repair".to_string())
        );
    }

    #[test]
    fn test_status_serde_keeps_unknown_values() {
        let status: AssetStatus = serde_json::from_str("\"quality_control\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"quality_control\"");
    }

    #[test]
    fn test_unsold_asset_contributes_no_revenue() {
        let mut asset = AssetRecord {
            id: Uuid::new_v4(),
            batch_id: Uuid::new_v4(),
            cost_amount: Decimal::from(100),
            sale_price: Some(Decimal::from(250)),
            status: AssetStatus::Pending,
            brand: None,
            model: None,
            asset_type: None,
        };
        assert_eq!(asset.realized_revenue(), Decimal::ZERO);

        asset.status = AssetStatus::Sold;
        assert_eq!(asset.realized_revenue(), Decimal::from(250));

        asset.sale_price = None;
        assert_eq!(asset.realized_revenue(), Decimal::ZERO);
    }
}
