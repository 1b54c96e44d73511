//! WebAssembly module for the Asset Recovery Finance platform
//!
//! Provides client-side computation for:
//! - Batch P&L previews while figures are being edited
//! - ABC classification of inventory value groups
//! - Guarded percentages and amount validation for forms

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{
    build_abc_report, calculate_pnl, percentage, round_pct, validate_groups, ExpenseMap, PnLInput,
};

/// Batch figures as entered in the browser
#[derive(Debug, Deserialize)]
struct PnLPreviewInput {
    #[serde(default)]
    batch_id: Option<uuid::Uuid>,
    #[serde(default)]
    batch_code: String,
    units_sold: u32,
    units_scrapped: u32,
    units_pending: u32,
    gross_revenue: Decimal,
    #[serde(default)]
    scrap_revenue: Decimal,
    acquisition_cost: Decimal,
    #[serde(default)]
    expenses: BTreeMap<ExpenseCategory, Decimal>,
}

impl PnLPreviewInput {
    fn into_pnl_input(self) -> Result<PnLInput, String> {
        let amounts = [
            ("gross_revenue", self.gross_revenue),
            ("scrap_revenue", self.scrap_revenue),
            ("acquisition_cost", self.acquisition_cost),
        ];
        for (field, amount) in amounts
            .into_iter()
            .chain(self.expenses.iter().map(|(c, a)| (c.as_str(), *a)))
        {
            validate_amount(amount).map_err(|msg| format!("{}: {}", field, msg))?;
        }

        let total = self
            .units_sold
            .checked_add(self.units_scrapped)
            .and_then(|n| n.checked_add(self.units_pending))
            .ok_or_else(|| "Unit counts are too large".to_string())?;

        let expenses = self
            .expenses
            .iter()
            .fold(ExpenseMap::new(), |map, (category, amount)| {
                map.with(*category, *amount)
            });

        Ok(PnLInput {
            batch_id: self.batch_id.unwrap_or_else(uuid::Uuid::nil),
            batch_code: self.batch_code,
            counts: UnitCounts {
                total,
                sold: self.units_sold,
                pending: self.units_pending,
                scrapped: self.units_scrapped,
            },
            gross_revenue: self.gross_revenue,
            scrap_revenue: self.scrap_revenue,
            acquisition_cost: self.acquisition_cost,
            expenses,
        })
    }
}

fn pnl_preview(input_json: &str) -> Result<String, String> {
    let input: PnLPreviewInput =
        serde_json::from_str(input_json).map_err(|e| format!("Invalid batch JSON: {}", e))?;
    let pnl = calculate_pnl(&input.into_pnl_input()?);
    serde_json::to_string(&pnl).map_err(|e| e.to_string())
}

fn abc_report(groups_json: &str) -> Result<String, String> {
    let groups: Vec<InventoryValueGroup> =
        serde_json::from_str(groups_json).map_err(|e| format!("Invalid groups JSON: {}", e))?;
    validate_groups(&groups).map_err(|e| e.to_string())?;
    let report = build_abc_report(groups).map_err(|e| e.to_string())?;
    serde_json::to_string(&report).map_err(|e| e.to_string())
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

/// Compute a full P&L from batch figures (JSON in, JSON out)
#[wasm_bindgen]
pub fn calculate_batch_pnl(input_json: &str) -> Result<String, JsValue> {
    pnl_preview(input_json).map_err(to_js_error)
}

/// Rank value groups and classify them A/B/C (JSON in, JSON out)
#[wasm_bindgen]
pub fn classify_inventory_abc(groups_json: &str) -> Result<String, JsValue> {
    abc_report(groups_json).map_err(to_js_error)
}

/// `part / whole × 100` to one decimal, 0 when `whole` is 0
#[wasm_bindgen]
pub fn safe_percentage(part: f64, whole: f64) -> f64 {
    let (Ok(part), Ok(whole)) = (Decimal::try_from(part), Decimal::try_from(whole)) else {
        return 0.0;
    };
    round_pct(percentage(part, whole)).to_f64().unwrap_or(0.0)
}

/// Whether a user-entered amount is numeric and not negative
#[wasm_bindgen]
pub fn is_valid_amount(raw: &str) -> bool {
    parse_amount(raw).is_ok()
}
