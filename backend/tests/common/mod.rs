//! Fixtures shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use asset_recovery_backend::store::{FinanceStore, MemoryFinanceStore};
use chrono::Utc;
use rust_decimal::Decimal;
use shared::{AssetRecord, AssetStatus, Batch};
use uuid::Uuid;

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn memory_store() -> Arc<MemoryFinanceStore> {
    Arc::new(MemoryFinanceStore::new("LIQ"))
}

pub fn as_dyn(store: &Arc<MemoryFinanceStore>) -> Arc<dyn FinanceStore> {
    store.clone()
}

pub async fn seed_batch(store: &MemoryFinanceStore, code: &str) -> Uuid {
    let id = Uuid::new_v4();
    store
        .add_batch(Batch {
            id,
            code: code.to_string(),
            client_reference: Some("ACME Corp".to_string()),
            created_at: Utc::now(),
        })
        .await;
    id
}

pub async fn seed_asset(
    store: &MemoryFinanceStore,
    batch_id: Uuid,
    status: &str,
    cost: i64,
    sale_price: Option<i64>,
) {
    store
        .add_asset(AssetRecord {
            id: Uuid::new_v4(),
            batch_id,
            cost_amount: dec(cost),
            sale_price: sale_price.map(dec),
            status: AssetStatus::from(status),
            brand: Some("Dell".to_string()),
            model: Some("Latitude 5400".to_string()),
            asset_type: Some("laptop".to_string()),
        })
        .await;
}

/// Ten units: 6 sold for 15 000 in total, 1 scrapped, 3 pending; cost 10 000
pub async fn seed_reference_batch(store: &MemoryFinanceStore) -> Uuid {
    let batch_id = seed_batch(store, "LOT-2024-0001").await;
    for _ in 0..6 {
        seed_asset(store, batch_id, "sold", 1_000, Some(2_500)).await;
    }
    seed_asset(store, batch_id, "scrapped", 1_000, None).await;
    for _ in 0..3 {
        seed_asset(store, batch_id, "pending", 1_000, None).await;
    }
    batch_id
}
