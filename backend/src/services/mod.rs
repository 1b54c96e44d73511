//! Business logic services for the settlement engine

pub mod batch;
pub mod inventory;
pub mod pnl;
pub mod settlement;

pub use batch::BatchService;
pub use inventory::InventoryService;
pub use pnl::PnLService;
pub use settlement::{LedgerWrite, SettlementService};
