//! Domain models for the Asset Recovery Finance platform

mod asset;
mod batch;
mod expense;
mod inventory;
mod settlement;

pub use asset::*;
pub use batch::*;
pub use expense::*;
pub use inventory::*;
pub use settlement::*;
