//! HTTP request handlers

mod batch;
mod health;
mod inventory;
mod settlement;

pub use batch::*;
pub use health::*;
pub use inventory::*;
pub use settlement::*;
