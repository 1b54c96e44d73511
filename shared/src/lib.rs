//! Shared types and models for the Asset Recovery Finance platform
//!
//! This crate contains the settlement domain model and the pure financial
//! computations shared between the backend, the browser (via WASM), and other
//! components of the system. Nothing in here performs I/O.

pub mod finance;
pub mod models;
pub mod types;
pub mod validation;

pub use finance::*;
pub use models::*;
pub use types::*;
pub use validation::*;
