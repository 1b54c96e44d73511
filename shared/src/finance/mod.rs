//! Financial computations for batch settlement and inventory valuation
//!
//! Everything here is pure: callers load records, these functions reduce
//! them. Ratios always go through [`safe_divide`] so a zero denominator yields
//! zero instead of an error.

mod abc;
mod aggregate;
mod math;
mod pnl;
mod summary;

pub use abc::*;
pub use aggregate::*;
pub use math::*;
pub use pnl::*;
pub use summary::*;
