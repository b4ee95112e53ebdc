//! Governance cycle model for the BSQ DAO.
//!
//! A DAO cycle is a fixed, height-bounded sequence of phases (proposal,
//! blind vote, vote reveal…) that repeats forever from the genesis height.
//! Everything in this crate is pure height arithmetic: no clocks, no
//! mutability, so every node derives the same phase for the same height.

pub mod params;
pub mod period;
pub mod phase;

pub use params::Param;
pub use period::{Cycle, PeriodService};
pub use phase::DaoPhase;
