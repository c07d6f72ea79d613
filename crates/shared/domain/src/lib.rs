//! # Domain Models
//!
//! Pure data shared across the workspace (`serde` + `chrono` only).
//! No I/O, no HTTP, no async here.

pub mod config;
pub mod constants;
pub mod registrant;
pub mod slice;
