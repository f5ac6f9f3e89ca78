//! Inventory lookup and equipment set counting for DuckDelve.
//!
//! Pasted item names are matched against a reference catalog; the matched
//! items are grouped by slot and the number of possible equipment sets is
//! computed, optionally restricted to sets carrying a list of spells.

pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;
