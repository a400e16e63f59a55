//! Client, badge and card records
//!
//! A client (badge holder) owns exactly one badge, and a badge owns one or
//! more cards. The access lifecycle operations act on these records through
//! the store contract.

pub mod badge;
pub mod client;

pub use badge::*;
pub use client::*;
