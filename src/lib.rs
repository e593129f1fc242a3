//! taskloot library
//!
//! Gamified task completion: weighted task draws, a timed lifecycle, a prize
//! lottery with an overtime penalty, and a wallet ledger.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod payout;
pub mod selection;
pub mod types;
