//! Domain logic for the stockfolio portfolio tracker.
//!
//! Covers the portfolio/lot model and CRUD, exchange market-hours policy,
//! lot valuation, and the asynchronous price refresh orchestrator with its
//! progress store. HTTP and configuration live in the server crate.

pub mod constants;
pub mod market_hours;
pub mod portfolio;
pub mod refresh;
