#![doc(test(attr(deny(warnings))))]

//! Movement Planner turns recurring household obligations into dated ledger
//! entries exactly once, keeps a running balance per account and projects
//! monthly totals for budget dashboards.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Movement planner tracing initialized.");
    });
}
