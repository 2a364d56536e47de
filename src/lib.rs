#![doc(test(attr(deny(warnings))))]

//! Budget Calendar projects recurring expenses, payroll and ledger activity
//! onto daily, monthly and yearly buckets for budget and dashboard views.
//!
//! The engine is a pure read-side computation: callers fetch rules and
//! transactions (see [`storage::ProjectionSource`]), then hand them to
//! [`projection::Projector`] or the free functions in [`ledger`] and
//! [`projection`].

pub mod cli;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod projection;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Budget Calendar tracing initialized.");
    });
}
