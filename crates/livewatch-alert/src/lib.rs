//! Threshold alerting over live-commerce metric snapshots.
//!
//! [`evaluator::AlertEvaluator`] applies a fixed rule set to each snapshot
//! set and keeps a capped, newest-first list of [`AlertMessage`]s with a
//! one-way `unread -> read` state.
//!
//! [`AlertMessage`]: livewatch_common::types::AlertMessage

pub mod error;
pub mod evaluator;
pub mod rules;


pub use error::AlertError;
pub use evaluator::AlertEvaluator;
