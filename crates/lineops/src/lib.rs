//! Review validation and completion-locking engine for restaurant shift
//! operations.
//!
//! The crate is organized around the `reviews` module tree: a submission
//! resolves to exactly one review instance per (template, employee, date,
//! shift), passes the update-window check, is scored from the full response
//! set, audited on overwrite, and may trigger a manager notification. The
//! workflow gate answers whether an employee may enter a shift workflow
//! given the day's required reviews.

pub mod config;
pub mod error;
pub mod reviews;
pub mod telemetry;
