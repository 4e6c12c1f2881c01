//! Core types and scheduling logic for the carpool duty coordinator.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//! Everything here is a pure computation over loaded state: the caller
//! loads preferences, fairness records, and vacation windows through
//! [`store::CarpoolStore`], runs the engine, and persists the results.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod coverage;
pub mod error;
pub mod event;
pub mod fairness;
pub mod family;
pub mod group;
pub mod preference;
pub mod schedule;
pub mod store;
pub mod vacation;

pub use error::{Error, Result};
