//! JSON REST API for the carpool duty coordinator.
//!
//! Exposes an axum [`Router`] backed by any
//! [`carpool_core::store::CarpoolStore`] and
//! [`carpool_core::event::Notifier`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", carpool_api::api_router(state))
//! ```

pub mod error;
pub mod fairness;
pub mod notify;
pub mod preferences;
pub mod registry;
pub mod schedule;
pub mod vacations;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use carpool_core::{event::Notifier, store::CarpoolStore};

pub use error::ApiError;
pub use notify::TracingNotifier;

/// Shared state threaded through all handlers.
pub struct ApiState<S, N> {
  pub store:    Arc<S>,
  pub notifier: Arc<N>,
}

// Manual impl: `#[derive(Clone)]` would demand `S: Clone` and `N: Clone`.
impl<S, N> Clone for ApiState<S, N> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      notifier: Arc::clone(&self.notifier),
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S, N>(state: ApiState<S, N>) -> Router<()>
where
  S: CarpoolStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier + Send + Sync + 'static,
{
  Router::new()
    // Registration pass-throughs
    .route("/families", post(registry::create_family::<S, N>))
    .route("/groups", post(registry::create_group::<S, N>))
    .route("/groups/{id}", get(registry::get_group::<S, N>))
    // Preferences
    .route("/groups/{id}/preferences", post(preferences::submit::<S, N>))
    // Scheduling
    .route(
      "/groups/{id}/schedule",
      get(schedule::get_week::<S, N>).post(schedule::generate::<S, N>),
    )
    // Fairness ledger
    .route(
      "/groups/{id}/weeks/{week_start}/record",
      post(fairness::record_week::<S, N>),
    )
    .route("/groups/{id}/dashboard", get(fairness::dashboard::<S, N>))
    .route("/groups/{id}/adjustments", post(fairness::adjust::<S, N>))
    .route("/groups/{id}/reset", post(fairness::reset::<S, N>))
    // Vacations and holidays
    .route("/groups/{id}/vacations", post(vacations::record_vacation::<S, N>))
    .route("/groups/{id}/holidays", post(vacations::record_holiday::<S, N>))
    .with_state(state)
}
