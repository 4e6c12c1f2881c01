//! Fairness-ledger handlers: week recording, dashboard, manual
//! adjustments, and the school-year reset.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carpool_core::{
  Error as CoreError,
  event::{Notifier, SchedulingEvent},
  fairness::{FairnessDashboard, FairnessLedger},
  group::monday_of,
  store::CarpoolStore,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, notify::dispatch, registry::fetch_group};

#[derive(Debug, Deserialize)]
pub struct RecordBody {
  /// Overwrite an already-recorded week wholesale instead of rejecting.
  #[serde(default)]
  pub force: bool,
}

/// `POST /groups/:id/weeks/:week_start/record` — fold a generated week
/// into every member's fairness record. Duplicate weeks answer 409 unless
/// forced.
pub async fn record_week<S, N>(
  State(state): State<ApiState<S, N>>,
  Path((group_id, week_start)): Path<(Uuid, NaiveDate)>,
  Json(body): Json<RecordBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  fetch_group(store, group_id).await?;
  let week_start = monday_of(week_start);

  let schedule = store
    .week_schedule(group_id, week_start)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no schedule for group {group_id} week {week_start}; generate first"
      ))
    })?;

  let families = store
    .group_families(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let vacations = store
    .vacations(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let records = store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut ledger = FairnessLedger::from_records(group_id, records);
  ledger
    .record_week(week_start, &schedule, &families, &vacations, body.force)
    .map_err(|e| match e {
      CoreError::DuplicateRecording { .. } => ApiError::Conflict(e.to_string()),
      other => ApiError::BadRequest(other.to_string()),
    })?;

  let dashboard = ledger.dashboard();
  store
    .save_fairness_records(ledger.into_records())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(%group_id, %week_start, forced = body.force, "week recorded");
  Ok((StatusCode::OK, Json(dashboard)))
}

/// `GET /groups/:id/dashboard` — equity scores and recommendations.
pub async fn dashboard<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
) -> Result<Json<FairnessDashboard>, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  fetch_group(state.store.as_ref(), group_id).await?;
  let records = state
    .store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let ledger = FairnessLedger::from_records(group_id, records);
  Ok(Json(ledger.dashboard()))
}

#[derive(Debug, Deserialize)]
pub struct AdjustmentBody {
  pub family_id:       Uuid,
  pub delta:           f64,
  pub reason:          String,
  pub admin_family_id: Uuid,
}

/// `POST /groups/:id/adjustments` — admin-issued signed debt delta,
/// audited separately from the weekly history.
pub async fn adjust<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<AdjustmentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  fetch_group(store, group_id).await?;
  let records = store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut ledger = FairnessLedger::from_records(group_id, records);
  ledger
    .adjust(
      body.family_id,
      body.delta,
      body.reason.clone(),
      body.admin_family_id,
    )
    .map_err(|e| ApiError::NotFound(e.to_string()))?;

  store
    .save_fairness_records(ledger.into_records())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  dispatch(state.notifier.as_ref(), body.family_id, SchedulingEvent::DebtAdjusted {
    group_id,
    delta: body.delta,
    reason: body.reason,
  })
  .await;

  Ok(StatusCode::NO_CONTENT)
}

/// `POST /groups/:id/reset` — zero every member's totals, debt, history,
/// and adjustment log, stamping a new tracking period. Used at
/// school-year boundaries.
pub async fn reset<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  let group = fetch_group(store, group_id).await?;
  let records = store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let mut ledger = FairnessLedger::from_records(group_id, records);
  ledger.reset(Utc::now());
  store
    .save_fairness_records(ledger.into_records())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(%group_id, "tracking period reset");
  dispatch(
    state.notifier.as_ref(),
    group.admin_family_id,
    SchedulingEvent::TrackingPeriodReset { group_id },
  )
  .await;

  Ok(StatusCode::NO_CONTENT)
}
