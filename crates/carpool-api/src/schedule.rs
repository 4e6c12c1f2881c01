//! Schedule generation and retrieval handlers.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use carpool_core::{
  event::{Notifier, SchedulingEvent},
  fairness::FairnessLedger,
  group::monday_of,
  schedule::{WeekContext, WeekSchedule, assign_week},
  store::CarpoolStore,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, notify::dispatch, registry::fetch_group};

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
  pub week_start: NaiveDate,
  /// Regenerate even if the week already has a stored schedule.
  #[serde(default)]
  pub force:      bool,
}

/// `POST /groups/:id/schedule` — run the assignment engine for one week.
///
/// Regeneration is deterministic for identical inputs, so `force` is safe
/// to use after a preference or vacation change; without it an existing
/// week answers 409.
pub async fn generate<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<GenerateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  let group = fetch_group(store, group_id).await?;
  let week_start = monday_of(body.week_start);

  if group.template.is_empty() {
    return Err(ApiError::Validation(format!(
      "group {group_id} has an empty time-slot template"
    )));
  }

  let existing = store
    .week_schedule(group_id, week_start)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if existing.is_some() && !body.force {
    return Err(ApiError::Conflict(format!(
      "schedule for week {week_start} already exists; pass force=true to \
       regenerate"
    )));
  }

  let families = store
    .group_families(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let preferences = store
    .preferences(group_id, week_start)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let records = store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let vacations = store
    .vacations(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let holidays = store
    .holidays(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let ledger = FairnessLedger::from_records(group_id, records);
  let debts = ledger.debts();

  let schedule = assign_week(&WeekContext {
    group: &group,
    week_start,
    families: &families,
    preferences: &preferences,
    debts: &debts,
    vacations: &vacations,
    holidays: &holidays,
  });

  store
    .save_week_schedule(schedule.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(
    %group_id,
    %week_start,
    unfilled = schedule.conflicts.len(),
    "schedule generated"
  );

  // Notifications are best-effort and never unwind the write above.
  for assignment in &schedule.assignments {
    if let Some(family_id) = assignment.family_id {
      dispatch(state.notifier.as_ref(), family_id, SchedulingEvent::AssignmentMade {
        group_id,
        week_start,
        slot_id: assignment.slot_id,
        date: assignment.date,
      })
      .await;
    }
  }
  dispatch(
    state.notifier.as_ref(),
    group.admin_family_id,
    SchedulingEvent::ScheduleGenerated {
      group_id,
      week_start,
      unfilled: schedule.conflicts.len(),
    },
  )
  .await;

  Ok((StatusCode::CREATED, Json(schedule)))
}

#[derive(Debug, Deserialize)]
pub struct WeekParams {
  pub week_start: NaiveDate,
}

/// `GET /groups/:id/schedule?week_start=YYYY-MM-DD`
pub async fn get_week<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Query(params): Query<WeekParams>,
) -> Result<Json<WeekSchedule>, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let week_start = monday_of(params.week_start);
  let schedule = state
    .store
    .week_schedule(group_id, week_start)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no schedule for group {group_id} week {week_start}"
      ))
    })?;
  Ok(Json(schedule))
}
