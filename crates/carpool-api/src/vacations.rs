//! Vacation and holiday handlers: slot exclusion, fair-share excusal,
//! coverage arrangement, and holiday cancellation of generated weeks.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carpool_core::{
  coverage::{DEFAULT_MAX_BACKUPS, arrange_coverage},
  event::{Notifier, SchedulingEvent},
  fairness::FairnessLedger,
  group::monday_of,
  store::CarpoolStore,
  vacation::{HolidayRecord, VacationRecord, cancel_for_holiday},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, notify::dispatch, registry::fetch_group};

// ─── Vacations ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VacationBody {
  pub family_id:  Uuid,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  /// Backup drivers to arrange; policy parameter, default 2.
  #[serde(default = "default_max_backups")]
  pub max_backups: usize,
}

fn default_max_backups() -> usize { DEFAULT_MAX_BACKUPS }

#[derive(Debug, Serialize)]
pub struct VacationResponse {
  pub vacation:         VacationRecord,
  pub excused_weekdays: u32,
}

/// `POST /groups/:id/vacations` — record the absence, excuse the family's
/// fair share, and arrange backup coverage from the eligible pool.
///
/// A missing backup is not an error: the vacation is stored with
/// `coverage_arranged = false` and the admin is notified.
pub async fn record_vacation<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<VacationBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  let group = fetch_group(store, group_id).await?;
  if !group.is_member(body.family_id) {
    return Err(ApiError::BadRequest(format!(
      "family {} is not a member of group {group_id}",
      body.family_id
    )));
  }
  let family = store
    .get_family(body.family_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("family {} not found", body.family_id))
    })?;

  let mut vacation =
    VacationRecord::new(body.family_id, group_id, body.start_date, body.end_date)
      .map_err(|e| ApiError::Validation(e.to_string()))?;

  // Excuse the fair share before arranging coverage, so the excusal
  // sticks even if no backup can be found.
  let records = store
    .fairness_records(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let mut ledger = FairnessLedger::from_records(group_id, records);
  let excused_weekdays = ledger.excuse_vacation(&family, &vacation);
  let debts = ledger.debts();
  store
    .save_fairness_records(ledger.into_records())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let families = store
    .group_families(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let other_vacations = store
    .vacations(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let outcome = arrange_coverage(
    &vacation,
    &group,
    &families,
    &debts,
    &other_vacations,
    body.max_backups,
  );
  vacation.coverage_arranged = outcome.arranged;
  vacation.backup_drivers = outcome.backup_drivers.clone();

  store
    .save_vacation(vacation.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if outcome.arranged {
    for backup in &outcome.backup_drivers {
      dispatch(state.notifier.as_ref(), *backup, SchedulingEvent::CoverageArranged {
        group_id,
        vacationing_family: body.family_id,
        start_date: body.start_date,
        end_date: body.end_date,
      })
      .await;
    }
  } else {
    tracing::warn!(%group_id, family_id = %body.family_id, "no eligible backup driver");
    dispatch(
      state.notifier.as_ref(),
      group.admin_family_id,
      SchedulingEvent::CoverageUnavailable {
        group_id,
        vacationing_family: body.family_id,
        start_date: body.start_date,
        end_date: body.end_date,
      },
    )
    .await;
  }

  Ok((StatusCode::CREATED, Json(VacationResponse { vacation, excused_weekdays })))
}

// ─── Holidays ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HolidayBody {
  pub name:       String,
  pub start_date: NaiveDate,
  pub end_date:   NaiveDate,
  #[serde(default = "default_true")]
  pub auto_adjust_scheduling: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Serialize)]
pub struct HolidayResponse {
  pub holiday:         HolidayRecord,
  /// Slots cancelled out of already-generated weeks.
  pub cancelled_slots: usize,
}

/// `POST /groups/:id/holidays` — record a group-wide holiday and, when
/// auto-adjusting, cancel in-range slots of any already-generated week.
/// No fair-share change accompanies this: a holiday affects everyone
/// equally.
pub async fn record_holiday<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<HolidayBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let store = state.store.as_ref();
  let group = fetch_group(store, group_id).await?;
  if body.start_date > body.end_date {
    return Err(ApiError::Validation(format!(
      "holiday range is inverted: {} > {}",
      body.start_date, body.end_date
    )));
  }

  let holiday = HolidayRecord {
    holiday_id: Uuid::new_v4(),
    group_id,
    name: body.name,
    start_date: body.start_date,
    end_date: body.end_date,
    auto_adjust_scheduling: body.auto_adjust_scheduling,
  };
  store
    .save_holiday(holiday.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  // Walk every week the holiday touches and strip affected slots from
  // schedules that were generated before the holiday was known.
  let mut cancelled_slots = 0;
  if holiday.auto_adjust_scheduling {
    let mut week = monday_of(holiday.start_date);
    while week <= holiday.end_date {
      let stored = store
        .week_schedule(group_id, week)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      if let Some(mut schedule) = stored {
        let applied =
          cancel_for_holiday(&mut schedule, &group.template, &holiday);
        if !applied.is_empty() {
          cancelled_slots += applied.len();
          store
            .save_week_schedule(schedule)
            .await
            .map_err(|e| ApiError::Store(Box::new(e)))?;
        }
      }
      week = week + chrono::Days::new(7);
    }
  }

  tracing::info!(%group_id, cancelled_slots, "holiday recorded");
  Ok((StatusCode::CREATED, Json(HolidayResponse { holiday, cancelled_slots })))
}
