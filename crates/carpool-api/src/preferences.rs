//! Handler for weekly preference submission.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carpool_core::{
  event::Notifier,
  group::monday_of,
  preference::{PreferenceTier, WeeklyPreferenceSet},
  store::CarpoolStore,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError, registry::fetch_group};

#[derive(Debug, Deserialize)]
pub struct PreferencesBody {
  pub family_id:  Uuid,
  pub week_start: NaiveDate,
  /// Slot id → tier; omitted slots are neutral.
  pub tiers:      BTreeMap<Uuid, PreferenceTier>,
}

/// `POST /groups/:id/preferences` — validated submission; an over-limit
/// set is rejected with 422 before it ever reaches the engine.
pub async fn submit<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
  Json(body): Json<PreferencesBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let group = fetch_group(state.store.as_ref(), group_id).await?;
  if !group.is_member(body.family_id) {
    return Err(ApiError::BadRequest(format!(
      "family {} is not a member of group {group_id}",
      body.family_id
    )));
  }

  let known_slots: Vec<Uuid> =
    group.template.iter().map(|s| s.slot_id).collect();
  if let Some(unknown) =
    body.tiers.keys().find(|id| !known_slots.contains(id))
  {
    return Err(ApiError::BadRequest(format!(
      "slot {unknown} is not in the group template"
    )));
  }

  let set = WeeklyPreferenceSet {
    family_id:    body.family_id,
    group_id,
    week_start:   monday_of(body.week_start),
    submitted_at: Utc::now(),
    tiers:        body.tiers,
  };
  set
    .validate()
    .map_err(|e| ApiError::Validation(e.to_string()))?;

  state
    .store
    .save_preferences(set.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(set)))
}
