//! Registration pass-throughs.
//!
//! Family and group ownership belongs to the external registration
//! subsystem; these handlers exist so a deployment can be bootstrapped and
//! tested without it. They do no more than validate shape and persist.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use carpool_core::{
  event::Notifier,
  family::Family,
  group::{Group, TimeSlot},
  store::CarpoolStore,
};
use chrono::{NaiveTime, Utc, Weekday};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Load a group or map its absence to a 404.
pub(crate) async fn fetch_group<S>(store: &S, group_id: Uuid) -> Result<Group, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_group(group_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("group {group_id} not found")))
}

// ─── Families ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewFamilyBody {
  pub display_name:   String,
  pub children_count: u32,
  #[serde(default = "default_true")]
  pub can_drive:      bool,
  #[serde(default)]
  pub group_ids:      Vec<Uuid>,
}

fn default_true() -> bool { true }

/// `POST /families` — returns 201 + the stored family.
pub async fn create_family<S, N>(
  State(state): State<ApiState<S, N>>,
  Json(body): Json<NewFamilyBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  let family = Family {
    family_id:      Uuid::new_v4(),
    display_name:   body.display_name,
    created_at:     Utc::now(),
    active:         true,
    children_count: body.children_count,
    can_drive:      body.can_drive,
    group_ids:      body.group_ids,
  };
  state
    .store
    .upsert_family(family.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(family)))
}

// ─── Groups ──────────────────────────────────────────────────────────────────

/// One template entry in a group-creation request; the slot id is
/// server-assigned.
#[derive(Debug, Deserialize)]
pub struct NewSlotBody {
  pub day:       Weekday,
  pub time:      NaiveTime,
  pub route_tag: String,
}

#[derive(Debug, Deserialize)]
pub struct NewGroupBody {
  pub name:            String,
  pub admin_family_id: Uuid,
  #[serde(default)]
  pub member_ids:      Vec<Uuid>,
  pub template:        Vec<NewSlotBody>,
}

/// `POST /groups` — returns 201 + the stored group with assigned slot ids.
pub async fn create_group<S, N>(
  State(state): State<ApiState<S, N>>,
  Json(body): Json<NewGroupBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  if body.template.is_empty() {
    return Err(ApiError::Validation(
      "a group needs at least one time slot".into(),
    ));
  }

  let group = Group {
    group_id:        Uuid::new_v4(),
    name:            body.name,
    admin_family_id: body.admin_family_id,
    member_ids:      body.member_ids,
    template:        body
      .template
      .into_iter()
      .map(|s| TimeSlot {
        slot_id:   Uuid::new_v4(),
        day:       s.day,
        time:      s.time,
        route_tag: s.route_tag,
      })
      .collect(),
  };
  state
    .store
    .upsert_group(group.clone())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(group)))
}

/// `GET /groups/:id`
pub async fn get_group<S, N>(
  State(state): State<ApiState<S, N>>,
  Path(group_id): Path<Uuid>,
) -> Result<Json<Group>, ApiError>
where
  S: CarpoolStore,
  S::Error: std::error::Error + Send + Sync + 'static,
  N: Notifier,
{
  Ok(Json(fetch_group(state.store.as_ref(), group_id).await?))
}
