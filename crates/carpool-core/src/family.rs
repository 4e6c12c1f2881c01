//! Family — the unit of membership and driving duty.
//!
//! Families are owned by the registration subsystem; the core treats them
//! as read-only reference data and never mutates one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A household participating in one or more carpool groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
  pub family_id:      Uuid,
  pub display_name:   String,
  pub created_at:     DateTime<Utc>,
  /// Inactive families are excluded from every assignment pass.
  pub active:         bool,
  /// Weight for fair-share calculation.
  pub children_count: u32,
  /// Families that cannot drive never receive a slot or a coverage
  /// request, but their children still count toward the group's total.
  pub can_drive:      bool,
  pub group_ids:      Vec<Uuid>,
}

impl Family {
  /// Whether this family can be considered for any driving duty at all.
  pub fn eligible_driver(&self) -> bool { self.active && self.can_drive }
}
