//! Group — a set of families sharing a school route, plus the weekly
//! time-slot template that defines their recurring duties.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── TimeSlot ────────────────────────────────────────────────────────────────

/// One recurring duty within a group's week: a `(day, time, route)` tuple.
/// Immutable once the template is set; preferences and assignments refer
/// to it by `slot_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
  pub slot_id:   Uuid,
  pub day:       Weekday,
  pub time:      NaiveTime,
  /// Free-text tag distinguishing routes, e.g. "morning-dropoff".
  pub route_tag: String,
}

impl TimeSlot {
  /// The concrete calendar date this slot falls on in the week starting
  /// at `week_start` (a Monday).
  pub fn date_in_week(&self, week_start: NaiveDate) -> NaiveDate {
    week_start + chrono::Days::new(u64::from(self.day.num_days_from_monday()))
  }
}

/// Normalise any date to the Monday of its week. All week-keyed state is
/// stored under this date, so callers naming the same week by different
/// days cannot create divergent schedules.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
  date - chrono::Days::new(u64::from(date.weekday().num_days_from_monday()))
}

// ─── Group ───────────────────────────────────────────────────────────────────

/// A carpool group. Created and updated by group management (external);
/// the core reads the template and membership only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
  pub group_id:        Uuid,
  pub name:            String,
  pub admin_family_id: Uuid,
  pub member_ids:      Vec<Uuid>,
  /// Ordered weekly template; order is preserved in generated schedules.
  pub template:        Vec<TimeSlot>,
}

impl Group {
  pub fn is_member(&self, family_id: Uuid) -> bool {
    self.member_ids.contains(&family_id)
  }

  /// Number of slots in one week of this group's template.
  pub fn slots_per_week(&self) -> usize { self.template.len() }
}
