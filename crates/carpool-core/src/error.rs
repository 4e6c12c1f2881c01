//! Error types for `carpool-core`.
//!
//! Unfillable slots and missing coverage backups are deliberately *not*
//! here: both are first-class result values ([`crate::schedule::SlotConflict`],
//! [`crate::coverage::CoverageOutcome`]) so callers can surface them to an
//! admin without aborting the rest of the week.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("group not found: {0}")]
  GroupNotFound(Uuid),

  #[error("family not found: {0}")]
  FamilyNotFound(Uuid),

  #[error("family {family_id} is not a member of group {group_id}")]
  NotAMember { family_id: Uuid, group_id: Uuid },

  #[error("group {0} has an empty time-slot template")]
  EmptyTemplate(Uuid),

  #[error(
    "preference set exceeds the per-week limit: {count} slots marked \
     {tier} (max {max})"
  )]
  PreferenceLimit {
    tier:  &'static str,
    count: usize,
    max:   usize,
  },

  #[error("week {week_start} already recorded for group {group_id}")]
  DuplicateRecording {
    group_id:   Uuid,
    week_start: NaiveDate,
  },

  #[error("vacation range is inverted: {start} > {end}")]
  InvertedDateRange { start: NaiveDate, end: NaiveDate },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
