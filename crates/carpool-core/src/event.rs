//! Notification events and the dispatch trait.
//!
//! Every downstream-visible occurrence is a tagged variant, so consumers
//! pattern-match exhaustively instead of probing loosely-shaped payloads.
//! Delivery is fire-and-forget: a failed notification is logged by the
//! caller and never rolls back an assignment or ledger write.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An occurrence worth telling a family about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulingEvent {
  /// The family was assigned a driving slot.
  AssignmentMade {
    group_id:   Uuid,
    week_start: NaiveDate,
    slot_id:    Uuid,
    date:       NaiveDate,
  },
  /// A week's schedule was generated (sent to the group admin).
  ScheduleGenerated {
    group_id:   Uuid,
    week_start: NaiveDate,
    unfilled:   usize,
  },
  /// An admin manually moved the family's fairness debt.
  DebtAdjusted {
    group_id: Uuid,
    delta:    f64,
    reason:   String,
  },
  /// The family was selected as a backup driver for someone's vacation.
  CoverageArranged {
    group_id:            Uuid,
    vacationing_family:  Uuid,
    start_date:          NaiveDate,
    end_date:            NaiveDate,
  },
  /// No backup driver could be found (sent to the group admin).
  CoverageUnavailable {
    group_id:           Uuid,
    vacationing_family: Uuid,
    start_date:         NaiveDate,
    end_date:           NaiveDate,
  },
  /// The fairness tracking period was reset for the group.
  TrackingPeriodReset { group_id: Uuid },
}

/// Abstraction over the external notification channel.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Dispatch `event` to `family_id`. Best effort; callers ignore the
  /// error beyond logging it.
  fn notify(
    &self,
    family_id: Uuid,
    event: SchedulingEvent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
