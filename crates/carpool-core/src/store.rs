//! The `CarpoolStore` trait.
//!
//! Implemented by storage backends (e.g. `carpool-store-sqlite`). Higher
//! layers depend on this abstraction, not on any concrete backend. The
//! core's computations stay pure: callers load state here, run the engine
//! and ledger in memory, then save the results back.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  fairness::FairnessRecord,
  family::Family,
  group::Group,
  preference::WeeklyPreferenceSet,
  schedule::WeekSchedule,
  vacation::{HolidayRecord, VacationRecord},
};

/// Abstraction over carpool persistence.
pub trait CarpoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  /// Insert or replace a family.
  fn upsert_family(
    &self,
    family: Family,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_family(
    &self,
    family_id: Uuid,
  ) -> impl Future<Output = Result<Option<Family>, Self::Error>> + Send + '_;

  /// All families that are members of `group_id`.
  fn group_families(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Family>, Self::Error>> + Send + '_;

  /// Insert or replace a group, including its slot template.
  fn upsert_group(
    &self,
    group: Group,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_group(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  /// Persist a submitted preference set, replacing any earlier submission
  /// for the same `(family, group, week)`.
  fn save_preferences(
    &self,
    set: WeeklyPreferenceSet,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All members' preference sets for one `(group, week)`.
  fn preferences(
    &self,
    group_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Vec<WeeklyPreferenceSet>, Self::Error>> + Send + '_;

  // ── Fairness records ──────────────────────────────────────────────────

  fn fairness_records(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FairnessRecord>, Self::Error>> + Send + '_;

  /// Persist the given records. Atomic per family record: a concurrent
  /// reader sees each family's record either fully old or fully new.
  fn save_fairness_records(
    &self,
    records: Vec<FairnessRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Week schedules ────────────────────────────────────────────────────

  fn week_schedule(
    &self,
    group_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Option<WeekSchedule>, Self::Error>> + Send + '_;

  /// Persist a generated week, replacing any prior schedule for the same
  /// `(group, week)` in one transaction.
  fn save_week_schedule(
    &self,
    schedule: WeekSchedule,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Vacations and holidays ────────────────────────────────────────────

  /// Insert or replace a vacation record (also used for the
  /// coverage-arrangement write-back).
  fn save_vacation(
    &self,
    vacation: VacationRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn vacations(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<VacationRecord>, Self::Error>> + Send + '_;

  fn save_holiday(
    &self,
    holiday: HolidayRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn holidays(
    &self,
    group_id: Uuid,
  ) -> impl Future<Output = Result<Vec<HolidayRecord>, Self::Error>> + Send + '_;
}
