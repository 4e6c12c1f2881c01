//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use carpool_core::{
  fairness::{FairnessLedger, FairnessRecord},
  family::Family,
  group::{Group, TimeSlot},
  preference::{PreferenceTier, WeeklyPreferenceSet},
  schedule::{WeekContext, assign_week},
  store::CarpoolStore,
  vacation::{HolidayRecord, VacationRecord},
};
use chrono::{NaiveDate, NaiveTime, Utc, Weekday};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn week() -> NaiveDate { date(2024, 9, 2) } // a Monday

fn family(group_id: Uuid, children: u32) -> Family {
  Family {
    family_id: Uuid::new_v4(),
    display_name: "test family".into(),
    created_at: Utc::now(),
    active: true,
    children_count: children,
    can_drive: true,
    group_ids: vec![group_id],
  }
}

fn group(members: &[&Family]) -> Group {
  Group {
    group_id:        members[0].group_ids[0],
    name:            "school-run".into(),
    admin_family_id: members[0].family_id,
    member_ids:      members.iter().map(|f| f.family_id).collect(),
    template:        [
      Weekday::Mon,
      Weekday::Tue,
      Weekday::Wed,
      Weekday::Thu,
      Weekday::Fri,
    ]
    .into_iter()
    .map(|day| TimeSlot {
      slot_id:   Uuid::new_v4(),
      day,
      time:      NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
      route_tag: "morning".into(),
    })
    .collect(),
  }
}

async fn seed(s: &SqliteStore, children: &[u32]) -> (Group, Vec<Family>) {
  let group_id = Uuid::new_v4();
  let families: Vec<Family> =
    children.iter().map(|c| family(group_id, *c)).collect();
  let refs: Vec<&Family> = families.iter().collect();
  let g = group(&refs);
  for f in &families {
    s.upsert_family(f.clone()).await.unwrap();
  }
  s.upsert_group(g.clone()).await.unwrap();
  (g, families)
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_family() {
  let s = store().await;
  let f = family(Uuid::new_v4(), 2);
  s.upsert_family(f.clone()).await.unwrap();

  let fetched = s.get_family(f.family_id).await.unwrap().unwrap();
  assert_eq!(fetched.family_id, f.family_id);
  assert_eq!(fetched.children_count, 2);
  assert!(fetched.can_drive);
  assert_eq!(fetched.group_ids, f.group_ids);
}

#[tokio::test]
async fn get_family_missing_returns_none() {
  let s = store().await;
  assert!(s.get_family(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn group_round_trips_with_template() {
  let s = store().await;
  let (g, _) = seed(&s, &[1, 2]).await;

  let fetched = s.get_group(g.group_id).await.unwrap().unwrap();
  assert_eq!(fetched.group_id, g.group_id);
  assert_eq!(fetched.template, g.template);
  assert_eq!(fetched.member_ids, g.member_ids);
}

#[tokio::test]
async fn group_families_returns_members_only() {
  let s = store().await;
  let (g, families) = seed(&s, &[1, 2, 1]).await;
  // An unrelated family in another group.
  s.upsert_family(family(Uuid::new_v4(), 1)).await.unwrap();

  let members = s.group_families(g.group_id).await.unwrap();
  assert_eq!(members.len(), families.len());
}

// ─── Preferences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn preferences_round_trip_and_replace() {
  let s = store().await;
  let (g, families) = seed(&s, &[1, 1]).await;
  let slot = g.template[0].slot_id;

  let mut set =
    WeeklyPreferenceSet::new(families[0].family_id, g.group_id, week());
  set.tiers.insert(slot, PreferenceTier::Preferable);
  s.save_preferences(set.clone()).await.unwrap();

  let loaded = s.preferences(g.group_id, week()).await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded[0].tier_for(slot), PreferenceTier::Preferable);

  // Resubmission replaces, not duplicates.
  set.tiers.insert(slot, PreferenceTier::Unavailable);
  s.save_preferences(set).await.unwrap();
  let reloaded = s.preferences(g.group_id, week()).await.unwrap();
  assert_eq!(reloaded.len(), 1);
  assert_eq!(reloaded[0].tier_for(slot), PreferenceTier::Unavailable);
}

#[tokio::test]
async fn preferences_are_scoped_to_week() {
  let s = store().await;
  let (g, families) = seed(&s, &[1]).await;
  let set =
    WeeklyPreferenceSet::new(families[0].family_id, g.group_id, week());
  s.save_preferences(set).await.unwrap();

  let other_week = s.preferences(g.group_id, date(2024, 9, 9)).await.unwrap();
  assert!(other_week.is_empty());
}

// ─── Fairness records ────────────────────────────────────────────────────────

#[tokio::test]
async fn fairness_records_round_trip() {
  let s = store().await;
  let (g, families) = seed(&s, &[2, 1]).await;

  let mut record =
    FairnessRecord::new(families[0].family_id, g.group_id, 2);
  record.total_trips = 7;
  record.total_weeks = 3;
  record.fairness_debt = 1.25;
  record.vacation_adjustments = 3;
  s.save_fairness_records(vec![record.clone()]).await.unwrap();

  let loaded = s.fairness_records(g.group_id).await.unwrap();
  assert_eq!(loaded.len(), 1);
  let r = &loaded[0];
  assert_eq!(r.family_id, record.family_id);
  assert_eq!(r.total_trips, 7);
  assert_eq!(r.total_weeks, 3);
  assert!((r.fairness_debt - 1.25).abs() < 1e-9);
  assert_eq!(r.vacation_adjustments, 3);
}

#[tokio::test]
async fn fairness_save_replaces_whole_record() {
  let s = store().await;
  let (g, families) = seed(&s, &[1]).await;

  let mut record =
    FairnessRecord::new(families[0].family_id, g.group_id, 1);
  s.save_fairness_records(vec![record.clone()]).await.unwrap();

  record.fairness_debt = -2.0;
  record.total_weeks = 5;
  s.save_fairness_records(vec![record]).await.unwrap();

  let loaded = s.fairness_records(g.group_id).await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert!((loaded[0].fairness_debt + 2.0).abs() < 1e-9);
  assert_eq!(loaded[0].total_weeks, 5);
}

// ─── Week schedules ──────────────────────────────────────────────────────────

#[tokio::test]
async fn week_schedule_round_trip_and_regeneration() {
  let s = store().await;
  let (g, families) = seed(&s, &[2, 1]).await;

  let debts = BTreeMap::new();
  let schedule = assign_week(&WeekContext {
    group:       &g,
    week_start:  week(),
    families:    &families,
    preferences: &[],
    debts:       &debts,
    vacations:   &[],
    holidays:    &[],
  });
  s.save_week_schedule(schedule.clone()).await.unwrap();

  let loaded = s.week_schedule(g.group_id, week()).await.unwrap().unwrap();
  assert_eq!(loaded, schedule);

  // Forced regeneration replaces the stored week wholesale.
  let mut regenerated = schedule.clone();
  regenerated.assignments[0].family_id = Some(families[1].family_id);
  s.save_week_schedule(regenerated.clone()).await.unwrap();
  let reloaded = s.week_schedule(g.group_id, week()).await.unwrap().unwrap();
  assert_eq!(reloaded, regenerated);
}

#[tokio::test]
async fn missing_week_schedule_returns_none() {
  let s = store().await;
  let (g, _) = seed(&s, &[1]).await;
  assert!(s.week_schedule(g.group_id, week()).await.unwrap().is_none());
}

// ─── Vacations and holidays ──────────────────────────────────────────────────

#[tokio::test]
async fn vacation_coverage_write_back() {
  let s = store().await;
  let (g, families) = seed(&s, &[1, 1, 1]).await;

  let mut vacation = VacationRecord::new(
    families[0].family_id,
    g.group_id,
    date(2024, 9, 2),
    date(2024, 9, 6),
  )
  .unwrap();
  s.save_vacation(vacation.clone()).await.unwrap();

  let loaded = s.vacations(g.group_id).await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert!(!loaded[0].coverage_arranged);

  // The coverage arranger writes back the chosen backups.
  vacation.coverage_arranged = true;
  vacation.backup_drivers =
    vec![families[1].family_id, families[2].family_id];
  s.save_vacation(vacation.clone()).await.unwrap();

  let reloaded = s.vacations(g.group_id).await.unwrap();
  assert_eq!(reloaded.len(), 1);
  assert!(reloaded[0].coverage_arranged);
  assert_eq!(reloaded[0].backup_drivers, vacation.backup_drivers);
}

#[tokio::test]
async fn holidays_round_trip() {
  let s = store().await;
  let (g, _) = seed(&s, &[1]).await;

  let holiday = HolidayRecord {
    holiday_id:             Uuid::new_v4(),
    group_id:               g.group_id,
    name:                   "fall break".into(),
    start_date:             date(2024, 10, 14),
    end_date:               date(2024, 10, 18),
    auto_adjust_scheduling: true,
  };
  s.save_holiday(holiday.clone()).await.unwrap();

  let loaded = s.holidays(g.group_id).await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded[0].name, "fall break");
  assert!(loaded[0].auto_adjust_scheduling);
}

// ─── End to end ──────────────────────────────────────────────────────────────

/// Full weekly cycle against the store: load, assign, persist, record,
/// reload, and verify the ledger state survives the round trip.
#[tokio::test]
async fn generate_record_and_reload_cycle() {
  let s = store().await;
  let (g, families) = seed(&s, &[2, 1, 2]).await;

  let records = s.fairness_records(g.group_id).await.unwrap();
  let mut ledger = FairnessLedger::from_records(g.group_id, records);
  let debts = ledger.debts();

  let preferences = s.preferences(g.group_id, week()).await.unwrap();
  let vacations = s.vacations(g.group_id).await.unwrap();
  let holidays = s.holidays(g.group_id).await.unwrap();

  let schedule = assign_week(&WeekContext {
    group: &g,
    week_start: week(),
    families: &families,
    preferences: &preferences,
    debts: &debts,
    vacations: &vacations,
    holidays: &holidays,
  });
  assert_eq!(schedule.assignments.len(), 5);

  s.save_week_schedule(schedule.clone()).await.unwrap();
  ledger
    .record_week(week(), &schedule, &families, &vacations, false)
    .unwrap();
  s.save_fairness_records(ledger.into_records()).await.unwrap();

  // A second recording attempt built from reloaded state still trips the
  // duplicate guard.
  let reloaded = s.fairness_records(g.group_id).await.unwrap();
  assert_eq!(reloaded.len(), 3);
  let mut ledger = FairnessLedger::from_records(g.group_id, reloaded);
  let err = ledger
    .record_week(week(), &schedule, &families, &vacations, false)
    .unwrap_err();
  assert!(matches!(
    err,
    carpool_core::Error::DuplicateRecording { .. }
  ));

  // Debt conservation survives the round trip.
  let total_share: f64 = s
    .fairness_records(g.group_id)
    .await
    .unwrap()
    .iter()
    .map(|r| r.weekly_history[0].fair_share)
    .sum();
  assert!((total_share - 5.0).abs() < 1e-9);
}
