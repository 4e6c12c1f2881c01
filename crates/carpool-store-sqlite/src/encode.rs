//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and dates as ISO `YYYY-MM-DD`.
//! Structured fields (templates, tier maps, weekly history, id lists) are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use std::collections::BTreeMap;

use carpool_core::{
  fairness::{FairnessRecord, ManualAdjustment, WeekEntry},
  family::Family,
  group::{Group, TimeSlot},
  preference::{PreferenceTier, WeeklyPreferenceSet},
  vacation::{HolidayRecord, VacationRecord},
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|e: chrono::ParseError| Error::DateParse(e.to_string()))
}

pub fn encode_uuid_list(ids: &[Uuid]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_uuid_list(s: &str) -> Result<Vec<Uuid>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `families` row as read from SQLite, before decoding.
pub struct RawFamily {
  pub family_id:      String,
  pub display_name:   String,
  pub created_at:     String,
  pub active:         bool,
  pub children_count: i64,
  pub can_drive:      bool,
  pub group_ids:      String,
}

impl RawFamily {
  pub fn into_family(self) -> Result<Family> {
    Ok(Family {
      family_id:      decode_uuid(&self.family_id)?,
      display_name:   self.display_name,
      created_at:     decode_dt(&self.created_at)?,
      active:         self.active,
      children_count: self.children_count as u32,
      can_drive:      self.can_drive,
      group_ids:      decode_uuid_list(&self.group_ids)?,
    })
  }
}

pub struct RawGroup {
  pub group_id:        String,
  pub name:            String,
  pub admin_family_id: String,
  pub member_ids:      String,
  pub template:        String,
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    let template: Vec<TimeSlot> = serde_json::from_str(&self.template)?;
    Ok(Group {
      group_id:        decode_uuid(&self.group_id)?,
      name:            self.name,
      admin_family_id: decode_uuid(&self.admin_family_id)?,
      member_ids:      decode_uuid_list(&self.member_ids)?,
      template,
    })
  }
}

pub struct RawPreferenceSet {
  pub family_id:    String,
  pub group_id:     String,
  pub week_start:   String,
  pub submitted_at: String,
  pub tiers:        String,
}

impl RawPreferenceSet {
  pub fn into_set(self) -> Result<WeeklyPreferenceSet> {
    let tiers: BTreeMap<Uuid, PreferenceTier> =
      serde_json::from_str(&self.tiers)?;
    Ok(WeeklyPreferenceSet {
      family_id:    decode_uuid(&self.family_id)?,
      group_id:     decode_uuid(&self.group_id)?,
      week_start:   decode_date(&self.week_start)?,
      submitted_at: decode_dt(&self.submitted_at)?,
      tiers,
    })
  }
}

pub struct RawFairnessRecord {
  pub family_id:            String,
  pub group_id:             String,
  pub children_count:       i64,
  pub total_trips:          i64,
  pub total_weeks:          i64,
  pub fairness_debt:        f64,
  pub vacation_adjustments: i64,
  pub weekly_history:       String,
  pub adjustments:          String,
  pub period_started_at:    String,
}

impl RawFairnessRecord {
  pub fn into_record(self) -> Result<FairnessRecord> {
    let weekly_history: Vec<WeekEntry> =
      serde_json::from_str(&self.weekly_history)?;
    let adjustments: Vec<ManualAdjustment> =
      serde_json::from_str(&self.adjustments)?;
    Ok(FairnessRecord {
      family_id:            decode_uuid(&self.family_id)?,
      group_id:             decode_uuid(&self.group_id)?,
      children_count:       self.children_count as u32,
      total_trips:          self.total_trips as u32,
      total_weeks:          self.total_weeks as u32,
      fairness_debt:        self.fairness_debt,
      vacation_adjustments: self.vacation_adjustments as u32,
      weekly_history,
      adjustments,
      period_started_at:    decode_dt(&self.period_started_at)?,
    })
  }
}

pub struct RawVacation {
  pub vacation_id:       String,
  pub family_id:         String,
  pub group_id:          String,
  pub start_date:        String,
  pub end_date:          String,
  pub coverage_arranged: bool,
  pub backup_drivers:    String,
}

impl RawVacation {
  pub fn into_vacation(self) -> Result<VacationRecord> {
    Ok(VacationRecord {
      vacation_id:       decode_uuid(&self.vacation_id)?,
      family_id:         decode_uuid(&self.family_id)?,
      group_id:          decode_uuid(&self.group_id)?,
      start_date:        decode_date(&self.start_date)?,
      end_date:          decode_date(&self.end_date)?,
      coverage_arranged: self.coverage_arranged,
      backup_drivers:    decode_uuid_list(&self.backup_drivers)?,
    })
  }
}

pub struct RawHoliday {
  pub holiday_id:             String,
  pub group_id:               String,
  pub name:                   String,
  pub start_date:             String,
  pub end_date:               String,
  pub auto_adjust_scheduling: bool,
}

impl RawHoliday {
  pub fn into_holiday(self) -> Result<HolidayRecord> {
    Ok(HolidayRecord {
      holiday_id:             decode_uuid(&self.holiday_id)?,
      group_id:               decode_uuid(&self.group_id)?,
      name:                   self.name,
      start_date:             decode_date(&self.start_date)?,
      end_date:               decode_date(&self.end_date)?,
      auto_adjust_scheduling: self.auto_adjust_scheduling,
    })
  }
}
