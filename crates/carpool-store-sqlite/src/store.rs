//! [`SqliteStore`] — the SQLite implementation of [`CarpoolStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use carpool_core::{
  fairness::FairnessRecord,
  family::Family,
  group::Group,
  preference::WeeklyPreferenceSet,
  schedule::WeekSchedule,
  store::CarpoolStore,
  vacation::{HolidayRecord, VacationRecord},
};

use crate::{
  Error, Result,
  encode::{
    RawFairnessRecord, RawFamily, RawGroup, RawHoliday, RawPreferenceSet,
    RawVacation, encode_date, encode_dt, encode_uuid, encode_uuid_list,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A carpool store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CarpoolStore impl ───────────────────────────────────────────────────────

impl CarpoolStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────

  async fn upsert_family(&self, family: Family) -> Result<()> {
    let family_id_str = encode_uuid(family.family_id);
    let created_at    = encode_dt(family.created_at);
    let group_ids     = encode_uuid_list(&family.group_ids)?;
    let display_name  = family.display_name;
    let children      = i64::from(family.children_count);
    let active        = family.active;
    let can_drive     = family.can_drive;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO families (
             family_id, display_name, created_at, active,
             children_count, can_drive, group_ids
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            family_id_str,
            display_name,
            created_at,
            active,
            children,
            can_drive,
            group_ids,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_family(&self, family_id: Uuid) -> Result<Option<Family>> {
    let id_str = encode_uuid(family_id);

    let raw: Option<RawFamily> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT family_id, display_name, created_at, active,
                      children_count, can_drive, group_ids
               FROM families WHERE family_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawFamily {
                  family_id:      row.get(0)?,
                  display_name:   row.get(1)?,
                  created_at:     row.get(2)?,
                  active:         row.get(3)?,
                  children_count: row.get(4)?,
                  can_drive:      row.get(5)?,
                  group_ids:      row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFamily::into_family).transpose()
  }

  async fn group_families(&self, group_id: Uuid) -> Result<Vec<Family>> {
    let pattern = format!("%{}%", encode_uuid(group_id));

    let raws: Vec<RawFamily> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT family_id, display_name, created_at, active,
                  children_count, can_drive, group_ids
           FROM families WHERE group_ids LIKE ?1
           ORDER BY family_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| {
            Ok(RawFamily {
              family_id:      row.get(0)?,
              display_name:   row.get(1)?,
              created_at:     row.get(2)?,
              active:         row.get(3)?,
              children_count: row.get(4)?,
              can_drive:      row.get(5)?,
              group_ids:      row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFamily::into_family).collect()
  }

  async fn upsert_group(&self, group: Group) -> Result<()> {
    let group_id_str = encode_uuid(group.group_id);
    let admin_str    = encode_uuid(group.admin_family_id);
    let member_ids   = encode_uuid_list(&group.member_ids)?;
    let template     = serde_json::to_string(&group.template)?;
    let name         = group.name;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO groups
             (group_id, name, admin_family_id, member_ids, template)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![group_id_str, name, admin_str, member_ids, template],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_group(&self, group_id: Uuid) -> Result<Option<Group>> {
    let id_str = encode_uuid(group_id);

    let raw: Option<RawGroup> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT group_id, name, admin_family_id, member_ids, template
               FROM groups WHERE group_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawGroup {
                  group_id:        row.get(0)?,
                  name:            row.get(1)?,
                  admin_family_id: row.get(2)?,
                  member_ids:      row.get(3)?,
                  template:        row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGroup::into_group).transpose()
  }

  // ── Preferences ───────────────────────────────────────────────────────

  async fn save_preferences(&self, set: WeeklyPreferenceSet) -> Result<()> {
    let family_id_str = encode_uuid(set.family_id);
    let group_id_str  = encode_uuid(set.group_id);
    let week_str      = encode_date(set.week_start);
    let submitted_str = encode_dt(set.submitted_at);
    let tiers         = serde_json::to_string(&set.tiers)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO preferences
             (family_id, group_id, week_start, submitted_at, tiers)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            family_id_str,
            group_id_str,
            week_str,
            submitted_str,
            tiers,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn preferences(
    &self,
    group_id:   Uuid,
    week_start: NaiveDate,
  ) -> Result<Vec<WeeklyPreferenceSet>> {
    let group_id_str = encode_uuid(group_id);
    let week_str     = encode_date(week_start);

    let raws: Vec<RawPreferenceSet> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT family_id, group_id, week_start, submitted_at, tiers
           FROM preferences
           WHERE group_id = ?1 AND week_start = ?2
           ORDER BY family_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_id_str, week_str], |row| {
            Ok(RawPreferenceSet {
              family_id:    row.get(0)?,
              group_id:     row.get(1)?,
              week_start:   row.get(2)?,
              submitted_at: row.get(3)?,
              tiers:        row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPreferenceSet::into_set).collect()
  }

  // ── Fairness records ──────────────────────────────────────────────────

  async fn fairness_records(&self, group_id: Uuid) -> Result<Vec<FairnessRecord>> {
    let group_id_str = encode_uuid(group_id);

    let raws: Vec<RawFairnessRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT family_id, group_id, children_count, total_trips,
                  total_weeks, fairness_debt, vacation_adjustments,
                  weekly_history, adjustments, period_started_at
           FROM fairness_records WHERE group_id = ?1
           ORDER BY family_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_id_str], |row| {
            Ok(RawFairnessRecord {
              family_id:            row.get(0)?,
              group_id:             row.get(1)?,
              children_count:       row.get(2)?,
              total_trips:          row.get(3)?,
              total_weeks:          row.get(4)?,
              fairness_debt:        row.get(5)?,
              vacation_adjustments: row.get(6)?,
              weekly_history:       row.get(7)?,
              adjustments:          row.get(8)?,
              period_started_at:    row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFairnessRecord::into_record).collect()
  }

  async fn save_fairness_records(&self, records: Vec<FairnessRecord>) -> Result<()> {
    // One transaction per family record: a concurrent reader sees each
    // record either fully old or fully new, and a mid-batch failure never
    // leaves a half-written row.
    for record in records {
      let family_id_str  = encode_uuid(record.family_id);
      let group_id_str   = encode_uuid(record.group_id);
      let children       = i64::from(record.children_count);
      let total_trips    = i64::from(record.total_trips);
      let total_weeks    = i64::from(record.total_weeks);
      let fairness_debt  = record.fairness_debt;
      let vac_days       = i64::from(record.vacation_adjustments);
      let weekly_history = serde_json::to_string(&record.weekly_history)?;
      let adjustments    = serde_json::to_string(&record.adjustments)?;
      let period_started = encode_dt(record.period_started_at);

      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          tx.execute(
            "INSERT OR REPLACE INTO fairness_records (
               family_id, group_id, children_count, total_trips,
               total_weeks, fairness_debt, vacation_adjustments,
               weekly_history, adjustments, period_started_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              family_id_str,
              group_id_str,
              children,
              total_trips,
              total_weeks,
              fairness_debt,
              vac_days,
              weekly_history,
              adjustments,
              period_started,
            ],
          )?;
          tx.commit()?;
          Ok(())
        })
        .await?;
    }
    Ok(())
  }

  // ── Week schedules ────────────────────────────────────────────────────

  async fn week_schedule(
    &self,
    group_id:   Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<WeekSchedule>> {
    let group_id_str = encode_uuid(group_id);
    let week_str     = encode_date(week_start);

    let payload: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload FROM week_schedules
               WHERE group_id = ?1 AND week_start = ?2",
              rusqlite::params![group_id_str, week_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    payload
      .map(|p| serde_json::from_str(&p).map_err(Error::Json))
      .transpose()
  }

  async fn save_week_schedule(&self, schedule: WeekSchedule) -> Result<()> {
    let group_id_str = encode_uuid(schedule.group_id);
    let week_str     = encode_date(schedule.week_start);
    let payload      = serde_json::to_string(&schedule)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO week_schedules (group_id, week_start, payload)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![group_id_str, week_str, payload],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Vacations and holidays ────────────────────────────────────────────

  async fn save_vacation(&self, vacation: VacationRecord) -> Result<()> {
    let vacation_id_str = encode_uuid(vacation.vacation_id);
    let family_id_str   = encode_uuid(vacation.family_id);
    let group_id_str    = encode_uuid(vacation.group_id);
    let start_str       = encode_date(vacation.start_date);
    let end_str         = encode_date(vacation.end_date);
    let arranged        = vacation.coverage_arranged;
    let backups         = encode_uuid_list(&vacation.backup_drivers)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO vacations (
             vacation_id, family_id, group_id, start_date, end_date,
             coverage_arranged, backup_drivers
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            vacation_id_str,
            family_id_str,
            group_id_str,
            start_str,
            end_str,
            arranged,
            backups,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn vacations(&self, group_id: Uuid) -> Result<Vec<VacationRecord>> {
    let group_id_str = encode_uuid(group_id);

    let raws: Vec<RawVacation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT vacation_id, family_id, group_id, start_date, end_date,
                  coverage_arranged, backup_drivers
           FROM vacations WHERE group_id = ?1
           ORDER BY start_date, vacation_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_id_str], |row| {
            Ok(RawVacation {
              vacation_id:       row.get(0)?,
              family_id:         row.get(1)?,
              group_id:          row.get(2)?,
              start_date:        row.get(3)?,
              end_date:          row.get(4)?,
              coverage_arranged: row.get(5)?,
              backup_drivers:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVacation::into_vacation).collect()
  }

  async fn save_holiday(&self, holiday: HolidayRecord) -> Result<()> {
    let holiday_id_str = encode_uuid(holiday.holiday_id);
    let group_id_str   = encode_uuid(holiday.group_id);
    let name           = holiday.name;
    let start_str      = encode_date(holiday.start_date);
    let end_str        = encode_date(holiday.end_date);
    let auto_adjust    = holiday.auto_adjust_scheduling;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO holidays (
             holiday_id, group_id, name, start_date, end_date,
             auto_adjust_scheduling
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            holiday_id_str,
            group_id_str,
            name,
            start_str,
            end_str,
            auto_adjust,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn holidays(&self, group_id: Uuid) -> Result<Vec<HolidayRecord>> {
    let group_id_str = encode_uuid(group_id);

    let raws: Vec<RawHoliday> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT holiday_id, group_id, name, start_date, end_date,
                  auto_adjust_scheduling
           FROM holidays WHERE group_id = ?1
           ORDER BY start_date, holiday_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![group_id_str], |row| {
            Ok(RawHoliday {
              holiday_id:             row.get(0)?,
              group_id:               row.get(1)?,
              name:                   row.get(2)?,
              start_date:             row.get(3)?,
              end_date:               row.get(4)?,
              auto_adjust_scheduling: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHoliday::into_holiday).collect()
  }
}
