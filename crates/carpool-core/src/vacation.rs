//! Vacation and holiday windows, and the date arithmetic that excuses a
//! family from duty without punishing their fairness debt.
//!
//! Two distinct cases:
//! - a per-family [`VacationRecord`] excludes that family's slots only and
//!   reduces their fair share for the affected weeks;
//! - a group-wide [`HolidayRecord`] with `auto_adjust_scheduling` removes
//!   the slots for *everyone*, so no fair-share adjustment is made at all.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  group::TimeSlot,
  schedule::{CancelReason, SlotCancellation, WeekSchedule},
};

/// Days of driving duty per template week used by the weekday
/// approximation below.
pub const WEEKDAYS_PER_WEEK: u32 = 5;

// ─── Records ─────────────────────────────────────────────────────────────────

/// A family's absence window. Owned by holiday management; the core reads
/// the window and writes back `coverage_arranged` and `backup_drivers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationRecord {
  pub vacation_id:       Uuid,
  pub family_id:         Uuid,
  pub group_id:          Uuid,
  pub start_date:        NaiveDate,
  pub end_date:          NaiveDate,
  pub coverage_arranged: bool,
  pub backup_drivers:    Vec<Uuid>,
}

impl VacationRecord {
  pub fn new(
    family_id:  Uuid,
    group_id:   Uuid,
    start_date: NaiveDate,
    end_date:   NaiveDate,
  ) -> Result<Self> {
    if start_date > end_date {
      return Err(Error::InvertedDateRange {
        start: start_date,
        end:   end_date,
      });
    }
    Ok(Self {
      vacation_id: Uuid::new_v4(),
      family_id,
      group_id,
      start_date,
      end_date,
      coverage_arranged: false,
      backup_drivers: Vec::new(),
    })
  }

  pub fn covers(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }

  pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
    self.start_date <= end && start <= self.end_date
  }
}

/// A group-wide no-school window. When `auto_adjust_scheduling` is set,
/// slots in range are removed from assignment for every family at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolidayRecord {
  pub holiday_id:             Uuid,
  pub group_id:               Uuid,
  pub name:                   String,
  pub start_date:             NaiveDate,
  pub end_date:               NaiveDate,
  pub auto_adjust_scheduling: bool,
}

impl HolidayRecord {
  pub fn covers(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }
}

// ─── Date arithmetic ─────────────────────────────────────────────────────────

/// Weekday approximation of a calendar range: `floor(calendar_days * 5/7)`.
/// Used for the cumulative `vacation_adjustments` counter, so a 5-day
/// vacation excuses 3 weekdays of duty.
pub fn excused_weekdays(start: NaiveDate, end: NaiveDate) -> u32 {
  if start > end {
    return 0;
  }
  let calendar_days = (end - start).num_days() as u32 + 1;
  calendar_days * WEEKDAYS_PER_WEEK / 7
}

/// Exact count of Mon-Fri dates in `[start, end]` that fall inside the
/// week starting at `week_start`. Drives the per-week availability
/// fraction in the fairness ledger.
pub fn weekdays_in_week(
  start:      NaiveDate,
  end:        NaiveDate,
  week_start: NaiveDate,
) -> u32 {
  (0..WEEKDAYS_PER_WEEK as u64)
    .map(|offset| week_start + chrono::Days::new(offset))
    .filter(|d| {
      *d >= start && *d <= end && d.weekday() != Weekday::Sat
        && d.weekday() != Weekday::Sun
    })
    .count() as u32
}

/// Slots of `template` whose concrete date in the week starting at
/// `week_start` falls inside `[start, end]`.
pub fn excluded_slots(
  template:   &[TimeSlot],
  week_start: NaiveDate,
  start:      NaiveDate,
  end:        NaiveDate,
) -> Vec<(Uuid, NaiveDate)> {
  template
    .iter()
    .filter_map(|slot| {
      let date = slot.date_in_week(week_start);
      (start <= date && date <= end).then_some((slot.slot_id, date))
    })
    .collect()
}

// ─── Holiday cancellation ────────────────────────────────────────────────────

/// Cancel every already-generated assignment in `schedule` whose slot date
/// falls inside the holiday. Returns the cancellations that were applied.
/// No fairness adjustment accompanies this: a holiday affects all families
/// equally.
pub fn cancel_for_holiday(
  schedule: &mut WeekSchedule,
  template: &[TimeSlot],
  holiday:  &HolidayRecord,
) -> Vec<SlotCancellation> {
  if !holiday.auto_adjust_scheduling {
    return Vec::new();
  }

  let affected =
    excluded_slots(template, schedule.week_start, holiday.start_date, holiday.end_date);

  let mut applied = Vec::new();
  for (slot_id, date) in affected {
    if schedule.cancelled.iter().any(|c| c.slot_id == slot_id) {
      continue;
    }
    let cancellation = SlotCancellation {
      slot_id,
      date,
      reason: CancelReason::Holiday,
    };
    schedule.cancelled.push(cancellation.clone());
    if let Some(a) =
      schedule.assignments.iter_mut().find(|a| a.slot_id == slot_id)
    {
      a.family_id = None;
    }
    applied.push(cancellation);
  }
  applied
}
