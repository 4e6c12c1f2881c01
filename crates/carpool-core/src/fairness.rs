//! The fairness-debt ledger.
//!
//! One [`FairnessRecord`] per `(family, group)` carries lifetime totals, a
//! signed debt (positive = has driven more than their fair share), the
//! per-week history, and an audited manual-adjustment log. A
//! [`FairnessLedger`] is constructed per group from loaded records and
//! mutated in memory; the caller persists the records through the store
//! trait. There is deliberately no shared global ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  family::Family,
  group::monday_of,
  schedule::WeekSchedule,
  vacation::{VacationRecord, WEEKDAYS_PER_WEEK, weekdays_in_week},
};

/// Families with debt above this are flagged for deprioritisation.
pub const DEBT_DEPRIORITIZE_THRESHOLD: f64 = 1.5;
/// Families with debt below this are flagged for prioritisation.
pub const DEBT_PRIORITIZE_THRESHOLD: f64 = -1.5;

// ─── Records ─────────────────────────────────────────────────────────────────

/// One recorded week for one family. `children_in_group` is frozen at
/// recording time, so later membership changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekEntry {
  pub week_start:        NaiveDate,
  pub assigned_trips:    u32,
  pub fair_share:        f64,
  pub debt_change:       f64,
  pub children_in_group: u32,
}

/// An admin-issued debt correction, audited separately from the weekly
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAdjustment {
  pub adjusted_at:     DateTime<Utc>,
  pub delta:           f64,
  pub reason:          String,
  pub admin_family_id: Uuid,
}

/// Cumulative fairness state for one family in one group. Created lazily
/// on first recording; reset (never deleted) at school-year boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessRecord {
  pub family_id:            Uuid,
  pub group_id:             Uuid,
  pub children_count:       u32,
  pub total_trips:          u32,
  pub total_weeks:          u32,
  pub fairness_debt:        f64,
  /// Cumulative weekdays excused by vacations.
  pub vacation_adjustments: u32,
  pub weekly_history:       Vec<WeekEntry>,
  pub adjustments:          Vec<ManualAdjustment>,
  pub period_started_at:    DateTime<Utc>,
}

impl FairnessRecord {
  pub fn new(family_id: Uuid, group_id: Uuid, children_count: u32) -> Self {
    Self {
      family_id,
      group_id,
      children_count,
      total_trips: 0,
      total_weeks: 0,
      fairness_debt: 0.0,
      vacation_adjustments: 0,
      weekly_history: Vec::new(),
      adjustments: Vec::new(),
      period_started_at: Utc::now(),
    }
  }

  pub fn average_trips_per_week(&self) -> f64 {
    if self.total_weeks == 0 {
      0.0
    } else {
      f64::from(self.total_trips) / f64::from(self.total_weeks)
    }
  }

  fn has_week(&self, week_start: NaiveDate) -> bool {
    self.weekly_history.iter().any(|e| e.week_start == week_start)
  }

  /// Remove a recorded week and revert its contribution to the totals.
  fn revert_week(&mut self, week_start: NaiveDate) {
    if let Some(pos) =
      self.weekly_history.iter().position(|e| e.week_start == week_start)
    {
      let entry = self.weekly_history.remove(pos);
      self.total_trips -= entry.assigned_trips;
      self.total_weeks -= 1;
      self.fairness_debt -= entry.debt_change;
    }
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Per-family line of the equity dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyEquity {
  pub family_id:             Uuid,
  pub equity_score:          u32,
  pub fairness_debt:         f64,
  pub total_trips:           u32,
  pub total_weeks:           u32,
  pub average_trips_per_week: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
  /// Debt above +1.5: give this family fewer slots next week.
  Deprioritize,
  /// Debt below -1.5: give this family more slots next week.
  Prioritize,
}

/// An advisory flag; the engine's lowest-debt tie-break already leans the
/// same way, so nothing enforces these automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
  pub family_id:     Uuid,
  pub kind:          RecommendationKind,
  pub fairness_debt: f64,
}

/// The computed read model for a group's fairness state. Never stored,
/// always derived from the records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessDashboard {
  pub group_id:        Uuid,
  /// `max(0, 100 - debt_range * 10)` across the group.
  pub group_score:     u32,
  pub families:        Vec<FamilyEquity>,
  pub recommendations: Vec<Recommendation>,
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// In-memory fairness ledger for a single group. Construct from the loaded
/// records, mutate, then persist [`FairnessLedger::into_records`].
pub struct FairnessLedger {
  group_id: Uuid,
  records:  BTreeMap<Uuid, FairnessRecord>,
}

impl FairnessLedger {
  pub fn from_records(group_id: Uuid, records: Vec<FairnessRecord>) -> Self {
    Self {
      group_id,
      records: records
        .into_iter()
        .filter(|r| r.group_id == group_id)
        .map(|r| (r.family_id, r))
        .collect(),
    }
  }

  pub fn record(&self, family_id: Uuid) -> Option<&FairnessRecord> {
    self.records.get(&family_id)
  }

  /// Debt snapshot for the assignment engine's tie-break.
  pub fn debts(&self) -> BTreeMap<Uuid, f64> {
    self
      .records
      .values()
      .map(|r| (r.family_id, r.fairness_debt))
      .collect()
  }

  /// Consume the ledger, yielding records in family-id order for
  /// persistence.
  pub fn into_records(self) -> Vec<FairnessRecord> {
    self.records.into_values().collect()
  }

  fn ensure_record(&mut self, family: &Family) -> &mut FairnessRecord {
    self
      .records
      .entry(family.family_id)
      .or_insert_with(|| {
        FairnessRecord::new(family.family_id, self.group_id, family.children_count)
      })
  }

  // ── record_week ───────────────────────────────────────────────────────

  /// Record a finished week into every active member's fairness record.
  ///
  /// For each family: `fair_share = (total_slots / total_children) *
  /// children_count * availability`, where `availability` scales down for
  /// weekdays excused by a recorded vacation (a fully-excused week yields
  /// a share of zero, so being away never raises debt). `debt_change =
  /// assigned - fair_share`.
  ///
  /// Recording the same week twice is rejected with
  /// [`Error::DuplicateRecording`] unless `force` is set, in which case the
  /// prior entry's contribution is reverted and replaced wholesale.
  pub fn record_week(
    &mut self,
    week_start: NaiveDate,
    schedule:   &WeekSchedule,
    families:   &[Family],
    vacations:  &[VacationRecord],
    force:      bool,
  ) -> Result<()> {
    let week_start = monday_of(week_start);

    let members: Vec<&Family> = families
      .iter()
      .filter(|f| f.active && f.group_ids.contains(&self.group_id))
      .collect();

    let already_recorded = members
      .iter()
      .filter_map(|f| self.records.get(&f.family_id))
      .any(|r| r.has_week(week_start));
    if already_recorded {
      if !force {
        return Err(Error::DuplicateRecording {
          group_id: self.group_id,
          week_start,
        });
      }
      for family in &members {
        if let Some(record) = self.records.get_mut(&family.family_id) {
          record.revert_week(week_start);
        }
      }
    }

    let total_children: u32 = members.iter().map(|f| f.children_count).sum();
    let total_slots = schedule.assignable_slots() as f64;
    let counts = schedule.assigned_counts();

    for family in members {
      let excused = vacations
        .iter()
        .filter(|v| {
          v.group_id == self.group_id && v.family_id == family.family_id
        })
        .map(|v| weekdays_in_week(v.start_date, v.end_date, week_start))
        .sum::<u32>()
        .min(WEEKDAYS_PER_WEEK);
      let availability =
        f64::from(WEEKDAYS_PER_WEEK - excused) / f64::from(WEEKDAYS_PER_WEEK);

      let fair_share = if total_children == 0 {
        0.0
      } else {
        (total_slots / f64::from(total_children))
          * f64::from(family.children_count)
          * availability
      };

      let assigned = counts.get(&family.family_id).copied().unwrap_or(0);
      let debt_change = f64::from(assigned) - fair_share;

      let record = self.ensure_record(family);
      record.children_count = family.children_count;
      record.weekly_history.push(WeekEntry {
        week_start,
        assigned_trips: assigned,
        fair_share,
        debt_change,
        children_in_group: total_children,
      });
      record.total_trips += assigned;
      record.total_weeks += 1;
      record.fairness_debt += debt_change;
    }

    Ok(())
  }

  // ── Vacation excusal ──────────────────────────────────────────────────

  /// Bump the cumulative excused-weekday counter for a vacationing family.
  /// The per-week fair-share reduction itself happens in
  /// [`FairnessLedger::record_week`] via the availability fraction.
  pub fn excuse_vacation(
    &mut self,
    family:   &Family,
    vacation: &VacationRecord,
  ) -> u32 {
    let days =
      crate::vacation::excused_weekdays(vacation.start_date, vacation.end_date);
    let record = self.ensure_record(family);
    record.vacation_adjustments += days;
    days
  }

  // ── Manual adjustment ─────────────────────────────────────────────────

  /// Apply an admin-issued signed delta to a family's debt, with the
  /// reason kept in the audited adjustments log.
  pub fn adjust(
    &mut self,
    family_id:       Uuid,
    delta:           f64,
    reason:          String,
    admin_family_id: Uuid,
  ) -> Result<()> {
    let record = self
      .records
      .get_mut(&family_id)
      .ok_or(Error::FamilyNotFound(family_id))?;
    record.fairness_debt += delta;
    record.adjustments.push(ManualAdjustment {
      adjusted_at: Utc::now(),
      delta,
      reason,
      admin_family_id,
    });
    Ok(())
  }

  // ── Reset ─────────────────────────────────────────────────────────────

  /// Zero every family's totals, debt, history, and adjustment log, and
  /// stamp a new tracking-period start. Identity is preserved; used at
  /// school-year boundaries.
  pub fn reset(&mut self, now: DateTime<Utc>) {
    for record in self.records.values_mut() {
      record.total_trips = 0;
      record.total_weeks = 0;
      record.fairness_debt = 0.0;
      record.vacation_adjustments = 0;
      record.weekly_history.clear();
      record.adjustments.clear();
      record.period_started_at = now;
    }
  }

  // ── Dashboard ─────────────────────────────────────────────────────────

  /// Equity scores and advisory recommendations for the group.
  pub fn dashboard(&self) -> FairnessDashboard {
    let families: Vec<FamilyEquity> = self
      .records
      .values()
      .map(|r| FamilyEquity {
        family_id:              r.family_id,
        equity_score:           equity_score(r),
        fairness_debt:          r.fairness_debt,
        total_trips:            r.total_trips,
        total_weeks:            r.total_weeks,
        average_trips_per_week: r.average_trips_per_week(),
      })
      .collect();

    let group_score = match (
      self.records.values().map(|r| r.fairness_debt).fold(f64::INFINITY, f64::min),
      self
        .records
        .values()
        .map(|r| r.fairness_debt)
        .fold(f64::NEG_INFINITY, f64::max),
    ) {
      (min, max) if min.is_finite() && max.is_finite() => {
        (100.0 - (max - min) * 10.0).max(0.0).round() as u32
      }
      _ => 100,
    };

    let mut recommendations: Vec<Recommendation> = self
      .records
      .values()
      .filter_map(|r| {
        let kind = if r.fairness_debt > DEBT_DEPRIORITIZE_THRESHOLD {
          Some(RecommendationKind::Deprioritize)
        } else if r.fairness_debt < DEBT_PRIORITIZE_THRESHOLD {
          Some(RecommendationKind::Prioritize)
        } else {
          None
        };
        kind.map(|kind| Recommendation {
          family_id:     r.family_id,
          kind,
          fairness_debt: r.fairness_debt,
        })
      })
      .collect();
    // Worst offenders first.
    recommendations.sort_by(|a, b| {
      b.fairness_debt
        .abs()
        .partial_cmp(&a.fairness_debt.abs())
        .unwrap_or(std::cmp::Ordering::Equal)
        .then(a.family_id.cmp(&b.family_id))
    });

    FairnessDashboard {
      group_id: self.group_id,
      group_score,
      families,
      recommendations,
    }
  }
}

/// `round(max(0, min(100, avg/expected * 100) - |debt| * 5))`, with one
/// expected trip per week per child.
fn equity_score(record: &FairnessRecord) -> u32 {
  let expected = f64::from(record.children_count);
  let ratio_pct = if expected > 0.0 {
    (record.average_trips_per_week() / expected * 100.0).min(100.0)
  } else {
    0.0
  };
  (ratio_pct - record.fairness_debt.abs() * 5.0).max(0.0).round() as u32
}

// ─── Tests ───────────────────────────────────────────────────────────────────
