//! The weekly slot-assignment engine.
//!
//! [`assign_week`] is a pure function: given the group template, every
//! member's preferences and fairness record, and the active vacation and
//! holiday windows, it produces exactly one assignment per slot. It has no
//! side effects and is deterministic, so forced regeneration with identical
//! inputs yields an identical schedule.
//!
//! Per slot, in strict order: exclude ineligible families, then try the
//! `preferable` tier, then `less_preferable`, then `neutral` (the default
//! for unmapped slots). Within the winning tier the family with the lowest
//! fairness debt drives; debts tied within [`DEBT_EPSILON`] fall back to
//! ascending family id.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  family::Family,
  group::{Group, monday_of},
  preference::{PreferenceTier, WeeklyPreferenceSet},
  vacation::{HolidayRecord, VacationRecord},
};

/// Debts closer than this are considered tied and fall through to the
/// family-id tie-break.
pub const DEBT_EPSILON: f64 = 1e-9;

// ─── Output types ────────────────────────────────────────────────────────────

/// The preference tier that produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMethod {
  Preferable,
  LessPreferable,
  Neutral,
  /// No eligible family existed; see the matching [`SlotConflict`].
  Unfilled,
}

/// Why the winning family won, recorded for admin-facing explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TieBreakRationale {
  /// Only one family survived the tier filter.
  SoleCandidate,
  /// Strictly lowest fairness debt among the tier's candidates.
  LowestDebt {
    winner_debt:    f64,
    runner_up_debt: f64,
  },
  /// Debts tied within epsilon; lowest family id wins.
  FamilyIdOrder { tied: usize },
}

/// One slot's outcome for the week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
  pub slot_id:   Uuid,
  pub date:      NaiveDate,
  /// `None` when the slot is unfilled or holiday-cancelled.
  pub family_id: Option<Uuid>,
  pub method:    AssignmentMethod,
  pub rationale: Option<TieBreakRationale>,
}

/// Why a slot could not be filled. A first-class result value, not an
/// error: the rest of the week is still assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
  /// The group has no active, drive-capable members at all.
  NoActiveDrivers,
  /// Every otherwise-eligible family is on vacation for this date.
  AllOnVacation,
  /// Every remaining family marked the slot unavailable.
  AllUnavailable,
}

/// An unfillable slot, surfaced for manual admin resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConflict {
  pub slot_id: Uuid,
  pub date:    NaiveDate,
  pub reason:  ConflictReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
  Holiday,
}

/// A slot removed from the week after (or during) generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotCancellation {
  pub slot_id: Uuid,
  pub date:    NaiveDate,
  pub reason:  CancelReason,
}

/// The complete output for one `(group, week)`: one assignment per
/// template slot, plus conflicts and holiday cancellations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
  pub group_id:    Uuid,
  /// Monday of the scheduled week.
  pub week_start:  NaiveDate,
  pub assignments: Vec<SlotAssignment>,
  pub conflicts:   Vec<SlotConflict>,
  pub cancelled:   Vec<SlotCancellation>,
}

impl WeekSchedule {
  /// Trips per family in this week. Families with no slot are absent.
  pub fn assigned_counts(&self) -> BTreeMap<Uuid, u32> {
    let mut counts = BTreeMap::new();
    for a in &self.assignments {
      if let Some(family_id) = a.family_id {
        *counts.entry(family_id).or_insert(0) += 1;
      }
    }
    counts
  }

  /// Slots that count toward fair share: everything not holiday-cancelled.
  pub fn assignable_slots(&self) -> usize {
    self.assignments.len() - self.cancelled.len()
  }

  pub fn assignment_for(&self, slot_id: Uuid) -> Option<&SlotAssignment> {
    self.assignments.iter().find(|a| a.slot_id == slot_id)
  }
}

// ─── Engine input ────────────────────────────────────────────────────────────

/// Everything [`assign_week`] needs, loaded by the caller. The engine
/// never touches storage.
pub struct WeekContext<'a> {
  pub group:       &'a Group,
  /// Monday (or any day; normalised) of the target week.
  pub week_start:  NaiveDate,
  pub families:    &'a [Family],
  pub preferences: &'a [WeeklyPreferenceSet],
  /// `(family_id, fairness_debt)` snapshot; families absent here count
  /// as debt 0.
  pub debts:       &'a BTreeMap<Uuid, f64>,
  pub vacations:   &'a [VacationRecord],
  pub holidays:    &'a [HolidayRecord],
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Assign every slot of the group's template for one week.
pub fn assign_week(ctx: &WeekContext) -> WeekSchedule {
  let week_start = monday_of(ctx.week_start);

  let members: BTreeMap<Uuid, &Family> = ctx
    .families
    .iter()
    .filter(|f| ctx.group.is_member(f.family_id))
    .map(|f| (f.family_id, f))
    .collect();

  // Over-limit submissions are demoted rather than trusted; see
  // WeeklyPreferenceSet::normalized.
  let prefs: BTreeMap<Uuid, WeeklyPreferenceSet> = ctx
    .preferences
    .iter()
    .filter(|p| p.group_id == ctx.group.group_id && p.week_start == week_start)
    .map(|p| (p.family_id, p.normalized()))
    .collect();

  let mut schedule = WeekSchedule {
    group_id:    ctx.group.group_id,
    week_start,
    assignments: Vec::with_capacity(ctx.group.template.len()),
    conflicts:   Vec::new(),
    cancelled:   Vec::new(),
  };

  for slot in &ctx.group.template {
    let date = slot.date_in_week(week_start);

    // Group-wide holiday: the slot is removed for everyone, no conflict.
    if ctx
      .holidays
      .iter()
      .any(|h| h.group_id == ctx.group.group_id && h.auto_adjust_scheduling && h.covers(date))
    {
      schedule.assignments.push(SlotAssignment {
        slot_id:   slot.slot_id,
        date,
        family_id: None,
        method:    AssignmentMethod::Unfilled,
        rationale: None,
      });
      schedule.cancelled.push(SlotCancellation {
        slot_id: slot.slot_id,
        date,
        reason:  CancelReason::Holiday,
      });
      continue;
    }

    // Step 1: exclusion. Track the pool size at each stage so an empty
    // result can name its cause.
    let drivers: Vec<&Family> =
      members.values().copied().filter(|f| f.eligible_driver()).collect();

    let off_vacation: Vec<&Family> = drivers
      .iter()
      .copied()
      .filter(|f| {
        !ctx.vacations.iter().any(|v| {
          v.group_id == ctx.group.group_id
            && v.family_id == f.family_id
            && v.covers(date)
        })
      })
      .collect();

    let tier_of = |family_id: Uuid| {
      prefs
        .get(&family_id)
        .map(|p| p.tier_for(slot.slot_id))
        .unwrap_or_default()
    };

    let available: Vec<&Family> = off_vacation
      .iter()
      .copied()
      .filter(|f| tier_of(f.family_id) != PreferenceTier::Unavailable)
      .collect();

    if available.is_empty() {
      let reason = if drivers.is_empty() {
        ConflictReason::NoActiveDrivers
      } else if off_vacation.is_empty() {
        ConflictReason::AllOnVacation
      } else {
        ConflictReason::AllUnavailable
      };
      schedule.assignments.push(SlotAssignment {
        slot_id:   slot.slot_id,
        date,
        family_id: None,
        method:    AssignmentMethod::Unfilled,
        rationale: None,
      });
      schedule.conflicts.push(SlotConflict { slot_id: slot.slot_id, date, reason });
      continue;
    }

    // Steps 2-4: tier passes, highest tier that has any candidate.
    let passes = [
      (PreferenceTier::Preferable, AssignmentMethod::Preferable),
      (PreferenceTier::LessPreferable, AssignmentMethod::LessPreferable),
      (PreferenceTier::Neutral, AssignmentMethod::Neutral),
    ];
    let (candidates, method) = passes
      .iter()
      .find_map(|(tier, method)| {
        let subset: Vec<&Family> = available
          .iter()
          .copied()
          .filter(|f| tier_of(f.family_id) == *tier)
          .collect();
        (!subset.is_empty()).then_some((subset, *method))
      })
      .unwrap_or_else(|| {
        // Every available family has a tier in the pass list.
        unreachable!("available candidates always match a tier pass")
      });

    // Step 5: lowest debt, then ascending family id.
    let (winner, rationale) = tie_break(&candidates, ctx.debts);

    schedule.assignments.push(SlotAssignment {
      slot_id:   slot.slot_id,
      date,
      family_id: Some(winner),
      method,
      rationale: Some(rationale),
    });
  }

  schedule
}

fn debt_of(debts: &BTreeMap<Uuid, f64>, family_id: Uuid) -> f64 {
  debts.get(&family_id).copied().unwrap_or(0.0)
}

/// Select from a non-empty candidate set: lowest fairness debt wins; debts
/// within [`DEBT_EPSILON`] of the minimum are tied and the lowest family id
/// among them wins. Deterministic for any input order.
fn tie_break(
  candidates: &[&Family],
  debts:      &BTreeMap<Uuid, f64>,
) -> (Uuid, TieBreakRationale) {
  if let [only] = candidates {
    return (only.family_id, TieBreakRationale::SoleCandidate);
  }

  let min_debt = candidates
    .iter()
    .map(|f| debt_of(debts, f.family_id))
    .fold(f64::INFINITY, f64::min);

  let mut tied: Vec<Uuid> = candidates
    .iter()
    .filter(|f| debt_of(debts, f.family_id) - min_debt <= DEBT_EPSILON)
    .map(|f| f.family_id)
    .collect();
  tied.sort();

  let winner = tied[0];
  if tied.len() > 1 {
    return (winner, TieBreakRationale::FamilyIdOrder { tied: tied.len() });
  }

  let runner_up_debt = candidates
    .iter()
    .map(|f| debt_of(debts, f.family_id))
    .filter(|d| d - min_debt > DEBT_EPSILON)
    .fold(f64::INFINITY, f64::min);

  (winner, TieBreakRationale::LowestDebt {
    winner_debt: min_debt,
    runner_up_debt,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{Datelike, NaiveTime, Weekday};

  use super::*;
  use crate::group::TimeSlot;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  const WEEK: fn() -> NaiveDate = || date(2024, 9, 2); // a Monday

  fn slot(day: Weekday) -> TimeSlot {
    TimeSlot {
      // Deterministic ids so test expectations are stable.
      slot_id:   Uuid::from_u128(u128::from(day.num_days_from_monday()) + 1),
      day,
      time:      NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
      route_tag: "morning".into(),
    }
  }

  fn family(id: u128, children: u32) -> Family {
    Family {
      family_id:      Uuid::from_u128(id),
      display_name:   format!("family-{id}"),
      created_at:     chrono::Utc::now(),
      active:         true,
      children_count: children,
      can_drive:      true,
      group_ids:      vec![Uuid::from_u128(99)],
    }
  }

  fn group(members: &[&Family]) -> Group {
    Group {
      group_id:        Uuid::from_u128(99),
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
      .map(slot)
      .collect(),
    }
  }

  fn prefs(
    family: &Family,
    group: &Group,
    entries: &[(Weekday, PreferenceTier)],
  ) -> WeeklyPreferenceSet {
    let mut set =
      WeeklyPreferenceSet::new(family.family_id, group.group_id, WEEK());
    for (day, tier) in entries {
      let slot_id = group
        .template
        .iter()
        .find(|s| s.day == *day)
        .unwrap()
        .slot_id;
      set.tiers.insert(slot_id, *tier);
    }
    set
  }

  fn assigned_on(schedule: &WeekSchedule, day: Weekday) -> Option<Uuid> {
    schedule
      .assignments
      .iter()
      .find(|a| a.date.weekday() == day)
      .and_then(|a| a.family_id)
  }

  /// Three families, 5 weekday slots, mixed preferences, all debts zero.
  fn three_family_week() -> (Vec<Family>, Group, Vec<WeeklyPreferenceSet>) {
    let a = family(1, 2);
    let b = family(2, 1);
    let c = family(3, 2);
    let g = group(&[&a, &b, &c]);
    use PreferenceTier::*;
    let prefs = vec![
      prefs(&a, &g, &[
        (Weekday::Mon, Preferable),
        (Weekday::Thu, Preferable),
        (Weekday::Tue, Unavailable),
      ]),
      prefs(&b, &g, &[(Weekday::Wed, Preferable)]),
      prefs(&c, &g, &[(Weekday::Fri, Preferable)]),
    ];
    (vec![a, b, c], g, prefs)
  }

  fn ctx<'a>(
    group:       &'a Group,
    families:    &'a [Family],
    preferences: &'a [WeeklyPreferenceSet],
    debts:       &'a BTreeMap<Uuid, f64>,
    vacations:   &'a [VacationRecord],
    holidays:    &'a [HolidayRecord],
  ) -> WeekContext<'a> {
    WeekContext {
      group,
      week_start: WEEK(),
      families,
      preferences,
      debts,
      vacations,
      holidays,
    }
  }

  #[test]
  fn mixed_preferences_fill_the_week() {
    let (families, g, p) = three_family_week();
    let debts = BTreeMap::new();
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));

    let (a, b, c) =
      (families[0].family_id, families[1].family_id, families[2].family_id);
    assert_eq!(assigned_on(&schedule, Weekday::Mon), Some(a));
    // Tuesday: A unavailable, B and C both neutral at debt 0; lowest
    // family id (B) wins.
    assert_eq!(assigned_on(&schedule, Weekday::Tue), Some(b));
    assert_eq!(assigned_on(&schedule, Weekday::Wed), Some(b));
    assert_eq!(assigned_on(&schedule, Weekday::Thu), Some(a));
    assert_eq!(assigned_on(&schedule, Weekday::Fri), Some(c));
    assert!(schedule.conflicts.is_empty());

    let tue = schedule
      .assignments
      .iter()
      .find(|x| x.date.weekday() == Weekday::Tue)
      .unwrap();
    assert_eq!(tue.method, AssignmentMethod::Neutral);
    assert_eq!(tue.rationale, Some(TieBreakRationale::FamilyIdOrder { tied: 2 }));
  }

  #[test]
  fn regeneration_is_deterministic() {
    let (families, g, p) = three_family_week();
    let mut debts = BTreeMap::new();
    debts.insert(families[1].family_id, 0.8);
    debts.insert(families[2].family_id, -1.2);

    let first = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    let second = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    assert_eq!(first, second);
    // Byte-identical, not just structurally equal.
    assert_eq!(
      serde_json::to_vec(&first).unwrap(),
      serde_json::to_vec(&second).unwrap()
    );
  }

  #[test]
  fn debt_breaks_neutral_tie() {
    let (families, g, p) = three_family_week();
    let mut debts = BTreeMap::new();
    // C has driven less than their share; Tuesday goes to C over B.
    debts.insert(families[2].family_id, -2.0);
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    assert_eq!(
      assigned_on(&schedule, Weekday::Tue),
      Some(families[2].family_id)
    );
    let tue = schedule
      .assignments
      .iter()
      .find(|x| x.date.weekday() == Weekday::Tue)
      .unwrap();
    assert!(matches!(
      tue.rationale,
      Some(TieBreakRationale::LowestDebt { .. })
    ));
  }

  #[test]
  fn preferable_beats_lower_debt_neutral() {
    // Precedence invariant: tier first, debt only within the tier.
    let (families, g, mut p) = three_family_week();
    let mut debts = BTreeMap::new();
    debts.insert(families[0].family_id, 5.0); // A heavily over-assigned
    debts.insert(families[1].family_id, -5.0);
    // A prefers Monday; B is neutral with much lower debt. A still wins.
    p.retain(|s| s.family_id != families[2].family_id);
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    let mon = schedule
      .assignments
      .iter()
      .find(|x| x.date.weekday() == Weekday::Mon)
      .unwrap();
    assert_eq!(mon.family_id, Some(families[0].family_id));
    assert_eq!(mon.method, AssignmentMethod::Preferable);
  }

  #[test]
  fn less_preferable_pass_runs_before_neutral() {
    let a = family(1, 1);
    let b = family(2, 1);
    let g = group(&[&a, &b]);
    let p = vec![prefs(&a, &g, &[(
      Weekday::Mon,
      PreferenceTier::LessPreferable,
    )])];
    let debts = BTreeMap::new();
    let families = vec![a, b];
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    let mon = schedule
      .assignments
      .iter()
      .find(|x| x.date.weekday() == Weekday::Mon)
      .unwrap();
    assert_eq!(mon.family_id, Some(families[0].family_id));
    assert_eq!(mon.method, AssignmentMethod::LessPreferable);
  }

  #[test]
  fn vacation_excludes_family_for_covered_dates() {
    let (families, g, p) = three_family_week();
    let debts = BTreeMap::new();
    // A on vacation Mon-Wed; their preferable Monday goes elsewhere.
    let vacation = VacationRecord::new(
      families[0].family_id,
      g.group_id,
      date(2024, 9, 2),
      date(2024, 9, 4),
    )
    .unwrap();
    let schedule =
      assign_week(&ctx(&g, &families, &p, &debts, &[vacation], &[]));
    assert_ne!(
      assigned_on(&schedule, Weekday::Mon),
      Some(families[0].family_id)
    );
    // Thursday is outside the window; A drives as preferred.
    assert_eq!(
      assigned_on(&schedule, Weekday::Thu),
      Some(families[0].family_id)
    );
  }

  #[test]
  fn holiday_cancels_slot_for_everyone() {
    let (families, g, p) = three_family_week();
    let debts = BTreeMap::new();
    let holiday = HolidayRecord {
      holiday_id:             Uuid::new_v4(),
      group_id:               g.group_id,
      name:                   "fall break".into(),
      start_date:             date(2024, 9, 2),
      end_date:               date(2024, 9, 3),
      auto_adjust_scheduling: true,
    };
    let schedule =
      assign_week(&ctx(&g, &families, &p, &debts, &[], &[holiday]));
    assert_eq!(assigned_on(&schedule, Weekday::Mon), None);
    assert_eq!(assigned_on(&schedule, Weekday::Tue), None);
    assert_eq!(schedule.cancelled.len(), 2);
    // Cancellations are not conflicts.
    assert!(schedule.conflicts.is_empty());
    assert_eq!(schedule.assignable_slots(), 3);
  }

  #[test]
  fn holiday_without_auto_adjust_changes_nothing() {
    let (families, g, p) = three_family_week();
    let debts = BTreeMap::new();
    let holiday = HolidayRecord {
      holiday_id:             Uuid::new_v4(),
      group_id:               g.group_id,
      name:                   "optional day".into(),
      start_date:             date(2024, 9, 2),
      end_date:               date(2024, 9, 3),
      auto_adjust_scheduling: false,
    };
    let schedule =
      assign_week(&ctx(&g, &families, &p, &debts, &[], &[holiday]));
    assert!(schedule.cancelled.is_empty());
    assert!(assigned_on(&schedule, Weekday::Mon).is_some());
  }

  #[test]
  fn unfillable_slot_reports_all_unavailable() {
    let a = family(1, 1);
    let b = family(2, 1);
    let g = group(&[&a, &b]);
    use PreferenceTier::Unavailable;
    let p = vec![
      prefs(&a, &g, &[(Weekday::Fri, Unavailable)]),
      prefs(&b, &g, &[(Weekday::Fri, Unavailable)]),
    ];
    let debts = BTreeMap::new();
    let families = vec![a, b];
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));

    let fri = schedule
      .assignments
      .iter()
      .find(|x| x.date.weekday() == Weekday::Fri)
      .unwrap();
    assert_eq!(fri.method, AssignmentMethod::Unfilled);
    assert_eq!(fri.family_id, None);
    assert_eq!(schedule.conflicts.len(), 1);
    assert_eq!(schedule.conflicts[0].reason, ConflictReason::AllUnavailable);
    // The other four slots are still assigned.
    assert_eq!(
      schedule.assignments.iter().filter(|a| a.family_id.is_some()).count(),
      4
    );
  }

  #[test]
  fn empty_group_reports_no_active_drivers() {
    let mut a = family(1, 1);
    a.can_drive = false;
    let g = group(&[&a]);
    let debts = BTreeMap::new();
    let families = vec![a];
    let schedule = assign_week(&ctx(&g, &families, &[], &debts, &[], &[]));
    assert_eq!(schedule.conflicts.len(), 5);
    assert!(schedule
      .conflicts
      .iter()
      .all(|c| c.reason == ConflictReason::NoActiveDrivers));
  }

  #[test]
  fn all_on_vacation_reported_as_such() {
    let a = family(1, 1);
    let b = family(2, 1);
    let g = group(&[&a, &b]);
    let vacations = vec![
      VacationRecord::new(a.family_id, g.group_id, date(2024, 9, 2), date(2024, 9, 6))
        .unwrap(),
      VacationRecord::new(b.family_id, g.group_id, date(2024, 9, 2), date(2024, 9, 6))
        .unwrap(),
    ];
    let debts = BTreeMap::new();
    let families = vec![a, b];
    let schedule =
      assign_week(&ctx(&g, &families, &[], &debts, &vacations, &[]));
    assert!(schedule
      .conflicts
      .iter()
      .all(|c| c.reason == ConflictReason::AllOnVacation));
    assert_eq!(schedule.conflicts.len(), 5);
  }

  #[test]
  fn inactive_family_is_never_assigned() {
    let a = family(1, 1);
    let mut b = family(2, 1);
    b.active = false;
    let g = group(&[&a, &b]);
    let debts = BTreeMap::new();
    let families = vec![a, b];
    let schedule = assign_week(&ctx(&g, &families, &[], &debts, &[], &[]));
    assert!(schedule
      .assignments
      .iter()
      .all(|s| s.family_id == Some(families[0].family_id)));
  }

  #[test]
  fn week_start_is_normalised_to_monday() {
    let (families, g, p) = three_family_week();
    let debts = BTreeMap::new();
    let mut c = ctx(&g, &families, &p, &debts, &[], &[]);
    c.week_start = date(2024, 9, 5); // a Thursday
    let schedule = assign_week(&c);
    assert_eq!(schedule.week_start, WEEK());
  }

  #[test]
  fn over_limit_preferences_are_demoted_not_trusted() {
    let a = family(1, 1);
    let b = family(2, 1);
    let g = group(&[&a, &b]);
    use PreferenceTier::Preferable;
    // A claims all five days preferable; only three survive.
    let p = vec![prefs(&a, &g, &[
      (Weekday::Mon, Preferable),
      (Weekday::Tue, Preferable),
      (Weekday::Wed, Preferable),
      (Weekday::Thu, Preferable),
      (Weekday::Fri, Preferable),
    ])];
    let debts = BTreeMap::new();
    let families = vec![a, b];
    let schedule = assign_week(&ctx(&g, &families, &p, &debts, &[], &[]));
    let preferable_wins = schedule
      .assignments
      .iter()
      .filter(|s| s.method == AssignmentMethod::Preferable)
      .count();
    assert_eq!(preferable_wins, 3);
  }
}
