//! Backup-driver selection for a vacationing family.
//!
//! Selection reuses the engine's fairness criterion: the most under-assigned
//! (most negative debt) eligible families are asked first, with ascending
//! family id as the stable fallback. Finding nobody is a reported outcome,
//! not an error, so the caller can alert the admin and fall back to manual
//! assignment.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  family::Family, group::Group, schedule::DEBT_EPSILON,
  vacation::VacationRecord,
};

/// Default number of backup drivers to arrange.
pub const DEFAULT_MAX_BACKUPS: usize = 2;

/// The result of a coverage attempt for one vacation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageOutcome {
  pub vacation_id:    Uuid,
  pub family_id:      Uuid,
  /// False when no eligible backup exists; a scheduling conflict for the
  /// admin, surfaced by the caller.
  pub arranged:       bool,
  pub backup_drivers: Vec<Uuid>,
}

/// Pick up to `max_backups` backup drivers for `vacation` from the group's
/// remaining members.
///
/// Eligible: an active, drive-capable member other than the vacationing
/// family, with no vacation of their own overlapping the window. Backups
/// are matched at group level; callers wanting route or time matching can
/// pre-filter `families`.
pub fn arrange_coverage(
  vacation:        &VacationRecord,
  group:           &Group,
  families:        &[Family],
  debts:           &BTreeMap<Uuid, f64>,
  other_vacations: &[VacationRecord],
  max_backups:     usize,
) -> CoverageOutcome {
  let mut eligible: Vec<&Family> = families
    .iter()
    .filter(|f| {
      f.family_id != vacation.family_id
        && group.is_member(f.family_id)
        && f.eligible_driver()
        && !other_vacations.iter().any(|v| {
          v.family_id == f.family_id
            && v.group_id == group.group_id
            && v.overlaps(vacation.start_date, vacation.end_date)
        })
    })
    .collect();

  // Most negative debt first; ties within epsilon by ascending family id.
  eligible.sort_by(|a, b| {
    let da = debts.get(&a.family_id).copied().unwrap_or(0.0);
    let db = debts.get(&b.family_id).copied().unwrap_or(0.0);
    if (da - db).abs() <= DEBT_EPSILON {
      a.family_id.cmp(&b.family_id)
    } else {
      da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    }
  });

  let backup_drivers: Vec<Uuid> = eligible
    .iter()
    .take(max_backups)
    .map(|f| f.family_id)
    .collect();

  CoverageOutcome {
    vacation_id: vacation.vacation_id,
    family_id:   vacation.family_id,
    arranged:    !backup_drivers.is_empty(),
    backup_drivers,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime, Utc, Weekday};

  use super::*;
  use crate::group::TimeSlot;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn family(id: u128) -> Family {
    Family {
      family_id:      Uuid::from_u128(id),
      display_name:   format!("family-{id}"),
      created_at:     Utc::now(),
      active:         true,
      children_count: 1,
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
      template:        vec![TimeSlot {
        slot_id:   Uuid::from_u128(1),
        day:       Weekday::Mon,
        time:      NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        route_tag: "morning".into(),
      }],
    }
  }

  fn vacation(family_id: Uuid) -> VacationRecord {
    VacationRecord::new(
      family_id,
      Uuid::from_u128(99),
      date(2024, 9, 2),
      date(2024, 9, 6),
    )
    .unwrap()
  }

  #[test]
  fn picks_most_negative_debt_first() {
    let a = family(1);
    let b = family(2);
    let c = family(3);
    let d = family(4);
    let g = group(&[&a, &b, &c, &d]);
    let families = vec![a.clone(), b, c, d];

    let mut debts = BTreeMap::new();
    debts.insert(Uuid::from_u128(2), 1.0);
    debts.insert(Uuid::from_u128(3), -3.0);
    debts.insert(Uuid::from_u128(4), -1.0);

    let outcome = arrange_coverage(
      &vacation(a.family_id),
      &g,
      &families,
      &debts,
      &[],
      DEFAULT_MAX_BACKUPS,
    );
    assert!(outcome.arranged);
    assert_eq!(outcome.backup_drivers, vec![
      Uuid::from_u128(3),
      Uuid::from_u128(4)
    ]);
  }

  #[test]
  fn debt_ties_fall_back_to_family_id() {
    let a = family(1);
    let b = family(2);
    let c = family(3);
    let g = group(&[&a, &b, &c]);
    let families = vec![a.clone(), b, c];

    let outcome = arrange_coverage(
      &vacation(a.family_id),
      &g,
      &families,
      &BTreeMap::new(),
      &[],
      1,
    );
    assert_eq!(outcome.backup_drivers, vec![Uuid::from_u128(2)]);
  }

  #[test]
  fn overlapping_vacationers_are_skipped() {
    let a = family(1);
    let b = family(2);
    let c = family(3);
    let g = group(&[&a, &b, &c]);
    let families = vec![a.clone(), b.clone(), c];

    // B is also away for an overlapping stretch.
    let other = VacationRecord::new(
      b.family_id,
      g.group_id,
      date(2024, 9, 4),
      date(2024, 9, 10),
    )
    .unwrap();

    let outcome = arrange_coverage(
      &vacation(a.family_id),
      &g,
      &families,
      &BTreeMap::new(),
      &[other],
      DEFAULT_MAX_BACKUPS,
    );
    assert_eq!(outcome.backup_drivers, vec![Uuid::from_u128(3)]);
  }

  #[test]
  fn no_eligible_backup_is_reported_not_thrown() {
    let a = family(1);
    let mut b = family(2);
    b.can_drive = false;
    let g = group(&[&a, &b]);
    let families = vec![a.clone(), b];

    let outcome = arrange_coverage(
      &vacation(a.family_id),
      &g,
      &families,
      &BTreeMap::new(),
      &[],
      DEFAULT_MAX_BACKUPS,
    );
    assert!(!outcome.arranged);
    assert!(outcome.backup_drivers.is_empty());
  }
}
