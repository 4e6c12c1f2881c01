//! Weekly driving preferences.
//!
//! A family submits at most one preference set per `(group, week)`. A slot
//! absent from the map is *explicitly* neutral: [`WeeklyPreferenceSet::tier_for`]
//! is total over slot ids, so no caller ever probes for a missing key.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Per-week submission limits. Enforced at submission time; the engine
/// additionally demotes over-limit entries rather than trusting input.
pub const MAX_PREFERABLE: usize = 3;
pub const MAX_LESS_PREFERABLE: usize = 2;
pub const MAX_UNAVAILABLE: usize = 2;

// ─── Tier ────────────────────────────────────────────────────────────────────

/// How willing a family is to drive a given slot.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceTier {
  Preferable,
  LessPreferable,
  #[default]
  Neutral,
  Unavailable,
}

// ─── WeeklyPreferenceSet ─────────────────────────────────────────────────────

/// One family's preferences for one group and one week. Immutable after the
/// preference deadline; superseded by the next week's set, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyPreferenceSet {
  pub family_id:    Uuid,
  pub group_id:     Uuid,
  /// Monday of the target week.
  pub week_start:   NaiveDate,
  pub submitted_at: DateTime<Utc>,
  /// Slot id → tier. BTreeMap so iteration (and over-limit demotion)
  /// is deterministic.
  pub tiers:        BTreeMap<Uuid, PreferenceTier>,
}

impl WeeklyPreferenceSet {
  pub fn new(family_id: Uuid, group_id: Uuid, week_start: NaiveDate) -> Self {
    Self {
      family_id,
      group_id,
      week_start,
      submitted_at: Utc::now(),
      tiers: BTreeMap::new(),
    }
  }

  /// The tier for `slot_id`. Total: unmapped slots are `Neutral`.
  pub fn tier_for(&self, slot_id: Uuid) -> PreferenceTier {
    self.tiers.get(&slot_id).copied().unwrap_or_default()
  }

  fn count(&self, tier: PreferenceTier) -> usize {
    self.tiers.values().filter(|t| **t == tier).count()
  }

  /// Enforce the submission limits. Called at submission time, before the
  /// set is persisted; the engine assumes (but does not require) validity.
  pub fn validate(&self) -> Result<()> {
    let checks = [
      (PreferenceTier::Preferable, "preferable", MAX_PREFERABLE),
      (
        PreferenceTier::LessPreferable,
        "less_preferable",
        MAX_LESS_PREFERABLE,
      ),
      (PreferenceTier::Unavailable, "unavailable", MAX_UNAVAILABLE),
    ];
    for (tier, name, max) in checks {
      let count = self.count(tier);
      if count > max {
        return Err(Error::PreferenceLimit {
          tier: name,
          count,
          max,
        });
      }
    }
    Ok(())
  }

  /// A copy with any over-limit entries demoted to `Neutral`, keeping the
  /// first `max` occurrences in slot-id order. The engine runs on
  /// normalized sets so a constraint-violating submission that slipped
  /// past validation degrades instead of skewing the week.
  pub fn normalized(&self) -> Self {
    let mut out = self.clone();
    for (tier, max) in [
      (PreferenceTier::Preferable, MAX_PREFERABLE),
      (PreferenceTier::LessPreferable, MAX_LESS_PREFERABLE),
      (PreferenceTier::Unavailable, MAX_UNAVAILABLE),
    ] {
      let mut seen = 0usize;
      for (_, t) in out.tiers.iter_mut() {
        if *t == tier {
          seen += 1;
          if seen > max {
            *t = PreferenceTier::Neutral;
          }
        }
      }
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn set_with(tiers: &[(Uuid, PreferenceTier)]) -> WeeklyPreferenceSet {
    let mut set = WeeklyPreferenceSet::new(
      Uuid::new_v4(),
      Uuid::new_v4(),
      NaiveDate::from_ymd_opt(2024, 9, 2).unwrap(),
    );
    set.tiers = tiers.iter().cloned().collect();
    set
  }

  #[test]
  fn unmapped_slot_is_neutral() {
    let set = set_with(&[]);
    assert_eq!(set.tier_for(Uuid::new_v4()), PreferenceTier::Neutral);
  }

  #[test]
  fn validate_rejects_four_preferable() {
    let slots: Vec<_> = (0..4)
      .map(|_| (Uuid::new_v4(), PreferenceTier::Preferable))
      .collect();
    let err = set_with(&slots).validate().unwrap_err();
    assert!(matches!(
      err,
      Error::PreferenceLimit { count: 4, max: 3, .. }
    ));
  }

  #[test]
  fn validate_accepts_limits_exactly() {
    let mut slots: Vec<_> = (0..3)
      .map(|_| (Uuid::new_v4(), PreferenceTier::Preferable))
      .collect();
    slots.extend((0..2).map(|_| (Uuid::new_v4(), PreferenceTier::Unavailable)));
    slots.extend(
      (0..2).map(|_| (Uuid::new_v4(), PreferenceTier::LessPreferable)),
    );
    assert!(set_with(&slots).validate().is_ok());
  }

  #[test]
  fn normalized_demotes_excess_to_neutral() {
    let slots: Vec<_> = (0..5)
      .map(|_| (Uuid::new_v4(), PreferenceTier::Preferable))
      .collect();
    let norm = set_with(&slots).normalized();
    let kept = norm
      .tiers
      .values()
      .filter(|t| **t == PreferenceTier::Preferable)
      .count();
    assert_eq!(kept, MAX_PREFERABLE);
    assert!(norm.validate().is_ok());
  }

  #[test]
  fn normalized_is_deterministic() {
    let slots: Vec<_> = (0..5)
      .map(|_| (Uuid::new_v4(), PreferenceTier::Preferable))
      .collect();
    let set = set_with(&slots);
    let a = set.normalized();
    let b = set.normalized();
    assert_eq!(a.tiers, b.tiers);
  }
}
