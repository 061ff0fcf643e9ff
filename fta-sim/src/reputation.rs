//! Faction reputation levels and the score thresholds that define them.
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALLIED_MIN, DEFAULT_FRIENDLY_MIN, DEFAULT_NEUTRAL_MIN, DEFAULT_REPUTATION_DRIFT,
    DEFAULT_UNFRIENDLY_MIN,
};

/// Standing of a faction towards the player, from worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReputationLevel {
    Hostile,
    Unfriendly,
    #[default]
    Neutral,
    Friendly,
    Allied,
}

impl ReputationLevel {
    pub const ALL: [Self; 5] = [
        Self::Hostile,
        Self::Unfriendly,
        Self::Neutral,
        Self::Friendly,
        Self::Allied,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Hostile => "hostile",
            Self::Unfriendly => "unfriendly",
            Self::Neutral => "neutral",
            Self::Friendly => "friendly",
            Self::Allied => "allied",
        }
    }
}

/// Minimum reputation score required for each level above `Hostile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationTable {
    #[serde(default = "ReputationTable::default_unfriendly")]
    pub unfriendly: i32,
    #[serde(default = "ReputationTable::default_neutral")]
    pub neutral: i32,
    #[serde(default = "ReputationTable::default_friendly")]
    pub friendly: i32,
    #[serde(default = "ReputationTable::default_allied")]
    pub allied: i32,
    /// Points the score moves back toward zero every month.
    #[serde(default = "ReputationTable::default_drift")]
    pub monthly_drift: i32,
}

impl ReputationTable {
    const fn default_unfriendly() -> i32 {
        DEFAULT_UNFRIENDLY_MIN
    }

    const fn default_neutral() -> i32 {
        DEFAULT_NEUTRAL_MIN
    }

    const fn default_friendly() -> i32 {
        DEFAULT_FRIENDLY_MIN
    }

    const fn default_allied() -> i32 {
        DEFAULT_ALLIED_MIN
    }

    const fn default_drift() -> i32 {
        DEFAULT_REPUTATION_DRIFT
    }

    /// Highest level whose threshold the score reaches.
    #[must_use]
    pub const fn level_for(&self, score: i32) -> ReputationLevel {
        if score >= self.allied {
            ReputationLevel::Allied
        } else if score >= self.friendly {
            ReputationLevel::Friendly
        } else if score >= self.neutral {
            ReputationLevel::Neutral
        } else if score >= self.unfriendly {
            ReputationLevel::Unfriendly
        } else {
            ReputationLevel::Hostile
        }
    }

    /// Move a score toward zero by the monthly drift without crossing it.
    #[must_use]
    pub fn drift(&self, score: i32) -> i32 {
        let step = self.monthly_drift.max(0);
        if score > 0 {
            score.saturating_sub(step).max(0)
        } else {
            score.saturating_add(step).min(0)
        }
    }

    /// Thresholds must strictly increase with the level.
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.unfriendly < self.neutral && self.neutral < self.friendly && self.friendly < self.allied
    }
}

impl Default for ReputationTable {
    fn default() -> Self {
        Self {
            unfriendly: Self::default_unfriendly(),
            neutral: Self::default_neutral(),
            friendly: Self::default_friendly(),
            allied: Self::default_allied(),
            monthly_drift: Self::default_drift(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_follow_thresholds() {
        let table = ReputationTable::default();
        assert_eq!(table.level_for(-500), ReputationLevel::Hostile);
        assert_eq!(table.level_for(-200), ReputationLevel::Unfriendly);
        assert_eq!(table.level_for(0), ReputationLevel::Neutral);
        assert_eq!(table.level_for(100), ReputationLevel::Friendly);
        assert_eq!(table.level_for(1_000), ReputationLevel::Allied);
    }

    #[test]
    fn drift_never_overshoots_zero() {
        let table = ReputationTable {
            monthly_drift: 10,
            ..ReputationTable::default()
        };
        assert_eq!(table.drift(25), 15);
        assert_eq!(table.drift(4), 0);
        assert_eq!(table.drift(-4), 0);
        assert_eq!(table.drift(-30), -20);
        assert_eq!(table.drift(0), 0);
    }

    #[test]
    fn levels_are_ordered_worst_to_best() {
        assert!(ReputationLevel::Hostile < ReputationLevel::Neutral);
        assert!(ReputationLevel::Allied > ReputationLevel::Friendly);
        assert!(ReputationTable::default().is_ordered());
    }
}
