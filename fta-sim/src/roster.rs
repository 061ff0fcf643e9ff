//! Player soldiers, their stats and what they are currently assigned to.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a soldier within a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoldierId(pub u32);

impl fmt::Display for SoldierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Soldier attribute that rules can weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    TimeUnits,
    Stamina,
    Health,
    Bravery,
    Reactions,
    Firing,
    Throwing,
    Strength,
    Melee,
    PsiStrength,
    PsiSkill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoldierStats {
    #[serde(default)]
    pub time_units: i32,
    #[serde(default)]
    pub stamina: i32,
    #[serde(default)]
    pub health: i32,
    #[serde(default)]
    pub bravery: i32,
    #[serde(default)]
    pub reactions: i32,
    #[serde(default)]
    pub firing: i32,
    #[serde(default)]
    pub throwing: i32,
    #[serde(default)]
    pub strength: i32,
    #[serde(default)]
    pub melee: i32,
    #[serde(default)]
    pub psi_strength: i32,
    #[serde(default)]
    pub psi_skill: i32,
}

impl SoldierStats {
    #[must_use]
    pub const fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::TimeUnits => self.time_units,
            StatKind::Stamina => self.stamina,
            StatKind::Health => self.health,
            StatKind::Bravery => self.bravery,
            StatKind::Reactions => self.reactions,
            StatKind::Firing => self.firing,
            StatKind::Throwing => self.throwing,
            StatKind::Strength => self.strength,
            StatKind::Melee => self.melee,
            StatKind::PsiStrength => self.psi_strength,
            StatKind::PsiSkill => self.psi_skill,
        }
    }
}

/// Per-stat multipliers used to turn a soldier into a single effort figure.
pub type StatWeights = BTreeMap<StatKind, f64>;

/// What a soldier is busy with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum Assignment {
    #[default]
    Idle,
    IntelProject(usize),
    CovertOperation(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soldier {
    pub id: SoldierId,
    pub name: String,
    /// Rule-defined type such as `agent` or `trooper`.
    pub soldier_type: String,
    #[serde(default)]
    pub stats: SoldierStats,
    #[serde(default)]
    pub assignment: Assignment,
}

impl Soldier {
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.assignment, Assignment::Idle)
    }
}
