//! Covert operations: odds calculation and the timed operation lifecycle.
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::GameDate;
use crate::constants::{
    COVERT_DEFAULT_MAX_CHANCE, COVERT_DEFAULT_STAT_SCALE, COVERT_TIME_SPEEDUP_DIVISOR,
    COVERT_UNDERSTAFFED_PENALTY, COVERT_VIGILANCE_PENALTY, DEFAULT_TEAM_FALLOFF, PERCENT,
};
use crate::effort::team_effort;
use crate::numbers::{ceil_f64_to_u32, usize_to_f64};
use crate::roster::{Soldier, SoldierId, StatWeights};
use crate::stock::ItemStock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Easy,
    #[default]
    Normal,
    Hard,
    VeryHard,
}

impl Difficulty {
    #[must_use]
    pub const fn chance_coefficient(self) -> f64 {
        match self {
            Self::Trivial => 1.25,
            Self::Easy => 1.1,
            Self::Normal => 1.0,
            Self::Hard => 0.85,
            Self::VeryHard => 0.7,
        }
    }

    #[must_use]
    pub const fn time_coefficient(self) -> f64 {
        match self {
            Self::Trivial => 0.75,
            Self::Easy => 0.9,
            Self::Normal => 1.0,
            Self::Hard => 1.2,
            Self::VeryHard => 1.5,
        }
    }
}

/// Optional equipment that improves the odds per unit brought along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBonus {
    pub item: String,
    pub chance_per_unit: f64,
    pub max_units: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovertOperationRule {
    pub id: String,
    pub name: String,
    pub base_chance: f64,
    pub base_days: u32,
    #[serde(default = "CovertOperationRule::default_min_soldiers")]
    pub min_soldiers: u32,
    #[serde(default = "CovertOperationRule::default_max_soldiers")]
    pub max_soldiers: u32,
    #[serde(default)]
    pub stat_weights: StatWeights,
    /// Team effort per point of chance.
    #[serde(default = "CovertOperationRule::default_stat_scale")]
    pub stat_scale: f64,
    #[serde(default = "CovertOperationRule::default_falloff")]
    pub team_falloff: f64,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub required_items: ItemStock,
    #[serde(default)]
    pub optional_items: Vec<ItemBonus>,
    /// Flat chance adjustment per soldier of a given type.
    #[serde(default)]
    pub soldier_type_modifiers: BTreeMap<String, f64>,
    #[serde(default)]
    pub target_faction: Option<String>,
    #[serde(default)]
    pub success_research: Vec<String>,
    #[serde(default)]
    pub funding_cost: i64,
    #[serde(default)]
    pub reputation_on_success: i32,
    #[serde(default)]
    pub reputation_on_failure: i32,
    #[serde(default)]
    pub vigilance_on_success: i32,
    #[serde(default)]
    pub vigilance_on_failure: i32,
    #[serde(default)]
    pub funds_on_success: i64,
    #[serde(default = "CovertOperationRule::default_max_chance")]
    pub max_chance: f64,
}

impl CovertOperationRule {
    const fn default_min_soldiers() -> u32 {
        1
    }

    const fn default_max_soldiers() -> u32 {
        4
    }

    const fn default_stat_scale() -> f64 {
        COVERT_DEFAULT_STAT_SCALE
    }

    const fn default_falloff() -> f64 {
        DEFAULT_TEAM_FALLOFF
    }

    const fn default_max_chance() -> f64 {
        COVERT_DEFAULT_MAX_CHANCE
    }
}

/// Every term that went into an odds figure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OddsBreakdown {
    pub base: f64,
    pub soldier_bonus: f64,
    pub item_bonus: f64,
    pub type_modifier: f64,
    pub understaffed_penalty: f64,
    pub vigilance_penalty: f64,
    pub chance_coefficient: f64,
    pub time_coefficient: f64,
}

impl OddsBreakdown {
    /// Chance before the difficulty coefficient and clamping.
    #[must_use]
    pub fn raw_chance(&self) -> f64 {
        self.base + self.soldier_bonus + self.item_bonus + self.type_modifier
            - self.understaffed_penalty
            - self.vigilance_penalty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationOdds {
    /// Success chance in percent.
    pub chance: f64,
    pub days: u32,
    pub breakdown: OddsBreakdown,
}

/// Odds of an operation with the given team and equipment against a target
/// at `target_vigilance`.
#[must_use]
pub fn operation_odds(
    rule: &CovertOperationRule,
    soldiers: &[&Soldier],
    items: &ItemStock,
    target_vigilance: i32,
) -> OperationOdds {
    let effort = team_effort(
        soldiers.iter().map(|soldier| &soldier.stats),
        &rule.stat_weights,
        rule.team_falloff,
    );
    let soldier_bonus = effort / rule.stat_scale;
    let item_bonus: f64 = rule
        .optional_items
        .iter()
        .map(|bonus| f64::from(items.get(&bonus.item).min(bonus.max_units)) * bonus.chance_per_unit)
        .sum();
    let type_modifier: f64 = soldiers
        .iter()
        .filter_map(|soldier| rule.soldier_type_modifiers.get(&soldier.soldier_type))
        .sum();
    let missing = usize_to_f64(
        usize::try_from(rule.min_soldiers)
            .unwrap_or(usize::MAX)
            .saturating_sub(soldiers.len()),
    );
    let difficulty = rule.difficulty;
    let breakdown = OddsBreakdown {
        base: rule.base_chance,
        soldier_bonus,
        item_bonus,
        type_modifier,
        understaffed_penalty: missing * COVERT_UNDERSTAFFED_PENALTY,
        vigilance_penalty: f64::from(target_vigilance.max(0)) * COVERT_VIGILANCE_PENALTY,
        chance_coefficient: difficulty.chance_coefficient(),
        time_coefficient: difficulty.time_coefficient(),
    };

    let chance = (breakdown.raw_chance() * breakdown.chance_coefficient)
        .clamp(0.0, rule.max_chance.min(PERCENT));
    let speedup = 1.0 + soldier_bonus.max(0.0) / COVERT_TIME_SPEEDUP_DIVISOR;
    let days =
        ceil_f64_to_u32(f64::from(rule.base_days) * breakdown.time_coefficient / speedup).max(1);

    OperationOdds {
        chance,
        days,
        breakdown,
    }
}

/// A running operation. Odds are frozen when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovertOperation {
    pub rule_id: String,
    pub soldiers: Vec<SoldierId>,
    pub items: ItemStock,
    pub chance: f64,
    pub days_total: u32,
    pub days_remaining: u32,
    pub started: GameDate,
    /// Research granted to the player on success.
    #[serde(default)]
    pub research_hook: Vec<String>,
    /// `Some(success)` once resolved.
    #[serde(default)]
    pub outcome: Option<bool>,
}

impl CovertOperation {
    #[must_use]
    pub fn new(
        rule: &CovertOperationRule,
        soldiers: Vec<SoldierId>,
        items: ItemStock,
        odds: &OperationOdds,
        started: GameDate,
    ) -> Self {
        Self {
            rule_id: rule.id.clone(),
            soldiers,
            items,
            chance: odds.chance,
            days_total: odds.days,
            days_remaining: odds.days,
            started,
            research_hook: rule.success_research.clone(),
            outcome: None,
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Count down one day. Returns true when the operation is due.
    pub fn advance_day(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.days_remaining = self.days_remaining.saturating_sub(1);
        self.days_remaining == 0
    }

    /// Draw the outcome. Only the first call rolls.
    pub fn resolve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if let Some(success) = self.outcome {
            return success;
        }
        let roll: f64 = rng.gen_range(0.0..PERCENT);
        let success = roll < self.chance;
        debug!(
            "covert {} roll {:.2} vs {:.2}",
            self.rule_id, roll, self.chance
        );
        info!(
            "covert operation {} {}",
            self.rule_id,
            if success { "succeeded" } else { "failed" }
        );
        self.outcome = Some(success);
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Assignment, SoldierStats, StatKind};
    use rand::rngs::mock::StepRng;

    fn rule() -> CovertOperationRule {
        serde_json::from_str(
            r#"{
                "id": "wiretap",
                "name": "Wiretap",
                "base_chance": 40.0,
                "base_days": 10,
                "min_soldiers": 2,
                "stat_weights": {"bravery": 1.0},
                "team_falloff": 0.5,
                "difficulty": "hard",
                "optional_items": [{"item": "medkit", "chance_per_unit": 2.5, "max_units": 2}],
                "soldier_type_modifiers": {"agent": 5.0}
            }"#,
        )
        .unwrap()
    }

    fn soldier(id: u32, soldier_type: &str, bravery: i32) -> Soldier {
        Soldier {
            id: SoldierId(id),
            name: format!("S{id}"),
            soldier_type: soldier_type.to_string(),
            stats: SoldierStats {
                bravery,
                ..SoldierStats::default()
            },
            assignment: Assignment::Idle,
        }
    }

    #[test]
    fn difficulty_coefficients_are_monotonic() {
        let all = [
            Difficulty::Trivial,
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Hard,
            Difficulty::VeryHard,
        ];
        for pair in all.windows(2) {
            assert!(pair[0].chance_coefficient() > pair[1].chance_coefficient());
            assert!(pair[0].time_coefficient() < pair[1].time_coefficient());
        }
        assert!((Difficulty::default().chance_coefficient() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn odds_combine_every_term() {
        let rule = rule();
        let agent = soldier(1, "agent", 100);
        let items: ItemStock = [("medkit", 3)].into_iter().collect();
        let odds = operation_odds(&rule, &[&agent], &items, 20);

        let b = odds.breakdown;
        assert!((b.soldier_bonus - 10.0).abs() < 1e-9);
        assert!((b.item_bonus - 5.0).abs() < 1e-9);
        assert!((b.type_modifier - 5.0).abs() < 1e-9);
        assert!((b.understaffed_penalty - 15.0).abs() < 1e-9);
        assert!((b.vigilance_penalty - 5.0).abs() < 1e-9);
        assert!((odds.chance - 34.0).abs() < 1e-9);
        assert_eq!(odds.days, 11);
    }

    #[test]
    fn chance_is_clamped() {
        let mut rule = rule();
        rule.base_chance = 100.0;
        rule.difficulty = Difficulty::Trivial;
        let team = [soldier(1, "agent", 300), soldier(2, "agent", 300)];
        let refs: Vec<&Soldier> = team.iter().collect();
        let odds = operation_odds(&rule, &refs, &ItemStock::new(), 0);
        assert!((odds.chance - rule.max_chance).abs() < 1e-9);

        rule.base_chance = 0.0;
        let odds = operation_odds(&rule, &[], &ItemStock::new(), 400);
        assert!(odds.chance.abs() < f64::EPSILON);
        assert!(odds.days >= 1);
    }

    #[test]
    fn vigilance_lowers_odds() {
        let rule = rule();
        let team = [soldier(1, "trooper", 60), soldier(2, "trooper", 40)];
        let refs: Vec<&Soldier> = team.iter().collect();
        let calm = operation_odds(&rule, &refs, &ItemStock::new(), 0);
        let alert = operation_odds(&rule, &refs, &ItemStock::new(), 80);
        assert!(alert.chance < calm.chance);
        assert_eq!(calm.days, alert.days);
    }

    #[test]
    fn operation_counts_down_and_resolves_once() {
        let rule = rule();
        let odds = OperationOdds {
            chance: 50.0,
            days: 2,
            breakdown: OddsBreakdown::default(),
        };
        let mut op = CovertOperation::new(
            &rule,
            vec![SoldierId(1)],
            ItemStock::new(),
            &odds,
            GameDate::default(),
        );
        assert!(!op.advance_day());
        assert!(op.advance_day());

        let mut rng = StepRng::new(0, 0);
        assert!(op.resolve(&mut rng));
        let mut failing = StepRng::new(u64::MAX, 0);
        assert!(op.resolve(&mut failing));
        assert!(op.is_finished());
        assert!(!op.advance_day());
        assert_eq!(rule.stat_weights.get(&StatKind::Bravery), Some(&1.0));
    }
}
