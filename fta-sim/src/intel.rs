//! Intel projects: multi-stage investigations advanced by daily rolls.
//!
//! A project is worked by a small team of agents. Every day the team pays
//! the current roll cost and rolls against the stage chance; a success adds
//! step progress, and a stage completes once its requirement is met. The
//! roll cost rises after every paid roll so that brute-forcing a project
//! with a weak team gets expensive.
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TEAM_FALLOFF, INTEL_DEFAULT_MAX_CHANCE, INTEL_DEFAULT_MIN_CHANCE,
    INTEL_DEFAULT_STEP_SCALE, PERCENT,
};
use crate::effort::team_effort;
use crate::numbers::round_f64_to_u32;
use crate::roster::{SoldierId, SoldierStats, StatWeights};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelStageRule {
    pub name: String,
    pub progress_required: u32,
    #[serde(default)]
    pub difficulty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelProjectRule {
    pub id: String,
    pub name: String,
    pub stages: Vec<IntelStageRule>,
    #[serde(default)]
    pub stat_weights: StatWeights,
    /// Cost of the first roll.
    #[serde(default)]
    pub base_cost: i64,
    /// Added to the roll cost after every paid roll.
    #[serde(default)]
    pub cost_increase: i64,
    #[serde(default = "IntelProjectRule::default_falloff")]
    pub team_falloff: f64,
    #[serde(default = "IntelProjectRule::default_step_scale")]
    pub step_scale: f64,
    #[serde(default = "IntelProjectRule::default_min_chance")]
    pub min_chance: f64,
    #[serde(default = "IntelProjectRule::default_max_chance")]
    pub max_chance: f64,
    #[serde(default = "IntelProjectRule::default_max_agents")]
    pub max_agents: u32,
    /// Research the player learns when the last stage completes.
    #[serde(default)]
    pub unlocks: Vec<String>,
}

impl IntelProjectRule {
    const fn default_falloff() -> f64 {
        DEFAULT_TEAM_FALLOFF
    }

    const fn default_step_scale() -> f64 {
        INTEL_DEFAULT_STEP_SCALE
    }

    const fn default_min_chance() -> f64 {
        INTEL_DEFAULT_MIN_CHANCE
    }

    const fn default_max_chance() -> f64 {
        INTEL_DEFAULT_MAX_CHANCE
    }

    const fn default_max_agents() -> u32 {
        4
    }

    /// Combined effort of the assigned agents.
    #[must_use]
    pub fn effort(&self, team: &[&SoldierStats]) -> f64 {
        team_effort(team.iter().copied(), &self.stat_weights, self.team_falloff)
    }
}

/// Success chance, in percent, for one roll against `stage`.
#[must_use]
pub fn stage_chance(rule: &IntelProjectRule, stage: &IntelStageRule, effort: f64) -> f64 {
    if stage.difficulty <= 0.0 {
        return rule.max_chance;
    }
    let effort = effort.max(0.0);
    let raw = PERCENT * effort / (effort + stage.difficulty);
    raw.clamp(rule.min_chance, rule.max_chance)
}

/// Progress a successful roll adds to `stage`. Always at least 1 and never
/// more than the stage needs.
#[must_use]
pub fn get_step_progress(rule: &IntelProjectRule, stage: &IntelStageRule, effort: f64) -> u32 {
    let step = effort.max(0.0) * rule.step_scale / stage.difficulty.max(1.0);
    round_f64_to_u32(step).clamp(1, stage.progress_required.max(1))
}

/// Result of a single daily roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum IntelOutcome {
    AlreadyComplete,
    /// No agents assigned; nothing is paid or rolled.
    Idle,
    /// Funds could not cover the roll cost.
    Unfunded,
    Failed,
    Progressed { gained: u32 },
    StageCompleted { stage: usize },
    ProjectCompleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelRoll {
    pub outcome: IntelOutcome,
    pub cost_paid: i64,
    pub chance: f64,
}

impl IntelRoll {
    const fn skipped(outcome: IntelOutcome) -> Self {
        Self {
            outcome,
            cost_paid: 0,
            chance: 0.0,
        }
    }
}

/// Live state of an intel project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntelProject {
    pub rule_id: String,
    pub stage: usize,
    pub stage_rolls: Vec<u32>,
    pub progress: u32,
    pub rolls: u32,
    /// Cost of the next roll.
    pub cost: i64,
    #[serde(default)]
    pub agents: Vec<SoldierId>,
    #[serde(default)]
    pub completed: bool,
}

impl IntelProject {
    #[must_use]
    pub fn new(rule: &IntelProjectRule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            stage: 0,
            stage_rolls: vec![0; rule.stages.len()],
            progress: 0,
            rolls: 0,
            cost: rule.base_cost,
            agents: Vec::new(),
            completed: false,
        }
    }

    #[must_use]
    pub fn current_stage<'r>(&self, rule: &'r IntelProjectRule) -> Option<&'r IntelStageRule> {
        if self.completed {
            None
        } else {
            rule.stages.get(self.stage)
        }
    }

    /// Chance of the next roll with the given team, or `None` once complete.
    #[must_use]
    pub fn chance(&self, rule: &IntelProjectRule, team: &[&SoldierStats]) -> Option<f64> {
        self.current_stage(rule)
            .map(|stage| stage_chance(rule, stage, rule.effort(team)))
    }

    /// Pay for and perform one roll.
    ///
    /// Nothing is paid and nothing is drawn from `rng` when the project is
    /// complete, has no team, or `funds` cannot cover the cost.
    pub fn roll<R: Rng + ?Sized>(
        &mut self,
        rule: &IntelProjectRule,
        team: &[&SoldierStats],
        funds: &mut i64,
        rng: &mut R,
    ) -> IntelRoll {
        let Some(stage) = self.current_stage(rule) else {
            return IntelRoll::skipped(IntelOutcome::AlreadyComplete);
        };
        if team.is_empty() {
            return IntelRoll::skipped(IntelOutcome::Idle);
        }
        if *funds < self.cost {
            warn!(
                "intel project {} cannot pay roll cost {} (funds {})",
                self.rule_id, self.cost, funds
            );
            return IntelRoll::skipped(IntelOutcome::Unfunded);
        }

        let cost_paid = self.cost;
        *funds -= cost_paid;
        self.cost = self.cost.saturating_add(rule.cost_increase);
        self.rolls += 1;
        if let Some(count) = self.stage_rolls.get_mut(self.stage) {
            *count += 1;
        }

        let effort = rule.effort(team);
        let chance = stage_chance(rule, stage, effort);
        let roll: f64 = rng.gen_range(0.0..PERCENT);
        debug!(
            "intel {} stage {} roll {:.2} vs {:.2} (effort {:.1})",
            self.rule_id, self.stage, roll, chance, effort
        );
        if roll >= chance {
            return IntelRoll {
                outcome: IntelOutcome::Failed,
                cost_paid,
                chance,
            };
        }

        let gained = get_step_progress(rule, stage, effort);
        self.progress = self.progress.saturating_add(gained);
        let outcome = if self.progress < stage.progress_required {
            IntelOutcome::Progressed { gained }
        } else {
            let finished = self.stage;
            self.progress = 0;
            self.stage += 1;
            if self.stage >= rule.stages.len() {
                self.completed = true;
                info!("intel project {} completed after {} rolls", self.rule_id, self.rolls);
                IntelOutcome::ProjectCompleted
            } else {
                info!("intel project {} finished stage {}", self.rule_id, finished);
                IntelOutcome::StageCompleted { stage: finished }
            }
        };
        IntelRoll {
            outcome,
            cost_paid,
            chance,
        }
    }
}
