use std::collections::BTreeMap;

use fta_sim::{Campaign, DayReport, RuleSet};
use thiserror::Error;

/// A rule the simulation must never break on any day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{faction} funds went negative ({funds})")]
    NegativeFunds { faction: String, funds: i64 },
    #[error("player funds went negative ({0})")]
    NegativePlayerFunds(i64),
    #[error("{faction} funds moved by {actual} but events account for {logged}")]
    LedgerMismatch {
        faction: String,
        actual: i64,
        logged: i64,
    },
    #[error("{faction} power {power} outside 0..={cap}")]
    PowerOutOfBounds { faction: String, power: i32, cap: i32 },
    #[error("{faction} assigned {assigned} scientists but employs {employed}")]
    ScientistsOverAssigned {
        faction: String,
        assigned: u32,
        employed: u32,
    },
    #[error("{faction} runs {running} research projects with {slots} slots")]
    TooManyProjects {
        faction: String,
        running: usize,
        slots: u32,
    },
    #[error("intel project {project} roll cost dropped from {before} to {after}")]
    IntelCostDropped {
        project: usize,
        before: i64,
        after: i64,
    },
    #[error("day counter went from {before} to {after}")]
    DaySkipped { before: u32, after: u32 },
    #[error("faction {0} missing from rules")]
    UnknownFaction(String),
}

/// Figures captured before a tick so the next state can be compared.
#[derive(Debug, Clone, Default)]
pub struct DaySnapshot {
    day: u32,
    faction_funds: BTreeMap<String, i64>,
    intel_costs: Vec<i64>,
}

impl DaySnapshot {
    #[must_use]
    pub fn capture(campaign: &Campaign) -> Self {
        Self {
            day: campaign.day,
            faction_funds: campaign
                .factions
                .iter()
                .map(|faction| (faction.id.clone(), faction.funds))
                .collect(),
            intel_costs: campaign.intel_projects.iter().map(|p| p.cost).collect(),
        }
    }
}

/// Check every per-day invariant after `report` moved `campaign` on from
/// `before`.
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_day(
    rules: &RuleSet,
    before: &DaySnapshot,
    campaign: &Campaign,
    report: &DayReport,
) -> Result<(), InvariantViolation> {
    if campaign.day != before.day + 1 {
        return Err(InvariantViolation::DaySkipped {
            before: before.day,
            after: campaign.day,
        });
    }
    if campaign.player.funds < 0 {
        return Err(InvariantViolation::NegativePlayerFunds(campaign.player.funds));
    }

    let deltas = report.faction_funds_deltas();
    for faction in &campaign.factions {
        let rule = rules
            .faction(&faction.id)
            .ok_or_else(|| InvariantViolation::UnknownFaction(faction.id.clone()))?;
        if faction.funds < 0 {
            return Err(InvariantViolation::NegativeFunds {
                faction: faction.id.clone(),
                funds: faction.funds,
            });
        }
        if let Some(start) = before.faction_funds.get(&faction.id) {
            let actual = faction.funds - start;
            let logged = deltas.get(faction.id.as_str()).copied().unwrap_or(0);
            if actual != logged {
                return Err(InvariantViolation::LedgerMismatch {
                    faction: faction.id.clone(),
                    actual,
                    logged,
                });
            }
        }
        if !(0..=rule.power_cap).contains(&faction.power) {
            return Err(InvariantViolation::PowerOutOfBounds {
                faction: faction.id.clone(),
                power: faction.power,
                cap: rule.power_cap,
            });
        }
        let assigned = faction.assigned_scientists();
        if assigned > faction.staff.scientists {
            return Err(InvariantViolation::ScientistsOverAssigned {
                faction: faction.id.clone(),
                assigned,
                employed: faction.staff.scientists,
            });
        }
        if faction.research.len() > rule.research_slots as usize {
            return Err(InvariantViolation::TooManyProjects {
                faction: faction.id.clone(),
                running: faction.research.len(),
                slots: rule.research_slots,
            });
        }
    }

    for (project, (state, before_cost)) in campaign
        .intel_projects
        .iter()
        .zip(&before.intel_costs)
        .enumerate()
    {
        if state.cost < *before_cost {
            return Err(InvariantViolation::IntelCostDropped {
                project,
                before: *before_cost,
                after: state.cost,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fta_sim::{CampaignController, StartProfile};

    fn campaign() -> (RuleSet, Campaign) {
        let rules = RuleSet::builtin().unwrap();
        let profile = StartProfile::builtin().unwrap();
        let campaign = Campaign::new(&rules, &profile, 99).unwrap();
        (rules, campaign)
    }

    #[test]
    fn clean_days_pass() {
        let (rules, mut campaign) = campaign();
        let mut controller = CampaignController::new(rules.clone(), campaign.seed);
        for _ in 0..45 {
            let before = DaySnapshot::capture(&campaign);
            let report = controller.tick_day(&mut campaign);
            check_day(&rules, &before, &campaign, &report).unwrap();
        }
    }

    #[test]
    fn tampered_funds_break_the_ledger() {
        let (rules, mut campaign) = campaign();
        let mut controller = CampaignController::new(rules.clone(), campaign.seed);
        let before = DaySnapshot::capture(&campaign);
        let report = controller.tick_day(&mut campaign);
        campaign.factions[0].funds += 5;
        let err = check_day(&rules, &before, &campaign, &report).unwrap_err();
        assert!(matches!(err, InvariantViolation::LedgerMismatch { actual, logged, .. } if actual == logged + 5));
    }

    #[test]
    fn repeated_day_is_flagged() {
        let (rules, mut campaign) = campaign();
        let mut controller = CampaignController::new(rules.clone(), campaign.seed);
        let report = controller.tick_day(&mut campaign);
        let before = DaySnapshot::capture(&campaign);
        let err = check_day(&rules, &before, &campaign, &report).unwrap_err();
        assert_eq!(err, InvariantViolation::DaySkipped { before: 1, after: 1 });
    }
}
