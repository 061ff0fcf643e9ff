//! Factional research: project selection and scientist allocation.
//!
//! Each faction funds a limited number of projects at once. Candidates are
//! ranked by points per unit of cost (scaled by the faction's focus on the
//! category) and compete for a single pool of scientists that is
//! re-balanced every day.
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::Faction;
use crate::constants::{DEFAULT_FOCUS_WEIGHT, RESEARCH_WORK_SCALE};
use crate::events::FactionEvent;
use crate::rules::{FactionRule, ResearchRule, RuleSet};

/// A research project a faction is currently funding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionalResearch {
    pub research_id: String,
    /// Total work in hundredths of a scientist-day.
    pub total: u32,
    pub remaining: u32,
    pub scientists: u32,
    pub priority: f64,
    #[serde(default)]
    pub max_scientists: Option<u32>,
}

impl FactionalResearch {
    #[must_use]
    pub fn new(rule: &ResearchRule, priority: f64) -> Self {
        let total = rule.cost.saturating_mul(RESEARCH_WORK_SCALE);
        Self {
            research_id: rule.id.clone(),
            total,
            remaining: total,
            scientists: 0,
            priority,
            max_scientists: rule.max_scientists,
        }
    }

    /// Most scientists worth assigning: the rule cap, or enough to finish today.
    #[must_use]
    pub fn scientist_cap(&self, efficiency: u32) -> u32 {
        let needed = self.remaining.div_ceil(efficiency.max(1));
        self.max_scientists.map_or(needed, |cap| cap.min(needed))
    }

    /// Apply one day of work and return the amount done.
    pub fn progress(&mut self, efficiency: u32) -> u32 {
        let work = self.scientists.saturating_mul(efficiency).min(self.remaining);
        self.remaining -= work;
        work
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Fraction of the project completed, 0.0..=1.0.
    #[must_use]
    pub fn completion(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        f64::from(self.total - self.remaining) / f64::from(self.total)
    }
}

/// Points per scientist-day, scaled by the faction's focus on the category.
#[must_use]
pub fn priority_score(rule: &ResearchRule, faction_rule: &FactionRule) -> f64 {
    let focus = rule
        .category
        .as_ref()
        .and_then(|category| faction_rule.research_focus.get(category))
        .copied()
        .unwrap_or(DEFAULT_FOCUS_WEIGHT);
    f64::from(rule.points) / f64::from(rule.cost.max(1)) * focus
}

/// Research the faction could start right now, best first.
#[must_use]
pub fn candidates<'r>(
    faction: &Faction,
    rules: &'r RuleSet,
    faction_rule: &FactionRule,
) -> Vec<(&'r ResearchRule, f64)> {
    let mut list: Vec<(&ResearchRule, f64)> = rules
        .research
        .iter()
        .filter(|rule| rule.available_to(&faction.id))
        .filter(|rule| !faction.discovered.contains(&rule.id))
        .filter(|rule| !faction.is_researching(&rule.id))
        .filter(|rule| {
            rule.prerequisites
                .iter()
                .all(|prerequisite| faction.discovered.contains(prerequisite))
        })
        .map(|rule| (rule, priority_score(rule, faction_rule)))
        .collect();
    list.sort_by(|(a_rule, a_score), (b_rule, b_score)| {
        b_score
            .total_cmp(a_score)
            .then_with(|| a_rule.id.cmp(&b_rule.id))
    });
    list
}

/// Distribute `scientists` across projects in proportion to priority.
///
/// Each project is capped at `scientist_cap`. Shares are floored, then the
/// remainder goes out one head at a time in priority order. The total
/// assigned never exceeds `scientists`.
pub fn reallocate(projects: &mut [FactionalResearch], scientists: u32, efficiency: u32) {
    if projects.is_empty() {
        return;
    }
    let mut order: Vec<usize> = (0..projects.len()).collect();
    order.sort_by(|&a, &b| {
        projects[b]
            .priority
            .total_cmp(&projects[a].priority)
            .then_with(|| projects[a].research_id.cmp(&projects[b].research_id))
    });
    let caps: Vec<u32> = projects
        .iter()
        .map(|project| project.scientist_cap(efficiency))
        .collect();
    let total_priority: f64 = projects.iter().map(|p| p.priority.max(0.0)).sum();
    let pool = f64::from(scientists);

    let mut assigned: u32 = 0;
    for (project, cap) in projects.iter_mut().zip(&caps) {
        let share = if total_priority > 0.0 {
            crate::numbers::floor_f64_to_u32(pool * project.priority.max(0.0) / total_priority)
        } else {
            0
        };
        project.scientists = share.min(*cap);
        assigned = assigned.saturating_add(project.scientists);
    }

    // Floating point rounding can overshoot by a head; take it back from the
    // lowest priority projects.
    for &idx in order.iter().rev() {
        if assigned <= scientists {
            break;
        }
        let excess = (assigned - scientists).min(projects[idx].scientists);
        projects[idx].scientists -= excess;
        assigned -= excess;
    }

    let mut spare = scientists - assigned;
    while spare > 0 {
        let mut handed_out = false;
        for &idx in &order {
            if spare == 0 {
                break;
            }
            if projects[idx].scientists < caps[idx] {
                projects[idx].scientists += 1;
                spare -= 1;
                handed_out = true;
            }
        }
        if !handed_out {
            break;
        }
    }
}

impl Faction {
    #[must_use]
    pub fn is_researching(&self, research_id: &str) -> bool {
        self.research
            .iter()
            .any(|project| project.research_id == research_id)
    }

    /// Scientists currently assigned across all projects.
    #[must_use]
    pub fn assigned_scientists(&self) -> u32 {
        self.research.iter().map(|project| project.scientists).sum()
    }

    /// Daily research step: re-balance, progress, complete, pick new work.
    pub fn handle_research(
        &mut self,
        rules: &RuleSet,
        faction_rule: &FactionRule,
    ) -> Vec<FactionEvent> {
        let efficiency = rules.economy.scientist_efficiency_pct.max(1);
        let mut events = Vec::new();

        reallocate(&mut self.research, self.staff.scientists, efficiency);
        for project in &mut self.research {
            let work = project.progress(efficiency);
            debug!(
                "{}: {} +{} work ({} left, {} scientists)",
                self.id, project.research_id, work, project.remaining, project.scientists
            );
        }

        let mut completed = Vec::new();
        self.research.retain(|project| {
            if project.is_complete() {
                completed.push(project.research_id.clone());
                false
            } else {
                true
            }
        });
        for research in completed {
            info!("{} completed research {}", self.id, research);
            self.discovered.insert(research.clone());
            self.discovered_this_month.push(research.clone());
            events.push(FactionEvent::ResearchCompleted { research });
        }

        events.extend(self.select_projects(rules, faction_rule));
        reallocate(&mut self.research, self.staff.scientists, efficiency);
        events
    }

    /// Fill free research slots with the best affordable candidates.
    pub fn select_projects(
        &mut self,
        rules: &RuleSet,
        faction_rule: &FactionRule,
    ) -> Vec<FactionEvent> {
        let slots = usize::try_from(faction_rule.research_slots).unwrap_or(usize::MAX);
        let mut events = Vec::new();
        if self.research.len() >= slots {
            return events;
        }

        for (rule, priority) in candidates(self, rules, faction_rule) {
            if self.research.len() >= slots {
                break;
            }
            let spendable = self.funds - faction_rule.funds_reserve;
            if rule.funding > spendable {
                continue;
            }
            self.funds -= rule.funding;
            self.research.push(FactionalResearch::new(rule, priority));
            debug!(
                "{} started research {} (priority {:.3}, funding {})",
                self.id, rule.id, priority, rule.funding
            );
            events.push(FactionEvent::ResearchStarted {
                research: rule.id.clone(),
                funding: rule.funding,
            });
        }
        events
    }
}
