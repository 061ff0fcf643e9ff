//! Campaign state, player commands and the daily tick.
//!
//! [`Campaign`] is plain serializable data. [`CampaignController`] owns the
//! rules and RNG streams and advances a campaign one day at a time;
//! [`CampaignSession`] binds the two together for callers that just want
//! to play.
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hasher;
use thiserror::Error;
use twox_hash::XxHash64;

use crate::calendar::{GameDate, ThinkPeriods, think_periods};
use crate::covert::{CovertOperation, OperationOdds, operation_odds};
use crate::events::{DiscoverySource, EventLog, FactionEvent, GameEvent};
use crate::faction::Faction;
use crate::intel::{IntelOutcome, IntelProject};
use crate::rng::{RngBundle, RngCheckpoint};
use crate::roster::{Assignment, Soldier, SoldierId, SoldierStats};
use crate::rules::{RuleError, RuleSet, StartProfile};
use crate::stock::ItemStock;

/// Reasons a player command is refused.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error(transparent)]
    Rules(#[from] RuleError),
    #[error("unknown intel project rule `{0}`")]
    UnknownIntelProject(String),
    #[error("unknown covert operation rule `{0}`")]
    UnknownCovertOperation(String),
    #[error("no intel project at index {0}")]
    NoSuchProject(usize),
    #[error("intel project {0} is already complete")]
    ProjectComplete(usize),
    #[error("unknown soldier {0}")]
    UnknownSoldier(SoldierId),
    #[error("soldier {0} is assigned more than once")]
    DuplicateSoldier(SoldierId),
    #[error("soldier {0} is busy")]
    SoldierBusy(SoldierId),
    #[error("{requested} soldiers assigned, allowed {min}..={max}")]
    SoldierCount { requested: usize, min: u32, max: u32 },
    #[error("operation needs {required} x `{item}`, {assigned} assigned")]
    MissingRequiredItems {
        item: String,
        required: u32,
        assigned: u32,
    },
    #[error("stores hold {available} x `{item}`, {requested} requested")]
    InsufficientStores {
        item: String,
        requested: u32,
        available: u32,
    },
    #[error("need {required} funds, have {available}")]
    InsufficientFunds { required: i64, available: i64 },
}

/// The player's side of the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub funds: i64,
    pub stores: ItemStock,
    pub soldiers: Vec<Soldier>,
    pub discovered: BTreeSet<String>,
}

impl PlayerState {
    #[must_use]
    pub fn from_profile(profile: &StartProfile) -> Self {
        Self {
            funds: profile.funds,
            stores: profile.stores.clone(),
            soldiers: profile.soldiers.clone(),
            discovered: profile.discovered.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn soldier(&self, id: SoldierId) -> Option<&Soldier> {
        self.soldiers.iter().find(|soldier| soldier.id == id)
    }

    fn set_assignment(&mut self, ids: &[SoldierId], assignment: Assignment) {
        for soldier in &mut self.soldiers {
            if ids.contains(&soldier.id) {
                soldier.assignment = assignment;
            }
        }
    }

    /// Record a discovery; returns false when it was already known.
    pub fn discover(&mut self, research: &str) -> bool {
        self.discovered.insert(research.to_string())
    }

    /// Resolve ids to soldiers that exist, appear once, and are either idle
    /// or already on `current`.
    fn team(
        &self,
        ids: &[SoldierId],
        current: Option<Assignment>,
    ) -> Result<Vec<&Soldier>, CampaignError> {
        let mut seen = BTreeSet::new();
        let mut team = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(*id) {
                return Err(CampaignError::DuplicateSoldier(*id));
            }
            let soldier = self.soldier(*id).ok_or(CampaignError::UnknownSoldier(*id))?;
            if !soldier.is_idle() && Some(soldier.assignment) != current {
                return Err(CampaignError::SoldierBusy(*id));
            }
            team.push(soldier);
        }
        Ok(team)
    }
}

/// Complete, serializable campaign state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub seed: u64,
    pub date: GameDate,
    pub day: u32,
    pub player: PlayerState,
    pub factions: Vec<Faction>,
    pub intel_projects: Vec<IntelProject>,
    pub covert_operations: Vec<CovertOperation>,
    pub log: EventLog,
    #[serde(default)]
    pub rng_checkpoint: RngCheckpoint,
}

impl Campaign {
    /// Start a campaign from rules and a start profile.
    ///
    /// # Errors
    ///
    /// Returns an error when the rules are inconsistent or the profile
    /// references unknown content.
    pub fn new(rules: &RuleSet, profile: &StartProfile, seed: u64) -> Result<Self, CampaignError> {
        rules.validate()?;
        profile.validate(rules)?;
        let factions = rules
            .factions
            .iter()
            .map(|rule| Faction::from_rule(rule, &rules.reputation))
            .collect();
        Ok(Self {
            seed,
            date: profile.start_date,
            day: 0,
            player: PlayerState::from_profile(profile),
            factions,
            intel_projects: Vec::new(),
            covert_operations: Vec::new(),
            log: EventLog::default(),
            rng_checkpoint: RngCheckpoint::default(),
        })
    }

    #[must_use]
    pub fn faction(&self, id: &str) -> Option<&Faction> {
        self.factions.iter().find(|faction| faction.id == id)
    }

    /// Stable hash of the full campaign state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized.
    pub fn digest(&self) -> Result<u64, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        Ok(hasher.finish())
    }

    /// Open a new intel project staffed by `agents`.
    ///
    /// # Errors
    ///
    /// Fails for unknown rules, too many agents, or agents that are
    /// missing, duplicated or busy.
    pub fn start_intel_project(
        &mut self,
        rules: &RuleSet,
        rule_id: &str,
        agents: &[SoldierId],
    ) -> Result<usize, CampaignError> {
        let rule = rules
            .intel_project(rule_id)
            .ok_or_else(|| CampaignError::UnknownIntelProject(rule_id.to_string()))?;
        check_count(agents.len(), 0, rule.max_agents)?;
        self.player.team(agents, None)?;

        let index = self.intel_projects.len();
        let mut project = IntelProject::new(rule);
        project.agents = agents.to_vec();
        self.intel_projects.push(project);
        self.player
            .set_assignment(agents, Assignment::IntelProject(index));
        info!("started intel project {rule_id} with {} agents", agents.len());
        Ok(index)
    }

    /// Replace the team on an existing intel project.
    ///
    /// # Errors
    ///
    /// Fails for unknown or completed projects and invalid teams.
    pub fn assign_intel_agents(
        &mut self,
        rules: &RuleSet,
        project: usize,
        agents: &[SoldierId],
    ) -> Result<(), CampaignError> {
        let state = self
            .intel_projects
            .get(project)
            .ok_or(CampaignError::NoSuchProject(project))?;
        if state.completed {
            return Err(CampaignError::ProjectComplete(project));
        }
        let rule = rules
            .intel_project(&state.rule_id)
            .ok_or_else(|| CampaignError::UnknownIntelProject(state.rule_id.clone()))?;
        check_count(agents.len(), 0, rule.max_agents)?;
        self.player
            .team(agents, Some(Assignment::IntelProject(project)))?;

        let previous = std::mem::take(&mut self.intel_projects[project].agents);
        self.player.set_assignment(&previous, Assignment::Idle);
        self.player
            .set_assignment(agents, Assignment::IntelProject(project));
        self.intel_projects[project].agents = agents.to_vec();
        Ok(())
    }

    /// Odds of an operation without committing anything.
    ///
    /// # Errors
    ///
    /// Fails for unknown rules or soldiers.
    pub fn preview_operation_odds(
        &self,
        rules: &RuleSet,
        rule_id: &str,
        soldiers: &[SoldierId],
        items: &ItemStock,
    ) -> Result<OperationOdds, CampaignError> {
        let rule = rules
            .covert_operation(rule_id)
            .ok_or_else(|| CampaignError::UnknownCovertOperation(rule_id.to_string()))?;
        let team = soldiers
            .iter()
            .map(|id| {
                self.player
                    .soldier(*id)
                    .ok_or(CampaignError::UnknownSoldier(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(operation_odds(rule, &team, items, self.target_vigilance(rule.target_faction.as_deref())))
    }

    /// Commit soldiers, items and funding to a covert operation.
    ///
    /// # Errors
    ///
    /// Fails when the team size is out of bounds, soldiers are unavailable,
    /// required items are not assigned, the stores cannot cover the
    /// assigned items, or funds cannot cover the funding cost.
    pub fn start_covert_operation(
        &mut self,
        rules: &RuleSet,
        rule_id: &str,
        soldiers: &[SoldierId],
        items: ItemStock,
    ) -> Result<usize, CampaignError> {
        let rule = rules
            .covert_operation(rule_id)
            .ok_or_else(|| CampaignError::UnknownCovertOperation(rule_id.to_string()))?;
        check_count(soldiers.len(), rule.min_soldiers, rule.max_soldiers)?;
        let team = self.player.team(soldiers, None)?;

        for (item, required) in rule.required_items.iter() {
            let assigned = items.get(item);
            if assigned < required {
                return Err(CampaignError::MissingRequiredItems {
                    item: item.to_string(),
                    required,
                    assigned,
                });
            }
        }
        for (item, requested) in items.iter() {
            let available = self.player.stores.get(item);
            if available < requested {
                return Err(CampaignError::InsufficientStores {
                    item: item.to_string(),
                    requested,
                    available,
                });
            }
        }
        if self.player.funds < rule.funding_cost {
            return Err(CampaignError::InsufficientFunds {
                required: rule.funding_cost,
                available: self.player.funds,
            });
        }

        let odds = operation_odds(
            rule,
            &team,
            &items,
            self.target_vigilance(rule.target_faction.as_deref()),
        );
        for (item, quantity) in items.iter() {
            self.player.stores.remove(item, quantity);
        }
        self.player.funds -= rule.funding_cost;

        let index = self.covert_operations.len();
        self.player
            .set_assignment(soldiers, Assignment::CovertOperation(index));
        self.covert_operations.push(CovertOperation::new(
            rule,
            soldiers.to_vec(),
            items,
            &odds,
            self.date,
        ));
        info!(
            "started covert operation {rule_id}: {:.1}% over {} days",
            odds.chance, odds.days
        );
        self.log.push(
            self.date,
            GameEvent::CovertStarted {
                operation: index,
                rule: rule_id.to_string(),
                chance: odds.chance,
                days: odds.days,
            },
        );
        Ok(index)
    }

    fn target_vigilance(&self, target: Option<&str>) -> i32 {
        target
            .and_then(|id| self.faction(id))
            .map_or(0, |faction| faction.vigilance)
    }
}

fn check_count(requested: usize, min: u32, max: u32) -> Result<(), CampaignError> {
    let in_bounds = u32::try_from(requested).is_ok_and(|n| (min..=max).contains(&n));
    if in_bounds {
        Ok(())
    } else {
        Err(CampaignError::SoldierCount {
            requested,
            min,
            max,
        })
    }
}

/// Everything that happened on one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: GameDate,
    pub day: u32,
    pub periods: ThinkPeriods,
    pub events: Vec<GameEvent>,
}

impl DayReport {
    /// Net change to each faction's funds implied by the day's events.
    #[must_use]
    pub fn faction_funds_deltas(&self) -> BTreeMap<&str, i64> {
        let mut deltas = BTreeMap::new();
        for (faction, event) in self.events.iter().filter_map(GameEvent::as_faction) {
            *deltas.entry(faction).or_insert(0) += event.funds_delta();
        }
        deltas
    }
}

/// Advances campaigns under one rule set and RNG bundle.
#[derive(Debug, Clone)]
pub struct CampaignController {
    rules: RuleSet,
    rng: RngBundle,
}

impl CampaignController {
    #[must_use]
    pub fn new(rules: RuleSet, seed: u64) -> Self {
        Self {
            rules,
            rng: RngBundle::from_user_seed(seed),
        }
    }

    /// Controller positioned to continue a saved campaign.
    #[must_use]
    pub fn resume(rules: RuleSet, campaign: &Campaign) -> Self {
        Self {
            rules,
            rng: RngBundle::resume(campaign.seed, &campaign.rng_checkpoint),
        }
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub const fn rng(&self) -> &RngBundle {
        &self.rng
    }

    /// Advance one day: faction thinking, intel rolls, covert operations.
    pub fn tick_day(&mut self, campaign: &mut Campaign) -> DayReport {
        campaign.date = campaign.date.next_day();
        campaign.day += 1;
        let date = campaign.date;
        let periods = think_periods(date);
        let mut events = Vec::new();

        for period in &periods {
            for faction in &mut campaign.factions {
                let Some(rule) = self.rules.faction(&faction.id) else {
                    continue;
                };
                let produced =
                    faction.think(&self.rules, rule, *period, date, &mut *self.rng.mission());
                events.extend(produced.into_iter().map(|event| GameEvent::Faction {
                    faction: faction.id.clone(),
                    event,
                }));
            }
        }

        events.extend(self.roll_intel_projects(campaign));
        events.extend(self.progress_covert_operations(campaign));

        debug!("{date}: {} events", events.len());
        campaign.log.extend(date, events.iter().cloned());
        campaign.rng_checkpoint = self.rng.checkpoint();
        DayReport {
            date,
            day: campaign.day,
            periods,
            events,
        }
    }

    /// Tick `days` times and collect the reports.
    pub fn run_days(&mut self, campaign: &mut Campaign, days: u32) -> Vec<DayReport> {
        (0..days).map(|_| self.tick_day(campaign)).collect()
    }

    fn roll_intel_projects(&self, campaign: &mut Campaign) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let mut completed = Vec::new();
        let Campaign {
            player,
            intel_projects,
            ..
        } = campaign;

        for (index, project) in intel_projects.iter_mut().enumerate() {
            if project.completed {
                continue;
            }
            let Some(rule) = self.rules.intel_project(&project.rule_id) else {
                continue;
            };
            let team: Vec<&SoldierStats> = project
                .agents
                .iter()
                .filter_map(|id| player.soldiers.iter().find(|soldier| soldier.id == *id))
                .map(|soldier| &soldier.stats)
                .collect();
            let roll = project.roll(rule, &team, &mut player.funds, &mut *self.rng.intel());
            if matches!(roll.outcome, IntelOutcome::Idle | IntelOutcome::AlreadyComplete) {
                continue;
            }
            if roll.outcome == IntelOutcome::ProjectCompleted {
                completed.push((index, project.agents.clone(), rule.unlocks.clone()));
            }
            events.push(GameEvent::Intel {
                project: index,
                rule: project.rule_id.clone(),
                outcome: roll.outcome,
                cost_paid: roll.cost_paid,
            });
        }

        for (index, agents, unlocks) in completed {
            player.set_assignment(&agents, Assignment::Idle);
            for research in unlocks {
                if player.discover(&research) {
                    info!("intel project {index} revealed {research}");
                    events.push(GameEvent::ResearchDiscovered {
                        research,
                        source: DiscoverySource::IntelProject,
                    });
                }
            }
        }
        events
    }

    fn progress_covert_operations(&self, campaign: &mut Campaign) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for index in 0..campaign.covert_operations.len() {
            let operation = &mut campaign.covert_operations[index];
            if !operation.advance_day() {
                continue;
            }
            let success = operation.resolve(&mut *self.rng.covert());
            let operation = operation.clone();
            let Some(rule) = self.rules.covert_operation(&operation.rule_id) else {
                continue;
            };
            events.push(GameEvent::CovertResolved {
                operation: index,
                rule: rule.id.clone(),
                success,
            });

            let player = &mut campaign.player;
            player.set_assignment(&operation.soldiers, Assignment::Idle);
            let (reputation, vigilance) = if success {
                for (item, quantity) in operation.items.iter() {
                    player.stores.add(item, quantity);
                }
                player.funds = player.funds.saturating_add(rule.funds_on_success);
                for research in &operation.research_hook {
                    if player.discover(research) {
                        events.push(GameEvent::ResearchDiscovered {
                            research: research.clone(),
                            source: DiscoverySource::CovertOperation,
                        });
                    }
                }
                (rule.reputation_on_success, rule.vigilance_on_success)
            } else {
                (rule.reputation_on_failure, rule.vigilance_on_failure)
            };

            let Some(target_id) = rule.target_faction.as_deref() else {
                continue;
            };
            let (Some(target), Some(target_rule)) = (
                campaign.factions.iter_mut().find(|f| f.id == target_id),
                self.rules.faction(target_id),
            ) else {
                continue;
            };
            target.raise_vigilance(vigilance);
            let changes: Vec<FactionEvent> =
                target.adjust_reputation(reputation, &self.rules.reputation, target_rule);
            events.extend(changes.into_iter().map(|event| GameEvent::Faction {
                faction: target_id.to_string(),
                event,
            }));
        }
        events
    }
}

/// A campaign paired with the controller that advances it.
#[derive(Debug, Clone)]
pub struct CampaignSession {
    controller: CampaignController,
    campaign: Campaign,
}

impl CampaignSession {
    /// Start a fresh campaign.
    ///
    /// # Errors
    ///
    /// Returns an error when the rules are inconsistent or the profile does
    /// not fit them.
    pub fn new(rules: RuleSet, profile: &StartProfile, seed: u64) -> Result<Self, CampaignError> {
        let campaign = Campaign::new(&rules, profile, seed)?;
        Ok(Self {
            controller: CampaignController::new(rules, seed),
            campaign,
        })
    }

    /// Continue a saved campaign.
    #[must_use]
    pub fn from_campaign(rules: RuleSet, campaign: Campaign) -> Self {
        Self {
            controller: CampaignController::resume(rules, &campaign),
            campaign,
        }
    }

    pub fn tick_day(&mut self) -> DayReport {
        self.controller.tick_day(&mut self.campaign)
    }

    pub fn run_days(&mut self, days: u32) -> Vec<DayReport> {
        self.controller.run_days(&mut self.campaign, days)
    }

    #[must_use]
    pub const fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        self.controller.rules()
    }

    #[must_use]
    pub const fn controller(&self) -> &CampaignController {
        &self.controller
    }

    /// Apply a player command against the campaign and its rules.
    pub fn with_campaign_mut<T>(&mut self, f: impl FnOnce(&mut Campaign, &RuleSet) -> T) -> T {
        f(&mut self.campaign, &self.controller.rules)
    }

    #[must_use]
    pub fn into_campaign(self) -> Campaign {
        self.campaign
    }
}
