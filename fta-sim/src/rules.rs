//! Rule content: research, items, factions, covert operations and intel
//! projects, plus the economy constants that tie them together.
//!
//! Rules are plain data deserialized from JSON. `RuleSet::validate` only
//! checks what the simulation relies on to keep its invariants (resolvable
//! references, non-zero divisors, probabilities in range).
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::calendar::GameDate;
use crate::constants::{DEFAULT_SCIENTIST_EFFICIENCY_PCT, DEFAULT_SELL_KEEP_PCT, PERCENT};
use crate::covert::CovertOperationRule;
use crate::intel::IntelProjectRule;
use crate::reputation::{ReputationLevel, ReputationTable};
use crate::roster::Soldier;
use crate::stock::ItemStock;

/// Errors raised while loading or checking rule content.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to parse rule data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("{owner} references unknown {kind} `{reference}`")]
    UnknownReference {
        kind: &'static str,
        owner: String,
        reference: String,
    },
    #[error("{owner}: {field} {reason}")]
    InvalidField {
        owner: String,
        field: &'static str,
        reason: &'static str,
    },
    #[error("reputation thresholds must increase from unfriendly to allied")]
    ReputationThresholds,
}

/// A research topic factions (and the player) can discover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRule {
    pub id: String,
    pub name: String,
    /// Work in scientist-days.
    pub cost: u32,
    #[serde(default)]
    pub points: u32,
    /// Funds a faction commits when it starts the project.
    #[serde(default)]
    pub funding: i64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Factions allowed to research this topic; empty means any.
    #[serde(default)]
    pub factions: Vec<String>,
    #[serde(default)]
    pub max_scientists: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ResearchRule {
    #[must_use]
    pub fn available_to(&self, faction_id: &str) -> bool {
        self.factions.is_empty() || self.factions.iter().any(|id| id == faction_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRule {
    pub id: String,
    pub name: String,
    pub buy_price: i64,
    pub sell_price: i64,
    /// Research a faction needs before it can buy or build the item.
    #[serde(default)]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Scientist,
    Engineer,
    Agent,
}

impl StaffRole {
    /// Hiring order.
    pub const ALL: [Self; 3] = [Self::Scientist, Self::Engineer, Self::Agent];
    /// Who goes first when salaries cannot be met.
    pub const DISMISSAL_ORDER: [Self; 3] = [Self::Agent, Self::Engineer, Self::Scientist];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Scientist => "scientist",
            Self::Engineer => "engineer",
            Self::Agent => "agent",
        }
    }
}

/// Head counts per staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffCounts {
    #[serde(default)]
    pub scientists: u32,
    #[serde(default)]
    pub engineers: u32,
    #[serde(default)]
    pub agents: u32,
}

impl StaffCounts {
    #[must_use]
    pub const fn get(&self, role: StaffRole) -> u32 {
        match role {
            StaffRole::Scientist => self.scientists,
            StaffRole::Engineer => self.engineers,
            StaffRole::Agent => self.agents,
        }
    }

    pub const fn get_mut(&mut self, role: StaffRole) -> &mut u32 {
        match role {
            StaffRole::Scientist => &mut self.scientists,
            StaffRole::Engineer => &mut self.engineers,
            StaffRole::Agent => &mut self.agents,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.scientists
            .saturating_add(self.engineers)
            .saturating_add(self.agents)
    }
}

/// Money amounts per staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffCosts {
    pub scientist: i64,
    pub engineer: i64,
    pub agent: i64,
}

impl StaffCosts {
    #[must_use]
    pub const fn get(&self, role: StaffRole) -> i64 {
        match role {
            StaffRole::Scientist => self.scientist,
            StaffRole::Engineer => self.engineer,
            StaffRole::Agent => self.agent,
        }
    }

    /// Monthly bill for the given head counts.
    #[must_use]
    pub fn bill(&self, staff: &StaffCounts) -> i64 {
        StaffRole::ALL
            .iter()
            .map(|role| self.get(*role).saturating_mul(i64::from(staff.get(*role))))
            .sum()
    }
}

/// Global economy constants shared by every faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default = "EconomyConfig::default_salaries")]
    pub salaries: StaffCosts,
    #[serde(default = "EconomyConfig::default_hire_costs")]
    pub hire_costs: StaffCosts,
    /// Research work units one scientist produces per day.
    #[serde(default = "EconomyConfig::default_efficiency")]
    pub scientist_efficiency_pct: u32,
    /// Stock kept back from sale, as a percentage of the restock target.
    #[serde(default = "EconomyConfig::default_keep")]
    pub sell_keep_pct: u32,
}

impl EconomyConfig {
    const fn default_salaries() -> StaffCosts {
        StaffCosts {
            scientist: 30,
            engineer: 25,
            agent: 20,
        }
    }

    const fn default_hire_costs() -> StaffCosts {
        StaffCosts {
            scientist: 60,
            engineer: 50,
            agent: 40,
        }
    }

    const fn default_efficiency() -> u32 {
        DEFAULT_SCIENTIST_EFFICIENCY_PCT
    }

    const fn default_keep() -> u32 {
        DEFAULT_SELL_KEEP_PCT
    }
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            salaries: Self::default_salaries(),
            hire_costs: Self::default_hire_costs(),
            scientist_efficiency_pct: Self::default_efficiency(),
            sell_keep_pct: Self::default_keep(),
        }
    }
}

/// Item a faction's engineers can build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    pub item: String,
    pub work_per_unit: u32,
    #[serde(default)]
    pub requires: Vec<String>,
}

/// Mission a faction may launch at month start by spending power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionMissionRule {
    pub id: String,
    pub power_cost: i32,
    /// Launch chance in percent once every other condition holds.
    pub chance: u8,
    #[serde(default)]
    pub requires_research: Vec<String>,
    /// Only launched while the faction's standing is at or below this level.
    #[serde(default)]
    pub max_reputation: Option<ReputationLevel>,
    #[serde(default)]
    pub min_vigilance: Option<i32>,
}

/// Treaty signed automatically while reputation stays at `min_level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatyRule {
    pub id: String,
    pub min_level: ReputationLevel,
    #[serde(default)]
    pub monthly_funds: i64,
    #[serde(default)]
    pub monthly_power: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub starting_funds: i64,
    #[serde(default)]
    pub starting_power: i32,
    #[serde(default)]
    pub starting_vigilance: i32,
    #[serde(default)]
    pub starting_reputation: i32,
    #[serde(default)]
    pub starting_staff: StaffCounts,
    #[serde(default)]
    pub staff_targets: StaffCounts,
    #[serde(default)]
    pub starting_stock: ItemStock,
    #[serde(default)]
    pub monthly_income: i64,
    /// Funds the faction will not spend on research, stock or hiring.
    #[serde(default)]
    pub funds_reserve: i64,
    #[serde(default = "FactionRule::default_research_slots")]
    pub research_slots: u32,
    /// Priority multiplier per research category.
    #[serde(default)]
    pub research_focus: BTreeMap<String, f64>,
    #[serde(default)]
    pub power_growth: i32,
    #[serde(default = "FactionRule::default_power_cap")]
    pub power_cap: i32,
    #[serde(default)]
    pub power_decay_pct: u8,
    #[serde(default)]
    pub vigilance_decay: i32,
    /// Price of one power point when converting surplus funds; 0 disables.
    #[serde(default)]
    pub funds_per_power: i64,
    #[serde(default)]
    pub power_conversion_reserve: i64,
    #[serde(default)]
    pub restock: BTreeMap<String, u32>,
    #[serde(default)]
    pub production: Vec<ProductionRule>,
    #[serde(default)]
    pub missions: Vec<FactionMissionRule>,
    #[serde(default = "FactionRule::default_max_missions")]
    pub max_missions_per_month: u32,
    #[serde(default)]
    pub treaties: Vec<TreatyRule>,
}

impl FactionRule {
    const fn default_research_slots() -> u32 {
        2
    }

    const fn default_power_cap() -> i32 {
        1_000
    }

    const fn default_max_missions() -> u32 {
        1
    }

    /// Restock target for an item, 0 when the faction does not stock it.
    #[must_use]
    pub fn restock_target(&self, item_id: &str) -> u32 {
        self.restock.get(item_id).copied().unwrap_or(0)
    }
}

/// Complete rule content for a campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub research: Vec<ResearchRule>,
    #[serde(default)]
    pub items: Vec<ItemRule>,
    #[serde(default)]
    pub factions: Vec<FactionRule>,
    #[serde(default)]
    pub covert_operations: Vec<CovertOperationRule>,
    #[serde(default)]
    pub intel_projects: Vec<IntelProjectRule>,
    #[serde(default)]
    pub reputation: ReputationTable,
    #[serde(default)]
    pub economy: EconomyConfig,
}

impl RuleSet {
    /// Parse rules from JSON without validating them.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the rule schema.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The builtin content pack, parsed and validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded pack fails to parse or validate.
    pub fn builtin() -> Result<Self, RuleError> {
        let rules = Self::from_json(include_str!("../assets/data/rules.json"))?;
        rules.validate()?;
        Ok(rules)
    }

    #[must_use]
    pub fn research(&self, id: &str) -> Option<&ResearchRule> {
        self.research.iter().find(|rule| rule.id == id)
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<&ItemRule> {
        self.items.iter().find(|rule| rule.id == id)
    }

    #[must_use]
    pub fn faction(&self, id: &str) -> Option<&FactionRule> {
        self.factions.iter().find(|rule| rule.id == id)
    }

    #[must_use]
    pub fn covert_operation(&self, id: &str) -> Option<&CovertOperationRule> {
        self.covert_operations.iter().find(|rule| rule.id == id)
    }

    #[must_use]
    pub fn intel_project(&self, id: &str) -> Option<&IntelProjectRule> {
        self.intel_projects.iter().find(|rule| rule.id == id)
    }

    /// Check references and numeric ranges the simulation depends on.
    ///
    /// # Errors
    ///
    /// Returns the first `RuleError` found.
    pub fn validate(&self) -> Result<(), RuleError> {
        if !self.reputation.is_ordered() {
            return Err(RuleError::ReputationThresholds);
        }
        let research_ids = unique_ids("research", self.research.iter().map(|r| r.id.as_str()))?;
        let item_ids = unique_ids("item", self.items.iter().map(|r| r.id.as_str()))?;
        let faction_ids = unique_ids("faction", self.factions.iter().map(|r| r.id.as_str()))?;
        unique_ids(
            "covert operation",
            self.covert_operations.iter().map(|r| r.id.as_str()),
        )?;
        unique_ids(
            "intel project",
            self.intel_projects.iter().map(|r| r.id.as_str()),
        )?;
        let refs = References {
            research: &research_ids,
            items: &item_ids,
            factions: &faction_ids,
        };

        for rule in &self.research {
            validate_research(rule, &refs)?;
        }
        for rule in &self.items {
            validate_item(rule, &refs)?;
        }
        for rule in &self.factions {
            validate_faction(rule, &refs)?;
        }
        for rule in &self.covert_operations {
            validate_covert(rule, &refs)?;
        }
        for rule in &self.intel_projects {
            validate_intel(rule, &refs)?;
        }
        Ok(())
    }
}

struct References<'a> {
    research: &'a BTreeSet<&'a str>,
    items: &'a BTreeSet<&'a str>,
    factions: &'a BTreeSet<&'a str>,
}

impl References<'_> {
    fn research(&self, owner: &str, id: &str) -> Result<(), RuleError> {
        check_ref("research", self.research, owner, id)
    }

    fn item(&self, owner: &str, id: &str) -> Result<(), RuleError> {
        check_ref("item", self.items, owner, id)
    }

    fn faction(&self, owner: &str, id: &str) -> Result<(), RuleError> {
        check_ref("faction", self.factions, owner, id)
    }
}

fn check_ref(
    kind: &'static str,
    known: &BTreeSet<&str>,
    owner: &str,
    reference: &str,
) -> Result<(), RuleError> {
    if known.contains(reference) {
        Ok(())
    } else {
        Err(RuleError::UnknownReference {
            kind,
            owner: owner.to_string(),
            reference: reference.to_string(),
        })
    }
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<BTreeSet<&'a str>, RuleError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(RuleError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(seen)
}

fn invalid(owner: &str, field: &'static str, reason: &'static str) -> RuleError {
    RuleError::InvalidField {
        owner: owner.to_string(),
        field,
        reason,
    }
}

fn check_percent(owner: &str, field: &'static str, value: f64) -> Result<(), RuleError> {
    if (0.0..=PERCENT).contains(&value) {
        Ok(())
    } else {
        Err(invalid(owner, field, "must be between 0 and 100"))
    }
}

fn check_falloff(owner: &str, value: f64) -> Result<(), RuleError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(invalid(owner, "team_falloff", "must be in (0, 1]"))
    }
}

fn validate_research(rule: &ResearchRule, refs: &References<'_>) -> Result<(), RuleError> {
    let owner = format!("research `{}`", rule.id);
    if rule.cost == 0 {
        return Err(invalid(&owner, "cost", "must be at least 1"));
    }
    if rule.funding < 0 {
        return Err(invalid(&owner, "funding", "must not be negative"));
    }
    if rule.max_scientists == Some(0) {
        return Err(invalid(&owner, "max_scientists", "must be at least 1"));
    }
    for prerequisite in &rule.prerequisites {
        if prerequisite == &rule.id {
            return Err(invalid(&owner, "prerequisites", "must not include itself"));
        }
        refs.research(&owner, prerequisite)?;
    }
    for faction in &rule.factions {
        refs.faction(&owner, faction)?;
    }
    Ok(())
}

fn validate_item(rule: &ItemRule, refs: &References<'_>) -> Result<(), RuleError> {
    let owner = format!("item `{}`", rule.id);
    if rule.buy_price < 0 || rule.sell_price < 0 {
        return Err(invalid(&owner, "price", "must not be negative"));
    }
    for research in &rule.requires {
        refs.research(&owner, research)?;
    }
    Ok(())
}

fn validate_faction(rule: &FactionRule, refs: &References<'_>) -> Result<(), RuleError> {
    let owner = format!("faction `{}`", rule.id);
    if rule.starting_funds < 0 {
        return Err(invalid(&owner, "starting_funds", "must not be negative"));
    }
    if rule.funds_reserve < 0 {
        return Err(invalid(&owner, "funds_reserve", "must not be negative"));
    }
    if rule.power_cap < 0 {
        return Err(invalid(&owner, "power_cap", "must not be negative"));
    }
    if rule.power_decay_pct > 100 {
        return Err(invalid(&owner, "power_decay_pct", "must be at most 100"));
    }
    if rule.funds_per_power < 0 {
        return Err(invalid(&owner, "funds_per_power", "must not be negative"));
    }
    if rule.research_focus.values().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid(&owner, "research_focus", "weights must be >= 0"));
    }
    for (item, _) in rule.starting_stock.iter() {
        refs.item(&owner, item)?;
    }
    for item in rule.restock.keys() {
        refs.item(&owner, item)?;
    }
    for line in &rule.production {
        refs.item(&owner, &line.item)?;
        if line.work_per_unit == 0 {
            return Err(invalid(&owner, "production.work_per_unit", "must be at least 1"));
        }
        for research in &line.requires {
            refs.research(&owner, research)?;
        }
    }
    unique_ids("mission", rule.missions.iter().map(|m| m.id.as_str()))?;
    for mission in &rule.missions {
        if mission.chance > 100 {
            return Err(invalid(&owner, "missions.chance", "must be at most 100"));
        }
        if mission.power_cost < 0 {
            return Err(invalid(&owner, "missions.power_cost", "must not be negative"));
        }
        for research in &mission.requires_research {
            refs.research(&owner, research)?;
        }
    }
    unique_ids("treaty", rule.treaties.iter().map(|t| t.id.as_str()))?;
    Ok(())
}

fn validate_covert(rule: &CovertOperationRule, refs: &References<'_>) -> Result<(), RuleError> {
    let owner = format!("covert operation `{}`", rule.id);
    if rule.max_soldiers == 0 || rule.min_soldiers > rule.max_soldiers {
        return Err(invalid(&owner, "soldiers", "bounds must satisfy 1 <= min <= max"));
    }
    if rule.base_days == 0 {
        return Err(invalid(&owner, "base_days", "must be at least 1"));
    }
    check_percent(&owner, "base_chance", rule.base_chance)?;
    check_percent(&owner, "max_chance", rule.max_chance)?;
    check_falloff(&owner, rule.team_falloff)?;
    if rule.stat_scale <= 0.0 || !rule.stat_scale.is_finite() {
        return Err(invalid(&owner, "stat_scale", "must be positive"));
    }
    if rule.funding_cost < 0 {
        return Err(invalid(&owner, "funding_cost", "must not be negative"));
    }
    for (item, _) in rule.required_items.iter() {
        refs.item(&owner, item)?;
    }
    for bonus in &rule.optional_items {
        refs.item(&owner, &bonus.item)?;
    }
    if let Some(target) = &rule.target_faction {
        refs.faction(&owner, target)?;
    }
    for research in &rule.success_research {
        refs.research(&owner, research)?;
    }
    Ok(())
}

fn validate_intel(rule: &IntelProjectRule, refs: &References<'_>) -> Result<(), RuleError> {
    let owner = format!("intel project `{}`", rule.id);
    if rule.stages.is_empty() {
        return Err(invalid(&owner, "stages", "must not be empty"));
    }
    if rule.stages.iter().any(|stage| stage.progress_required == 0) {
        return Err(invalid(&owner, "stages.progress_required", "must be at least 1"));
    }
    check_percent(&owner, "min_chance", rule.min_chance)?;
    check_percent(&owner, "max_chance", rule.max_chance)?;
    if rule.min_chance > rule.max_chance {
        return Err(invalid(&owner, "min_chance", "must not exceed max_chance"));
    }
    check_falloff(&owner, rule.team_falloff)?;
    if rule.step_scale <= 0.0 || !rule.step_scale.is_finite() {
        return Err(invalid(&owner, "step_scale", "must be positive"));
    }
    if rule.max_agents == 0 {
        return Err(invalid(&owner, "max_agents", "must be at least 1"));
    }
    if rule.base_cost < 0 || rule.cost_increase < 0 {
        return Err(invalid(&owner, "cost", "must not be negative"));
    }
    for research in &rule.unlocks {
        refs.research(&owner, research)?;
    }
    Ok(())
}

/// Player starting position for a new campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartProfile {
    #[serde(default)]
    pub start_date: GameDate,
    pub funds: i64,
    #[serde(default)]
    pub stores: ItemStock,
    #[serde(default)]
    pub soldiers: Vec<Soldier>,
    #[serde(default)]
    pub discovered: Vec<String>,
}

impl StartProfile {
    /// Parse a start profile from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The builtin start profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded profile fails to parse.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_json(include_str!("../assets/data/start.json"))
    }

    /// Check the profile against a rule set.
    ///
    /// # Errors
    ///
    /// Returns a `RuleError` for unknown items or research, duplicate
    /// soldier ids or negative funds.
    pub fn validate(&self, rules: &RuleSet) -> Result<(), RuleError> {
        let owner = "start profile";
        if self.funds < 0 {
            return Err(invalid(owner, "funds", "must not be negative"));
        }
        for (item, _) in self.stores.iter() {
            if rules.item(item).is_none() {
                return Err(RuleError::UnknownReference {
                    kind: "item",
                    owner: owner.to_string(),
                    reference: item.to_string(),
                });
            }
        }
        for research in &self.discovered {
            if rules.research(research).is_none() {
                return Err(RuleError::UnknownReference {
                    kind: "research",
                    owner: owner.to_string(),
                    reference: research.clone(),
                });
            }
        }
        let mut ids = BTreeSet::new();
        for soldier in &self.soldiers {
            if !ids.insert(soldier.id) {
                return Err(RuleError::DuplicateId {
                    kind: "soldier",
                    id: soldier.id.0.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> RuleSet {
        RuleSet::from_json(
            r#"{
                "research": [
                    {"id": "radio", "name": "Radio", "cost": 10, "points": 20},
                    {"id": "cipher", "name": "Cipher", "cost": 20, "points": 50, "prerequisites": ["radio"]}
                ],
                "items": [
                    {"id": "rifle", "name": "Rifle", "buy_price": 10, "sell_price": 6}
                ],
                "factions": [
                    {"id": "guild", "name": "Guild", "restock": {"rifle": 5}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_rules_validate() {
        let rules = minimal();
        rules.validate().unwrap();
        assert_eq!(rules.faction("guild").unwrap().research_slots, 2);
        assert_eq!(rules.faction("guild").unwrap().restock_target("rifle"), 5);
        assert_eq!(rules.economy.scientist_efficiency_pct, 100);
    }

    #[test]
    fn unknown_prerequisite_is_reported() {
        let mut rules = minimal();
        rules.research[1].prerequisites.push("teleport".into());
        let err = rules.validate().unwrap_err();
        assert!(matches!(
            err,
            RuleError::UnknownReference { kind: "research", ref reference, .. } if reference == "teleport"
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut rules = minimal();
        let copy = rules.items[0].clone();
        rules.items.push(copy);
        assert!(matches!(
            rules.validate(),
            Err(RuleError::DuplicateId { kind: "item", .. })
        ));
    }

    #[test]
    fn zero_cost_research_is_rejected() {
        let mut rules = minimal();
        rules.research[0].cost = 0;
        assert!(matches!(
            rules.validate(),
            Err(RuleError::InvalidField { field: "cost", .. })
        ));
    }

    #[test]
    fn unordered_reputation_table_is_rejected() {
        let mut rules = minimal();
        rules.reputation.friendly = rules.reputation.allied + 1;
        assert!(matches!(
            rules.validate(),
            Err(RuleError::ReputationThresholds)
        ));
    }

    #[test]
    fn staff_bill_sums_roles() {
        let staff = StaffCounts {
            scientists: 2,
            engineers: 1,
            agents: 3,
        };
        let costs = EconomyConfig::default().salaries;
        assert_eq!(costs.bill(&staff), 2 * 30 + 25 + 3 * 20);
        assert_eq!(staff.total(), 6);
    }

    #[test]
    fn faction_filter_limits_research() {
        let mut rules = minimal();
        rules.research[0].factions.push("guild".into());
        assert!(rules.research[0].available_to("guild"));
        assert!(!rules.research[0].available_to("cartel"));
        assert!(rules.research[1].available_to("cartel"));
    }
}
