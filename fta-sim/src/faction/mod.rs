//! Autonomous factions: their state and the periodic `think` loop.
//!
//! A faction runs three cadences. Research advances daily, the item
//! economy (production, restock, selling) runs every ten days and the
//! month start handles income, staff, power, missions and diplomacy.
//! Every change to funds is reported as a [`FactionEvent`] carrying the
//! exact delta, so a day's events always reconcile with the balance.
mod economy;
mod missions;
pub mod research;

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::calendar::{GameDate, ThinkPeriod};
use crate::events::FactionEvent;
use crate::reputation::{ReputationLevel, ReputationTable};
use crate::rules::{FactionRule, RuleSet, StaffCounts};
use crate::stock::ItemStock;
pub use research::FactionalResearch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub reputation: i32,
    pub reputation_level: ReputationLevel,
    pub power: i32,
    pub vigilance: i32,
    pub funds: i64,
    pub staff: StaffCounts,
    pub stock: ItemStock,
    pub research: Vec<FactionalResearch>,
    pub discovered: BTreeSet<String>,
    pub discovered_this_month: Vec<String>,
    pub treaties: BTreeSet<String>,
    pub missions_this_month: u32,
}

impl Faction {
    #[must_use]
    pub fn from_rule(rule: &FactionRule, table: &ReputationTable) -> Self {
        Self {
            id: rule.id.clone(),
            name: rule.name.clone(),
            reputation: rule.starting_reputation,
            reputation_level: table.level_for(rule.starting_reputation),
            power: rule.starting_power.clamp(0, rule.power_cap.max(0)),
            vigilance: rule.starting_vigilance.max(0),
            funds: rule.starting_funds.max(0),
            staff: rule.starting_staff,
            stock: rule.starting_stock.clone(),
            research: Vec::new(),
            discovered: BTreeSet::new(),
            discovered_this_month: Vec::new(),
            treaties: BTreeSet::new(),
            missions_this_month: 0,
        }
    }

    /// Run the logic due for `period`.
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        rules: &RuleSet,
        rule: &FactionRule,
        period: ThinkPeriod,
        date: GameDate,
        rng: &mut R,
    ) -> Vec<FactionEvent> {
        debug!("{} thinks ({}) on {}", self.id, period.key(), date);
        match period {
            ThinkPeriod::Daily => self.handle_research(rules, rule),
            ThinkPeriod::TenDay => {
                let mut events = self.handle_production(rule);
                events.extend(self.handle_restock(rules, rule));
                events.extend(self.handle_selling(rules, rule));
                events
            }
            ThinkPeriod::Monthly => {
                self.discovered_this_month.clear();
                self.missions_this_month = 0;
                let mut events = self.collect_income(rule);
                events.extend(self.manage_staff(&rules.economy, rule));
                events.extend(self.manage_power(rule));
                events.extend(self.faction_mission_generator(rule, rng));
                events.extend(self.update_reputation(&rules.reputation, rule));
                events
            }
        }
    }

    /// Monthly drift toward neutral, then level and treaty bookkeeping.
    pub fn update_reputation(
        &mut self,
        table: &ReputationTable,
        rule: &FactionRule,
    ) -> Vec<FactionEvent> {
        self.reputation = table.drift(self.reputation);
        self.refresh_standing(table, rule)
    }

    /// Shift the reputation score, as covert operations do.
    pub fn adjust_reputation(
        &mut self,
        delta: i32,
        table: &ReputationTable,
        rule: &FactionRule,
    ) -> Vec<FactionEvent> {
        self.reputation = self.reputation.saturating_add(delta);
        self.refresh_standing(table, rule)
    }

    /// Vigilance never drops below zero.
    pub fn raise_vigilance(&mut self, delta: i32) {
        self.vigilance = self.vigilance.saturating_add(delta).max(0);
    }

    fn refresh_standing(&mut self, table: &ReputationTable, rule: &FactionRule) -> Vec<FactionEvent> {
        let mut events = Vec::new();
        let level = table.level_for(self.reputation);
        if level != self.reputation_level {
            info!(
                "{} reputation {} -> {}",
                self.id,
                self.reputation_level.key(),
                level.key()
            );
            events.push(FactionEvent::ReputationChanged {
                from: self.reputation_level,
                to: level,
            });
            self.reputation_level = level;
        }
        for treaty in &rule.treaties {
            if treaty.min_level <= level {
                if self.treaties.insert(treaty.id.clone()) {
                    info!("{} signed treaty {}", self.id, treaty.id);
                    events.push(FactionEvent::TreatySigned {
                        treaty: treaty.id.clone(),
                    });
                }
            } else if self.treaties.remove(&treaty.id) {
                info!("{} revoked treaty {}", self.id, treaty.id);
                events.push(FactionEvent::TreatyRevoked {
                    treaty: treaty.id.clone(),
                });
            }
        }
        events
    }

    /// Funds and power granted each month by signed treaties.
    fn treaty_bonus(&self, rule: &FactionRule) -> (i64, i32) {
        rule.treaties
            .iter()
            .filter(|treaty| self.treaties.contains(&treaty.id))
            .fold((0, 0), |(funds, power), treaty| {
                (
                    funds.saturating_add(treaty.monthly_funds),
                    power.saturating_add(treaty.monthly_power),
                )
            })
    }

    fn has_discovered_all(&self, research: &[String]) -> bool {
        research.iter().all(|id| self.discovered.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::net_funds_delta;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rules() -> RuleSet {
        RuleSet::from_json(
            r#"{
                "research": [
                    {"id": "radio", "name": "Radio", "cost": 2, "points": 10, "funding": 30}
                ],
                "items": [
                    {"id": "rifle", "name": "Rifle", "buy_price": 10, "sell_price": 6}
                ],
                "factions": [
                    {"id": "guild", "name": "Guild",
                     "starting_funds": 1000, "starting_reputation": 90,
                     "starting_staff": {"scientists": 2, "engineers": 1},
                     "monthly_income": 400, "funds_reserve": 50,
                     "restock": {"rifle": 4},
                     "treaties": [{"id": "trade_pact", "min_level": "friendly", "monthly_funds": 100}],
                     "missions": [{"id": "raid", "power_cost": 0, "chance": 100}]}
                ],
                "reputation": {"monthly_drift": 5}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn from_rule_seeds_state() {
        let rules = rules();
        let faction = Faction::from_rule(&rules.factions[0], &rules.reputation);
        assert_eq!(faction.funds, 1000);
        assert_eq!(faction.reputation_level, ReputationLevel::Neutral);
        assert_eq!(faction.staff.scientists, 2);
        assert!(faction.research.is_empty());
    }

    #[test]
    fn every_period_reconciles_funds() {
        let rules = rules();
        let rule = &rules.factions[0];
        let mut faction = Faction::from_rule(rule, &rules.reputation);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for period in [ThinkPeriod::Daily, ThinkPeriod::TenDay, ThinkPeriod::Monthly] {
            let before = faction.funds;
            let events = faction.think(&rules, rule, period, GameDate::default(), &mut rng);
            assert_eq!(faction.funds - before, net_funds_delta(&events), "{period:?}");
            assert!(faction.funds >= 0);
        }
    }

    #[test]
    fn monthly_think_resets_counters() {
        let rules = rules();
        let rule = &rules.factions[0];
        let mut faction = Faction::from_rule(rule, &rules.reputation);
        faction.discovered_this_month.push("radio".into());
        faction.missions_this_month = 3;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let events = faction.think(&rules, rule, ThinkPeriod::Monthly, GameDate::default(), &mut rng);
        assert!(faction.discovered_this_month.is_empty());
        assert_eq!(faction.missions_this_month, 1);
        assert!(
            events
                .iter()
                .any(|event| matches!(event, FactionEvent::MissionLaunched { .. }))
        );
    }

    #[test]
    fn treaties_follow_reputation_level() {
        let rules = rules();
        let rule = &rules.factions[0];
        let mut faction = Faction::from_rule(rule, &rules.reputation);

        let events = faction.adjust_reputation(20, &rules.reputation, rule);
        assert_eq!(faction.reputation_level, ReputationLevel::Friendly);
        assert!(events.contains(&FactionEvent::TreatySigned {
            treaty: "trade_pact".into()
        }));
        assert_eq!(faction.treaty_bonus(rule), (100, 0));

        let events = faction.update_reputation(&rules.reputation, rule);
        assert_eq!(faction.reputation, 105);
        assert!(events.is_empty());

        let events = faction.adjust_reputation(-50, &rules.reputation, rule);
        assert!(events.contains(&FactionEvent::TreatyRevoked {
            treaty: "trade_pact".into()
        }));
        assert!(faction.treaties.is_empty());
    }

    #[test]
    fn vigilance_is_floored_at_zero() {
        let rules = rules();
        let mut faction = Faction::from_rule(&rules.factions[0], &rules.reputation);
        faction.raise_vigilance(15);
        assert_eq!(faction.vigilance, 15);
        faction.raise_vigilance(-40);
        assert_eq!(faction.vigilance, 0);
    }
}
