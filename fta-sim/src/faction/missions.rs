use log::info;
use rand::Rng;

use super::Faction;
use crate::events::FactionEvent;
use crate::rules::{FactionMissionRule, FactionRule};

impl Faction {
    fn mission_eligible(&self, mission: &FactionMissionRule) -> bool {
        self.has_discovered_all(&mission.requires_research)
            && mission
                .max_reputation
                .is_none_or(|max| self.reputation_level <= max)
            && mission
                .min_vigilance
                .is_none_or(|min| self.vigilance >= min)
            && self.power >= mission.power_cost
    }

    /// Launch missions at month start. Only eligible missions roll, so
    /// adding an ineligible mission to a rule never shifts later draws.
    pub fn faction_mission_generator<R: Rng + ?Sized>(
        &mut self,
        rule: &FactionRule,
        rng: &mut R,
    ) -> Vec<FactionEvent> {
        let mut events = Vec::new();
        for mission in &rule.missions {
            if self.missions_this_month >= rule.max_missions_per_month {
                break;
            }
            if !self.mission_eligible(mission) {
                continue;
            }
            if rng.gen_range(0..100_u8) >= mission.chance {
                continue;
            }
            self.power -= mission.power_cost;
            self.missions_this_month += 1;
            info!(
                "{} launched mission {} (power {} left)",
                self.id, mission.id, self.power
            );
            events.push(FactionEvent::MissionLaunched {
                mission: mission.id.clone(),
                power_cost: mission.power_cost,
            });
        }
        events
    }
}
