//! Events emitted by the simulation and the campaign event log.
use serde::{Deserialize, Serialize};

use crate::calendar::GameDate;
use crate::constants::{
    LOG_COVERT_FAILURE, LOG_COVERT_STARTED, LOG_COVERT_SUCCESS, LOG_INCOME_COLLECTED,
    LOG_INTEL_COMPLETE, LOG_INTEL_FAILED, LOG_INTEL_PROGRESS, LOG_INTEL_STAGE,
    LOG_INTEL_UNFUNDED, LOG_ITEMS_MANUFACTURED, LOG_ITEMS_RESTOCKED, LOG_ITEMS_SOLD,
    LOG_MISSION_LAUNCHED, LOG_POWER_CHANGED, LOG_REPUTATION_CHANGED, LOG_RESEARCH_COMPLETED,
    LOG_RESEARCH_DISCOVERED, LOG_RESEARCH_STARTED, LOG_SALARIES_PAID, LOG_STAFF_DISMISSED,
    LOG_STAFF_HIRED, LOG_TREATY_REVOKED, LOG_TREATY_SIGNED,
};
use crate::intel::IntelOutcome;
use crate::reputation::ReputationLevel;
use crate::rules::StaffRole;

/// Something a faction did during `think`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FactionEvent {
    ResearchStarted { research: String, funding: i64 },
    ResearchCompleted { research: String },
    ItemsManufactured { item: String, quantity: u32 },
    ItemsRestocked { item: String, quantity: u32, spent: i64 },
    ItemsSold { item: String, quantity: u32, earned: i64 },
    IncomeCollected { amount: i64 },
    SalariesPaid { amount: i64 },
    StaffHired { role: StaffRole, count: u32, cost: i64 },
    StaffDismissed { role: StaffRole, count: u32 },
    PowerChanged { before: i32, after: i32, funds_spent: i64 },
    MissionLaunched { mission: String, power_cost: i32 },
    ReputationChanged { from: ReputationLevel, to: ReputationLevel },
    TreatySigned { treaty: String },
    TreatyRevoked { treaty: String },
}

impl FactionEvent {
    /// Signed change to the faction's funds caused by this event.
    #[must_use]
    pub const fn funds_delta(&self) -> i64 {
        match self {
            Self::ResearchStarted { funding, .. } => -*funding,
            Self::ItemsRestocked { spent, .. } => -*spent,
            Self::ItemsSold { earned, .. } => *earned,
            Self::IncomeCollected { amount } => *amount,
            Self::SalariesPaid { amount } => -*amount,
            Self::StaffHired { cost, .. } => -*cost,
            Self::PowerChanged { funds_spent, .. } => -*funds_spent,
            Self::ResearchCompleted { .. }
            | Self::ItemsManufactured { .. }
            | Self::StaffDismissed { .. }
            | Self::MissionLaunched { .. }
            | Self::ReputationChanged { .. }
            | Self::TreatySigned { .. }
            | Self::TreatyRevoked { .. } => 0,
        }
    }

    #[must_use]
    pub const fn log_key(&self) -> &'static str {
        match self {
            Self::ResearchStarted { .. } => LOG_RESEARCH_STARTED,
            Self::ResearchCompleted { .. } => LOG_RESEARCH_COMPLETED,
            Self::ItemsManufactured { .. } => LOG_ITEMS_MANUFACTURED,
            Self::ItemsRestocked { .. } => LOG_ITEMS_RESTOCKED,
            Self::ItemsSold { .. } => LOG_ITEMS_SOLD,
            Self::IncomeCollected { .. } => LOG_INCOME_COLLECTED,
            Self::SalariesPaid { .. } => LOG_SALARIES_PAID,
            Self::StaffHired { .. } => LOG_STAFF_HIRED,
            Self::StaffDismissed { .. } => LOG_STAFF_DISMISSED,
            Self::PowerChanged { .. } => LOG_POWER_CHANGED,
            Self::MissionLaunched { .. } => LOG_MISSION_LAUNCHED,
            Self::ReputationChanged { .. } => LOG_REPUTATION_CHANGED,
            Self::TreatySigned { .. } => LOG_TREATY_SIGNED,
            Self::TreatyRevoked { .. } => LOG_TREATY_REVOKED,
        }
    }
}

/// Sum of the funds deltas carried by a batch of faction events.
#[must_use]
pub fn net_funds_delta<'a, I>(events: I) -> i64
where
    I: IntoIterator<Item = &'a FactionEvent>,
{
    events.into_iter().map(FactionEvent::funds_delta).sum()
}

/// Where the player learned a research topic from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoverySource {
    IntelProject,
    CovertOperation,
}

/// Campaign-level event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    Faction {
        faction: String,
        event: FactionEvent,
    },
    Intel {
        project: usize,
        rule: String,
        outcome: IntelOutcome,
        cost_paid: i64,
    },
    CovertStarted {
        operation: usize,
        rule: String,
        chance: f64,
        days: u32,
    },
    CovertResolved {
        operation: usize,
        rule: String,
        success: bool,
    },
    ResearchDiscovered {
        research: String,
        source: DiscoverySource,
    },
}

impl GameEvent {
    #[must_use]
    pub fn log_key(&self) -> &'static str {
        match self {
            Self::Faction { event, .. } => event.log_key(),
            Self::Intel { outcome, .. } => match outcome {
                IntelOutcome::Unfunded => LOG_INTEL_UNFUNDED,
                IntelOutcome::Failed => LOG_INTEL_FAILED,
                IntelOutcome::StageCompleted { .. } => LOG_INTEL_STAGE,
                IntelOutcome::ProjectCompleted => LOG_INTEL_COMPLETE,
                IntelOutcome::Progressed { .. }
                | IntelOutcome::Idle
                | IntelOutcome::AlreadyComplete => LOG_INTEL_PROGRESS,
            },
            Self::CovertStarted { .. } => LOG_COVERT_STARTED,
            Self::CovertResolved { success, .. } => {
                if *success {
                    LOG_COVERT_SUCCESS
                } else {
                    LOG_COVERT_FAILURE
                }
            }
            Self::ResearchDiscovered { .. } => LOG_RESEARCH_DISCOVERED,
        }
    }

    /// Faction id and inner event when this is a faction event.
    #[must_use]
    pub fn as_faction(&self) -> Option<(&str, &FactionEvent)> {
        match self {
            Self::Faction { faction, event } => Some((faction.as_str(), event)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub date: GameDate,
    pub event: GameEvent,
}

/// Append-only history of campaign events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn push(&mut self, date: GameDate, event: GameEvent) {
        self.entries.push(LoggedEvent { date, event });
    }

    pub fn extend(&mut self, date: GameDate, events: impl IntoIterator<Item = GameEvent>) {
        self.entries
            .extend(events.into_iter().map(|event| LoggedEvent { date, event }));
    }

    #[must_use]
    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    /// Faction events for one faction, oldest first.
    pub fn for_faction<'a>(
        &'a self,
        faction_id: &'a str,
    ) -> impl Iterator<Item = (&'a GameDate, &'a FactionEvent)> + 'a {
        self.entries.iter().filter_map(move |entry| {
            entry
                .event
                .as_faction()
                .filter(|(id, _)| *id == faction_id)
                .map(|(_, event)| (&entry.date, event))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn funds_deltas_carry_sign() {
        let events = [
            FactionEvent::IncomeCollected { amount: 500 },
            FactionEvent::SalariesPaid { amount: 120 },
            FactionEvent::ResearchStarted {
                research: "radio".into(),
                funding: 80,
            },
            FactionEvent::ItemsSold {
                item: "rifle".into(),
                quantity: 2,
                earned: 12,
            },
            FactionEvent::TreatySigned {
                treaty: "trade".into(),
            },
        ];
        assert_eq!(net_funds_delta(&events), 500 - 120 - 80 + 12);
    }

    #[test]
    fn log_filters_by_faction() {
        let mut log = EventLog::default();
        let date = GameDate::default();
        log.push(
            date,
            GameEvent::Faction {
                faction: "guild".into(),
                event: FactionEvent::IncomeCollected { amount: 1 },
            },
        );
        log.push(
            date,
            GameEvent::Faction {
                faction: "cartel".into(),
                event: FactionEvent::IncomeCollected { amount: 2 },
            },
        );
        log.push(
            date,
            GameEvent::ResearchDiscovered {
                research: "radio".into(),
                source: DiscoverySource::IntelProject,
            },
        );
        let guild: Vec<_> = log.for_faction("guild").collect();
        assert_eq!(guild.len(), 1);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn game_events_serialize_with_kind_tag() {
        let event = GameEvent::CovertResolved {
            operation: 0,
            rule: "sabotage".into(),
            success: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "covert_resolved");
        assert_eq!(event.log_key(), "log.covert.success");
    }
}
