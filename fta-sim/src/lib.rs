//! FtA Faction Simulation
//!
//! Platform-agnostic core of the FtA diplomacy layer: autonomous factions
//! with their own research, staff, item market and power economy, plus the
//! player's intel projects and covert operations. The crate carries no UI
//! or platform dependencies; content arrives as JSON rule packs.

pub mod calendar;
pub mod campaign;
pub mod constants;
pub mod covert;
pub mod effort;
pub mod events;
pub mod faction;
pub mod intel;
pub mod numbers;
pub mod reputation;
pub mod rng;
pub mod roster;
pub mod rules;
pub mod seed;
pub mod stock;

// Re-export commonly used types
pub use calendar::{CalendarError, GameDate, ThinkPeriod, ThinkPeriods, think_periods};
pub use campaign::{
    Campaign, CampaignController, CampaignError, CampaignSession, DayReport, PlayerState,
};
pub use covert::{
    CovertOperation, CovertOperationRule, Difficulty, ItemBonus, OddsBreakdown, OperationOdds,
    operation_odds,
};
pub use effort::{member_effort, team_effort};
pub use events::{
    DiscoverySource, EventLog, FactionEvent, GameEvent, LoggedEvent, net_funds_delta,
};
pub use faction::research::{candidates, priority_score, reallocate};
pub use faction::{Faction, FactionalResearch};
pub use intel::{
    IntelOutcome, IntelProject, IntelProjectRule, IntelRoll, IntelStageRule, get_step_progress,
    stage_chance,
};
pub use reputation::{ReputationLevel, ReputationTable};
pub use rng::{RngBundle, RngCheckpoint};
pub use roster::{Assignment, Soldier, SoldierId, SoldierStats, StatKind, StatWeights};
pub use rules::{
    EconomyConfig, FactionMissionRule, FactionRule, ItemRule, ProductionRule, ResearchRule,
    RuleError, RuleSet, StaffCosts, StaffCounts, StaffRole, StartProfile, TreatyRule,
};
pub use seed::{code_from_entropy, decode_code, encode_code};
pub use stock::ItemStock;

/// Trait for abstracting content loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the rule set campaigns are played under
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded or fail validation.
    fn load_rules(&self) -> Result<RuleSet, Self::Error>;

    /// Load the player's starting position
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be loaded or parsed.
    fn load_start_profile(&self) -> Result<StartProfile, Self::Error>;
}

/// Loader serving the content pack compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl DataLoader for EmbeddedLoader {
    type Error = RuleError;

    fn load_rules(&self) -> Result<RuleSet, Self::Error> {
        RuleSet::builtin()
    }

    fn load_start_profile(&self) -> Result<StartProfile, Self::Error> {
        StartProfile::builtin()
    }
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait CampaignStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save campaign state
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be saved.
    fn save_campaign(&self, save_name: &str, campaign: &Campaign) -> Result<(), Self::Error>;

    /// Load campaign state
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be loaded.
    fn load_campaign(&self, save_name: &str) -> Result<Option<Campaign>, Self::Error>;

    /// Delete saved campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main engine for creating, saving and resuming campaigns
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: CampaignStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: CampaignStorage,
{
    /// Create a new engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Start a fresh campaign session for `seed`
    ///
    /// # Errors
    ///
    /// Returns an error if content cannot be loaded or the start profile
    /// does not fit the rules.
    pub fn new_session(&self, seed: u64) -> Result<CampaignSession, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let rules = self.data_loader.load_rules().map_err(Into::into)?;
        let profile = self.data_loader.load_start_profile().map_err(Into::into)?;
        Ok(CampaignSession::new(rules, &profile, seed)?)
    }

    /// Start a fresh campaign and return its state
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be created.
    pub fn new_campaign(&self, seed: u64) -> Result<Campaign, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        self.new_session(seed).map(CampaignSession::into_campaign)
    }

    /// Save a campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the campaign cannot be saved.
    pub fn save_campaign(&self, save_name: &str, campaign: &Campaign) -> Result<(), S::Error> {
        self.storage.save_campaign(save_name, campaign)
    }

    /// Load a campaign and rebuild its session
    ///
    /// # Errors
    ///
    /// Returns an error if the save or the rules cannot be loaded.
    pub fn load_campaign(&self, save_name: &str) -> Result<Option<CampaignSession>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        if let Some(campaign) = self.storage.load_campaign(save_name).map_err(Into::into)? {
            // Resume under freshly loaded rules
            let rules = self.data_loader.load_rules().map_err(Into::into)?;
            Ok(Some(CampaignSession::from_campaign(rules, campaign)))
        } else {
            Ok(None)
        }
    }

    /// Delete a saved campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_campaign(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStorage {
        saves: Rc<RefCell<HashMap<String, Campaign>>>,
    }

    impl CampaignStorage for MemoryStorage {
        type Error = Infallible;

        fn save_campaign(&self, save_name: &str, campaign: &Campaign) -> Result<(), Self::Error> {
            self.saves
                .borrow_mut()
                .insert(save_name.to_string(), campaign.clone());
            Ok(())
        }

        fn load_campaign(&self, save_name: &str) -> Result<Option<Campaign>, Self::Error> {
            Ok(self.saves.borrow().get(save_name).cloned())
        }

        fn delete_save(&self, save_name: &str) -> Result<(), Self::Error> {
            self.saves.borrow_mut().remove(save_name);
            Ok(())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_campaign() {
        let engine = GameEngine::new(EmbeddedLoader, MemoryStorage::default());
        let mut session = engine.new_session(0xABCD).unwrap();
        session.run_days(12);
        let snapshot = session.campaign().clone();
        engine.save_campaign("slot-one", &snapshot).unwrap();

        let loaded = engine.load_campaign("slot-one").unwrap().expect("save exists");
        assert_eq!(loaded.campaign().day, 12);
        assert_eq!(loaded.campaign().digest().unwrap(), snapshot.digest().unwrap());
        assert!(engine.load_campaign("missing-slot").unwrap().is_none());

        engine.delete_campaign("slot-one").unwrap();
        assert!(engine.load_campaign("slot-one").unwrap().is_none());
    }

    #[test]
    fn new_campaign_seeds_every_faction() {
        let engine = GameEngine::new(EmbeddedLoader, MemoryStorage::default());
        let campaign = engine.new_campaign(7).unwrap();
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(campaign.factions.len(), rules.factions.len());
        assert_eq!(campaign.seed, 7);
        assert!(campaign.log.is_empty());
    }
}
