pub mod game_tester;
pub mod invariants;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use game_tester::{
    CampaignMetrics, DEFAULT_SIM_DAYS, GameTester, SimulationPlan, SimulationSummary, TesterAssets,
};
pub use seeds::{SeedInfo, resolve_seed_inputs};
pub use tester::*;
