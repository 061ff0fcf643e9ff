pub mod catalog;

use crate::logic::SimulationPlan;
use catalog::{catalog_scenarios, find_catalog_scenario};

/// A named plan the logic tester can run across seeds.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: String,
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" => "smoke",
        "research-race" | "research" => "research-race",
        "market-cycle" | "market" => "market-cycle",
        "intel-sweep" | "intel" => "intel-sweep",
        "covert-odds" | "covert" => "covert-odds",
        "long-campaign" | "long" => "long-campaign",
        _ => return None,
    };
    find_catalog_scenario(key)
}

pub fn list_scenarios() -> Vec<(String, String)> {
    catalog_scenarios()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.name))
        .collect()
}
