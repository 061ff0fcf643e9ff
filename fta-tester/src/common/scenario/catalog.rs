use anyhow::{Result, ensure};
use fta_sim::{
    Campaign, CampaignError, CampaignSession, DataLoader, EmbeddedLoader, FactionEvent, GameEvent,
    ItemStock, RuleSet, SoldierId,
};

use super::TestScenario;
use crate::logic::{DEFAULT_SIM_DAYS, SimulationPlan, SimulationSummary};

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "Smoke Test",
            SimulationPlan::new(30).with_expectation(smoke_expectation),
        ),
        TestScenario::new(
            "research-race",
            "Faction Research Race",
            SimulationPlan::new(180).with_expectation(research_expectation),
        ),
        TestScenario::new(
            "market-cycle",
            "Faction Market Cycle",
            SimulationPlan::new(DEFAULT_SIM_DAYS).with_expectation(market_expectation),
        ),
        TestScenario::new(
            "intel-sweep",
            "Intel Project Sweep",
            SimulationPlan::new(120)
                .with_setup(intel_setup)
                .with_expectation(intel_expectation),
        ),
        TestScenario::new(
            "covert-odds",
            "Covert Operation Odds",
            SimulationPlan::new(60)
                .with_setup(covert_setup)
                .with_expectation(covert_expectation),
        ),
        TestScenario::new(
            "long-campaign",
            "Long Campaign Replay",
            SimulationPlan::new(720)
                .with_expectation(long_campaign_expectation)
                .with_expectation(replay_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    let campaign = &summary.final_state;
    ensure!(
        campaign.day == summary.metrics.days_run,
        "day counter {} does not match {} simulated days",
        campaign.day,
        summary.metrics.days_run
    );
    if summary.metrics.days_run > 0 {
        ensure!(!campaign.log.is_empty(), "a running campaign logged nothing");
    }
    Ok(())
}

fn research_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    if metrics.days_run > 0 {
        ensure!(metrics.research_started > 0, "no faction started research");
    }
    if metrics.days_run >= 120 {
        ensure!(
            metrics.research_completed > 0,
            "no research completed in {} days",
            metrics.days_run
        );
    }
    for faction in &summary.final_state.factions {
        for project in &faction.research {
            ensure!(
                !faction.discovered.contains(&project.research_id),
                "{} still researching discovered {}",
                faction.id,
                project.research_id
            );
        }
    }
    Ok(())
}

fn market_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    if metrics.days_run >= 10 {
        ensure!(
            metrics.items_restocked + metrics.items_sold > 0,
            "factions never traded"
        );
    }
    let log = &summary.final_state.log;
    for faction in &summary.final_state.factions {
        let incomes = log
            .for_faction(&faction.id)
            .filter(|(_, event)| matches!(event, FactionEvent::IncomeCollected { .. }))
            .count();
        ensure!(
            incomes == metrics.monthly_cycles as usize,
            "{} collected income {} times over {} months",
            faction.id,
            incomes,
            metrics.monthly_cycles
        );
    }
    Ok(())
}

fn intel_setup(campaign: &mut Campaign, rules: &RuleSet) -> Result<(), CampaignError> {
    campaign.start_intel_project(rules, "mole_hunt", &[SoldierId(1), SoldierId(2), SoldierId(5)])?;
    campaign.start_intel_project(rules, "ledger_trail", &[SoldierId(3), SoldierId(4)])?;
    Ok(())
}

fn intel_expectation(summary: &SimulationSummary) -> Result<()> {
    let campaign = &summary.final_state;
    if summary.metrics.days_run > 0 {
        ensure!(summary.metrics.intel_rolls > 0, "no intel rolls were made");
    }
    let rules = EmbeddedLoader.load_rules()?;
    for project in &campaign.intel_projects {
        if !project.completed {
            continue;
        }
        let rule = rules
            .intel_project(&project.rule_id)
            .ok_or_else(|| anyhow::anyhow!("unknown intel project {}", project.rule_id))?;
        for research in &rule.unlocks {
            ensure!(
                campaign.player.discovered.contains(research),
                "{} completed without revealing {research}",
                project.rule_id
            );
        }
        for agent in &project.agents {
            let idle = campaign.player.soldier(*agent).is_some_and(|s| s.is_idle());
            ensure!(idle, "agent {agent} still busy after {} completed", project.rule_id);
        }
    }
    Ok(())
}

fn covert_setup(campaign: &mut Campaign, rules: &RuleSet) -> Result<(), CampaignError> {
    let wiretap: ItemStock = [("listening_bug", 1), ("forged_papers", 2)]
        .into_iter()
        .collect();
    campaign.start_covert_operation(rules, "wiretap_exchange", &[SoldierId(6)], wiretap)?;
    let courier: ItemStock = [("ration_pack", 5)].into_iter().collect();
    campaign.start_covert_operation(rules, "courier_run", &[SoldierId(4)], courier)?;
    let sabotage: ItemStock = [("charge", 2), ("medkit", 3)].into_iter().collect();
    campaign.start_covert_operation(
        rules,
        "sabotage_foundry",
        &[SoldierId(3), SoldierId(5)],
        sabotage,
    )?;
    Ok(())
}

fn covert_expectation(summary: &SimulationSummary) -> Result<()> {
    let campaign = &summary.final_state;
    ensure!(
        campaign.covert_operations.len() == 3,
        "expected 3 operations, found {}",
        campaign.covert_operations.len()
    );
    let started = campaign
        .log
        .entries()
        .iter()
        .filter(|entry| matches!(entry.event, GameEvent::CovertStarted { .. }))
        .count();
    ensure!(started == 3, "logged {started} operation starts");
    ensure!(
        summary.metrics.covert_started == 3,
        "counted {} operation starts",
        summary.metrics.covert_started
    );

    for operation in &campaign.covert_operations {
        ensure!(
            (0.0..=100.0).contains(&operation.chance),
            "{} frozen chance {} out of range",
            operation.rule_id,
            operation.chance
        );
        ensure!(operation.days_total >= 1, "{} takes no time", operation.rule_id);
        if summary.metrics.days_run >= operation.days_total {
            ensure!(
                operation.is_finished(),
                "{} still running after {} days",
                operation.rule_id,
                summary.metrics.days_run
            );
        }
    }

    let resolved = campaign
        .covert_operations
        .iter()
        .filter(|op| op.is_finished())
        .count();
    let counted = summary.metrics.covert_successes + summary.metrics.covert_failures;
    ensure!(
        resolved == counted as usize,
        "{resolved} operations finished but {counted} resolutions reported"
    );
    Ok(())
}

fn long_campaign_expectation(summary: &SimulationSummary) -> Result<()> {
    let metrics = &summary.metrics;
    ensure!(
        metrics.monthly_cycles >= metrics.days_run / 31,
        "only {} monthly cycles in {} days",
        metrics.monthly_cycles,
        metrics.days_run
    );
    let completed: usize = summary
        .final_state
        .factions
        .iter()
        .map(|f| f.discovered.len())
        .sum();
    ensure!(
        completed == metrics.research_completed as usize,
        "factions hold {completed} discoveries but {} were reported",
        metrics.research_completed
    );
    Ok(())
}

/// Re-run the same seed from scratch and compare final digests.
fn replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let loader = EmbeddedLoader;
    let mut session =
        CampaignSession::new(loader.load_rules()?, &loader.load_start_profile()?, summary.seed)?;
    session.run_days(summary.metrics.days_run);
    let digest = session.campaign().digest()?;
    ensure!(
        digest == summary.digest,
        "replay of seed {} diverged: {:016x} vs {:016x}",
        summary.seed,
        digest,
        summary.digest
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{GameTester, TesterAssets};
    use std::sync::Arc;

    fn run(key: &str, days: Option<u32>) -> SimulationSummary {
        let scenario = find_catalog_scenario(key).expect("scenario exists");
        let plan = days.map_or(scenario.plan.clone(), |d| scenario.plan.clone().with_days(d));
        let tester = GameTester::new(Arc::new(TesterAssets::load_default().unwrap()), false);
        let summary = tester.run_plan(&plan, 2024).unwrap();
        assert!(summary.halt.is_none(), "{key}: {:?}", summary.halt);
        for expectation in &plan.expectations {
            expectation.evaluate(&summary).unwrap();
        }
        summary
    }

    #[test]
    fn keys_are_unique() {
        let scenarios = catalog_scenarios();
        let mut keys: Vec<&str> = scenarios.iter().map(|s| s.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), scenarios.len());
    }

    #[test]
    fn smoke_and_market_pass() {
        run("smoke", None);
        let market = run("market-cycle", None);
        assert!(market.metrics.monthly_cycles >= 2);
    }

    #[test]
    fn covert_operations_resolve_within_window() {
        let summary = run("covert-odds", None);
        assert!(
            summary
                .final_state
                .covert_operations
                .iter()
                .all(fta_sim::CovertOperation::is_finished)
        );
    }

    #[test]
    fn intel_and_research_pass_with_short_runs() {
        run("intel-sweep", Some(20));
        run("research-race", Some(20));
        run("long-campaign", Some(60));
    }
}
