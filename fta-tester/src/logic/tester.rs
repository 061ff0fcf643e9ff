use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::common::{FailureArtifact, artifacts_dir, write_failure_artifact};
use crate::logic::SeedInfo;
use crate::logic::game_tester::{CampaignMetrics, GameTester, SimulationPlan, SimulationSummary};

/// One iteration's outcome, kept for CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario_name: String,
    pub seed: u64,
    pub code: String,
    pub passed: bool,
    pub digest: String,
    pub metrics: CampaignMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub code: String,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub records: Vec<RunRecord>,
}

pub struct LogicTester {
    game_tester: GameTester,
    verbose: bool,
    artifacts_base: Option<String>,
}

impl LogicTester {
    pub const fn new(game_tester: GameTester, verbose: bool) -> Self {
        Self {
            game_tester,
            verbose,
            artifacts_base: None,
        }
    }

    /// Write a JSON artifact for every failing iteration under `base`.
    #[must_use]
    pub fn with_artifacts(mut self, base: impl Into<String>) -> Self {
        self.artifacts_base = Some(base.into());
        self
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[SeedInfo],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for seed in seeds {
            if self.verbose {
                println!(
                    "🧪 Testing scenario: {} ({} days, seed {} / {})",
                    scenario.name.bright_white(),
                    scenario.plan.days,
                    seed.seed,
                    seed.display_code()
                );
            }

            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: &SeedInfo,
        iterations: usize,
    ) -> ScenarioResult {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut records = Vec::new();

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed
                .seed
                .wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));

            let summary = match self.game_tester.run_plan(&scenario.plan, iteration_seed) {
                Ok(summary) => summary,
                Err(err) => {
                    failures.push(format!(
                        "Iteration {} (seed {}): could not start campaign: {err:#}",
                        i + 1,
                        iteration_seed
                    ));
                    continue;
                }
            };

            let outcome = evaluate(&scenario.plan, &summary);
            records.push(RunRecord {
                scenario_name: scenario.name.clone(),
                seed: summary.seed,
                code: summary.code.clone(),
                passed: outcome.is_none(),
                digest: format!("{:016x}", summary.digest),
                metrics: summary.metrics.clone(),
            });

            if let Some(err) = outcome {
                let artifact = self
                    .dump_artifact(scenario, &summary, &err)
                    .map(|path| format!(" [artifact {}]", path.display()))
                    .unwrap_or_default();
                let message = format!(
                    "Iteration {} (seed {}, code {}, day {}/{}): {}{}",
                    i + 1,
                    summary.seed,
                    summary.code,
                    summary.metrics.days_run,
                    summary.planned_days,
                    err,
                    artifact
                );
                if self.verbose {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                }
                failures.push(message);
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);

                if self.verbose {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) days:{} research:{} missions:{} intel:{}",
                        i + 1,
                        iterations,
                        summary.metrics.days_run,
                        summary.metrics.research_completed,
                        summary.metrics.missions_launched,
                        summary.metrics.intel_rolls
                    );
                }
            }
        }

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed: seed.seed,
            code: seed.display_code(),
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
            records,
        }
    }

    fn dump_artifact(
        &self,
        scenario: &TestScenario,
        summary: &SimulationSummary,
        error: &str,
    ) -> Option<PathBuf> {
        let base = self.artifacts_base.as_deref()?;
        let dir = artifacts_dir(base, &scenario.key, summary.seed);
        let artifact = FailureArtifact {
            scenario: &scenario.name,
            seed: summary.seed,
            code: &summary.code,
            day: summary.metrics.days_run,
            error,
            metrics: &summary.metrics,
            campaign: &summary.final_state,
        };
        match write_failure_artifact(&dir, &artifact) {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!("could not write failure artifact to {dir}: {err:#}");
                None
            }
        }
    }
}

/// First reason the run failed, if any.
fn evaluate(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    if let Some(halt) = &summary.halt {
        return Some(halt.to_string());
    }
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| err.to_string())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis_vec = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis_vec
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}
