use anyhow::Result;
use colored::Colorize;
use fta_sim::{
    Campaign, CampaignError, CampaignSession, DataLoader, DayReport, EmbeddedLoader, EventLog,
    FactionEvent, GameEvent, IntelOutcome, RuleSet, StartProfile, ThinkPeriod, encode_code,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::invariants::{DaySnapshot, InvariantViolation, check_day};

pub const DEFAULT_SIM_DAYS: u32 = 90;

/// Content every run starts from.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    pub rules: RuleSet,
    pub profile: StartProfile,
}

impl TesterAssets {
    /// Load the builtin content pack.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded content does not validate.
    pub fn load_default() -> Result<Self> {
        let loader = EmbeddedLoader;
        Ok(Self {
            rules: loader.load_rules()?,
            profile: loader.load_start_profile()?,
        })
    }
}

/// Player orders issued before the first tick.
pub type SimulationSetup = fn(&mut Campaign, &RuleSet) -> Result<(), CampaignError>;

type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

/// Assertion hook run after a simulation completes.
#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub days: u32,
    pub setup: Option<SimulationSetup>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(days: u32) -> Self {
        Self {
            days,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: SimulationSetup) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Counters gathered from the day reports of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMetrics {
    pub days_run: u32,
    pub events: usize,
    pub monthly_cycles: u32,
    pub research_started: u32,
    pub research_completed: u32,
    pub items_restocked: u64,
    pub items_sold: u64,
    pub items_manufactured: u64,
    pub missions_launched: u32,
    pub staff_dismissed: u32,
    pub treaties_signed: u32,
    pub intel_rolls: u32,
    pub intel_stages: u32,
    pub intel_completed: u32,
    pub intel_unfunded: u32,
    pub covert_started: u32,
    pub covert_successes: u32,
    pub covert_failures: u32,
    pub player_discoveries: u32,
}

impl CampaignMetrics {
    pub fn record(&mut self, report: &DayReport) {
        self.days_run = report.day;
        self.events += report.events.len();
        if report.periods.contains(&ThinkPeriod::Monthly) {
            self.monthly_cycles += 1;
        }
        for event in &report.events {
            self.record_event(event);
        }
    }

    /// Count player orders, which are logged when issued rather than reported
    /// by a tick.
    pub fn record_orders(&mut self, log: &EventLog) {
        self.covert_started += u32::try_from(
            log.entries()
                .iter()
                .filter(|entry| matches!(entry.event, GameEvent::CovertStarted { .. }))
                .count(),
        )
        .unwrap_or(u32::MAX);
    }

    fn record_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Faction { event, .. } => match event {
                FactionEvent::ResearchStarted { .. } => self.research_started += 1,
                FactionEvent::ResearchCompleted { .. } => self.research_completed += 1,
                FactionEvent::ItemsRestocked { quantity, .. } => {
                    self.items_restocked += u64::from(*quantity);
                }
                FactionEvent::ItemsSold { quantity, .. } => self.items_sold += u64::from(*quantity),
                FactionEvent::ItemsManufactured { quantity, .. } => {
                    self.items_manufactured += u64::from(*quantity);
                }
                FactionEvent::MissionLaunched { .. } => self.missions_launched += 1,
                FactionEvent::StaffDismissed { count, .. } => self.staff_dismissed += count,
                FactionEvent::TreatySigned { .. } => self.treaties_signed += 1,
                _ => {}
            },
            GameEvent::Intel { outcome, .. } => match outcome {
                IntelOutcome::Unfunded => self.intel_unfunded += 1,
                IntelOutcome::StageCompleted { .. } => {
                    self.intel_rolls += 1;
                    self.intel_stages += 1;
                }
                IntelOutcome::ProjectCompleted => {
                    self.intel_rolls += 1;
                    self.intel_stages += 1;
                    self.intel_completed += 1;
                }
                IntelOutcome::Failed | IntelOutcome::Progressed { .. } => self.intel_rolls += 1,
                IntelOutcome::Idle | IntelOutcome::AlreadyComplete => {}
            },
            GameEvent::CovertStarted { .. } => {}
            GameEvent::CovertResolved { success, .. } => {
                if *success {
                    self.covert_successes += 1;
                } else {
                    self.covert_failures += 1;
                }
            }
            GameEvent::ResearchDiscovered { .. } => self.player_discoveries += 1,
        }
    }
}

/// Why a run stopped before its planned length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunHalt {
    Setup(String),
    Invariant { day: u32, violation: InvariantViolation },
}

impl std::fmt::Display for RunHalt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(err) => write!(f, "setup failed: {err}"),
            Self::Invariant { day, violation } => write!(f, "day {day}: {violation}"),
        }
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub code: String,
    pub planned_days: u32,
    pub metrics: CampaignMetrics,
    pub final_state: Campaign,
    pub halt: Option<RunHalt>,
    pub digest: u64,
}

#[derive(Debug, Clone)]
pub struct GameTester {
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    /// Run `plan` against a fresh campaign for `seed`, checking invariants
    /// after every day.
    ///
    /// # Errors
    ///
    /// Returns an error only if the start profile does not fit the rules.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> Result<SimulationSummary> {
        let mut session =
            CampaignSession::new(self.assets.rules.clone(), &self.assets.profile, seed)?;
        let mut metrics = CampaignMetrics::default();
        let mut halt = None;

        if let Some(setup) = plan.setup {
            let applied = session.with_campaign_mut(|campaign, rules| setup(campaign, rules));
            if let Err(err) = applied {
                halt = Some(RunHalt::Setup(err.to_string()));
            }
            metrics.record_orders(&session.campaign().log);
        }

        if halt.is_none() {
            for _ in 0..plan.days {
                let before = DaySnapshot::capture(session.campaign());
                let report = session.tick_day();
                metrics.record(&report);
                if let Err(violation) =
                    check_day(session.rules(), &before, session.campaign(), &report)
                {
                    halt = Some(RunHalt::Invariant {
                        day: report.day,
                        violation,
                    });
                    break;
                }
            }
        }

        if self.verbose {
            let status = halt
                .as_ref()
                .map_or_else(|| "ok".green(), |h| h.to_string().red());
            println!(
                "    seed {} ({}) ran {} days, {} events: {}",
                seed,
                encode_code(seed),
                metrics.days_run,
                metrics.events,
                status
            );
        }

        let final_state = session.into_campaign();
        let digest = final_state.digest()?;
        Ok(SimulationSummary {
            seed,
            code: encode_code(seed),
            planned_days: plan.days,
            metrics,
            final_state,
            halt,
            digest,
        })
    }
}
