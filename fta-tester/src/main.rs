mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use common::scenario::{TestScenario, get_scenario, list_scenarios};
use common::split_csv;
use logic::{GameTester, LogicTester, SeedInfo, TesterAssets, resolve_seed_inputs};

#[derive(Debug, Parser)]
#[command(name = "fta-tester", version)]
#[command(about = "Automated campaign testing for the FtA faction simulation")]
struct Args {
    /// Scenarios to run (comma-separated, or `all`)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated integers or campaign codes like CIPHER-42)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 3)]
    iterations: usize,

    /// Override the number of simulated days for every scenario
    #[arg(long)]
    days: Option<u32>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for failure artifacts
    #[arg(long, default_value = "target/test-artifacts")]
    artifacts_dir: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenario_names = expand_scenarios(&args.scenarios);
    let seed_tokens = split_csv(&args.seeds);
    let seeds = resolve_seed_inputs(&seed_tokens)?;
    let assets = Arc::new(TesterAssets::load_default().context("loading builtin content")?);
    let game_tester = GameTester::new(assets, args.verbose);

    let results = run_logic_scenarios(&args, &scenario_names, &seeds, game_tester);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🕵️ FtA Faction Simulation Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for (key, _) in list_scenarios() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn resolve_scenario(args: &Args, name: &str) -> Option<TestScenario> {
    let mut scenario = get_scenario(name)?;
    if let Some(days) = args.days {
        scenario.plan = scenario.plan.with_days(days);
    }
    Some(scenario)
}

fn run_logic_scenarios(
    args: &Args,
    scenarios: &[String],
    seeds: &[SeedInfo],
    game_tester: GameTester,
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester =
        LogicTester::new(game_tester, args.verbose).with_artifacts(args.artifacts_dir.clone());
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = resolve_scenario(args, scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[logic::ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# FtA Scenario Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, results)?,
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            days: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
            artifacts_dir: std::env::temp_dir()
                .join("fta-tester-artifacts")
                .to_string_lossy()
                .to_string(),
        }
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "fta-{}-{name}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn tester() -> GameTester {
        GameTester::new(Arc::new(TesterAssets::load_default().unwrap()), false)
    }

    fn sample_result(passed: bool) -> logic::ScenarioResult {
        logic::ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1,
            code: "CIPHER-01".to_string(),
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: Vec::new(),
            average_duration: Duration::from_millis(3),
            performance_data: vec![Duration::from_millis(3)],
            records: Vec::new(),
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded[0], "smoke");
        assert_eq!(expanded.len(), list_scenarios().len());
        assert!(expanded.contains(&"covert-odds".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("market,smoke");
        assert_eq!(expanded, vec!["market".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn days_flag_overrides_plan_length() {
        let args = Args {
            days: Some(7),
            ..base_args()
        };
        let scenario = resolve_scenario(&args, "long").unwrap();
        assert_eq!(scenario.plan.days, 7);
        assert!(resolve_scenario(&args, "nope").is_none());
    }

    #[test]
    fn run_logic_scenarios_runs_each_seed() {
        let args = Args {
            days: Some(5),
            ..base_args()
        };
        let seeds = vec![SeedInfo::from_numeric(1), SeedInfo::from_numeric(2)];
        let results = run_logic_scenarios(
            &args,
            &["smoke".to_string(), "unknown".to_string()],
            &seeds,
            tester(),
        );
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let temp = temp_file("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("intel-sweep"));
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_handles_empty_results() {
        let json = temp_file("empty.json");
        let args = Args {
            output: Some(json.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        assert!(std::fs::read_to_string(json).unwrap().contains("[]"));

        let md = temp_file("empty.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(md.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        assert!(
            std::fs::read_to_string(md)
                .unwrap()
                .contains("No scenarios executed")
        );
    }

    #[test]
    fn write_reports_console_includes_total_time() {
        let out = temp_file("console.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(out.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(out).unwrap();
        assert!(content.contains("Smoke Test"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn write_reports_csv_emits_header() {
        let out = temp_file("report.csv");
        let args = Args {
            report: "csv".to_string(),
            output: Some(out.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = std::fs::read_to_string(out).unwrap();
        assert!(content.starts_with("scenario,seed,code"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
