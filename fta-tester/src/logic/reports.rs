use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::{RunRecord, ScenarioResult};

fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let passed = u32::try_from(passed).map_or(f64::MAX, f64::from);
    let total = u32::try_from(total).map_or(f64::MAX, f64::from);
    passed / total * 100.0
}

pub fn generate_console_report(
    writer: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Scenario Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "===========================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(writer, "Total runs: {total}")?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", success_rate(passed, total))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} {} [seed {} / {}]",
            status,
            result.scenario_name.bold(),
            result.seed,
            result.code
        )?;
        writeln!(
            writer,
            "   Iterations: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(writer, "   Average time: {:?}", result.average_duration)?;
        for failure in &result.failures {
            writeln!(writer, "     • {}", failure.red())?;
        }
    }

    let records: Vec<&RunRecord> = results.iter().flat_map(|r| r.records.iter()).collect();
    if !records.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", "🗺️  Campaign Activity".bright_yellow().bold())?;
        writeln!(writer, "{}", "====================".yellow())?;
        let days: u64 = records.iter().map(|r| u64::from(r.metrics.days_run)).sum();
        let research: u64 = records
            .iter()
            .map(|r| u64::from(r.metrics.research_completed))
            .sum();
        let missions: u64 = records
            .iter()
            .map(|r| u64::from(r.metrics.missions_launched))
            .sum();
        let traded: u64 = records
            .iter()
            .map(|r| r.metrics.items_restocked + r.metrics.items_sold)
            .sum();
        let covert_done: u64 = records
            .iter()
            .map(|r| u64::from(r.metrics.covert_successes + r.metrics.covert_failures))
            .sum();
        let covert_won: u64 = records
            .iter()
            .map(|r| u64::from(r.metrics.covert_successes))
            .sum();
        writeln!(writer, "Simulated days: {days}")?;
        writeln!(writer, "Faction research completed: {research}")?;
        writeln!(writer, "Faction missions launched: {missions}")?;
        writeln!(writer, "Items traded by factions: {traded}")?;
        writeln!(writer, "Covert operations: {covert_won}/{covert_done} succeeded")?;
    }

    if let (Some(fastest), Some(slowest)) = (
        results.iter().min_by_key(|r| r.average_duration),
        results.iter().max_by_key(|r| r.average_duration),
    ) {
        writeln!(writer)?;
        writeln!(writer, "{}", "⚡ Performance Summary".bright_yellow().bold())?;
        writeln!(writer, "{}", "=====================".yellow())?;
        writeln!(
            writer,
            "Fastest: {} ({:?})",
            fastest.scenario_name.green(),
            fastest.average_duration
        )?;
        writeln!(
            writer,
            "Slowest: {} ({:?})",
            slowest.scenario_name.yellow(),
            slowest.average_duration
        )?;
    }
    Ok(())
}

pub fn generate_json_report(writer: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    let json_output = serde_json::to_string_pretty(results)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(writer: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(writer, "# FtA Scenario Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total runs**: {total}")?;
    writeln!(writer, "- **Passed**: {passed}")?;
    writeln!(writer, "- **Failed**: {}", total - passed)?;
    writeln!(
        writer,
        "- **Success rate**: {:.1}%\n",
        success_rate(passed, total)
    )?;

    writeln!(writer, "## Detailed Results\n")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            writer,
            "### {} {} (`{}`)\n",
            status, result.scenario_name, result.code
        )?;
        writeln!(
            writer,
            "- **Iterations**: {}/{} successful",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(writer, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(writer, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(writer, "  - {failure}")?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn generate_csv_report(writer: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(
        writer,
        "scenario,seed,code,passed,days,research_completed,missions,restocked,sold,intel_rolls,intel_completed,covert_successes,covert_failures,discoveries,digest"
    )?;
    for record in results.iter().flat_map(|r| r.records.iter()) {
        let m = &record.metrics;
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            record.scenario_name,
            record.seed,
            record.code,
            record.passed,
            m.days_run,
            m.research_completed,
            m.missions_launched,
            m.items_restocked,
            m.items_sold,
            m.intel_rolls,
            m.intel_completed,
            m.covert_successes,
            m.covert_failures,
            m.player_discoveries,
            record.digest
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::game_tester::CampaignMetrics;

    fn result(passed: bool) -> ScenarioResult {
        let metrics = CampaignMetrics {
            days_run: 30,
            research_completed: 2,
            missions_launched: 1,
            ..CampaignMetrics::default()
        };
        ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 42,
            code: "CIPHER-42".to_string(),
            passed,
            iterations_run: 1,
            successful_iterations: usize::from(passed),
            failures: if passed {
                Vec::new()
            } else {
                vec!["day 3: boom".to_string()]
            },
            average_duration: Duration::from_millis(4),
            performance_data: vec![Duration::from_millis(4)],
            records: vec![RunRecord {
                scenario_name: "Smoke".to_string(),
                seed: 42,
                code: "CIPHER-42".to_string(),
                passed,
                digest: "00000000000000ff".to_string(),
                metrics,
            }],
        }
    }

    fn render(f: impl Fn(&mut dyn Write) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn console_report_lists_failures_and_activity() {
        let out = render(|w| {
            generate_console_report(w, &[result(true), result(false)], Duration::from_secs(1))
        });
        assert!(out.contains("Total runs: 2"));
        assert!(out.contains("day 3: boom"));
        assert!(out.contains("Simulated days: 60"));
        assert!(out.contains("Faction research completed: 4"));
    }

    #[test]
    fn csv_report_has_one_row_per_record() {
        let out = render(|w| generate_csv_report(w, &[result(true)]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("scenario,seed,code"));
        assert!(lines[1].starts_with("Smoke,42,CIPHER-42,true,30,2,1"));
        assert!(lines[1].ends_with("00000000000000ff"));
    }

    #[test]
    fn markdown_and_json_reports_name_the_scenario() {
        let md = render(|w| generate_markdown_report(w, &[result(false)]));
        assert!(md.contains("# FtA Scenario Results"));
        assert!(md.contains("### ❌ Smoke (`CIPHER-42`)"));
        let json = render(|w| generate_json_report(w, &[result(true)]));
        assert!(json.contains("\"scenario_name\": \"Smoke\""));
        assert!(json.contains("\"average_duration\": 4"));
    }
}
