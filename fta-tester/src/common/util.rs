use anyhow::{Context, Result};
use chrono::Utc;
use fta_sim::Campaign;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logic::CampaignMetrics;

pub fn artifacts_dir(base: &str, scenario: &str, seed: u64) -> String {
    let ts = Utc::now().format("%Y%m%dT%H%M%S%.3f");
    format!("{base}/{scenario}/seed-{seed}/{ts}")
}

/// Everything needed to replay and inspect a failed iteration.
#[derive(Debug, Serialize)]
pub struct FailureArtifact<'a> {
    pub scenario: &'a str,
    pub seed: u64,
    pub code: &'a str,
    pub day: u32,
    pub error: &'a str,
    pub metrics: &'a CampaignMetrics,
    pub campaign: &'a Campaign,
}

/// Write `failure.json` and `error.txt` into `dir`, returning the JSON path.
pub fn write_failure_artifact(dir: &str, artifact: &FailureArtifact<'_>) -> Result<PathBuf> {
    let dir = Path::new(dir);
    fs::create_dir_all(dir).context("creating artifacts dir")?;

    let path = dir.join("failure.json");
    let payload = serde_json::to_vec_pretty(artifact).context("serializing failure artifact")?;
    fs::write(&path, payload).with_context(|| format!("writing {}", path.display()))?;
    let _ = fs::write(dir.join("error.txt"), artifact.error);
    Ok(path)
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fta_sim::{RuleSet, StartProfile};

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn artifacts_dir_includes_key_segments() {
        let dir = artifacts_dir("target/out", "smoke", 42);
        assert!(dir.starts_with("target/out/smoke/seed-42/"));
    }

    #[test]
    fn failure_artifact_carries_campaign_snapshot() {
        let base = std::env::temp_dir().join(format!(
            "fta-failure-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let rules = RuleSet::builtin().unwrap();
        let campaign = Campaign::new(&rules, &StartProfile::builtin().unwrap(), 8).unwrap();
        let metrics = CampaignMetrics::default();
        let artifact = FailureArtifact {
            scenario: "smoke",
            seed: 8,
            code: "CIPHER-08",
            day: 0,
            error: "boom",
            metrics: &metrics,
            campaign: &campaign,
        };
        let path = write_failure_artifact(&base.to_string_lossy(), &artifact).expect("write");

        let value: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["error"], "boom");
        assert_eq!(value["campaign"]["seed"], 8);
        assert!(base.join("error.txt").exists());
    }
}
