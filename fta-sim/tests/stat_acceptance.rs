use fta_sim::{
    CovertOperation, CovertOperationRule, Faction, GameDate, IntelOutcome, IntelProject,
    IntelProjectRule, ItemStock, RuleSet, SoldierId, SoldierStats, operation_odds,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

fn rate(hits: usize) -> f64 {
    let total = f64::from(u32::try_from(SAMPLE_SIZE).expect("sample size fits"));
    f64::from(u32::try_from(hits).expect("count fits")) / total
}

#[test]
fn intel_roll_success_tracks_stage_chance() {
    let rule: IntelProjectRule = serde_json::from_str(
        r#"{
            "id": "survey",
            "name": "Survey",
            "stages": [{"name": "endless", "progress_required": 4000000000, "difficulty": 75.0}],
            "stat_weights": {"reactions": 1.0},
            "base_cost": 0
        }"#,
    )
    .unwrap();
    let agent = SoldierStats {
        reactions: 25,
        ..SoldierStats::default()
    };
    let team = [&agent];
    let mut project = IntelProject::new(&rule);
    let expected = project.chance(&rule, &team).unwrap() / 100.0;
    assert!((expected - 0.25).abs() < 1e-9);

    let mut rng = SmallRng::seed_from_u64(0xF7A1);
    let mut funds = 0;
    let mut hits = 0usize;
    for _ in 0..SAMPLE_SIZE {
        match project.roll(&rule, &team, &mut funds, &mut rng).outcome {
            IntelOutcome::Progressed { .. } => hits += 1,
            IntelOutcome::Failed => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    let observed = rate(hits);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "intel success rate drifted: observed {observed:.4}, expected {expected:.4}"
    );
    assert_eq!(project.rolls, 5000);
}

#[test]
fn covert_resolution_tracks_frozen_odds() {
    let rule: CovertOperationRule = serde_json::from_str(
        r#"{
            "id": "drop",
            "name": "Dead Drop",
            "base_chance": 30.0,
            "base_days": 1,
            "min_soldiers": 0,
            "difficulty": "easy"
        }"#,
    )
    .unwrap();
    let odds = operation_odds(&rule, &[], &ItemStock::new(), 0);
    let expected = odds.chance / 100.0;
    assert!((expected - 0.33).abs() < 1e-9);

    let mut rng = SmallRng::seed_from_u64(0xC0FE);
    let mut successes = 0usize;
    for _ in 0..SAMPLE_SIZE {
        let mut operation = CovertOperation::new(
            &rule,
            vec![SoldierId(1)],
            ItemStock::new(),
            &odds,
            GameDate::default(),
        );
        assert!(operation.advance_day());
        if operation.resolve(&mut rng) {
            successes += 1;
        }
    }
    let observed = rate(successes);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "covert success rate drifted: observed {observed:.4}"
    );
}

#[test]
fn mission_launch_rate_matches_chance() {
    let rules = RuleSet::from_json(
        r#"{
            "factions": [
                {"id": "cell", "name": "Cell", "starting_power": 10,
                 "missions": [{"id": "probe", "power_cost": 0, "chance": 40}]}
            ]
        }"#,
    )
    .unwrap();
    let rule = &rules.factions[0];
    let mut faction = Faction::from_rule(rule, &rules.reputation);
    let mut rng = SmallRng::seed_from_u64(0xBEEF);

    let mut launched = 0usize;
    for _ in 0..SAMPLE_SIZE {
        faction.missions_this_month = 0;
        launched += faction.faction_mission_generator(rule, &mut rng).len();
    }
    let observed = rate(launched);
    assert!(
        (observed - 0.40).abs() <= TOLERANCE,
        "mission launch rate drifted: observed {observed:.4}"
    );
}
