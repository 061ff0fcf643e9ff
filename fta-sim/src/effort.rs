//! Team effort aggregation shared by intel projects and covert operations.
//!
//! Each member contributes the weighted sum of their stats. Members are
//! ranked by contribution and every additional member counts for a
//! geometrically smaller share, so large teams see diminishing returns.

use crate::roster::{SoldierStats, StatWeights};

/// Weighted contribution of a single soldier.
#[must_use]
pub fn member_effort(stats: &SoldierStats, weights: &StatWeights) -> f64 {
    weights
        .iter()
        .map(|(kind, weight)| weight * f64::from(stats.get(*kind)))
        .sum()
}

/// Combined effort of a team with `falloff` applied per rank.
#[must_use]
pub fn team_effort<'a, I>(team: I, weights: &StatWeights, falloff: f64) -> f64
where
    I: IntoIterator<Item = &'a SoldierStats>,
{
    let falloff = if falloff.is_finite() {
        falloff.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let mut efforts: Vec<f64> = team
        .into_iter()
        .map(|stats| member_effort(stats, weights))
        .collect();
    efforts.sort_by(|a, b| b.total_cmp(a));

    let mut factor = 1.0;
    let mut total = 0.0;
    for effort in efforts {
        total += effort * factor;
        factor *= falloff;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::StatKind;

    fn weights() -> StatWeights {
        [(StatKind::Bravery, 0.5), (StatKind::Reactions, 1.0)]
            .into_iter()
            .collect()
    }

    fn stats(bravery: i32, reactions: i32) -> SoldierStats {
        SoldierStats {
            bravery,
            reactions,
            ..SoldierStats::default()
        }
    }

    #[test]
    fn member_effort_is_weighted_sum() {
        let effort = member_effort(&stats(40, 30), &weights());
        assert!((effort - 50.0).abs() < 1e-9);
    }

    #[test]
    fn strongest_member_counts_in_full() {
        let team = [stats(0, 10), stats(0, 40)];
        let effort = team_effort(team.iter(), &weights(), 0.5);
        assert!((effort - 45.0).abs() < 1e-9);
    }

    #[test]
    fn extra_members_have_diminishing_returns() {
        let member = stats(20, 20);
        let one = team_effort([member].iter(), &weights(), 0.75);
        let four = team_effort([member; 4].iter(), &weights(), 0.75);
        assert!(four > one);
        assert!(four < one * 4.0);
    }

    #[test]
    fn empty_team_has_no_effort() {
        let empty: [SoldierStats; 0] = [];
        assert!(team_effort(empty.iter(), &weights(), 0.75).abs() < f64::EPSILON);
    }
}
