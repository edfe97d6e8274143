//! Fixed-weight player scores used by the lineup builder.
//!
//! Both scores are linear in [`Averages`] and take no other input:
//!
//! ```text
//! efficiency = ppg + rpg + apg + spg + bpg - tpg
//! overall    = 1.0·ppg + 1.2·rpg + 1.5·apg + 2.0·spg + 2.0·bpg - 1.5·tpg
//!            + 0.10·fg% + 0.05·ft% + 0.05·3p%
//! ```
use std::cmp::Ordering;

use arrayvec::ArrayVec;

use crate::ids::UserId;
use crate::model::MAX_LINEUP_SIZE;
use crate::stats::averages::Averages;

pub fn efficiency(averages: &Averages) -> f64 {
    round_tenth(
        averages.ppg + averages.rpg + averages.apg + averages.spg + averages.bpg - averages.tpg,
    )
}

pub fn overall_rating(averages: &Averages) -> f64 {
    round_tenth(
        averages.ppg
            + 1.2 * averages.rpg
            + 1.5 * averages.apg
            + 2.0 * averages.spg
            + 2.0 * averages.bpg
            - 1.5 * averages.tpg
            + 0.10 * averages.fg_pct
            + 0.05 * averages.ft_pct
            + 0.05 * averages.three_pct,
    )
}

/// Picks the highest-rated players, best first.
///
/// Ties fall back to player id so the same input always gives the same
/// lineup.
pub fn suggest_lineup(candidates: &[(UserId, Averages)]) -> ArrayVec<UserId, MAX_LINEUP_SIZE> {
    let mut ranked: Vec<(&UserId, f64)> = candidates
        .iter()
        .map(|(player, averages)| (player, overall_rating(averages)))
        .collect();

    ranked.sort_by(|(a_id, a), (b_id, b)| match b.total_cmp(a) {
        Ordering::Equal => a_id.cmp(b_id),
        other => other,
    });

    ranked
        .into_iter()
        .take(MAX_LINEUP_SIZE)
        .map(|(player, _)| player.clone())
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
