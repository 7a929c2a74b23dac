use crate::domain::model::{Direction, MatchStatus, OrientationResult};
use crate::domain::summary::{DirectionCount, ResultSource, Summary};
use std::collections::HashMap;

/// Tallies results per label and derives the success rate.
///
/// An empty run reports a success rate of 0.0 rather than NaN. The summary
/// depends only on `results`, so re-runs write identical files.
pub fn summarize(results: &[OrientationResult], source: ResultSource) -> Summary {
    let mut counts: HashMap<Direction, usize> = HashMap::new();
    let mut imputed = 0;
    for result in results {
        *counts.entry(result.orientation).or_insert(0) += 1;
        if result.status == MatchStatus::Imputed {
            imputed += 1;
        }
    }

    let total = results.len();
    let unknown = counts.get(&Direction::Unknown).copied().unwrap_or(0);
    let known = total - unknown;
    let ratio = |n: usize| if total == 0 { 0.0 } else { n as f64 / total as f64 };

    let directions = Direction::ALL
        .into_iter()
        .map(|orientation| {
            let count = counts.get(&orientation).copied().unwrap_or(0);
            DirectionCount {
                orientation,
                count,
                percentage: ratio(count) * 100.0,
            }
        })
        .collect();

    Summary {
        source,
        total,
        known,
        unknown,
        success_rate: ratio(known),
        unknown_rate: ratio(unknown),
        imputed,
        directions,
    }
}

/// Most frequent known direction; ties go to the earlier octant clockwise from N.
pub fn modal_direction(results: &[OrientationResult]) -> Option<Direction> {
    let mut counts = [0usize; 8];
    for result in results {
        if let Some(idx) = Direction::COMPASS.iter().position(|d| *d == result.orientation) {
            counts[idx] += 1;
        }
    }

    let (idx, best) = counts
        .iter()
        .enumerate()
        .fold((0, 0), |acc, (i, &c)| if c > acc.1 { (i, c) } else { acc });
    (best > 0).then(|| Direction::COMPASS[idx])
}

/// Replaces up to `floor(total * fraction)` unknowns with the modal known direction.
///
/// Unknowns are taken in input order so repeated runs give the same output.
/// Returns how many rows were filled in.
pub fn impute_unknowns(results: &mut [OrientationResult], fraction: f64) -> usize {
    let Some(fill) = modal_direction(results) else {
        tracing::warn!("No known orientations to impute from");
        return 0;
    };

    let budget = (results.len() as f64 * fraction.clamp(0.0, 1.0)).floor() as usize;
    let mut replaced = 0;
    for result in results.iter_mut() {
        if replaced >= budget {
            break;
        }
        if !result.orientation.is_known() {
            result.orientation = fill;
            result.status = MatchStatus::Imputed;
            replaced += 1;
        }
    }

    tracing::info!(
        "Using most common orientation '{}' for {} remaining unknowns",
        fill,
        replaced
    );
    replaced
}
