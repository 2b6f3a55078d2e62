use std::collections::BTreeMap;

use super::super::super::frameworks::domain::{
    CompetencyDefinition, CompetencyId, Dimension, DimensionWeights, LevelRanges,
};
use super::classify::classify;
use super::{DimensionResult, GlobalResult};

/// Per-competency scores run 1-3; 0 marks "not scored yet".
const MAX_COMPETENCY_SCORE: u32 = 3;

/// Fold one dimension's raw scores into its normalized total and level.
///
/// The total is the recorded points over the dimension's maximum, projected
/// onto 0-100. A dimension configured with weight 0 contributes nothing and
/// is pinned to 0 rather than divided out.
pub(crate) fn dimension_result(
    dimension: Dimension,
    definitions: &[CompetencyDefinition],
    weight: f64,
    scores: &BTreeMap<CompetencyId, u8>,
    ranges: &LevelRanges,
) -> DimensionResult {
    let mut raw_points: u32 = 0;
    let mut scored: usize = 0;

    for definition in definitions {
        if let Some(value) = scores.get(&definition.id) {
            if *value > 0 {
                raw_points += u32::from(*value);
                scored += 1;
            }
        }
    }

    let expected = definitions.len();
    let max_points = MAX_COMPETENCY_SCORE * expected as u32;

    let total = if weight == 0.0 || max_points == 0 {
        0.0
    } else {
        f64::from(raw_points) / f64::from(max_points) * 100.0
    };

    DimensionResult {
        dimension,
        raw_points,
        max_points,
        scored,
        expected,
        total,
        level: classify(total, ranges),
    }
}

/// Combine the three dimension totals into the weighted global score.
pub(crate) fn global_result(
    dimensions: &[DimensionResult],
    weights: &DimensionWeights,
    ranges: &LevelRanges,
) -> GlobalResult {
    let score = dimensions
        .iter()
        .map(|result| weights.for_dimension(result.dimension) * result.total)
        .sum();

    GlobalResult {
        score,
        level: classify(score, ranges),
    }
}
