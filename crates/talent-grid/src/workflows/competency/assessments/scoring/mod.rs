mod classify;
mod rules;

use serde::{Deserialize, Serialize};

use super::super::frameworks::domain::{
    CompetencyFramework, CompetencyId, Dimension, SeniorityLevel,
};
use super::domain::ScoreSheet;

/// Stateless scorer bound to one framework version.
///
/// Results are a pure function of the framework configuration and the raw
/// sheet: recomputing over identical input yields identical output, which is
/// what lets every save path re-derive totals instead of trusting stored
/// derived state.
pub struct ScoringEngine<'a> {
    framework: &'a CompetencyFramework,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(framework: &'a CompetencyFramework) -> Self {
        Self { framework }
    }

    /// Reject sheets carrying out-of-scale values or competencies the
    /// framework does not define for that dimension.
    pub fn validate_sheet(&self, sheet: &ScoreSheet) -> Result<(), ScoreValidationError> {
        for dimension in Dimension::ALL {
            for (competency, value) in sheet.for_dimension(dimension) {
                if *value > 3 {
                    return Err(ScoreValidationError::OutOfScale {
                        competency: competency.clone(),
                        value: *value,
                    });
                }
                if !self.framework.competencies.contains(dimension, competency) {
                    return Err(ScoreValidationError::UnknownCompetency {
                        dimension,
                        competency: competency.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Derive per-dimension totals/levels and the weighted global result.
    pub fn results(&self, sheet: &ScoreSheet) -> AssessmentResults {
        let dimensions: Vec<DimensionResult> = Dimension::ALL
            .iter()
            .map(|dimension| {
                rules::dimension_result(
                    *dimension,
                    self.framework.competencies.for_dimension(*dimension),
                    self.framework.weights.for_dimension(*dimension),
                    sheet.for_dimension(*dimension),
                    self.framework.ranges.for_dimension(*dimension),
                )
            })
            .collect();

        let global = rules::global_result(
            &dimensions,
            &self.framework.weights,
            &self.framework.ranges.global,
        );

        AssessmentResults { dimensions, global }
    }

    /// Submission gate: every competency across all three dimensions must
    /// carry a non-zero score.
    pub fn completion(&self, sheet: &ScoreSheet) -> Completion {
        Completion {
            scored: sheet.recorded_count(),
            expected: self.framework.competencies.total_count(),
        }
    }
}

/// Progress of a sheet towards the submission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub scored: usize,
    pub expected: usize,
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        self.scored == self.expected
    }
}

/// Derived outcome for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionResult {
    pub dimension: Dimension,
    pub raw_points: u32,
    pub max_points: u32,
    pub scored: usize,
    pub expected: usize,
    /// Normalized onto 0-100.
    pub total: f64,
    pub level: SeniorityLevel,
}

/// Weighted combination of the three dimension totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalResult {
    pub score: f64,
    pub level: SeniorityLevel,
}

/// Full derived state stored alongside the raw sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResults {
    pub dimensions: Vec<DimensionResult>,
    pub global: GlobalResult,
}

impl AssessmentResults {
    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionResult> {
        self.dimensions
            .iter()
            .find(|result| result.dimension == dimension)
    }

    pub fn expected_count(&self) -> usize {
        self.dimensions.iter().map(|result| result.expected).sum()
    }
}

/// Score-sheet validation failures, rejected before any write.
#[derive(Debug, thiserror::Error)]
pub enum ScoreValidationError {
    #[error("score {value} for competency '{competency}' exceeds the 0-3 scale")]
    OutOfScale { competency: CompetencyId, value: u8 },
    #[error("competency '{competency}' is not part of the {dimension:?} dimension")]
    UnknownCompetency {
        dimension: Dimension,
        competency: CompetencyId,
    },
}
