use std::collections::BTreeSet;
use std::fmt;

use super::domain::{
    CompetencyId, CompetencyMatrix, Dimension, DimensionWeights, LevelRanges, ScoringRanges,
    SeniorityLevel, WeightInput,
};

const WEIGHT_TOLERANCE: f64 = 1e-6;
const SCALE_MAX: u8 = 100;

/// Which band set a range error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeScope {
    Dimension(Dimension),
    Global,
}

impl fmt::Display for RangeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeScope::Dimension(dimension) => f.write_str(dimension.label()),
            RangeScope::Global => f.write_str("global"),
        }
    }
}

/// Validation errors raised before any framework write.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkValidationError {
    #[error("weights must sum to {expected} (got {actual:.6})")]
    WeightSum { expected: f64, actual: f64 },
    #[error("{dimension:?} weight {value} is not a finite non-negative number")]
    WeightOutOfRange { dimension: Dimension, value: f64 },
    #[error("framework name must not be empty")]
    EmptyName,
    #[error("{dimension:?} dimension has no competencies")]
    EmptyDimension { dimension: Dimension },
    #[error("competency id '{id}' appears more than once")]
    DuplicateCompetency { id: CompetencyId },
    #[error("{scope} {level:?} band is inverted ({min} > {max})")]
    InvertedBand {
        scope: RangeScope,
        level: SeniorityLevel,
        min: u8,
        max: u8,
    },
    #[error("{scope} junior band must start at 0 (found {found})")]
    RangeStart { scope: RangeScope, found: u8 },
    #[error("{scope} senior band must end at 100 (found {found})")]
    RangeEnd { scope: RangeScope, found: u8 },
    #[error(
        "{scope} {upper:?} band must begin at {expected} (found {found}); bands may not overlap or leave gaps"
    )]
    BandBoundary {
        scope: RangeScope,
        upper: SeniorityLevel,
        expected: u8,
        found: u8,
    },
}

/// Check the declared weight representation and normalize onto fractions.
///
/// The representation is part of the input, so a fraction set is compared
/// against 1.0 and a percentage set against 100. It is never inferred from
/// the magnitude of the numbers themselves.
pub fn validate_weights(input: &WeightInput) -> Result<DimensionWeights, FrameworkValidationError> {
    let (expected, divisor, behavioral, technical, process) = match *input {
        WeightInput::Fraction {
            behavioral,
            technical,
            process,
        } => (1.0, 1.0, behavioral, technical, process),
        WeightInput::Percentage {
            behavioral,
            technical,
            process,
        } => (100.0, 100.0, behavioral, technical, process),
    };

    for (dimension, value) in [
        (Dimension::Behavioral, behavioral),
        (Dimension::Technical, technical),
        (Dimension::Process, process),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(FrameworkValidationError::WeightOutOfRange { dimension, value });
        }
    }

    let actual = behavioral + technical + process;
    if (actual - expected).abs() > WEIGHT_TOLERANCE {
        return Err(FrameworkValidationError::WeightSum { expected, actual });
    }

    Ok(DimensionWeights::from_fractions(
        behavioral / divisor,
        technical / divisor,
        process / divisor,
    ))
}

/// Ensure each dimension carries at least one competency and that ids are
/// unique across the whole matrix.
pub fn validate_competencies(matrix: &CompetencyMatrix) -> Result<(), FrameworkValidationError> {
    let mut seen: BTreeSet<&CompetencyId> = BTreeSet::new();

    for dimension in Dimension::ALL {
        let definitions = matrix.for_dimension(dimension);
        if definitions.is_empty() {
            return Err(FrameworkValidationError::EmptyDimension { dimension });
        }
        for definition in definitions {
            if !seen.insert(&definition.id) {
                return Err(FrameworkValidationError::DuplicateCompetency {
                    id: definition.id.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Enforce the band layout at write time: three ordered bands starting at 0,
/// ending at 100, each beginning one past its predecessor. Runtime
/// classification can then rely on a total first-match lookup.
pub fn validate_ranges(ranges: &ScoringRanges) -> Result<(), FrameworkValidationError> {
    for dimension in Dimension::ALL {
        validate_level_ranges(RangeScope::Dimension(dimension), ranges.for_dimension(dimension))?;
    }
    validate_level_ranges(RangeScope::Global, &ranges.global)
}

fn validate_level_ranges(
    scope: RangeScope,
    ranges: &LevelRanges,
) -> Result<(), FrameworkValidationError> {
    let bands = ranges.bands();

    for (level, band) in bands {
        if band.min > band.max {
            return Err(FrameworkValidationError::InvertedBand {
                scope,
                level,
                min: band.min,
                max: band.max,
            });
        }
    }

    if ranges.junior.min != 0 {
        return Err(FrameworkValidationError::RangeStart {
            scope,
            found: ranges.junior.min,
        });
    }
    if ranges.senior.max != SCALE_MAX {
        return Err(FrameworkValidationError::RangeEnd {
            scope,
            found: ranges.senior.max,
        });
    }

    for window in bands.windows(2) {
        let (_, lower) = window[0];
        let (upper_level, upper) = window[1];
        let expected = lower.max.saturating_add(1);
        if upper.min != expected {
            return Err(FrameworkValidationError::BandBoundary {
                scope,
                upper: upper_level,
                expected,
                found: upper.min,
            });
        }
    }

    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), FrameworkValidationError> {
    if name.trim().is_empty() {
        return Err(FrameworkValidationError::EmptyName);
    }
    Ok(())
}
