use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! display_inner {
    ($($name:ident),* $(,)?) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )*
    };
}

/// Identifier wrapper for framework rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameworkId(pub String);

/// Identifier wrapper for job titles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobTitleId(pub String);

/// Identifier wrapper for workspaces (tenants).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub String);

/// Identifier wrapper for platform users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Identifier wrapper for a single competency definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompetencyId(pub String);

display_inner!(FrameworkId, JobTitleId, WorkspaceId, UserId, CompetencyId);

/// The three competency categories every framework configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Behavioral,
    Technical,
    Process,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Behavioral, Dimension::Technical, Dimension::Process];

    pub const fn label(self) -> &'static str {
        match self {
            Dimension::Behavioral => "behavioral",
            Dimension::Technical => "technical",
            Dimension::Process => "process",
        }
    }
}

/// Seniority classification derived from a numeric score via configured bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeniorityLevel {
    Junior,
    Pleno,
    Senior,
}

impl SeniorityLevel {
    pub const fn label(self) -> &'static str {
        match self {
            SeniorityLevel::Junior => "junior",
            SeniorityLevel::Pleno => "pleno",
            SeniorityLevel::Senior => "senior",
        }
    }
}

/// One evaluable competency inside a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyDefinition {
    pub id: CompetencyId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Ordered competency lists per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetencyMatrix {
    pub behavioral: Vec<CompetencyDefinition>,
    pub technical: Vec<CompetencyDefinition>,
    pub process: Vec<CompetencyDefinition>,
}

impl CompetencyMatrix {
    pub fn for_dimension(&self, dimension: Dimension) -> &[CompetencyDefinition] {
        match dimension {
            Dimension::Behavioral => &self.behavioral,
            Dimension::Technical => &self.technical,
            Dimension::Process => &self.process,
        }
    }

    /// Total competency count across all three dimensions.
    pub fn total_count(&self) -> usize {
        Dimension::ALL
            .iter()
            .map(|dimension| self.for_dimension(*dimension).len())
            .sum()
    }

    pub fn contains(&self, dimension: Dimension, id: &CompetencyId) -> bool {
        self.for_dimension(dimension)
            .iter()
            .any(|definition| &definition.id == id)
    }
}

/// Weight input as supplied by the operator. The representation is declared by
/// the caller rather than sniffed from magnitude, so `{50, 30, 20}` is only
/// ever a percentage set when tagged as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum WeightInput {
    Fraction {
        behavioral: f64,
        technical: f64,
        process: f64,
    },
    Percentage {
        behavioral: f64,
        technical: f64,
        process: f64,
    },
}

/// Validated dimension weights, stored as fractions summing to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    behavioral: f64,
    technical: f64,
    process: f64,
}

impl DimensionWeights {
    /// Constructor reserved for the validation layer; fractions are assumed
    /// to already satisfy the sum invariant.
    pub(crate) fn from_fractions(behavioral: f64, technical: f64, process: f64) -> Self {
        Self {
            behavioral,
            technical,
            process,
        }
    }

    pub fn for_dimension(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Behavioral => self.behavioral,
            Dimension::Technical => self.technical,
            Dimension::Process => self.process,
        }
    }

    /// Round-trip back to the tagged input shape, used when a new version
    /// inherits weights from its parent.
    pub fn as_input(&self) -> WeightInput {
        WeightInput::Fraction {
            behavioral: self.behavioral,
            technical: self.technical,
            process: self.process,
        }
    }
}

/// Inclusive score band on the 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: u8,
    pub max: u8,
}

impl ScoreBand {
    pub fn contains(&self, value: u8) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The three classification bands configured for one dimension (or globally).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRanges {
    pub junior: ScoreBand,
    pub pleno: ScoreBand,
    pub senior: ScoreBand,
}

impl LevelRanges {
    pub fn bands(&self) -> [(SeniorityLevel, ScoreBand); 3] {
        [
            (SeniorityLevel::Junior, self.junior),
            (SeniorityLevel::Pleno, self.pleno),
            (SeniorityLevel::Senior, self.senior),
        ]
    }

    /// First-match lookup. Validated ranges are gap-free over 0-100, so this
    /// returns `Some` for every clamped score.
    pub fn locate(&self, value: u8) -> Option<SeniorityLevel> {
        self.bands()
            .into_iter()
            .find(|(_, band)| band.contains(value))
            .map(|(level, _)| level)
    }
}

/// Per-dimension classification bands plus the global band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRanges {
    pub behavioral: LevelRanges,
    pub technical: LevelRanges,
    pub process: LevelRanges,
    pub global: LevelRanges,
}

impl ScoringRanges {
    pub fn for_dimension(&self, dimension: Dimension) -> &LevelRanges {
        match dimension {
            Dimension::Behavioral => &self.behavioral,
            Dimension::Technical => &self.technical,
            Dimension::Process => &self.process,
        }
    }
}

/// A named, versioned competency configuration scoped to a job title.
///
/// Rows are immutable once published: an edit inserts a successor row with a
/// bumped version and a `parent_framework_id` back-reference, and flips this
/// row inactive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyFramework {
    pub id: FrameworkId,
    pub job_title_id: JobTitleId,
    /// `None` marks the global template; workspaces may carry overrides.
    pub workspace_id: Option<WorkspaceId>,
    pub name: String,
    pub weights: DimensionWeights,
    pub competencies: CompetencyMatrix,
    pub ranges: ScoringRanges,
    pub is_template: bool,
    pub parent_framework_id: Option<FrameworkId>,
    pub version: u32,
    pub is_active: bool,
    pub created_by: UserId,
    pub published_at: DateTime<Utc>,
}

impl CompetencyFramework {
    pub fn is_global_template(&self) -> bool {
        self.is_template && self.workspace_id.is_none()
    }

    pub fn summary_view(&self) -> FrameworkView {
        FrameworkView {
            id: self.id.clone(),
            job_title_id: self.job_title_id.clone(),
            name: self.name.clone(),
            version: self.version,
            is_active: self.is_active,
            parent_framework_id: self.parent_framework_id.clone(),
            published_at: self.published_at,
        }
    }
}

/// Sanitized representation of a framework for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct FrameworkView {
    pub id: FrameworkId,
    pub job_title_id: JobTitleId,
    pub name: String,
    pub version: u32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_framework_id: Option<FrameworkId>,
    pub published_at: DateTime<Utc>,
}
