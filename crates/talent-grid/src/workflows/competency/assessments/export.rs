use std::io::Write;

use super::super::frameworks::domain::Dimension;
use super::domain::SeniorityAssessment;

/// Write a workspace's assessments as CSV for HR reporting.
pub fn write_assessments_csv<W: Write>(
    assessments: &[SeniorityAssessment],
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "assessment_id",
        "workspace_id",
        "evaluated_user",
        "evaluator",
        "assessment_type",
        "status",
        "period",
        "behavioral_total",
        "behavioral_level",
        "technical_total",
        "technical_level",
        "process_total",
        "process_level",
        "global_score",
        "global_level",
    ])?;

    for assessment in assessments {
        let mut record: Vec<String> = vec![
            assessment.id.0.clone(),
            assessment.workspace_id.0.clone(),
            assessment.evaluated_user.0.clone(),
            assessment
                .evaluator
                .as_ref()
                .map(|user| user.0.clone())
                .unwrap_or_default(),
            assessment.assessment_type.label().to_string(),
            assessment.status.label().to_string(),
            assessment.period.clone(),
        ];

        for dimension in Dimension::ALL {
            match assessment.results.dimension(dimension) {
                Some(result) => {
                    record.push(format!("{:.1}", result.total));
                    record.push(result.level.label().to_string());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }

        record.push(format!("{:.1}", assessment.results.global.score));
        record.push(assessment.results.global.level.label().to_string());

        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Render the CSV export into a string, as served by the export endpoint.
pub fn assessments_csv_string(
    assessments: &[SeniorityAssessment],
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_assessments_csv(assessments, &mut buffer)?;
    String::from_utf8(buffer).map_err(|_| ExportError::Encoding)
}

/// CSV export failure.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv flush failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv output was not valid utf-8")]
    Encoding,
}
