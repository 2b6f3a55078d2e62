use super::super::super::frameworks::domain::{LevelRanges, SeniorityLevel};

/// Map a 0-100 total onto a seniority level by first-match band lookup.
///
/// Totals are real-valued while bands carry integer bounds, so the value is
/// rounded before the lookup. Ranges are validated gap-free at framework
/// save time; the fallback only fires against legacy rows that predate that
/// rule, picking the highest band the value has reached.
pub(crate) fn classify(total: f64, ranges: &LevelRanges) -> SeniorityLevel {
    let value = total.round().clamp(0.0, 100.0) as u8;

    match ranges.locate(value) {
        Some(level) => level,
        None => ranges
            .bands()
            .into_iter()
            .rev()
            .find(|(_, band)| band.min <= value)
            .map(|(level, _)| level)
            .unwrap_or(SeniorityLevel::Junior),
    }
}
