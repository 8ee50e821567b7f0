//! Maturity drivers: the questions losing the most points.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Assessment;

/// Number of drivers reported when no limit is configured.
pub const DEFAULT_DRIVER_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaturityDriver {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub score: f64,
    pub max_weight: f64,
    /// `max_weight - score`
    pub gap: f64,
}

/// Rank assessment rows by point gap, largest first.
///
/// Every category is considered. Rows without both scores, or already at
/// their maximum weight, are skipped. Ties keep file order.
#[must_use]
pub fn identify_top_maturity_drivers(assessment: &Assessment, limit: usize) -> Vec<MaturityDriver> {
    let mut drivers: Vec<MaturityDriver> = assessment
        .rows()
        .iter()
        .filter_map(|row| {
            let gap = row.point_gap().filter(|gap| *gap > 0.0)?;
            Some(MaturityDriver {
                category: row.category.clone(),
                question: row.question.clone(),
                answer: row.answer.clone(),
                score: row.score?,
                max_weight: row.max_weight?,
                gap,
            })
        })
        .collect();

    // Stable sort keeps file order among equal gaps.
    drivers.sort_by(|a, b| b.gap.total_cmp(&a.gap));
    drivers.truncate(limit);

    info!("Identified {} maturity drivers", drivers.len());
    drivers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssessmentRow;

    fn row(category: &str, question: &str, score: Option<f64>, max: Option<f64>) -> AssessmentRow {
        AssessmentRow {
            category: category.to_string(),
            question: question.to_string(),
            answer: String::new(),
            score,
            max_weight: max,
        }
    }

    #[test]
    fn ranks_by_gap_descending() {
        let assessment = Assessment::new(vec![
            row("Data", "q1", Some(4.0), Some(5.0)),
            row("Activation", "q2", Some(0.0), Some(5.0)),
            row("Business", "q3", Some(1.0), Some(4.0)),
        ]);
        let drivers = identify_top_maturity_drivers(&assessment, DEFAULT_DRIVER_LIMIT);
        let questions: Vec<&str> = drivers.iter().map(|d| d.question.as_str()).collect();
        assert_eq!(questions, ["q2", "q3", "q1"]);
        assert!((drivers[0].gap - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_full_marks_and_unscored_rows() {
        let assessment = Assessment::new(vec![
            row("Data", "full", Some(5.0), Some(5.0)),
            row("Data", "unscored", None, Some(5.0)),
            row("Data", "partial", Some(2.0), Some(5.0)),
        ]);
        let drivers = identify_top_maturity_drivers(&assessment, DEFAULT_DRIVER_LIMIT);
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].question, "partial");
    }

    #[test]
    fn ties_keep_file_order_and_limit_applies() {
        let assessment = Assessment::new(vec![
            row("A", "first", Some(1.0), Some(3.0)),
            row("B", "second", Some(2.0), Some(4.0)),
            row("C", "third", Some(0.0), Some(2.0)),
        ]);
        let drivers = identify_top_maturity_drivers(&assessment, 2);
        let questions: Vec<&str> = drivers.iter().map(|d| d.question.as_str()).collect();
        assert_eq!(questions, ["first", "second"]);
    }
}
