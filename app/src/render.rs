//! Terminal rendering of workflow results.

use gmpa_core::{
    AssessmentRow, GapRecord, MatchedRecommendation, MaturityDriver, Step, WorkflowResults,
};
use prettytable::{Cell, Row, Table, row};

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text_row(cells: &[&str]) -> Row {
    Row::new(cells.iter().map(|c| Cell::new(c)).collect())
}

#[must_use]
pub fn assessment_preview(rows: &[AssessmentRow]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Category", "Question", "Answer", "Score", "MaxWeight"]);
    for r in rows {
        table.add_row(text_row(&[
            r.category.as_str(),
            r.question.as_str(),
            r.answer.as_str(),
            number(r.score).as_str(),
            number(r.max_weight).as_str(),
        ]));
    }
    table
}

#[must_use]
pub fn gap_table(records: &[GapRecord]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Heading", "Context", "Impact"]);
    for r in records {
        table.add_row(text_row(&[
            r.heading.as_str(),
            r.context.as_str(),
            r.impact.as_str(),
        ]));
    }
    table
}

#[must_use]
pub fn driver_table(drivers: &[MaturityDriver]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Category", "Question", "Answer", "Score", "MaxWeight", "Gap"]);
    for d in drivers {
        table.add_row(text_row(&[
            d.category.as_str(),
            d.question.as_str(),
            d.answer.as_str(),
            d.score.to_string().as_str(),
            d.max_weight.to_string().as_str(),
            d.gap.to_string().as_str(),
        ]));
    }
    table
}

#[must_use]
pub fn recommendation_table(matched: &[MatchedRecommendation]) -> Table {
    let mut table = Table::new();
    table.set_titles(row![
        "Recommendation",
        "Overview",
        "GMP Utilization Impact",
        "Business Impact",
        "score",
        "maxweight"
    ]);
    for m in matched {
        table.add_row(text_row(&[
            m.recommendation.as_str(),
            m.overview.as_str(),
            m.gmp_impact.as_str(),
            m.business_impact.as_str(),
            m.score.to_string().as_str(),
            m.maxweight.to_string().as_str(),
        ]));
    }
    table
}

/// Print the output of a completed step.
pub fn print_step(step: Step, results: &WorkflowResults) {
    match step {
        Step::Start => {}
        Step::CategorySummary => {
            println!("\n1️⃣ Category Summary\n");
            if let Some(reply) = &results.category_summary {
                println!("{}", reply.display_text());
            }
        }
        Step::BulletSummary => {
            println!("\n2️⃣ Bullet Point Summary\n");
            println!("Please copy and paste the text below into your email or document.\n");
            if let Some(reply) = &results.bullet_summary {
                println!("{}", reply.display_text());
            }
        }
        Step::MaturityGaps => {
            println!("\n3️⃣ Maturity Gaps\n");
            if let Some(gaps) = &results.maturity_gaps {
                match &gaps.notice {
                    Some(notice) => println!("⚠️ {notice}"),
                    None => {
                        gap_table(&gaps.records).printstd();
                    }
                }
            }
        }
        Step::MaturityDrivers => {
            println!("\n4️⃣ Maturity Drivers\n");
            match &results.maturity_drivers {
                Some(drivers) if !drivers.is_empty() => {
                    driver_table(drivers).printstd();
                }
                _ => println!(
                    "No maturity drivers found: every scored answer is at its maximum weight."
                ),
            }
        }
        Step::Recommendations => {
            println!("\n5️⃣ Capability Recommendations\n");
            if let Some(results) = &results.recommendations {
                if results.matched_recommendations.is_empty() {
                    println!("No recommendations matched based on the provided data.");
                } else {
                    recommendation_table(&results.matched_recommendations).printstd();
                }
                println!(
                    "Total Recommendations: {}",
                    results.total_matched_recommendations
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_table_has_one_row_per_record() {
        let records = gmpa_core::parse_response(
            "x\n1. **Heading**: Lack of automation\n**Context**: Manual\n**Impact**: Errors",
        );
        let table = gap_table(&records);
        assert_eq!(table.len(), 1);
        let printed = table.to_string();
        assert!(printed.contains("Heading"));
        assert!(printed.contains("Lack of automation"));
    }

    #[test]
    fn preview_leaves_missing_scores_blank() {
        let rows = vec![AssessmentRow {
            category: "Data".to_string(),
            question: "Q".to_string(),
            answer: String::new(),
            score: None,
            max_weight: Some(5.0),
        }];
        let printed = assessment_preview(&rows).to_string();
        assert!(printed.contains("Data"));
        assert!(printed.contains('5'));
    }
}
