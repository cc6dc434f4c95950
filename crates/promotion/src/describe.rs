//! Deterministic pull-request description generation.
//!
//! The description is part of the audit surface: the same promotion always
//! renders the same Markdown.

use aegis_types::PromotionRequest;

/// Render the Markdown pull-request description for a promotion.
pub fn pr_description(promotion: &PromotionRequest) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", promotion.title));
    out.push_str(&format!("{}\n\n", promotion.description));

    out.push_str("## Changes\n\n");
    out.push_str("| File | Type | Lines | Summary |\n");
    out.push_str("|---|---|---|---|\n");
    for change in &promotion.changes {
        out.push_str(&format!(
            "| {} | {} | +{}/-{} | {} |\n",
            change.file, change.change_type, change.lines_added, change.lines_removed,
            change.summary,
        ));
    }
    out.push('\n');

    let tests = &promotion.test_results;
    out.push_str("## Tests\n\n");
    out.push_str(&format!(
        "{}/{} tests passed in {} ms.",
        tests.passed_tests, tests.total_tests, tests.duration_ms,
    ));
    if let Some(coverage) = tests.coverage {
        out.push_str(&format!(" Coverage: {:.1}%.", coverage * 100.0));
    }
    out.push_str("\n\n");

    out.push_str("## Impact\n\n");
    out.push_str(&format!("**Risk:** {}\n\n", promotion.impact.risk));
    if !promotion.impact.affected_components.is_empty() {
        out.push_str(&format!(
            "Affected components: {}\n\n",
            promotion.impact.affected_components.join(", "),
        ));
    }
    out.push_str(&format!(
        "Estimated downtime: {} min.\n\n",
        promotion.impact.estimated_downtime_mins,
    ));

    out.push_str("## Rollback\n\n");
    for (i, step) in promotion.rollback_plan.steps.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, step));
    }
    out.push_str(&format!(
        "\nEstimated time: {} min. Automatable: {}.\n",
        promotion.rollback_plan.estimated_time_mins,
        if promotion.rollback_plan.automatable {
            "yes"
        } else {
            "no"
        },
    ));

    out
}
