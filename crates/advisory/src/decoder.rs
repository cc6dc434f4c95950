//! Marker-block decoder for free-text advisory responses.
//!
//! The advisory protocol is line-oriented: each field is a `MARKER:` prefix
//! followed by its value, and blocks are separated by a literal `---` line.
//! Markers are matched case-insensitively and in any order. Every missing
//! field has an explicit default so a partially well-formed response still
//! decodes:
//!
//! - `LIKELIHOOD:` defaults to 50
//! - `SEVERITY:` defaults to medium, `CATEGORY:` to technical
//! - `EFFORT:` defaults to 4 hours
//! - `CONFIDENCE:` defaults to 70
//!
//! Blocks missing their lead marker (`RISK:` for risks, `OPTION:` for
//! alternatives) are skipped entirely.

use aegis_types::{RiskCategory, RiskSeverity};

/// Literal line separating blocks.
const BLOCK_DELIMITER: &str = "---";

/// A decoded risk block.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskDraft {
    pub description: String,
    pub likelihood: u8,
    pub severity: RiskSeverity,
    pub category: RiskCategory,
}

/// A decoded alternative block.
#[derive(Clone, Debug, PartialEq)]
pub struct AlternativeDraft {
    pub option: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub effort_hours: u32,
    pub risks: Vec<String>,
}

/// A decoded recommendation.
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationDraft {
    pub option: String,
    pub reasoning: String,
    pub confidence: u8,
}

/// A decoded mitigation strategy. The strategy text arrives under the
/// `RECOMMENDATION:` marker and effectiveness under `CONFIDENCE:`.
#[derive(Clone, Debug, PartialEq)]
pub struct MitigationDraft {
    pub strategy: String,
    pub effort_hours: u32,
    pub effectiveness: u8,
}

/// Split content into blocks on `---` lines.
fn blocks(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for line in content.lines() {
        if line.trim() == BLOCK_DELIMITER {
            if !current.trim().is_empty() {
                out.push(current.clone());
            }
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

/// Extract the value of the first line starting with `marker`
/// (case-insensitive).
fn field(block: &str, marker: &str) -> Option<String> {
    for line in block.lines() {
        let trimmed = line.trim();
        match trimmed.get(..marker.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(marker) => {
                return Some(trimmed[marker.len()..].trim().to_string());
            }
            _ => {}
        }
    }
    None
}

/// Extract the first integer appearing in a value (tolerates "4h", "70%",
/// "about 6 hours").
fn first_number(value: &str) -> Option<u32> {
    let mut digits = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits.parse().ok()
}

/// Split a semicolon-separated list value.
fn list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Decode risk blocks. Blocks without a `RISK:` marker are skipped.
pub fn decode_risks(content: &str) -> Vec<RiskDraft> {
    blocks(content)
        .iter()
        .filter_map(|block| {
            let description = field(block, "RISK:")?;
            if description.is_empty() {
                return None;
            }
            Some(RiskDraft {
                description,
                likelihood: field(block, "LIKELIHOOD:")
                    .and_then(|v| first_number(&v))
                    .map(|n| n.min(100) as u8)
                    .unwrap_or(50),
                severity: RiskSeverity::parse_lenient(
                    &field(block, "SEVERITY:").unwrap_or_default(),
                ),
                category: RiskCategory::parse_lenient(
                    &field(block, "CATEGORY:").unwrap_or_default(),
                ),
            })
        })
        .collect()
}

/// Decode alternative blocks. Blocks without an `OPTION:` marker are skipped.
pub fn decode_alternatives(content: &str) -> Vec<AlternativeDraft> {
    blocks(content)
        .iter()
        .filter_map(|block| {
            let option = field(block, "OPTION:")?;
            if option.is_empty() {
                return None;
            }
            Some(AlternativeDraft {
                option,
                pros: field(block, "PROS:").map(|v| list(&v)).unwrap_or_default(),
                cons: field(block, "CONS:").map(|v| list(&v)).unwrap_or_default(),
                effort_hours: field(block, "EFFORT:")
                    .and_then(|v| first_number(&v))
                    .unwrap_or(4),
                risks: field(block, "RISK:").map(|v| list(&v)).unwrap_or_default(),
            })
        })
        .collect()
}

/// Decode the recommendation. Returns `None` when no `RECOMMENDATION:`
/// marker appears anywhere in the content.
pub fn decode_recommendation(content: &str) -> Option<RecommendationDraft> {
    let option = field(content, "RECOMMENDATION:")?;
    if option.is_empty() {
        return None;
    }
    Some(RecommendationDraft {
        option,
        reasoning: field(content, "REASONING:").unwrap_or_default(),
        confidence: field(content, "CONFIDENCE:")
            .and_then(|v| first_number(&v))
            .map(|n| n.min(100) as u8)
            .unwrap_or(70),
    })
}

/// Decode a mitigation strategy. Returns `None` when no `RECOMMENDATION:`
/// marker appears.
pub fn decode_mitigation(content: &str) -> Option<MitigationDraft> {
    let strategy = field(content, "RECOMMENDATION:")?;
    if strategy.is_empty() {
        return None;
    }
    Some(MitigationDraft {
        strategy,
        effort_hours: field(content, "EFFORT:")
            .and_then(|v| first_number(&v))
            .unwrap_or(4),
        effectiveness: field(content, "CONFIDENCE:")
            .and_then(|v| first_number(&v))
            .map(|n| n.min(100) as u8)
            .unwrap_or(70),
    })
}
