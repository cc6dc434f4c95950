//! Audit log export in json, csv, and markdown.

use aegis_types::PromotionAuditEntry;

use crate::error::AuditError;

/// Supported export formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    /// Parse a format name; unsupported names fail with
    /// [`AuditError::UnsupportedFormat`] and produce no partial output.
    pub fn parse(name: &str) -> Result<Self, AuditError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(AuditError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// CSV header row.
const CSV_HEADER: &str = "Timestamp,Promotion ID,Action,User,Reason";

/// Render entries in the requested format.
pub fn export(entries: &[PromotionAuditEntry], format: ExportFormat) -> Result<String, AuditError> {
    match format {
        ExportFormat::Json => {
            serde_json::to_string_pretty(entries).map_err(|e| AuditError::Export(e.to_string()))
        }
        ExportFormat::Csv => Ok(export_csv(entries)),
        ExportFormat::Markdown => Ok(export_markdown(entries)),
    }
}

fn csv_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn export_csv(entries: &[PromotionAuditEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for entry in entries {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            entry.timestamp.to_rfc3339(),
            entry.promotion_id,
            entry.action,
            csv_quote(&entry.user),
            csv_quote(entry.reason.as_deref().unwrap_or("")),
        ));
    }
    out
}

fn export_markdown(entries: &[PromotionAuditEntry]) -> String {
    let mut out = String::from("# Audit Log\n\n");
    out.push_str("| Timestamp | Promotion | Action | User | Reason |\n");
    out.push_str("|---|---|---|---|---|\n");
    for entry in entries {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            entry.timestamp.to_rfc3339(),
            entry.promotion_id,
            entry.action,
            entry.user,
            entry.reason.as_deref().unwrap_or("-"),
        ));
    }
    out
}
