//! Prompt builders for the fixed advisory text protocols.
//!
//! Prompts are assembled deterministically from the decision under
//! evaluation; the response format instructions mirror exactly what the
//! [`crate::decoder`] accepts.

use aegis_types::{ConsultationTrigger, Decision, Risk};

/// Builds prompts for every advisory task the pipeline issues.
pub struct PromptBuilder;

impl PromptBuilder {
    /// System prompt shared by every task.
    pub fn system_prompt() -> String {
        "You are the risk and planning advisor for an autonomous code-modification agent. \
         Answer only in the structured line format requested; no prose outside the markers."
            .to_string()
    }

    /// Prompt asking the backend to enumerate risks for a decision.
    pub fn risk_identification(decision: &Decision) -> String {
        let mut prompt = String::new();
        prompt.push_str("Identify the risks of the following change.\n\n");
        prompt.push_str(&format!("## Decision {} ({})\n", decision.id, decision.decision_type));
        prompt.push_str(&format!("{}\n\n", decision.description));
        prompt.push_str(&format!(
            "## Change ({})\n{} file(s): {}\n\n",
            decision.change.change_type,
            decision.change.files.len(),
            decision.change.files.join(", "),
        ));
        prompt.push_str(
            "Enumerate risks across the categories technical, security, operational, \
             business, maintenance.\n",
        );
        prompt.push_str("For each risk output a block:\n");
        prompt.push_str("RISK: <description>\nLIKELIHOOD: <0-100>\nSEVERITY: <low|medium|high|critical>\nCATEGORY: <category>\n");
        prompt.push_str("Separate blocks with a line containing only ---\n");
        prompt
    }

    /// Prompt asking the backend for a mitigation strategy for one risk.
    pub fn mitigation(risk: &Risk) -> String {
        format!(
            "Propose one mitigation for this {} risk ({} severity):\n{}\n\n\
             Output:\nRECOMMENDATION: <mitigation>\nEFFORT: <hours>\nCONFIDENCE: <0-100 effectiveness>\n",
            risk.category, risk.severity, risk.description,
        )
    }

    /// Prompt asking the backend for 2-3 alternatives plus a recommendation.
    pub fn alternatives(decision: &Decision, triggers: &[ConsultationTrigger]) -> String {
        let trigger_list: Vec<String> = triggers.iter().map(|t| t.to_string()).collect();
        let mut prompt = String::new();
        prompt.push_str("A human is being consulted about the following decision.\n\n");
        prompt.push_str(&format!("## Decision {} ({})\n", decision.id, decision.decision_type));
        prompt.push_str(&format!("{}\n\n", decision.description));
        prompt.push_str(&format!("Consultation triggers: {}\n\n", trigger_list.join(", ")));
        prompt.push_str("Generate 2-3 alternative courses of action. For each output a block:\n");
        prompt.push_str("OPTION: <name>\nPROS: <pro; pro; ...>\nCONS: <con; con; ...>\nEFFORT: <hours>\nRISK: <risk; risk; ...>\n");
        prompt.push_str("Separate blocks with a line containing only ---\n");
        prompt.push_str("Then, after the final block, output:\n");
        prompt.push_str("RECOMMENDATION: <chosen option>\nREASONING: <one sentence>\nCONFIDENCE: <0-100>\n");
        prompt
    }
}
