//! Decisions produced by upstream analysis.
//!
//! A [`Decision`] is immutable once produced; the only fields attached later
//! are the post-consultation `user_feedback`/`approved` entries in its
//! context bag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The kind of change a decision proposes.
///
/// Serialized as its snake_case name; unrecognized names deserialize as
/// [`DecisionType::Other`] so upstream producers can introduce new types
/// without breaking this core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DecisionType {
    Feature,
    BugFix,
    Refactoring,
    Optimization,
    Architectural,
    Security,
    SelfModification,
    /// Any decision type this core has no special handling for.
    Other,
}

impl From<String> for DecisionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "feature" => Self::Feature,
            "bug_fix" => Self::BugFix,
            "refactoring" => Self::Refactoring,
            "optimization" => Self::Optimization,
            "architectural" => Self::Architectural,
            "security" => Self::Security,
            "self_modification" => Self::SelfModification,
            _ => Self::Other,
        }
    }
}

impl From<DecisionType> for String {
    fn from(t: DecisionType) -> Self {
        t.to_string()
    }
}

impl DecisionType {
    /// Decision types with established precedent that do not require a
    /// consultation on novelty grounds alone.
    pub fn has_precedent(&self) -> bool {
        matches!(
            self,
            Self::Feature | Self::BugFix | Self::Refactoring | Self::Optimization
        )
    }
}

impl std::fmt::Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Feature => "feature",
            Self::BugFix => "bug_fix",
            Self::Refactoring => "refactoring",
            Self::Optimization => "optimization",
            Self::Architectural => "architectural",
            Self::Security => "security",
            Self::SelfModification => "self_modification",
            Self::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// The concrete change a decision proposes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSpec {
    /// Change classification as reported upstream (e.g. "additive", "breaking").
    pub change_type: String,
    /// Files the change touches.
    pub files: Vec<String>,
    /// Human-readable description of the change.
    pub description: String,
}

impl ChangeSpec {
    pub fn new(change_type: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            change_type: change_type.into(),
            files,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the upstream analysis flagged this change as breaking.
    pub fn is_breaking(&self) -> bool {
        self.change_type.eq_ignore_ascii_case("breaking")
    }
}

/// Opaque key-value bag carried alongside a decision.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionContext(pub HashMap<String, serde_json::Value>);

impl DecisionContext {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    /// Attach the human verdict after a consultation. This is the single
    /// mutation a decision context receives post-creation.
    pub fn attach_feedback(&mut self, feedback: impl Into<String>, approved: bool) {
        self.0.insert(
            "user_feedback".into(),
            serde_json::Value::String(feedback.into()),
        );
        self.0.insert("approved".into(), serde_json::Value::Bool(approved));
    }

    pub fn user_feedback(&self) -> Option<&str> {
        self.0.get("user_feedback").and_then(|v| v.as_str())
    }

    pub fn approved(&self) -> Option<bool> {
        self.0.get("approved").and_then(|v| v.as_bool())
    }
}

/// A decision produced by upstream analysis, awaiting governance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Upstream-assigned identifier.
    pub id: String,
    /// Human-readable description of the decision.
    pub description: String,
    /// Decision classification.
    pub decision_type: DecisionType,
    /// Opaque context bag from upstream analysis.
    pub context: DecisionContext,
    /// The proposed change.
    pub change: ChangeSpec,
}

impl Decision {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        decision_type: DecisionType,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            decision_type,
            context: DecisionContext::new(),
            change: ChangeSpec::default(),
        }
    }

    pub fn with_change(mut self, change: ChangeSpec) -> Self {
        self.change = change;
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key, value);
        self
    }
}
