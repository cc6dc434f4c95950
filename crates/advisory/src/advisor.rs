//! Advisor trait: the single operation the advisory backend exposes.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AdvisoryError;

/// What kind of advice is being requested. Backends may route different task
/// types to different models or prompts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryTask {
    RiskIdentification,
    MitigationPlanning,
    AlternativeGeneration,
    Recommendation,
}

impl std::fmt::Display for AdvisoryTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RiskIdentification => "risk_identification",
            Self::MitigationPlanning => "mitigation_planning",
            Self::AlternativeGeneration => "alternative_generation",
            Self::Recommendation => "recommendation",
        };
        write!(f, "{}", s)
    }
}

/// Free-text advice returned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// Raw response content, parsed downstream by the marker decoder.
    pub content: String,
}

/// Trait for the language-model advisory backend.
///
/// Real implementations call an inference service; tests use
/// [`SimulatedAdvisor`] or [`FailingAdvisor`].
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Request advice for a task.
    async fn advise(
        &self,
        task: AdvisoryTask,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<Advice, AdvisoryError>;
}

/// A simulated advisor returning scripted content per task type.
///
/// Tasks without a scripted response return empty content, which downstream
/// decoders treat the same as an advisory failure.
pub struct SimulatedAdvisor {
    responses: HashMap<AdvisoryTask, String>,
    /// Prompts received, for assertions in tests.
    seen_prompts: Mutex<Vec<(AdvisoryTask, String)>>,
}

impl SimulatedAdvisor {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            seen_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Script the content returned for a task type.
    pub fn with_response(mut self, task: AdvisoryTask, content: impl Into<String>) -> Self {
        self.responses.insert(task, content.into());
        self
    }

    /// Prompts this advisor has received.
    pub fn prompts(&self) -> Vec<(AdvisoryTask, String)> {
        self.seen_prompts.lock().expect("lock not poisoned").clone()
    }
}

impl Default for SimulatedAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Advisor for SimulatedAdvisor {
    async fn advise(
        &self,
        task: AdvisoryTask,
        prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
    ) -> Result<Advice, AdvisoryError> {
        self.seen_prompts
            .lock()
            .expect("lock not poisoned")
            .push((task, prompt.to_string()));
        Ok(Advice {
            content: self.responses.get(&task).cloned().unwrap_or_default(),
        })
    }
}

/// An advisor that always fails, for exercising heuristic fallback paths.
pub struct FailingAdvisor;

#[async_trait]
impl Advisor for FailingAdvisor {
    async fn advise(
        &self,
        _task: AdvisoryTask,
        _prompt: &str,
        _system_prompt: Option<&str>,
        _max_tokens: Option<u32>,
    ) -> Result<Advice, AdvisoryError> {
        Err(AdvisoryError::Unavailable("simulated advisory failure".into()))
    }
}
