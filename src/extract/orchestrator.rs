use crate::models::ActionItem;

use super::fallback::extract_fallback;
use super::llm::{GroqClient, LlmClient};
use super::parser::parse_extraction_payload;
use super::prompt::{build_user_message, EXTRACTION_SYSTEM_PROMPT};
use super::ExtractionError;
use crate::config;

/// Trimmed inputs shorter than this many characters are not worth a
/// completion round trip and yield an empty full result.
pub const MIN_INPUT_LENGTH: usize = 10;

/// Result of processing a transcript. `Degraded` carries items from the
/// deterministic fallback together with the reason the LLM path was skipped
/// or failed.
#[derive(Debug)]
pub enum Extraction {
    Full(Vec<ActionItem>),
    Degraded {
        items: Vec<ActionItem>,
        reason: ExtractionError,
    },
}

impl Extraction {
    pub fn items(&self) -> &[ActionItem] {
        match self {
            Extraction::Full(items) => items,
            Extraction::Degraded { items, .. } => items,
        }
    }

    pub fn into_items(self) -> Vec<ActionItem> {
        match self {
            Extraction::Full(items) => items,
            Extraction::Degraded { items, .. } => items,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded { .. })
    }

    pub fn degrade_reason(&self) -> Option<&ExtractionError> {
        match self {
            Extraction::Full(_) => None,
            Extraction::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Drives a transcript through length gating, the LLM path, and the
/// deterministic fallback. Never fails: any extraction error is absorbed
/// into a `Degraded` result.
pub struct TranscriptProcessor {
    llm: Option<Box<dyn LlmClient>>,
    model: String,
}

impl TranscriptProcessor {
    pub fn new(llm: Box<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm: Some(llm),
            model: model.into(),
        }
    }

    /// Processor with no LLM backend. All non-trivial inputs take the
    /// fallback path with `Unconfigured` as the reason.
    pub fn unconfigured() -> Self {
        Self {
            llm: None,
            model: config::model(),
        }
    }

    /// Build from the environment: LLM-backed when credentials are present,
    /// unconfigured otherwise.
    pub fn from_env() -> Self {
        match GroqClient::from_env() {
            Some(client) => {
                tracing::info!("Extraction service configured");
                Self::new(Box::new(client), config::model())
            }
            None => {
                tracing::warn!(
                    "{} not set, transcript processing uses line-marker fallback",
                    config::API_KEY_ENV
                );
                Self::unconfigured()
            }
        }
    }

    /// Whether an LLM backend is available. Surfaced by the health probe.
    pub fn is_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub fn process(&self, text: &str) -> Extraction {
        if text.trim().chars().count() < MIN_INPUT_LENGTH {
            tracing::debug!("Input below minimum length, skipping extraction");
            return Extraction::Full(Vec::new());
        }

        let Some(llm) = &self.llm else {
            tracing::warn!("No extraction credentials, using line-marker fallback");
            return Extraction::Degraded {
                items: extract_fallback(text),
                reason: ExtractionError::Unconfigured,
            };
        };

        match extract_via_llm(llm.as_ref(), &self.model, text) {
            Ok(items) => {
                tracing::info!(count = items.len(), "Extraction complete");
                Extraction::Full(items)
            }
            Err(reason) => {
                tracing::warn!(error = %reason, "Extraction failed, using line-marker fallback");
                Extraction::Degraded {
                    items: extract_fallback(text),
                    reason,
                }
            }
        }
    }
}

fn extract_via_llm(
    llm: &dyn LlmClient,
    model: &str,
    text: &str,
) -> Result<Vec<ActionItem>, ExtractionError> {
    let body = llm.complete(model, EXTRACTION_SYSTEM_PROMPT, &build_user_message(text))?;
    parse_extraction_payload(&body)
}
