//! Strategy Dispatcher
//!
//! QUESTION → CLASSIFY → STRATEGY → ONE EXTERNAL CALL → EXTRACT
//!
//! Holds the read-only knowledge context and the external service handle.
//! Configuration is checked once here, before any strategy is built.

use crate::classifier::QuestionClassifier;
use crate::error::RouterError;
use crate::extractor::extract;
use crate::knowledge::KnowledgeContext;
use crate::models::{Intent, NormalizedAnswer, Question};
use crate::responses::ResponsesBackend;
use crate::strategy::{self, CallSpec, StrategyKind, StrategySettings};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Phrases in a document answer that signal missing data
pub const MISSING_DATA_PHRASES: &[&str] = &[
    "data not available",
    "not found in documents",
    "information not provided",
    "no data available",
];

/// Question phrases that ask for a computed figure.
///
/// Every phrase is also a calculation keyword in the classifier, so a question
/// routed to document search never contains one and `CalculationRequested` is
/// only reachable by calling [`Escalation::assess`] directly.
pub const CALCULATION_INDICATORS: &[&str] = &[
    "max drawdown",
    "sharpe ratio",
    "volatility",
    "correlation",
    "calculate",
    "compute",
    "what is the",
    "show me the",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Classifier output alone selects the strategy
    #[default]
    Direct,
    /// Document-search questions may escalate to hybrid analysis
    Escalating,
}

impl FromStr for RoutingMode {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(RoutingMode::Direct),
            "escalating" | "escalate" => Ok(RoutingMode::Escalating),
            other => Err(RouterError::ConfigError(format!(
                "unknown routing mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingMode::Direct => f.write_str("direct"),
            RoutingMode::Escalating => f.write_str("escalating"),
        }
    }
}

/// Why a document answer should be escalated to hybrid analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    MissingData,
    CalculationRequested,
    NotNeeded,
}

impl Escalation {
    /// Text-sniffing heuristic over the document answer and the question.
    /// TODO: replace with a completeness signal returned by the document strategy.
    pub fn assess(question: &Question, document_answer: &str) -> Self {
        let answer = document_answer.to_lowercase();
        if MISSING_DATA_PHRASES.iter().any(|p| answer.contains(p)) {
            return Escalation::MissingData;
        }

        let question = question.as_str().to_lowercase();
        if CALCULATION_INDICATORS.iter().any(|p| question.contains(p)) {
            return Escalation::CalculationRequested;
        }

        Escalation::NotNeeded
    }

    pub fn is_needed(&self) -> bool {
        !matches!(self, Escalation::NotNeeded)
    }
}

/// Result of a routed question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedAnswer {
    pub intent: Intent,
    pub strategy: StrategyKind,
    pub answer: NormalizedAnswer,
}

pub struct Dispatcher {
    backend: Arc<dyn ResponsesBackend>,
    knowledge: Arc<KnowledgeContext>,
    settings: StrategySettings,
    mode: RoutingMode,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn ResponsesBackend>,
        knowledge: Arc<KnowledgeContext>,
        settings: StrategySettings,
    ) -> Self {
        Self {
            backend,
            knowledge,
            settings,
            mode: RoutingMode::Direct,
        }
    }

    pub fn with_mode(mut self, mode: RoutingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeContext {
        &self.knowledge
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    /// Classify and answer a question
    pub async fn answer(&self, question: &Question) -> Result<RoutedAnswer> {
        let intent = QuestionClassifier::classify(question);
        info!(intent = %intent, question = %question.preview(), "Question classified");

        if self.mode == RoutingMode::Escalating && intent == Intent::DocumentSearch {
            return self.answer_with_escalation(question).await;
        }

        let strategy = StrategyKind::for_intent(intent);
        let answer = self.dispatch(intent, question).await?;

        Ok(RoutedAnswer {
            intent,
            strategy,
            answer,
        })
    }

    /// Run the strategy for `intent` with one external call
    pub async fn dispatch(&self, intent: Intent, question: &Question) -> Result<NormalizedAnswer> {
        let spec = self.plan(intent, question)?;
        self.execute(&spec, question).await
    }

    /// Build the call spec for `intent` without issuing it.
    /// Fails with `NotConfiguredError` when required knowledge is missing.
    pub fn plan(&self, intent: Intent, question: &Question) -> Result<CallSpec> {
        self.build(StrategyKind::for_intent(intent), question, None)
    }

    fn ensure_configured(&self, kind: StrategyKind) -> Result<()> {
        if let Some(component) = kind
            .requirements()
            .iter()
            .find(|c| !self.knowledge.has(**c))
        {
            warn!(strategy = %kind, component = %component, "Strategy not configured");
            return Err(RouterError::NotConfiguredError {
                strategy: kind,
                component: *component,
            });
        }
        Ok(())
    }

    fn build(
        &self,
        kind: StrategyKind,
        question: &Question,
        document_context: Option<&str>,
    ) -> Result<CallSpec> {
        self.ensure_configured(kind)?;

        // Presence is guaranteed by ensure_configured
        let vector_store = self.knowledge.vector_store_id().unwrap_or_default();
        let spec = match kind {
            StrategyKind::DocumentSearch => strategy::document_search(&self.settings, vector_store),
            StrategyKind::MetadataAnalysis => strategy::metadata_analysis(
                &self.settings,
                question,
                self.knowledge.metadata().unwrap_or_default(),
            ),
            StrategyKind::HybridAnalysis => strategy::hybrid_analysis(
                &self.settings,
                question,
                self.knowledge.returns().unwrap_or_default(),
                vector_store,
                document_context,
            ),
        };

        Ok(spec)
    }

    async fn execute(&self, spec: &CallSpec, question: &Question) -> Result<NormalizedAnswer> {
        let started = Instant::now();
        info!(
            strategy = %spec.strategy,
            tools = ?spec.tool_names(),
            max_tool_calls = spec.max_tool_calls,
            instruction_chars = spec.instructions.len(),
            "Dispatching to external service"
        );

        let request = spec.to_request(question);
        let response = self
            .backend
            .create(&request)
            .await
            .map_err(|source| RouterError::UpstreamCallError {
                strategy: spec.strategy,
                source,
            })?;

        let answer = extract(&response);
        info!(
            strategy = %spec.strategy,
            chars = answer.text.len(),
            images = answer.images.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Answer extracted"
        );

        Ok(answer)
    }

    /// Document search first, hybrid analysis when the heuristic asks for it
    async fn answer_with_escalation(&self, question: &Question) -> Result<RoutedAnswer> {
        let document_spec = self.build(StrategyKind::DocumentSearch, question, None)?;
        let document_answer = self.execute(&document_spec, question).await?;

        let escalation = Escalation::assess(question, &document_answer.text);
        if !escalation.is_needed() {
            return Ok(RoutedAnswer {
                intent: Intent::DocumentSearch,
                strategy: StrategyKind::DocumentSearch,
                answer: document_answer,
            });
        }

        if let Err(e) = self.ensure_configured(StrategyKind::HybridAnalysis) {
            warn!(reason = ?escalation, "Escalation skipped: {}", e);
            return Ok(RoutedAnswer {
                intent: Intent::DocumentSearch,
                strategy: StrategyKind::DocumentSearch,
                answer: document_answer,
            });
        }

        info!(reason = ?escalation, "Escalating to hybrid analysis");
        let hybrid_spec = self.build(
            StrategyKind::HybridAnalysis,
            question,
            Some(&document_answer.text),
        )?;
        let answer = self.execute(&hybrid_spec, question).await?;

        Ok(RoutedAnswer {
            intent: Intent::DocumentSearch,
            strategy: StrategyKind::HybridAnalysis,
            answer,
        })
    }
}
