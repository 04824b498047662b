//! Answering strategies
//!
//! Each strategy is a pure recipe: (question, knowledge) → one call spec
//! (instructions + tools + call budget). Strategies never issue the call
//! themselves and never check configuration; the dispatcher does both.

use crate::knowledge::KnowledgeComponent;
use crate::models::{Intent, Question};
use crate::responses::{ResponsesRequest, ToolSpec};
use serde::Serialize;
use std::fmt;

pub mod prompts;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_ASSISTANT_NAME: &str = "Fund Analyst";

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    DocumentSearch,
    MetadataAnalysis,
    HybridAnalysis,
}

impl StrategyKind {
    /// Intent → strategy table
    pub fn for_intent(intent: Intent) -> Self {
        match intent {
            Intent::MetadataQuery => StrategyKind::MetadataAnalysis,
            Intent::CalculationRequired | Intent::ComparisonRequired => {
                StrategyKind::HybridAnalysis
            }
            Intent::DocumentSearch => StrategyKind::DocumentSearch,
        }
    }

    /// Knowledge the strategy cannot run without
    pub fn requirements(&self) -> &'static [KnowledgeComponent] {
        match self {
            StrategyKind::DocumentSearch => &[KnowledgeComponent::VectorStore],
            StrategyKind::MetadataAnalysis => &[KnowledgeComponent::MetadataTable],
            StrategyKind::HybridAnalysis => &[
                KnowledgeComponent::ReturnsTable,
                KnowledgeComponent::VectorStore,
            ],
        }
    }

    pub fn max_tool_calls(&self) -> u32 {
        match self {
            StrategyKind::DocumentSearch => 5,
            StrategyKind::MetadataAnalysis => 5,
            StrategyKind::HybridAnalysis => 10,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyKind::DocumentSearch => "document search",
            StrategyKind::MetadataAnalysis => "metadata analysis",
            StrategyKind::HybridAnalysis => "hybrid analysis",
        };
        f.write_str(s)
    }
}

/// Settings shared by every strategy
#[derive(Debug, Clone)]
pub struct StrategySettings {
    pub model: String,
    pub assistant_name: String,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            assistant_name: DEFAULT_ASSISTANT_NAME.to_string(),
        }
    }
}

/// Everything needed for one external call except the question itself
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    pub strategy: StrategyKind,
    pub model: String,
    pub instructions: String,
    pub tools: Vec<ToolSpec>,
    pub max_tool_calls: u32,
}

impl CallSpec {
    pub fn to_request(&self, question: &Question) -> ResponsesRequest {
        ResponsesRequest {
            model: self.model.clone(),
            input: question.as_str().to_string(),
            instructions: self.instructions.clone(),
            tools: self.tools.clone(),
            max_tool_calls: self.max_tool_calls,
        }
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(ToolSpec::name).collect()
    }
}

/// Answer from fund documents only
pub fn document_search(settings: &StrategySettings, vector_store_id: &str) -> CallSpec {
    let kind = StrategyKind::DocumentSearch;
    CallSpec {
        strategy: kind,
        model: settings.model.clone(),
        instructions: prompts::document_search_instructions(&settings.assistant_name),
        tools: vec![ToolSpec::file_search(vector_store_id)],
        max_tool_calls: kind.max_tool_calls(),
    }
}

/// Filter and summarise the fund metadata table with the code interpreter
pub fn metadata_analysis(
    settings: &StrategySettings,
    question: &Question,
    metadata: &str,
) -> CallSpec {
    let kind = StrategyKind::MetadataAnalysis;
    CallSpec {
        strategy: kind,
        model: settings.model.clone(),
        instructions: prompts::metadata_analysis_instructions(
            &settings.assistant_name,
            question.as_str(),
            metadata,
        ),
        tools: vec![ToolSpec::code_interpreter()],
        max_tool_calls: kind.max_tool_calls(),
    }
}

/// Calculations over the returns table, grounded in document retrieval.
/// Missing document context renders as an empty section.
pub fn hybrid_analysis(
    settings: &StrategySettings,
    question: &Question,
    returns: &str,
    vector_store_id: &str,
    document_context: Option<&str>,
) -> CallSpec {
    let kind = StrategyKind::HybridAnalysis;
    CallSpec {
        strategy: kind,
        model: settings.model.clone(),
        instructions: prompts::hybrid_analysis_instructions(
            &settings.assistant_name,
            question.as_str(),
            returns,
            document_context.unwrap_or(""),
        ),
        tools: vec![
            ToolSpec::file_search(vector_store_id),
            ToolSpec::code_interpreter(),
        ],
        max_tool_calls: kind.max_tool_calls(),
    }
}
