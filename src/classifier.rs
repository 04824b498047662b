//! Question Classifier
//!
//! Maps a question to an [`Intent`] with case-insensitive substring matching.
//! Rules are evaluated in table order and the first match wins:
//! - Calculation keywords: most specific, checked first
//! - Metadata keywords: fund listings and attribute filters
//! - Comparison: "compare" together with a metric word
//! - Anything else falls back to document search

use crate::models::{Intent, Question};

/// Static keyword lists, zero allocation
pub const CALCULATION_KEYWORDS: &[&str] = &[
    // Explicit requests
    "calculate", "compute",
    // Risk / return metrics
    "max drawdown", "sharpe ratio", "volatility", "vol", "annualized",
    "correlation", "beta", "alpha", "sortino", "information ratio",
    "treynor ratio", "calmar ratio", "var", "cvar", "skewness", "kurtosis",
    "jensen's alpha",
    // Phrasings that ask for a number
    "what is the", "show me the", "how much", "performance",
];

pub const METADATA_KEYWORDS: &[&str] = &[
    // Listing
    "list", "show", "which", "what funds", "available", "funds in",
    // Attributes
    "geography", "asset type", "instrument type", "strategy", "sub-category",
    // Instrument and asset types
    "hedge fund", "mutual fund", "equity", "fixed income", "market neutral",
    "alternatives", "low vol", "high vol",
    // Geographies
    "global", "asia", "emerging markets", "india", "united states",
    // Sub-categories
    "arbitrage", "global macro", "long short", "cryptocurrency", "technology",
    "credit", "options", "multi-asset",
];

pub const COMPARISON_ANCHOR: &str = "compare";

pub const COMPARISON_METRICS: &[&str] = &["performance", "return", "risk", "ratio"];

/// How a rule inspects the lowercased question
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any keyword present
    AnyOf(&'static [&'static str]),
    /// The anchor and at least one of the companions present
    AnchorWithAny {
        anchor: &'static str,
        companions: &'static [&'static str],
    },
}

impl Matcher {
    pub fn matches(&self, lowered: &str) -> bool {
        match self {
            Matcher::AnyOf(keywords) => keywords.iter().any(|kw| lowered.contains(kw)),
            Matcher::AnchorWithAny { anchor, companions } => {
                lowered.contains(anchor) && companions.iter().any(|kw| lowered.contains(kw))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RoutingRule {
    pub matcher: Matcher,
    pub intent: Intent,
}

/// Ordered routing table. Order encodes priority and must not be rearranged.
pub const ROUTING_RULES: &[RoutingRule] = &[
    RoutingRule {
        matcher: Matcher::AnyOf(CALCULATION_KEYWORDS),
        intent: Intent::CalculationRequired,
    },
    RoutingRule {
        matcher: Matcher::AnyOf(METADATA_KEYWORDS),
        intent: Intent::MetadataQuery,
    },
    RoutingRule {
        matcher: Matcher::AnchorWithAny {
            anchor: COMPARISON_ANCHOR,
            companions: COMPARISON_METRICS,
        },
        intent: Intent::ComparisonRequired,
    },
];

pub const FALLBACK_INTENT: Intent = Intent::DocumentSearch;

/// Question classifier
pub struct QuestionClassifier;

impl QuestionClassifier {
    /// Classify a validated question
    pub fn classify(question: &Question) -> Intent {
        Self::classify_text(question.as_str())
    }

    /// Classify raw text against [`ROUTING_RULES`]
    pub fn classify_text(text: &str) -> Intent {
        let lowered = text.to_lowercase();

        ROUTING_RULES
            .iter()
            .find(|rule| rule.matcher.matches(&lowered))
            .map(|rule| rule.intent)
            .unwrap_or(FALLBACK_INTENT)
    }
}
