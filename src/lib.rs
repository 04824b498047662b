//! Fund Query Router
//!
//! Routes end-user questions about investment funds to one of three
//! answering strategies backed by an external Responses API:
//! - Document search over the fund document vector store
//! - Metadata analysis of the fund metadata table
//! - Hybrid analysis: document retrieval plus calculations on monthly returns
//!
//! REQUEST FLOW:
//! QUESTION → CLASSIFY → DISPATCH → ONE EXTERNAL CALL → EXTRACT → {text, images}

pub mod api;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod knowledge;
pub mod models;
pub mod responses;
pub mod strategy;

pub use error::Result;

// Re-export common types
pub use classifier::QuestionClassifier;
pub use dispatcher::{Dispatcher, RoutedAnswer, RoutingMode};
pub use knowledge::KnowledgeContext;
pub use models::*;
