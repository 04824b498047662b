//! Knowledge context
//!
//! Read-only tabular data available to the answering strategies.
//! Loaded once at startup and shared behind an `Arc` for the process lifetime.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::{error, info, warn};

/// A piece of context a strategy may depend on
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeComponent {
    ReturnsTable,
    MetadataTable,
    VectorStore,
}

impl fmt::Display for KnowledgeComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KnowledgeComponent::ReturnsTable => "returns table",
            KnowledgeComponent::MetadataTable => "metadata table",
            KnowledgeComponent::VectorStore => "document vector store",
        };
        f.write_str(s)
    }
}

/// Process-wide knowledge bundle. Every field is independently optional.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeContext {
    returns: Option<String>,
    metadata: Option<String>,
    vector_store_id: Option<String>,
}

impl KnowledgeContext {
    /// Build a context from already-loaded text. Empty text counts as absent.
    pub fn new(
        returns: Option<String>,
        metadata: Option<String>,
        vector_store_id: Option<String>,
    ) -> Self {
        Self {
            returns: returns.filter(|s| !s.is_empty()),
            metadata: metadata.filter(|s| !s.is_empty()),
            vector_store_id: vector_store_id.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Load both tables from disk. A missing or unreadable file degrades the
    /// context instead of failing startup.
    pub async fn load(
        returns_path: &Path,
        metadata_path: &Path,
        vector_store_id: Option<String>,
    ) -> Self {
        let returns = read_table(returns_path, KnowledgeComponent::ReturnsTable).await;
        let metadata = read_table(metadata_path, KnowledgeComponent::MetadataTable).await;

        let context = Self::new(returns, metadata, vector_store_id);
        context.log_summary();
        context
    }

    pub fn returns(&self) -> Option<&str> {
        self.returns.as_deref()
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    pub fn vector_store_id(&self) -> Option<&str> {
        self.vector_store_id.as_deref()
    }

    pub fn has(&self, component: KnowledgeComponent) -> bool {
        match component {
            KnowledgeComponent::ReturnsTable => self.returns.is_some(),
            KnowledgeComponent::MetadataTable => self.metadata.is_some(),
            KnowledgeComponent::VectorStore => self.vector_store_id.is_some(),
        }
    }

    /// Document search plus returns data, the minimum for the default routes
    pub fn is_fully_configured(&self) -> bool {
        self.vector_store_id.is_some() && self.returns.is_some()
    }

    pub fn returns_fingerprint(&self) -> Option<String> {
        self.returns.as_deref().map(fingerprint)
    }

    pub fn metadata_fingerprint(&self) -> Option<String> {
        self.metadata.as_deref().map(fingerprint)
    }

    fn log_summary(&self) {
        match &self.vector_store_id {
            Some(id) => info!(vector_store_id = %id, "Document vector store configured"),
            None => warn!("VECTOR_STORE_ID not set, document retrieval disabled"),
        }
        if let Some(returns) = &self.returns {
            info!(
                chars = returns.len(),
                fingerprint = %fingerprint(returns),
                "Returns table loaded"
            );
        }
        if let Some(metadata) = &self.metadata {
            info!(
                chars = metadata.len(),
                fingerprint = %fingerprint(metadata),
                "Metadata table loaded"
            );
        }
    }
}

async fn read_table(path: &Path, component: KnowledgeComponent) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) if text.is_empty() => {
            warn!(path = %path.display(), "{} file is empty", component);
            None
        }
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "{} file not found", component);
            None
        }
        Err(e) => {
            error!(path = %path.display(), "Failed to load {}: {}", component, e);
            None
        }
    }
}

/// SHA256 of a table, hex encoded
pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
