use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity attached to a [`Document`] when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

/// Raw operation text handed to the parse phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub body: String,
    pub name: String,
}

impl Source {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            name: "request".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl From<&str> for Source {
    fn from(body: &str) -> Self {
        Source::new(body)
    }
}

impl From<String> for Source {
    fn from(body: String) -> Self {
        Source::new(body)
    }
}

/// Parsed operation document.
///
/// The AST is opaque to the orchestrator; it is whatever the engine's parser
/// produced. Every constructed document receives a fresh [`DocumentId`], so
/// two parses of the same text yield two distinct documents.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    ast: Value,
}

impl Document {
    pub fn new(ast: Value) -> Self {
        Self {
            id: DocumentId::next(),
            ast,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn ast(&self) -> &Value {
        &self.ast
    }
}
