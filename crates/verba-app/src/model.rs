// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use url::Url;

use crate::ids::{DocumentId, Sequence};

pub const PLACEHOLDER_LINK: &str = "#";

/// A document link as reported by the service. Anything that does not parse
/// as an absolute URL (including the `#` placeholder) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Url(Url),
    Placeholder(String),
}

impl Link {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Placeholder(PLACEHOLDER_LINK.to_owned());
        }
        match Url::parse(trimmed) {
            Ok(url) => Self::Url(url),
            Err(_) => Self::Placeholder(trimmed.to_owned()),
        }
    }

    pub fn placeholder() -> Self {
        Self::Placeholder(PLACEHOLDER_LINK.to_owned())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(url) => url.as_str(),
            Self::Placeholder(raw) => raw,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Url(url) => Some(url),
            Self::Placeholder(_) => None,
        }
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    System,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub sequence: Sequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub kind: String,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    pub doc_name: String,
    pub chunk_index: u32,
    pub doc_id: DocumentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentDetail {
    pub title: String,
    pub full_text: String,
    pub link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResponse {
    pub chunks: Vec<DocumentChunk>,
    pub answer: Option<String>,
}

/// One row of the active result set: either a ranked chunk from a query or a
/// document summary from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultItem {
    Chunk(DocumentChunk),
    Summary(DocumentSummary),
}

impl ResultItem {
    pub fn doc_id(&self) -> &DocumentId {
        match self {
            Self::Chunk(chunk) => &chunk.doc_id,
            Self::Summary(summary) => &summary.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Chunk(chunk) => &chunk.doc_name,
            Self::Summary(summary) => &summary.name,
        }
    }
}

impl From<DocumentChunk> for ResultItem {
    fn from(chunk: DocumentChunk) -> Self {
        Self::Chunk(chunk)
    }
}

impl From<DocumentSummary> for ResultItem {
    fn from(summary: DocumentSummary) -> Self {
        Self::Summary(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentChunk, DocumentSummary, Link, ResultItem};
    use crate::DocumentId;

    #[test]
    fn link_parses_absolute_urls_and_keeps_placeholders() {
        let url = Link::parse("https://weaviate.io/developers");
        assert!(url.url().is_some());
        assert_eq!(url.as_str(), "https://weaviate.io/developers");

        assert_eq!(Link::parse("#"), Link::placeholder());
        assert_eq!(Link::parse("   "), Link::placeholder());
        assert_eq!(
            Link::parse("docs/readme.md"),
            Link::Placeholder("docs/readme.md".to_owned())
        );
    }

    #[test]
    fn result_item_exposes_document_id_for_both_kinds() {
        let chunk = ResultItem::from(DocumentChunk {
            text: "vectors".to_owned(),
            doc_name: "Intro".to_owned(),
            chunk_index: 3,
            doc_id: DocumentId::new("doc-1"),
        });
        let summary = ResultItem::from(DocumentSummary {
            id: DocumentId::new("doc-2"),
            name: "Guide".to_owned(),
            kind: "Documentation".to_owned(),
            link: Link::placeholder(),
        });

        assert_eq!(chunk.doc_id().as_str(), "doc-1");
        assert_eq!(chunk.name(), "Intro");
        assert_eq!(summary.doc_id().as_str(), "doc-2");
        assert_eq!(summary.name(), "Guide");
    }
}
