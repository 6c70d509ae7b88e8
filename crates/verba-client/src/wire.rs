// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! JSON bodies exchanged with the retrieval service. Every field is optional
//! on the way in; missing or null values decode to empty defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use verba_app::{
    DocumentChunk, DocumentDetail, DocumentId, DocumentSummary, Link, QueryResponse,
};

#[derive(Debug, Serialize)]
pub(crate) struct QueryPayload<'a> {
    pub query: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DocumentPayload<'a> {
    pub document_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    documents: Option<Vec<SummaryRow>>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryRow {
    #[serde(default)]
    doc_name: Option<String>,
    #[serde(default)]
    doc_type: Option<String>,
    #[serde(default)]
    doc_link: Option<String>,
    #[serde(default, rename = "_additional")]
    additional: Option<Additional>,
}

#[derive(Debug, Default, Deserialize)]
struct Additional {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DetailResponse {
    #[serde(default)]
    document: Option<DetailDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailDocument {
    #[serde(default)]
    properties: Option<DetailProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailProperties {
    #[serde(default)]
    doc_name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    doc_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct QueryResult {
    #[serde(default)]
    documents: Option<Vec<ChunkRow>>,
    #[serde(default)]
    system: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkRow {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    doc_name: Option<String>,
    #[serde(default)]
    chunk_id: Option<Value>,
    #[serde(default)]
    doc_uuid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<Value>,
}

impl MessageBody {
    pub fn into_message(self) -> Option<String> {
        if let Some(message) = self.message
            && !message.is_empty()
        {
            return Some(message);
        }
        match self.detail? {
            Value::String(detail) if !detail.is_empty() => Some(detail),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl ListResponse {
    pub fn into_summaries(self) -> Vec<DocumentSummary> {
        self.documents
            .unwrap_or_default()
            .into_iter()
            .map(|row| DocumentSummary {
                id: DocumentId::new(row.additional.and_then(|extra| extra.id).unwrap_or_default()),
                name: row.doc_name.unwrap_or_default(),
                kind: row.doc_type.unwrap_or_default(),
                link: Link::parse(row.doc_link.as_deref().unwrap_or_default()),
            })
            .collect()
    }
}

impl DetailResponse {
    pub fn into_detail(self) -> DocumentDetail {
        let properties = self
            .document
            .and_then(|document| document.properties)
            .unwrap_or_default();
        DocumentDetail {
            title: properties.doc_name.unwrap_or_default(),
            full_text: properties.text.unwrap_or_default(),
            link: Link::parse(properties.doc_link.as_deref().unwrap_or_default()),
        }
    }
}

impl QueryResult {
    pub fn into_response(self) -> QueryResponse {
        QueryResponse {
            chunks: self
                .documents
                .unwrap_or_default()
                .into_iter()
                .map(|row| DocumentChunk {
                    text: row.text.unwrap_or_default(),
                    doc_name: row.doc_name.unwrap_or_default(),
                    chunk_index: chunk_index(row.chunk_id.as_ref()),
                    doc_id: DocumentId::new(row.doc_uuid.unwrap_or_default()),
                })
                .collect(),
            answer: self.system.filter(|system| !system.is_empty()),
        }
    }
}

/// The service stores chunk ids as numbers that sometimes come back as
/// floats (`3.0`) or strings; anything unusable becomes 0.
fn chunk_index(raw: Option<&Value>) -> u32 {
    let value = match raw {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    value
        .and_then(|value| u32::try_from(value).ok())
        .unwrap_or(0)
}
