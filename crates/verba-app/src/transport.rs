// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{DocumentDetail, DocumentId, DocumentSummary, QueryResponse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("cannot reach {url} -- is the retrieval service running? ({message})")]
    Unreachable { url: String, message: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("server error ({code}): {message}")]
    Status { code: u16, message: String },

    #[error("malformed response from {context}: {message}")]
    Malformed { context: String, message: String },
}

/// The three retrieval operations plus a liveness probe. Calls block the
/// calling thread; the UI issues them from worker threads and applies the
/// results in whatever order they come back.
pub trait Transport: Send + Sync {
    fn list_documents(&self) -> Result<Vec<DocumentSummary>, TransportError>;

    fn fetch_document_detail(&self, id: &DocumentId) -> Result<DocumentDetail, TransportError>;

    fn run_query(&self, text: &str) -> Result<QueryResponse, TransportError>;

    fn health(&self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn list_documents(&self) -> Result<Vec<DocumentSummary>, TransportError> {
        (**self).list_documents()
    }

    fn fetch_document_detail(&self, id: &DocumentId) -> Result<DocumentDetail, TransportError> {
        (**self).fetch_document_detail(id)
    }

    fn run_query(&self, text: &str) -> Result<QueryResponse, TransportError> {
        (**self).run_query(text)
    }

    fn health(&self) -> Result<(), TransportError> {
        (**self).health()
    }
}
