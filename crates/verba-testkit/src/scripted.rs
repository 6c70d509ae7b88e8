// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use verba_app::{
    DocumentDetail, DocumentId, DocumentSummary, QueryResponse, Transport, TransportError,
};

use crate::FakeDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListDocuments,
    FetchDetail(DocumentId),
    RunQuery(String),
    Health,
}

#[derive(Debug, Default)]
struct Script {
    documents: Option<Result<Vec<DocumentSummary>, TransportError>>,
    details: HashMap<DocumentId, Result<DocumentDetail, TransportError>>,
    queries: HashMap<String, Result<QueryResponse, TransportError>>,
    health: Option<TransportError>,
    calls: Vec<Call>,
}

/// Transport with canned answers keyed by request. Unknown documents answer
/// 404 and unknown queries answer with no chunks.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_corpus(corpus: &[FakeDocument]) -> Self {
        let transport = Self::new()
            .with_documents(corpus.iter().map(|doc| doc.summary.clone()).collect());
        for doc in corpus {
            transport.set_detail(doc.summary.id.clone(), Ok(doc.detail.clone()));
        }
        transport
    }

    pub fn with_documents(self, documents: Vec<DocumentSummary>) -> Self {
        self.lock().documents = Some(Ok(documents));
        self
    }

    pub fn with_detail(self, id: impl Into<DocumentId>, detail: DocumentDetail) -> Self {
        self.set_detail(id.into(), Ok(detail));
        self
    }

    pub fn with_query(self, text: &str, response: QueryResponse) -> Self {
        self.set_query(text, Ok(response));
        self
    }

    pub fn set_detail(&self, id: DocumentId, result: Result<DocumentDetail, TransportError>) {
        self.lock().details.insert(id, result);
    }

    pub fn set_query(&self, text: &str, result: Result<QueryResponse, TransportError>) {
        self.lock().queries.insert(text.to_owned(), result);
    }

    pub fn fail_documents(&self, error: TransportError) {
        self.lock().documents = Some(Err(error));
    }

    pub fn fail_health(&self, error: TransportError) {
        self.lock().health = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ScriptedTransport {
    fn list_documents(&self) -> Result<Vec<DocumentSummary>, TransportError> {
        let mut script = self.lock();
        script.calls.push(Call::ListDocuments);
        script.documents.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn fetch_document_detail(&self, id: &DocumentId) -> Result<DocumentDetail, TransportError> {
        let mut script = self.lock();
        script.calls.push(Call::FetchDetail(id.clone()));
        script.details.get(id).cloned().unwrap_or_else(|| {
            Err(TransportError::Status {
                code: 404,
                message: format!("document {id} not found"),
            })
        })
    }

    fn run_query(&self, text: &str) -> Result<QueryResponse, TransportError> {
        let mut script = self.lock();
        script.calls.push(Call::RunQuery(text.to_owned()));
        script
            .queries
            .get(text)
            .cloned()
            .unwrap_or_else(|| Ok(QueryResponse::default()))
    }

    fn health(&self) -> Result<(), TransportError> {
        let mut script = self.lock();
        script.calls.push(Call::Health);
        match &script.health {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}
