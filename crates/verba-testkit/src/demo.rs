// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::debug;
use verba_app::{
    DocumentChunk, DocumentDetail, DocumentId, DocumentSummary, QueryResponse, Transport,
    TransportError,
};

use crate::{CorpusFaker, DeterministicRng, FakeDocument};

const MAX_CHUNKS: usize = 5;

/// In-memory stand-in for the retrieval service. Every call sleeps for a
/// seeded, jittered delay so overlapping requests finish out of order.
#[derive(Debug)]
pub struct DemoTransport {
    documents: Vec<FakeDocument>,
    latency: Duration,
    jitter: Duration,
    rng: Mutex<DeterministicRng>,
}

impl DemoTransport {
    pub fn new(seed: u64, count: usize) -> Self {
        let documents = CorpusFaker::new(seed).corpus(count);
        Self {
            documents,
            latency: Duration::from_millis(80),
            jitter: Duration::from_millis(400),
            rng: Mutex::new(DeterministicRng::new(seed)),
        }
    }

    pub fn with_latency(mut self, latency: Duration, jitter: Duration) -> Self {
        self.latency = latency;
        self.jitter = jitter;
        self
    }

    pub fn documents(&self) -> &[FakeDocument] {
        &self.documents
    }

    fn pause(&self) {
        let jitter_ms = self.jitter.as_millis() as usize;
        let extra = if jitter_ms == 0 {
            0
        } else {
            self.rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .int_n(jitter_ms + 1)
        };
        let delay = self.latency + Duration::from_millis(extra as u64);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    fn rank(&self, text: &str) -> Vec<DocumentChunk> {
        let terms = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|term| term.len() > 2)
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored = self
            .documents
            .iter()
            .flat_map(|doc| doc.chunks.iter())
            .filter_map(|chunk| {
                let haystack = format!("{} {}", chunk.doc_name, chunk.text).to_lowercase();
                let score = terms
                    .iter()
                    .filter(|term| haystack.contains(term.as_str()))
                    .count();
                (score > 0).then_some((score, chunk))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|left, right| right.0.cmp(&left.0));
        scored
            .into_iter()
            .take(MAX_CHUNKS)
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }
}

impl Transport for DemoTransport {
    fn list_documents(&self) -> Result<Vec<DocumentSummary>, TransportError> {
        self.pause();
        Ok(self
            .documents
            .iter()
            .map(|doc| doc.summary.clone())
            .collect())
    }

    fn fetch_document_detail(&self, id: &DocumentId) -> Result<DocumentDetail, TransportError> {
        self.pause();
        self.documents
            .iter()
            .find(|doc| &doc.summary.id == id)
            .map(|doc| doc.detail.clone())
            .ok_or_else(|| TransportError::Status {
                code: 404,
                message: format!("document {id} not found"),
            })
    }

    fn run_query(&self, text: &str) -> Result<QueryResponse, TransportError> {
        self.pause();
        let chunks = self.rank(text);
        debug!(matches = chunks.len(), "demo query ranked");
        let answer = chunks.first().map(|top| {
            format!(
                "Found {} passage(s). The strongest match is \"{}\".",
                chunks.len(),
                top.doc_name
            )
        });
        Ok(QueryResponse { chunks, answer })
    }

    fn health(&self) -> Result<(), TransportError> {
        Ok(())
    }
}
