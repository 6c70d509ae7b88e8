// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod demo;
mod scripted;

pub use demo::DemoTransport;
pub use scripted::{Call, ScriptedTransport};

use anyhow::{Context, Result};
use std::path::PathBuf;
use verba_app::{DocumentChunk, DocumentDetail, DocumentId, DocumentSummary, Link};

const TOPICS: [&str; 12] = [
    "Hybrid Search",
    "Vector Indexing",
    "Schema Configuration",
    "Backups",
    "Multi-tenancy",
    "Replication",
    "Filtering",
    "Generative Search",
    "Quantization",
    "Tokenization",
    "Reranking",
    "Batch Imports",
];

const KINDS: [&str; 3] = ["Documentation", "Blog", "Video"];

const TITLE_FORMS: [&str; 5] = [
    "{} Overview",
    "Getting Started with {}",
    "{} in Production",
    "Tuning {}",
    "{} Explained",
];

const WORDS: [&str; 32] = [
    "vector",
    "index",
    "query",
    "cluster",
    "shard",
    "embedding",
    "distance",
    "filter",
    "keyword",
    "ranking",
    "module",
    "schema",
    "class",
    "property",
    "tenant",
    "replica",
    "backup",
    "restore",
    "latency",
    "recall",
    "memory",
    "compression",
    "search",
    "hybrid",
    "generative",
    "prompt",
    "chunk",
    "document",
    "token",
    "batch",
    "import",
    "consistency",
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// One stored document with its chunked text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDocument {
    pub summary: DocumentSummary,
    pub detail: DocumentDetail,
    pub chunks: Vec<DocumentChunk>,
}

/// Seeded generator for retrieval corpora. The same seed always yields the
/// same documents, ids and chunk text.
#[derive(Debug, Clone)]
pub struct CorpusFaker {
    rng: DeterministicRng,
    seed: u64,
    issued: u64,
}

impl CorpusFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            issued: 0,
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn document(&mut self) -> FakeDocument {
        self.issued += 1;
        let topic = self.pick(&TOPICS);
        let form = self.pick(&TITLE_FORMS);
        let name = form.replace("{}", topic);
        let kind = self.pick(&KINDS).to_owned();
        let id = DocumentId::new(format!(
            "{:08x}-{:04x}-4000-8000-{:012x}",
            self.seed as u32,
            self.issued as u16,
            self.rng.next_u64() & 0xFFFF_FFFF_FFFF
        ));
        let link = if self.rng.bool() || self.rng.bool() {
            Link::parse(&format!(
                "https://docs.example.com/{}",
                slug(&name)
            ))
        } else {
            Link::placeholder()
        };

        let chunk_count = 2 + self.rng.int_n(4);
        let chunks = (0..chunk_count)
            .map(|index| DocumentChunk {
                text: self.paragraph(topic),
                doc_name: name.clone(),
                chunk_index: index as u32,
                doc_id: id.clone(),
            })
            .collect::<Vec<_>>();
        let full_text = chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        FakeDocument {
            summary: DocumentSummary {
                id,
                name: name.clone(),
                kind,
                link: link.clone(),
            },
            detail: DocumentDetail {
                title: name,
                full_text,
                link,
            },
            chunks,
        }
    }

    pub fn corpus(&mut self, count: usize) -> Vec<FakeDocument> {
        (0..count).map(|_| self.document()).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn paragraph(&mut self, topic: &str) -> String {
        let sentences = 2 + self.rng.int_n(3);
        let mut parts = Vec::with_capacity(sentences + 1);
        parts.push(format!("{topic} covers more than one concern."));
        for _ in 0..sentences {
            parts.push(self.sentence(6, 14));
        }
        parts.join(" ")
    }

    fn sentence(&mut self, min_words: usize, max_words: usize) -> String {
        let span = max_words.saturating_sub(min_words) + 1;
        let count = min_words + self.rng.int_n(span);
        let mut parts = Vec::with_capacity(count);
        for _ in 0..count {
            parts.push(self.pick(&WORDS).to_owned());
        }
        let mut sentence = parts.join(" ");
        if let Some(first) = sentence.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        sentence.push('.');
        sentence
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn topics() -> &'static [&'static str] {
    &TOPICS
}

fn slug(value: &str) -> String {
    value
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
