// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DocumentId, ResultItem};

/// The ranked rows from the most recent list or query. Insertion order is
/// relevance order and is never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    items: Vec<ResultItem>,
}

impl ResultSet {
    /// Swap in a new sequence wholesale. Nothing from the prior set survives.
    pub fn replace<I>(&mut self, items: I)
    where
        I: IntoIterator,
        I::Item: Into<ResultItem>,
    {
        self.items = items.into_iter().map(Into::into).collect();
    }

    pub fn current(&self) -> &[ResultItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&ResultItem> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&ResultItem> {
        self.items.first()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position_of(&self, id: &DocumentId) -> Option<usize> {
        self.items.iter().position(|item| item.doc_id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::ResultSet;
    use crate::{DocumentChunk, DocumentId, DocumentSummary, Link, ResultItem};

    fn chunk(name: &str, index: u32) -> DocumentChunk {
        DocumentChunk {
            text: format!("{name} excerpt {index}"),
            doc_name: name.to_owned(),
            chunk_index: index,
            doc_id: DocumentId::new(format!("{name}-id")),
        }
    }

    #[test]
    fn replace_discards_previous_items() {
        let mut results = ResultSet::default();
        results.replace(vec![chunk("A", 0), chunk("B", 1)]);
        results.replace(vec![chunk("C", 4)]);

        assert_eq!(results.len(), 1);
        assert_eq!(results.current()[0].name(), "C");
        assert_eq!(results.position_of(&DocumentId::new("A-id")), None);
    }

    #[test]
    fn replace_preserves_ranking_order_over_chunk_index() {
        let mut results = ResultSet::default();
        results.replace(vec![chunk("Z", 9), chunk("Y", 0), chunk("X", 4)]);

        let names = results
            .current()
            .iter()
            .map(ResultItem::name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Z", "Y", "X"]);
    }

    #[test]
    fn replace_with_empty_sequence_is_a_valid_empty_state() {
        let mut results = ResultSet::default();
        results.replace(vec![chunk("A", 0)]);
        results.replace(Vec::<DocumentChunk>::new());

        assert!(results.is_empty());
        assert!(results.first().is_none());
    }

    #[test]
    fn summaries_and_chunks_share_the_same_set() {
        let mut results = ResultSet::default();
        results.replace(vec![DocumentSummary {
            id: DocumentId::new("doc-9"),
            name: "Readme".to_owned(),
            kind: "Documentation".to_owned(),
            link: Link::placeholder(),
        }]);

        assert_eq!(results.position_of(&DocumentId::new("doc-9")), Some(0));
        assert!(matches!(results.get(0), Some(ResultItem::Summary(_))));
    }
}
