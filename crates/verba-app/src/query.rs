// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::{
    DocumentId, MessageLog, QueryResponse, QueryTicket, ResultSet, Role, Sequence, TransportError,
};

/// How overlapping query responses are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOrdering {
    /// Every successful response replaces the result set; the later arrival
    /// wins even when it answers an earlier submission.
    #[default]
    ArrivalOrder,
    /// A response older than one already applied is dropped.
    LatestSubmission,
}

impl QueryOrdering {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ArrivalOrder => "arrival",
            Self::LatestSubmission => "latest",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "arrival" => Some(Self::ArrivalOrder),
            "latest" => Some(Self::LatestSubmission),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryState {
    in_flight: usize,
}

impl QueryState {
    pub fn is_fetching(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Releases one in-flight slot when dropped, whichever way completion exits.
struct InFlightSlot<'a>(&'a mut QueryState);

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.0.in_flight = self.0.in_flight.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDispatch {
    pub ticket: QueryTicket,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Applied {
        chunk_count: usize,
        answer: Option<Sequence>,
        default_focus: Option<DocumentId>,
    },
    Superseded,
    Failed(TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPipeline {
    state: QueryState,
    ordering: QueryOrdering,
    last_ticket: QueryTicket,
    newest_applied: QueryTicket,
}

impl QueryPipeline {
    pub fn new(ordering: QueryOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    pub fn ordering(&self) -> QueryOrdering {
        self.ordering
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Record the user's message and open a request. Blank input is a no-op.
    pub fn submit(&mut self, text: &str, log: &mut MessageLog) -> Option<QueryDispatch> {
        if text.trim().is_empty() {
            return None;
        }

        log.append(Role::User, text);
        self.state.in_flight = self.state.in_flight.saturating_add(1);
        self.last_ticket = self.last_ticket.next();
        Some(QueryDispatch {
            ticket: self.last_ticket,
            text: text.to_owned(),
        })
    }

    pub fn complete(
        &mut self,
        ticket: QueryTicket,
        result: Result<QueryResponse, TransportError>,
        results: &mut ResultSet,
        log: &mut MessageLog,
    ) -> QueryOutcome {
        let _slot = InFlightSlot(&mut self.state);

        let response = match result {
            Ok(response) => response,
            Err(error) => return QueryOutcome::Failed(error),
        };

        if self.ordering == QueryOrdering::LatestSubmission && ticket < self.newest_applied {
            debug!(
                ticket = %ticket,
                newest = %self.newest_applied,
                "discarding superseded query response"
            );
            return QueryOutcome::Superseded;
        }
        self.newest_applied = self.newest_applied.max(ticket);

        let chunk_count = response.chunks.len();
        results.replace(response.chunks);
        let answer = response
            .answer
            .filter(|answer| !answer.is_empty())
            .map(|answer| log.append(Role::System, answer));

        QueryOutcome::Applied {
            chunk_count,
            answer,
            default_focus: results.first().map(|item| item.doc_id().clone()),
        }
    }
}
