// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The single owner of every piece of client state.
//!
//! `Session` never touches the network. Commands hand back [`Request`]s for a
//! runtime to execute; the runtime feeds the tagged [`Completion`]s back
//! through [`Session::apply`] in whatever order they arrive.

use tracing::{debug, info, warn};

use crate::{
    DetailFetch, DocumentDetail, DocumentId, DocumentSummary, FetchOutcome, ListTicket,
    MessageLog, Pane, QueryDispatch, QueryOrdering, QueryOutcome, QueryPipeline, QueryResponse,
    QueryState, QueryTicket, Sequence, Transport, TransportError, ViewKind,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListDocuments { ticket: ListTicket },
    FetchDetail { view: ViewKind, fetch: DetailFetch },
    RunQuery(QueryDispatch),
}

impl Request {
    /// Run the request to completion on the calling thread.
    pub fn execute<T: Transport + ?Sized>(&self, transport: &T) -> Completion {
        match self {
            Self::ListDocuments { ticket } => Completion::Listed {
                ticket: *ticket,
                result: transport.list_documents(),
            },
            Self::FetchDetail { view, fetch } => Completion::Detail {
                view: *view,
                fetch: fetch.clone(),
                result: transport.fetch_document_detail(&fetch.id),
            },
            Self::RunQuery(dispatch) => Completion::Query {
                ticket: dispatch.ticket,
                result: transport.run_query(&dispatch.text),
            },
        }
    }

    /// Completion for a request that never reached the transport.
    pub fn fail(&self, error: TransportError) -> Completion {
        match self {
            Self::ListDocuments { ticket } => Completion::Listed {
                ticket: *ticket,
                result: Err(error),
            },
            Self::FetchDetail { view, fetch } => Completion::Detail {
                view: *view,
                fetch: fetch.clone(),
                result: Err(error),
            },
            Self::RunQuery(dispatch) => Completion::Query {
                ticket: dispatch.ticket,
                result: Err(error),
            },
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::ListDocuments { .. } => "list",
            Self::FetchDetail { .. } => "detail",
            Self::RunQuery(_) => "query",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Listed {
        ticket: ListTicket,
        result: Result<Vec<DocumentSummary>, TransportError>,
    },
    Detail {
        view: ViewKind,
        fetch: DetailFetch,
        result: Result<DocumentDetail, TransportError>,
    },
    Query {
        ticket: QueryTicket,
        result: Result<QueryResponse, TransportError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleKind {
    List,
    Detail,
    Query,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ResultsReplaced {
        view: ViewKind,
        count: usize,
    },
    FocusChanged {
        view: ViewKind,
        id: Option<DocumentId>,
    },
    DetailApplied {
        view: ViewKind,
        id: DocumentId,
    },
    MessageAppended(Sequence),
    FetchingChanged(bool),
    StaleDiscarded(StaleKind),
    Notice(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    RefreshDocuments,
    SubmitQuery(String),
    Focus { view: ViewKind, id: DocumentId },
    FocusIndex { view: ViewKind, index: usize },
    ClearFocus(ViewKind),
}

/// Requests to issue and events to show, produced by one command or one
/// completion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Effects {
    pub requests: Vec<Request>,
    pub events: Vec<SessionEvent>,
}

impl Effects {
    fn push_request(&mut self, request: Request) {
        self.requests.push(request);
    }

    fn push_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }
}

/// Query results feed the query pane and listings feed the explorer pane;
/// the message log and query pipeline are shared.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    query_pane: Pane,
    explorer_pane: Pane,
    log: MessageLog,
    query: QueryPipeline,
    last_list: ListTicket,
}

impl Session {
    pub fn new(ordering: QueryOrdering) -> Self {
        Self {
            query: QueryPipeline::new(ordering),
            ..Self::default()
        }
    }

    pub fn pane(&self, view: ViewKind) -> &Pane {
        match view {
            ViewKind::Query => &self.query_pane,
            ViewKind::Explorer => &self.explorer_pane,
        }
    }

    fn pane_mut(&mut self, view: ViewKind) -> &mut Pane {
        match view {
            ViewKind::Query => &mut self.query_pane,
            ViewKind::Explorer => &mut self.explorer_pane,
        }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn query_state(&self) -> QueryState {
        self.query.state()
    }

    pub fn ordering(&self) -> QueryOrdering {
        self.query.ordering()
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Effects {
        let mut effects = Effects::default();
        match command {
            SessionCommand::RefreshDocuments => {
                self.last_list = self.last_list.next();
                effects.push_request(Request::ListDocuments {
                    ticket: self.last_list,
                });
            }
            SessionCommand::SubmitQuery(text) => {
                let was_fetching = self.query.state().is_fetching();
                let Some(dispatch) = self.query.submit(&text, &mut self.log) else {
                    return effects;
                };
                if let Some(message) = self.log.last() {
                    effects.push_event(SessionEvent::MessageAppended(message.sequence));
                }
                if !was_fetching {
                    effects.push_event(SessionEvent::FetchingChanged(true));
                }
                debug!(ticket = %dispatch.ticket, "dispatching query");
                effects.push_request(Request::RunQuery(dispatch));
            }
            SessionCommand::Focus { view, id } => {
                let row = self.pane(view).results().position_of(&id);
                self.focus_row(view, id, row, &mut effects);
            }
            SessionCommand::FocusIndex { view, index } => {
                if let Some(item) = self.pane(view).results().get(index) {
                    let id = item.doc_id().clone();
                    self.focus_row(view, id, Some(index), &mut effects);
                }
            }
            SessionCommand::ClearFocus(view) => {
                self.clear_focus(view, &mut effects);
            }
        }
        effects
    }

    pub fn apply(&mut self, completion: Completion) -> Effects {
        let mut effects = Effects::default();
        match completion {
            Completion::Listed { ticket, .. } if ticket != self.last_list => {
                debug!(
                    ticket = %ticket,
                    newest = %self.last_list,
                    "discarding superseded document list"
                );
                effects.push_event(SessionEvent::StaleDiscarded(StaleKind::List));
            }
            Completion::Listed { ticket, result } => match result {
                Ok(summaries) => {
                    info!(ticket = %ticket, count = summaries.len(), "document list applied");
                    let pane = &mut self.explorer_pane;
                    pane.results.replace(summaries);
                    effects.push_event(SessionEvent::ResultsReplaced {
                        view: ViewKind::Explorer,
                        count: pane.results.len(),
                    });
                    self.clear_focus(ViewKind::Explorer, &mut effects);
                }
                Err(error) => {
                    warn!(ticket = %ticket, %error, "document list failed");
                    effects.push_event(SessionEvent::Notice(format!(
                        "document list failed: {error}; check [server] base_url"
                    )));
                }
            },
            Completion::Detail {
                view,
                fetch,
                result,
            } => match self.pane_mut(view).focus.resolve(&fetch, result) {
                FetchOutcome::Applied => {
                    info!(doc = %fetch.id, epoch = %fetch.epoch, "document detail applied");
                    effects.push_event(SessionEvent::DetailApplied { view, id: fetch.id });
                }
                FetchOutcome::Superseded => {
                    effects.push_event(SessionEvent::StaleDiscarded(StaleKind::Detail));
                }
                FetchOutcome::Failed(error) => {
                    warn!(doc = %fetch.id, %error, "document detail failed");
                    effects.push_event(SessionEvent::Notice(format!(
                        "document fetch failed: {error}; showing previous document"
                    )));
                }
            },
            Completion::Query { ticket, result } => {
                let outcome = self.query.complete(
                    ticket,
                    result,
                    &mut self.query_pane.results,
                    &mut self.log,
                );
                match outcome {
                    QueryOutcome::Applied {
                        chunk_count,
                        answer,
                        default_focus,
                    } => {
                        info!(ticket = %ticket, chunk_count, "query results applied");
                        effects.push_event(SessionEvent::ResultsReplaced {
                            view: ViewKind::Query,
                            count: chunk_count,
                        });
                        if let Some(sequence) = answer {
                            effects.push_event(SessionEvent::MessageAppended(sequence));
                        }
                        match default_focus {
                            Some(id) => self.focus_row(ViewKind::Query, id, Some(0), &mut effects),
                            None => self.clear_focus(ViewKind::Query, &mut effects),
                        }
                    }
                    QueryOutcome::Superseded => {
                        effects.push_event(SessionEvent::StaleDiscarded(StaleKind::Query));
                    }
                    QueryOutcome::Failed(error) => {
                        warn!(ticket = %ticket, %error, "query failed");
                        effects.push_event(SessionEvent::Notice(format!(
                            "query failed: {error}; check [server] base_url and retry"
                        )));
                    }
                }
                if !self.query.state().is_fetching() {
                    effects.push_event(SessionEvent::FetchingChanged(false));
                }
            }
        }
        effects
    }

    fn focus_row(
        &mut self,
        view: ViewKind,
        id: DocumentId,
        row: Option<usize>,
        effects: &mut Effects,
    ) {
        let fetch = self.pane_mut(view).focus_row(id.clone(), row);
        debug!(view = view.label(), doc = %fetch.id, epoch = %fetch.epoch, "focus changed");
        effects.push_event(SessionEvent::FocusChanged { view, id: Some(id) });
        effects.push_request(Request::FetchDetail { view, fetch });
    }

    fn clear_focus(&mut self, view: ViewKind, effects: &mut Effects) {
        if self.pane_mut(view).clear_focus() {
            effects.push_event(SessionEvent::FocusChanged { view, id: None });
        }
    }
}
