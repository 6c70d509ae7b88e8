// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Focus tracking and the detail fetches it drives.
//!
//! Every focus change bumps the epoch and hands back a [`DetailFetch`] tagged
//! with it. Fetches may complete in any order; a completion only reaches the
//! [`DocumentDetailStore`] when its tag still equals the current epoch, so the
//! displayed detail always belongs to the most recent focus request.

use tracing::debug;

use crate::{DocumentDetail, DocumentId, Epoch, TransportError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusState {
    #[default]
    Idle,
    Focused {
        id: DocumentId,
        epoch: Epoch,
    },
}

/// A detail request issued for one focus change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFetch {
    pub id: DocumentId,
    pub epoch: Epoch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The response belongs to an older focus request and was dropped.
    Superseded,
    /// The live request failed; the previously accepted detail stays put.
    Failed(TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedDetail {
    pub id: DocumentId,
    pub epoch: Epoch,
    pub detail: DocumentDetail,
}

/// Last accepted detail payload. Overwritten on acceptance, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentDetailStore {
    accepted: Option<AcceptedDetail>,
}

impl DocumentDetailStore {
    pub fn current(&self) -> Option<&DocumentDetail> {
        self.accepted.as_ref().map(|accepted| &accepted.detail)
    }

    pub fn accepted(&self) -> Option<&AcceptedDetail> {
        self.accepted.as_ref()
    }

    fn install(&mut self, id: DocumentId, epoch: Epoch, detail: DocumentDetail) {
        self.accepted = Some(AcceptedDetail { id, epoch, detail });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FocusController {
    state: FocusState,
    epoch: Epoch,
    store: DocumentDetailStore,
}

impl FocusController {
    /// Focus `id` immediately and return the fetch to issue for it. Focusing
    /// the same id twice still issues a second fetch.
    pub fn set_focus(&mut self, id: DocumentId) -> DetailFetch {
        self.epoch = self.epoch.next();
        self.state = FocusState::Focused {
            id: id.clone(),
            epoch: self.epoch,
        };
        DetailFetch {
            id,
            epoch: self.epoch,
        }
    }

    /// Drop focus. In-flight fetches keep running but can no longer match.
    pub fn clear(&mut self) {
        self.epoch = self.epoch.next();
        self.state = FocusState::Idle;
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn focused_id(&self) -> Option<&DocumentId> {
        match &self.state {
            FocusState::Idle => None,
            FocusState::Focused { id, .. } => Some(id),
        }
    }

    pub fn detail(&self) -> &DocumentDetailStore {
        &self.store
    }

    pub fn is_live(&self, fetch: &DetailFetch) -> bool {
        match &self.state {
            FocusState::Focused { id, epoch } => *epoch == fetch.epoch && *id == fetch.id,
            FocusState::Idle => false,
        }
    }

    pub fn resolve(
        &mut self,
        fetch: &DetailFetch,
        result: Result<DocumentDetail, TransportError>,
    ) -> FetchOutcome {
        if !self.is_live(fetch) {
            debug!(
                doc = %fetch.id,
                epoch = %fetch.epoch,
                current = %self.epoch,
                "discarding superseded detail response"
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(detail) => {
                self.store.install(fetch.id.clone(), fetch.epoch, detail);
                FetchOutcome::Applied
            }
            Err(error) => FetchOutcome::Failed(error),
        }
    }
}
