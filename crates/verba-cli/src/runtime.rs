// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{debug, warn};
use verba_app::{Completion, Request, Transport};
use verba_tui::{AppRuntime, InternalEvent};

/// Runs each request on its own worker thread and reports the completion
/// back over the UI channel.
pub struct ThreadRuntime<T> {
    transport: Arc<T>,
}

impl<T: Transport + 'static> ThreadRuntime<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }
}

impl<T: Transport + 'static> AppRuntime for ThreadRuntime<T> {
    fn execute(&mut self, request: &Request) -> Completion {
        request.execute(self.transport.as_ref())
    }

    fn spawn_request(&mut self, request: Request, tx: Sender<InternalEvent>) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        let label = request.label();
        thread::Builder::new()
            .name(format!("verba-{label}"))
            .spawn(move || {
                let completion = request.execute(transport.as_ref());
                if tx.send(InternalEvent::Completed(completion)).is_err() {
                    warn!(request = label, "ui channel closed before completion");
                }
            })
            .with_context(|| format!("spawn {label} worker"))?;
        Ok(())
    }

    fn cancel_request(&mut self, request: &Request) -> Result<()> {
        // Blocking calls cannot be interrupted; the session drops the stale
        // completion when it lands.
        debug!(request = request.label(), "request superseded");
        Ok(())
    }
}
