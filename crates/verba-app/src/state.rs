// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Query,
    Explorer,
}

impl ViewKind {
    pub const ALL: [Self; 2] = [Self::Query, Self::Explorer];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Explorer => "explorer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "query" => Some(Self::Query),
            "explorer" => Some(Self::Explorer),
            _ => None,
        }
    }
}

/// Which pane receives arrow keys and typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFocus {
    Prompt,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: ViewKind,
    pub input: InputFocus,
    pub explorer_loaded: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: ViewKind::Query,
            input: InputFocus::Prompt,
            explorer_loaded: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    ShowView(ViewKind),
    ToggleInputFocus,
    MarkExplorerLoaded,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    InputFocusChanged(InputFocus),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => {
                let views = ViewKind::ALL;
                let current = views
                    .iter()
                    .position(|view| *view == self.view)
                    .unwrap_or(0);
                self.switch_view(views[(current + 1) % views.len()])
            }
            AppCommand::ShowView(view) => self.switch_view(view),
            AppCommand::ToggleInputFocus => {
                self.input = match self.input {
                    InputFocus::Prompt => InputFocus::Results,
                    InputFocus::Results => InputFocus::Prompt,
                };
                vec![AppEvent::InputFocusChanged(self.input)]
            }
            AppCommand::MarkExplorerLoaded => {
                self.explorer_loaded = true;
                Vec::new()
            }
            AppCommand::SetStatus(message) => {
                self.status_line = Some(message.clone());
                vec![AppEvent::StatusUpdated(message)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn switch_view(&mut self, view: ViewKind) -> Vec<AppEvent> {
        if self.view == view {
            return Vec::new();
        }
        self.view = view;
        self.input = match view {
            ViewKind::Query => InputFocus::Prompt,
            ViewKind::Explorer => InputFocus::Results,
        };
        vec![
            AppEvent::ViewChanged(view),
            AppEvent::InputFocusChanged(self.input),
        ]
    }
}
