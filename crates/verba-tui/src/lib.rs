// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod list_view;

pub use list_view::{ListView, VisibleRow};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use verba_app::{
    AppCommand, AppState, Completion, DetailFetch, Effects, InputFocus, PLACEHOLDER_LINK, Request,
    ResultItem, Role, Session, SessionCommand, SessionEvent, TransportError, ViewKind,
};

const DETAIL_PAGE_ROWS: u16 = 10;
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Executes the requests a [`Session`] hands out. Implementations decide
/// where the blocking transport call runs; completions always come back to
/// the UI loop through `tx`.
pub trait AppRuntime {
    fn execute(&mut self, request: &Request) -> Completion;

    fn spawn_request(&mut self, request: Request, tx: Sender<InternalEvent>) -> Result<()> {
        let completion = self.execute(&request);
        tx.send(InternalEvent::Completed(completion))
            .map_err(|_| anyhow!("request channel closed"))?;
        Ok(())
    }

    /// Hint that `request` is no longer wanted. Results of a cancelled
    /// request may still arrive and are filtered by the session.
    fn cancel_request(&mut self, _request: &Request) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Completed(Completion),
}

/// Scroll window and outstanding detail fetch for one view's result list.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PaneView {
    list: ListView,
    pending_detail: Option<DetailFetch>,
}

impl PaneView {
    fn new(overscan: usize) -> Self {
        Self {
            list: ListView::new(1, overscan),
            pending_detail: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    prompt: String,
    query: PaneView,
    explorer: PaneView,
    results_area: Rect,
    detail_scroll: u16,
    status_token: u64,
    help_visible: bool,
}

impl ViewData {
    fn new(overscan: usize) -> Self {
        Self {
            prompt: String::new(),
            query: PaneView::new(overscan),
            explorer: PaneView::new(overscan),
            results_area: Rect::default(),
            detail_scroll: 0,
            status_token: 0,
            help_visible: false,
        }
    }

    fn pane(&self, view: ViewKind) -> &PaneView {
        match view {
            ViewKind::Query => &self.query,
            ViewKind::Explorer => &self.explorer,
        }
    }

    fn pane_mut(&mut self, view: ViewKind) -> &mut PaneView {
        match view {
            ViewKind::Query => &mut self.query,
            ViewKind::Explorer => &mut self.explorer,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BodyAreas {
    messages: Option<Rect>,
    prompt: Option<Rect>,
    results: Rect,
    detail: Rect,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    overscan: usize,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(overscan);
    let (internal_tx, internal_rx) = mpsc::channel();

    if state.view == ViewKind::Explorer {
        load_explorer(state, session, runtime, &mut view_data, &internal_tx);
    }

    let mut result = Ok(());
    loop {
        process_internal_events(state, session, runtime, &mut view_data, &internal_tx, &internal_rx);

        match terminal.size() {
            Ok(size) => sync_layout(state, &mut view_data, Rect::new(0, 0, size.width, size.height)),
            Err(error) => {
                result = Err(error).context("read terminal size");
                break;
            }
        }

        if let Err(error) = terminal.draw(|frame| render(frame, state, session, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let next = match event::poll(Duration::from_millis(120)) {
            Ok(true) => event::read().map(Some),
            Ok(false) => Ok(None),
            Err(error) => Err(error),
        };
        let next = match next {
            Ok(next) => next,
            Err(error) => {
                result = Err(error).context("read terminal event");
                break;
            }
        };
        if let Some(event) = next {
            match event {
                Event::Key(key) => {
                    if handle_key_event(state, session, runtime, &mut view_data, &internal_tx, key)
                    {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(state, session, runtime, &mut view_data, &internal_tx, mouse);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen, DisableMouseCapture)
        .context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Completed(completion) => {
                if let Completion::Detail { view, fetch, .. } = &completion {
                    let pane = view_data.pane_mut(*view);
                    if pane.pending_detail.as_ref() == Some(fetch) {
                        pane.pending_detail = None;
                    }
                }
                let effects = session.apply(completion);
                apply_effects(state, session, runtime, view_data, tx, effects);
            }
        }
    }
}

fn apply_effects<R: AppRuntime>(
    state: &mut AppState,
    session: &Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    effects: Effects,
) {
    for event in effects.events {
        match event {
            SessionEvent::ResultsReplaced { view, count } => {
                let list = &mut view_data.pane_mut(view).list;
                list.set_item_count(count);
                list.scroll_to(0);
            }
            SessionEvent::FocusChanged { view, .. } => {
                if view == state.view {
                    view_data.detail_scroll = 0;
                }
                if let Some(row) = session.pane(view).focused_row() {
                    view_data.pane_mut(view).list.ensure_visible(row);
                }
            }
            SessionEvent::DetailApplied { view, .. } => {
                if view == state.view {
                    view_data.detail_scroll = 0;
                }
            }
            SessionEvent::Notice(message) => {
                emit_status(state, view_data, tx, message);
            }
            SessionEvent::MessageAppended(_)
            | SessionEvent::FetchingChanged(_)
            | SessionEvent::StaleDiscarded(_) => {}
        }
    }

    for request in effects.requests {
        if let Request::FetchDetail { view, fetch } = &request
            && let Some(previous) = view_data.pane_mut(*view).pending_detail.replace(fetch.clone())
        {
            let doc = previous.id.clone();
            let superseded = Request::FetchDetail {
                view: *view,
                fetch: previous,
            };
            if let Err(error) = runtime.cancel_request(&superseded) {
                warn!(%doc, %error, "detail cancel failed");
            }
        }
        debug!(kind = request.label(), "spawning request");
        if let Err(error) = runtime.spawn_request(request.clone(), tx.clone()) {
            warn!(kind = request.label(), %error, "request could not start");
            let completion = request.fail(TransportError::Unreachable {
                url: request.label().to_owned(),
                message: error.to_string(),
            });
            if let Err(error) = tx.send(InternalEvent::Completed(completion)) {
                warn!(kind = request.label(), %error, "failed request dropped; ui loop is gone");
            }
        }
    }
}

fn dispatch_session<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: SessionCommand,
) {
    let effects = session.dispatch(command);
    apply_effects(state, session, runtime, view_data, tx, effects);
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        if sender.send(InternalEvent::ClearStatus { token }).is_err() {
            debug!(token, "status clear dropped; ui loop is gone");
        }
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn load_explorer<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if state.explorer_loaded {
        return;
    }
    state.dispatch(AppCommand::MarkExplorerLoaded);
    dispatch_session(state, session, runtime, view_data, tx, SessionCommand::RefreshDocuments);
}

fn move_selection<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let view = state.view;
    let pane = session.pane(view);
    let count = pane.results().len();
    if count == 0 {
        return;
    }
    let target = match pane.focused_row() {
        Some(row) => row.saturating_add_signed(delta).min(count - 1),
        None if delta < 0 => count - 1,
        None => 0,
    };
    if pane.focused_row() == Some(target) {
        return;
    }
    dispatch_session(
        state,
        session,
        runtime,
        view_data,
        tx,
        SessionCommand::FocusIndex {
            view,
            index: target,
        },
    );
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let view = state.view;

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match key.code {
        KeyCode::Char('q' | 'c') if ctrl => return true,
        KeyCode::Char('r') if ctrl => {
            dispatch_session(
                state,
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::RefreshDocuments,
            );
            return false;
        }
        KeyCode::F(1) => {
            view_data.help_visible = true;
            return false;
        }
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextView);
            view_data.detail_scroll = 0;
            if state.view == ViewKind::Explorer {
                load_explorer(state, session, runtime, view_data, internal_tx);
            }
            return false;
        }
        KeyCode::BackTab => {
            if state.view == ViewKind::Query {
                state.dispatch(AppCommand::ToggleInputFocus);
            }
            return false;
        }
        KeyCode::Esc => {
            dispatch_session(
                state,
                session,
                runtime,
                view_data,
                internal_tx,
                SessionCommand::ClearFocus(view),
            );
            return false;
        }
        KeyCode::Up => {
            move_selection(state, session, runtime, view_data, internal_tx, -1);
            return false;
        }
        KeyCode::Down => {
            move_selection(state, session, runtime, view_data, internal_tx, 1);
            return false;
        }
        KeyCode::PageUp => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_sub(DETAIL_PAGE_ROWS);
            return false;
        }
        KeyCode::PageDown => {
            view_data.detail_scroll = view_data.detail_scroll.saturating_add(DETAIL_PAGE_ROWS);
            return false;
        }
        _ => {}
    }

    match state.input {
        InputFocus::Prompt => match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut view_data.prompt);
                if text.trim().is_empty() {
                    return false;
                }
                dispatch_session(
                    state,
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::SubmitQuery(text),
                );
            }
            KeyCode::Backspace => {
                view_data.prompt.pop();
            }
            KeyCode::Char(ch) if !ctrl => {
                view_data.prompt.push(ch);
            }
            _ => {}
        },
        InputFocus::Results => match key.code {
            KeyCode::Char('j') => {
                move_selection(state, session, runtime, view_data, internal_tx, 1);
            }
            KeyCode::Char('k') => {
                move_selection(state, session, runtime, view_data, internal_tx, -1);
            }
            KeyCode::Char('g') | KeyCode::Home => {
                if !session.pane(view).results().is_empty() {
                    dispatch_session(
                        state,
                        session,
                        runtime,
                        view_data,
                        internal_tx,
                        SessionCommand::FocusIndex { view, index: 0 },
                    );
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                if let Some(last) = session.pane(view).results().len().checked_sub(1) {
                    dispatch_session(
                        state,
                        session,
                        runtime,
                        view_data,
                        internal_tx,
                        SessionCommand::FocusIndex { view, index: last },
                    );
                }
            }
            KeyCode::Enter => {
                if let Some(row) = session.pane(view).focused_row() {
                    dispatch_session(
                        state,
                        session,
                        runtime,
                        view_data,
                        internal_tx,
                        SessionCommand::FocusIndex { view, index: row },
                    );
                }
            }
            KeyCode::Char('?') => {
                view_data.help_visible = true;
            }
            _ => {}
        },
    }

    false
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    session: &mut Session,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    let area = view_data.results_area;
    let inside = mouse.column > area.x
        && mouse.column < area.right().saturating_sub(1)
        && mouse.row > area.y
        && mouse.row < area.bottom().saturating_sub(1);
    if !inside {
        return;
    }
    let view = state.view;
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let line = usize::from(mouse.row - area.y - 1);
            if let Some(index) = view_data.pane(view).list.row_at(line) {
                dispatch_session(
                    state,
                    session,
                    runtime,
                    view_data,
                    internal_tx,
                    SessionCommand::FocusIndex { view, index },
                );
            }
        }
        MouseEventKind::ScrollDown => view_data.pane_mut(view).list.scroll_by(3),
        MouseEventKind::ScrollUp => view_data.pane_mut(view).list.scroll_by(-3),
        _ => {}
    }
}

fn body_areas(view: ViewKind, body: Rect) -> BodyAreas {
    match view {
        ViewKind::Query => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(35),
                    Constraint::Percentage(25),
                    Constraint::Percentage(40),
                ])
                .split(body);
            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(3), Constraint::Length(3)])
                .split(columns[0]);
            BodyAreas {
                messages: Some(left[0]),
                prompt: Some(left[1]),
                results: columns[1],
                detail: columns[2],
            }
        }
        ViewKind::Explorer => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
                .split(body);
            BodyAreas {
                messages: None,
                prompt: None,
                results: columns[0],
                detail: columns[1],
            }
        }
    }
}

fn screen_areas(area: Rect) -> [Rect; 3] {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);
    [layout[0], layout[1], layout[2]]
}

fn sync_layout(state: &AppState, view_data: &mut ViewData, area: Rect) {
    let [_, body, _] = screen_areas(area);
    for view in ViewKind::ALL {
        let results = body_areas(view, body).results;
        if view == state.view {
            view_data.results_area = results;
        }
        view_data
            .pane_mut(view)
            .list
            .set_height(usize::from(results.height.saturating_sub(2)));
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, session: &Session, view_data: &ViewData) {
    let [header, body, footer] = screen_areas(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let tabs = Tabs::new(ViewKind::ALL.iter().map(|view| view.label()).collect::<Vec<_>>())
        .block(Block::default().title("verba").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, header);

    let areas = body_areas(state.view, body);
    if let Some(area) = areas.messages {
        let height = usize::from(area.height.saturating_sub(2));
        let lines = message_log_lines(session, height);
        let messages = Paragraph::new(lines.join("\n"))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("messages").borders(Borders::ALL));
        frame.render_widget(messages, area);
    }
    if let Some(area) = areas.prompt {
        let prompt = Paragraph::new(format!("> {}", view_data.prompt)).block(
            Block::default()
                .title("ask")
                .borders(Borders::ALL)
                .border_style(pane_style(state.input == InputFocus::Prompt)),
        );
        frame.render_widget(prompt, area);
    }

    render_results(frame, areas.results, state, session, view_data);

    let detail = Paragraph::new(detail_text(state, session))
        .wrap(Wrap { trim: false })
        .scroll((view_data.detail_scroll, 0))
        .block(
            Block::default()
                .title(detail_title(state, session))
                .borders(Borders::ALL),
        );
    frame.render_widget(detail, areas.detail);

    let status = Paragraph::new(status_text(state, session))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, footer);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_results(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    session: &Session,
    view_data: &ViewData,
) {
    let list = &view_data.pane(state.view).list;
    let pane = session.pane(state.view);
    let height = list.height() as isize;
    let focused = pane.focused_row();
    let items = pane.results().current();
    let lines = list
        .render_with(|row| {
            if row.top < 0 || row.top >= height {
                return None;
            }
            let item = items.get(row.index)?;
            let label = result_row_label(row.index, item);
            let style = if focused == Some(row.index) {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Some(Line::styled(label, style))
        })
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    let title = match state.view {
        ViewKind::Query => format!("chunks ({})", items.len()),
        ViewKind::Explorer => format!("documents ({})", items.len()),
    };
    let list = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(pane_style(state.input == InputFocus::Results)),
    );
    frame.render_widget(list, area);
}

fn pane_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn result_row_label(index: usize, item: &ResultItem) -> String {
    match item {
        ResultItem::Chunk(chunk) => format!("{}. {}", index + 1, chunk.doc_name),
        ResultItem::Summary(summary) if summary.kind.is_empty() => summary.name.clone(),
        ResultItem::Summary(summary) => format!("{} [{}]", summary.name, summary.kind),
    }
}

/// The newest messages that fit in `height` lines, plus the fetching
/// indicator while a query is outstanding.
fn message_log_lines(session: &Session, height: usize) -> Vec<String> {
    let mut lines = session
        .log()
        .entries()
        .iter()
        .map(|message| {
            let label = match message.role {
                Role::User => "you",
                Role::System => "verba",
            };
            format!("{label}: {}", message.content)
        })
        .collect::<Vec<_>>();

    if session.query_state().is_fetching() {
        lines.push("verba: searching...".to_owned());
    }
    if lines.is_empty() {
        lines.push("Ask a question about your documents.".to_owned());
    }

    let keep = lines.len().saturating_sub(height.max(1));
    lines.split_off(keep)
}

fn detail_title(state: &AppState, session: &Session) -> String {
    match session.pane(state.view).shown_detail() {
        Some(detail) if !detail.title.is_empty() => detail.title.clone(),
        _ => "detail".to_owned(),
    }
}

fn detail_text(state: &AppState, session: &Session) -> String {
    let mut lines = Vec::new();
    let pane = session.pane(state.view);

    let focused_id = pane.focus().focused_id();
    let accepted_id = pane.detail().accepted().map(|accepted| &accepted.id);
    if let Some(id) = focused_id
        && accepted_id != Some(id)
    {
        let name = pane
            .focused_item()
            .map(|item| item.name().to_owned())
            .unwrap_or_else(|| id.to_string());
        lines.push(format!("loading {name}..."));
        lines.push(String::new());
    }

    if state.view == ViewKind::Query
        && let Some(ResultItem::Chunk(chunk)) = pane.focused_item()
    {
        lines.push(format!("extract (chunk {}):", chunk.chunk_index));
        lines.push(chunk.text.clone());
        lines.push(String::new());
    }

    match pane.shown_detail() {
        Some(detail) => {
            if detail.link.as_str() != PLACEHOLDER_LINK {
                lines.push(detail.link.as_str().to_owned());
                lines.push(String::new());
            }
            lines.push(detail.full_text.clone());
        }
        None if lines.is_empty() => {
            lines.push("Select a result to read the document.".to_owned());
        }
        None => {}
    }

    lines.join("\n")
}

fn status_text(state: &AppState, session: &Session) -> String {
    let hints = match (state.view, state.input) {
        (ViewKind::Query, InputFocus::Prompt) => {
            "enter ask | up/down select | shift+tab results | tab explorer | f1 help | ctrl+q quit"
        }
        (ViewKind::Query, InputFocus::Results) => {
            "j/k select | enter reload | shift+tab prompt | tab explorer | ? help | ctrl+q quit"
        }
        (ViewKind::Explorer, _) => {
            "j/k select | ctrl+r refresh | esc clear | tab query | ? help | ctrl+q quit"
        }
    };
    let fetching = if session.query_state().is_fetching() {
        " | fetching"
    } else {
        ""
    };
    match &state.status_line {
        Some(status) => format!("{status}{fetching} | {hints}"),
        None => format!("{}{fetching} | {hints}", state.view.label()),
    }
}

fn help_overlay_text() -> &'static str {
    "global: tab switch view | ctrl+r reload documents | esc clear focus | ctrl+q quit\n\
select: up/down or j/k | g/G first/last | enter reload detail | click a row\n\
query: type a question | enter send | shift+tab move between prompt and results\n\
detail: pgup/pgdn scroll\n\
any key closes this help"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InternalEvent, ViewData, detail_text, detail_title, handle_key_event,
        handle_mouse_event, message_log_lines, process_internal_events, result_row_label,
        status_text, sync_layout,
    };
    use anyhow::anyhow;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;
    use std::sync::mpsc;
    use verba_app::{
        AppState, Completion, DocumentChunk, DocumentDetail, DocumentId, DocumentSummary,
        InputFocus, Link, QueryOrdering, QueryResponse, Request, ResultItem, Session,
        TransportError, ViewKind,
    };
    use verba_testkit::{Call, CorpusFaker, ScriptedTransport};

    /// Holds every spawned request so tests choose the completion order.
    #[derive(Debug, Default)]
    struct TestRuntime {
        spawned: Vec<Request>,
        cancelled: Vec<Request>,
    }

    impl AppRuntime for TestRuntime {
        fn execute(&mut self, _request: &Request) -> Completion {
            unreachable!("test runtime never executes inline")
        }

        fn spawn_request(
            &mut self,
            request: Request,
            _tx: mpsc::Sender<InternalEvent>,
        ) -> anyhow::Result<()> {
            self.spawned.push(request);
            Ok(())
        }

        fn cancel_request(&mut self, request: &Request) -> anyhow::Result<()> {
            self.cancelled.push(request.clone());
            Ok(())
        }
    }

    impl TestRuntime {
        fn detail_fetches(&self) -> Vec<Request> {
            self.spawned
                .iter()
                .filter(|request| matches!(request, Request::FetchDetail { .. }))
                .cloned()
                .collect()
        }
    }

    /// Spawns like `TestRuntime` but refuses every cancellation.
    #[derive(Debug, Default)]
    struct StubbornRuntime(TestRuntime);

    impl AppRuntime for StubbornRuntime {
        fn execute(&mut self, request: &Request) -> Completion {
            self.0.execute(request)
        }

        fn spawn_request(
            &mut self,
            request: Request,
            tx: mpsc::Sender<InternalEvent>,
        ) -> anyhow::Result<()> {
            self.0.spawn_request(request, tx)
        }

        fn cancel_request(&mut self, _request: &Request) -> anyhow::Result<()> {
            Err(anyhow!("worker already finished"))
        }
    }

    /// Refuses to start anything.
    struct OfflineRuntime;

    impl AppRuntime for OfflineRuntime {
        fn execute(&mut self, _request: &Request) -> Completion {
            unreachable!("offline runtime never executes")
        }

        fn spawn_request(
            &mut self,
            _request: Request,
            _tx: mpsc::Sender<InternalEvent>,
        ) -> anyhow::Result<()> {
            Err(anyhow!("worker pool exhausted"))
        }
    }

    /// Runs each request immediately against a scripted transport.
    struct InlineRuntime(ScriptedTransport);

    impl AppRuntime for InlineRuntime {
        fn execute(&mut self, request: &Request) -> Completion {
            request.execute(&self.0)
        }
    }

    struct Harness {
        state: AppState,
        session: Session,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::channel();
            let mut view_data = ViewData::new(2);
            view_data.query.list.set_height(10);
            view_data.explorer.list.set_height(10);
            Self {
                state: AppState::default(),
                session: Session::new(QueryOrdering::ArrivalOrder),
                view_data,
                tx,
                rx,
            }
        }

        fn key<R: AppRuntime>(&mut self, runtime: &mut R, code: KeyCode) -> bool {
            self.key_with(runtime, code, KeyModifiers::NONE)
        }

        fn key_with<R: AppRuntime>(
            &mut self,
            runtime: &mut R,
            code: KeyCode,
            modifiers: KeyModifiers,
        ) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.session,
                runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            );
            self.pump(runtime);
            quit
        }

        fn type_text<R: AppRuntime>(&mut self, runtime: &mut R, text: &str) {
            for ch in text.chars() {
                self.key(runtime, KeyCode::Char(ch));
            }
        }

        fn deliver<R: AppRuntime>(&mut self, runtime: &mut R, completion: Completion) {
            self.tx
                .send(InternalEvent::Completed(completion))
                .expect("channel open");
            self.pump(runtime);
        }

        fn pump<R: AppRuntime>(&mut self, runtime: &mut R) {
            process_internal_events(
                &mut self.state,
                &mut self.session,
                runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
            );
        }
    }

    fn summary(name: &str) -> DocumentSummary {
        DocumentSummary {
            id: DocumentId::new(format!("{name}-id")),
            name: name.to_owned(),
            kind: "Documentation".to_owned(),
            link: Link::placeholder(),
        }
    }

    fn detail(title: &str) -> DocumentDetail {
        DocumentDetail {
            title: title.to_owned(),
            full_text: format!("{title} full text"),
            link: Link::placeholder(),
        }
    }

    fn chunk(name: &str, index: u32) -> DocumentChunk {
        DocumentChunk {
            text: format!("{name} passage"),
            doc_name: name.to_owned(),
            chunk_index: index,
            doc_id: DocumentId::new(format!("{name}-id")),
        }
    }

    fn listed(request: &Request, names: &[&str]) -> Completion {
        let Request::ListDocuments { ticket } = request else {
            panic!("not a list request: {request:?}");
        };
        Completion::Listed {
            ticket: *ticket,
            result: Ok(names.iter().map(|name| summary(name)).collect()),
        }
    }

    fn ok_detail(request: &Request, title: &str) -> Completion {
        let Request::FetchDetail { view, fetch } = request else {
            panic!("not a detail request: {request:?}");
        };
        Completion::Detail {
            view: *view,
            fetch: fetch.clone(),
            result: Ok(detail(title)),
        }
    }

    fn explorer_with(harness: &mut Harness, runtime: &mut TestRuntime, names: &[&str]) {
        harness.key(runtime, KeyCode::Tab);
        let list = runtime.spawned.last().cloned().expect("list request");
        harness.deliver(runtime, listed(&list, names));
    }

    #[test]
    fn first_switch_to_explorer_lists_documents_once() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.key(&mut runtime, KeyCode::Tab);
        assert_eq!(harness.state.view, ViewKind::Explorer);
        assert_eq!(harness.state.input, InputFocus::Results);
        assert!(matches!(runtime.spawned.as_slice(), [Request::ListDocuments { .. }]));

        harness.key(&mut runtime, KeyCode::Tab);
        harness.key(&mut runtime, KeyCode::Tab);
        assert_eq!(harness.state.view, ViewKind::Explorer);
        assert_eq!(runtime.spawned.len(), 1);

        harness.key_with(&mut runtime, KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(runtime.spawned.len(), 2);
    }

    #[test]
    fn enter_submits_prompt_text_and_ignores_blank_input() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.type_text(&mut runtime, "   ");
        harness.key(&mut runtime, KeyCode::Enter);
        assert!(runtime.spawned.is_empty());
        assert!(harness.view_data.prompt.is_empty());

        harness.type_text(&mut runtime, "what is hybrid searchh");
        harness.key(&mut runtime, KeyCode::Backspace);
        harness.key(&mut runtime, KeyCode::Enter);

        match runtime.spawned.as_slice() {
            [Request::RunQuery(dispatch)] => assert_eq!(dispatch.text, "what is hybrid search"),
            other => panic!("expected one query request, got {other:?}"),
        }
        assert!(harness.view_data.prompt.is_empty());
        assert!(harness.session.query_state().is_fetching());
        assert!(status_text(&harness.state, &harness.session).contains("fetching"));
    }

    #[test]
    fn late_detail_for_an_earlier_selection_is_ignored() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        explorer_with(&mut harness, &mut runtime, &["A", "B", "C"]);

        harness.key(&mut runtime, KeyCode::Down);
        harness.key(&mut runtime, KeyCode::Down);
        let fetches = runtime.detail_fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(runtime.cancelled, vec![fetches[0].clone()]);
        let pane = harness.session.pane(ViewKind::Explorer);
        assert_eq!(pane.focus().focused_id(), Some(&DocumentId::new("B-id")));

        harness.deliver(&mut runtime, ok_detail(&fetches[1], "B"));
        harness.deliver(&mut runtime, ok_detail(&fetches[0], "A"));

        let pane = harness.session.pane(ViewKind::Explorer);
        assert_eq!(pane.shown_detail().map(|d| d.title.as_str()), Some("B"));
        assert!(harness.view_data.explorer.pending_detail.is_none());
    }

    #[test]
    fn query_completion_focuses_first_chunk_and_fetches_it() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.type_text(&mut runtime, "replication");
        harness.key(&mut runtime, KeyCode::Enter);
        let Some(Request::RunQuery(dispatch)) = runtime.spawned.first().cloned() else {
            panic!("expected query request");
        };

        harness.deliver(
            &mut runtime,
            Completion::Query {
                ticket: dispatch.ticket,
                result: Ok(QueryResponse {
                    chunks: vec![chunk("X", 4), chunk("Y", 0)],
                    answer: Some("Replicas copy shards.".to_owned()),
                }),
            },
        );

        assert_eq!(harness.session.pane(ViewKind::Query).focused_row(), Some(0));
        assert_eq!(harness.view_data.query.list.item_count(), 2);
        assert_eq!(harness.view_data.explorer.list.item_count(), 0);
        assert!(!harness.session.query_state().is_fetching());
        match runtime.spawned.last() {
            Some(Request::FetchDetail { view, fetch }) => {
                assert_eq!(*view, ViewKind::Query);
                assert_eq!(fetch.id, DocumentId::new("X-id"));
            }
            other => panic!("expected detail fetch, got {other:?}"),
        }

        let log = message_log_lines(&harness.session, 10);
        assert_eq!(
            log,
            vec![
                "you: replication".to_owned(),
                "verba: Replicas copy shards.".to_owned(),
            ]
        );

        let text = detail_text(&harness.state, &harness.session);
        assert!(text.starts_with("loading X..."));
        assert!(text.contains("extract (chunk 4):\nX passage"));
    }

    #[test]
    fn failures_surface_as_a_transient_status() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.type_text(&mut runtime, "q");
        harness.key(&mut runtime, KeyCode::Enter);
        let request = runtime.spawned[0].clone();
        harness.deliver(
            &mut runtime,
            request.fail(TransportError::Status {
                code: 503,
                message: "Database not ready!".to_owned(),
            }),
        );

        let status = harness.state.status_line.clone().expect("status");
        assert!(status.starts_with("query failed"));
        assert!(status.contains("Database not ready!"));

        let stale_token = harness.view_data.status_token.saturating_sub(1);
        harness
            .tx
            .send(InternalEvent::ClearStatus { token: stale_token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert!(harness.state.status_line.is_some());

        let token = harness.view_data.status_token;
        harness
            .tx
            .send(InternalEvent::ClearStatus { token })
            .expect("channel open");
        harness.pump(&mut runtime);
        assert!(harness.state.status_line.is_none());
    }

    #[test]
    fn escape_clears_focus_and_drops_late_detail() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        explorer_with(&mut harness, &mut runtime, &["A"]);

        harness.key(&mut runtime, KeyCode::Down);
        let fetch = runtime.detail_fetches()[0].clone();
        harness.key(&mut runtime, KeyCode::Esc);
        harness.deliver(&mut runtime, ok_detail(&fetch, "A"));

        let pane = harness.session.pane(ViewKind::Explorer);
        assert!(pane.focus().focused_id().is_none());
        assert!(pane.detail().current().is_none());
    }

    #[test]
    fn help_overlay_swallows_the_next_key() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.key(&mut runtime, KeyCode::F(1));
        assert!(harness.view_data.help_visible);
        let quit = harness.key_with(&mut runtime, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(!quit);
        assert!(!harness.view_data.help_visible);
        assert!(harness.key_with(&mut runtime, KeyCode::Char('q'), KeyModifiers::CONTROL));
    }

    #[test]
    fn clicking_a_row_focuses_that_item() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        explorer_with(&mut harness, &mut runtime, &["A", "B", "C", "D"]);
        sync_layout(&harness.state, &mut harness.view_data, Rect::new(0, 0, 100, 30));

        let area = harness.view_data.results_area;
        handle_mouse_event(
            &mut harness.state,
            &mut harness.session,
            &mut runtime,
            &mut harness.view_data,
            &harness.tx,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: area.x + 2,
                row: area.y + 3,
                modifiers: KeyModifiers::NONE,
            },
        );

        let pane = harness.session.pane(ViewKind::Explorer);
        assert_eq!(pane.focused_row(), Some(2));
        assert_eq!(pane.focus().focused_id(), Some(&DocumentId::new("C-id")));
    }

    #[test]
    fn sync_layout_sizes_the_list_to_its_pane() {
        let mut harness = Harness::new();
        sync_layout(&harness.state, &mut harness.view_data, Rect::new(0, 0, 120, 40));
        let area = harness.view_data.results_area;
        assert_eq!(harness.view_data.query.list.height(), usize::from(area.height - 2));
        assert!(area.height > 2);
        assert!(harness.view_data.explorer.list.height() > 0);
    }

    #[test]
    fn inline_runtime_round_trips_through_the_channel() {
        let corpus = CorpusFaker::new(21).corpus(3);
        let mut runtime = InlineRuntime(ScriptedTransport::from_corpus(&corpus));
        let mut harness = Harness::new();

        harness.key(&mut runtime, KeyCode::Tab);
        assert_eq!(harness.session.pane(ViewKind::Explorer).results().len(), 3);

        harness.key(&mut runtime, KeyCode::Char('j'));
        let pane = harness.session.pane(ViewKind::Explorer);
        assert_eq!(pane.shown_detail(), Some(&corpus[0].detail));

        harness.key(&mut runtime, KeyCode::Char('G'));
        let pane = harness.session.pane(ViewKind::Explorer);
        assert_eq!(pane.shown_detail(), Some(&corpus[2].detail));
    }

    #[test]
    fn row_labels_rank_chunks_and_tag_summaries() {
        assert_eq!(
            result_row_label(0, &ResultItem::Chunk(chunk("Intro", 3))),
            "1. Intro"
        );
        assert_eq!(
            result_row_label(4, &ResultItem::Summary(summary("Guide"))),
            "Guide [Documentation]"
        );
    }

    #[test]
    fn detail_hides_placeholder_links() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        explorer_with(&mut harness, &mut runtime, &["A"]);
        harness.key(&mut runtime, KeyCode::Down);
        let fetch = runtime.detail_fetches()[0].clone();
        harness.deliver(&mut runtime, ok_detail(&fetch, "A"));

        let text = detail_text(&harness.state, &harness.session);
        assert_eq!(text, "A full text");
        assert!(!text.contains('#'));
    }

    #[test]
    fn message_log_keeps_the_newest_lines_and_shows_fetching() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        for question in ["one", "two", "three"] {
            harness.type_text(&mut runtime, question);
            harness.key(&mut runtime, KeyCode::Enter);
        }

        let lines = message_log_lines(&harness.session, 2);
        assert_eq!(
            lines,
            vec!["you: three".to_owned(), "verba: searching...".to_owned()]
        );
    }

    #[test]
    fn switching_views_keeps_each_views_results() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();

        harness.type_text(&mut runtime, "q");
        harness.key(&mut runtime, KeyCode::Enter);
        let Some(Request::RunQuery(dispatch)) = runtime.spawned.first().cloned() else {
            panic!("expected query request");
        };
        harness.deliver(
            &mut runtime,
            Completion::Query {
                ticket: dispatch.ticket,
                result: Ok(QueryResponse {
                    chunks: vec![chunk("X", 0)],
                    answer: None,
                }),
            },
        );

        explorer_with(&mut harness, &mut runtime, &["A", "B"]);
        assert_eq!(harness.session.pane(ViewKind::Explorer).results().len(), 2);

        harness.key(&mut runtime, KeyCode::Tab);
        assert_eq!(harness.state.view, ViewKind::Query);
        let pane = harness.session.pane(ViewKind::Query);
        assert!(matches!(
            pane.results().current(),
            [ResultItem::Chunk(chunk)] if chunk.doc_name == "X"
        ));
        assert_eq!(pane.focused_row(), Some(0));
        assert_eq!(harness.view_data.query.list.item_count(), 1);
        assert!(detail_text(&harness.state, &harness.session).contains("X passage"));
    }

    #[test]
    fn scripted_backend_serves_query_detail_and_list_failure() {
        let transport = ScriptedTransport::new()
            .with_query(
                "sharding",
                QueryResponse {
                    chunks: vec![chunk("Shards", 2)],
                    answer: Some("Shards split an index.".to_owned()),
                },
            )
            .with_detail("Shards-id", detail("Shards"));
        transport.fail_documents(TransportError::Status {
            code: 503,
            message: "Database not ready!".to_owned(),
        });
        let mut runtime = InlineRuntime(transport);
        let mut harness = Harness::new();

        harness.type_text(&mut runtime, "sharding");
        harness.key(&mut runtime, KeyCode::Enter);

        let pane = harness.session.pane(ViewKind::Query);
        assert_eq!(pane.shown_detail().map(|d| d.title.as_str()), Some("Shards"));
        assert_eq!(
            detail_text(&harness.state, &harness.session),
            "extract (chunk 2):\nShards passage\n\nShards full text"
        );
        assert_eq!(
            runtime.0.calls(),
            vec![
                Call::RunQuery("sharding".to_owned()),
                Call::FetchDetail(DocumentId::new("Shards-id")),
            ]
        );

        harness.key(&mut runtime, KeyCode::Tab);
        let status = harness.state.status_line.clone().expect("status");
        assert!(status.starts_with("document list failed"));
        assert!(harness.session.pane(ViewKind::Explorer).results().is_empty());
        assert_eq!(harness.session.pane(ViewKind::Query).results().len(), 1);
    }

    #[test]
    fn refused_cancel_still_starts_the_newer_fetch() {
        let mut harness = Harness::new();
        let mut runtime = StubbornRuntime::default();
        harness.key(&mut runtime, KeyCode::Tab);
        let list = runtime.0.spawned.last().cloned().expect("list request");
        harness.deliver(&mut runtime, listed(&list, &["A", "B"]));

        harness.key(&mut runtime, KeyCode::Down);
        harness.key(&mut runtime, KeyCode::Down);

        let fetches = runtime.0.detail_fetches();
        assert_eq!(fetches.len(), 2);
        let Request::FetchDetail { fetch, .. } = &fetches[1] else {
            panic!("expected detail fetch");
        };
        assert_eq!(harness.view_data.explorer.pending_detail.as_ref(), Some(fetch));
    }

    #[test]
    fn request_that_cannot_start_reports_through_the_status_line() {
        let mut harness = Harness::new();
        let mut runtime = OfflineRuntime;

        harness.type_text(&mut runtime, "q");
        harness.key(&mut runtime, KeyCode::Enter);

        let status = harness.state.status_line.clone().expect("status");
        assert!(status.starts_with("query failed"));
        assert!(status.contains("worker pool exhausted"));
        assert!(!harness.session.query_state().is_fetching());
    }

    #[test]
    fn escape_hides_the_previously_shown_document() {
        let mut harness = Harness::new();
        let mut runtime = TestRuntime::default();
        explorer_with(&mut harness, &mut runtime, &["A"]);
        harness.key(&mut runtime, KeyCode::Down);
        let fetch = runtime.detail_fetches()[0].clone();
        harness.deliver(&mut runtime, ok_detail(&fetch, "A"));
        assert_eq!(detail_title(&harness.state, &harness.session), "A");

        harness.key(&mut runtime, KeyCode::Esc);

        assert_eq!(
            detail_text(&harness.state, &harness.session),
            "Select a result to read the document."
        );
        assert_eq!(detail_title(&harness.state, &harness.session), "detail");
    }
}
