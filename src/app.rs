use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use citechat::session::task_failure;
use citechat::sources::SourceLink;
use citechat::{ChatClient, ChatError, ChatReply, ChatSession, Settings, Submission, WidgetState};

use crate::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Sources,
    Input,
}

pub type DispatchTask = JoinHandle<Result<ChatReply, ChatError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub widget: WidgetState,

    // Chat state
    pub session: ChatSession,
    pub client: ChatClient,
    pub input_cursor: usize, // cursor position in the input, in chars
    pub dispatch_task: Option<DispatchTask>,

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of chat area, set during render
    pub chat_width: u16,  // inner width of chat area, set during render
    pub sources_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // One-line feedback shown in the footer
    pub status: Option<String>,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub sources_area: Option<Rect>,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Input,
            widget: WidgetState::default(),

            session: ChatSession::new(settings.rate_limit()),
            client: ChatClient::new(&settings.endpoint),
            input_cursor: 0,
            dispatch_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            sources_state: ListState::default(),

            animation_frame: 0,
            status: None,

            chat_area: None,
            sources_area: None,
        }
    }

    pub fn toggle_widget(&mut self) {
        self.widget.toggle();
        if self.widget.is_open() {
            self.focus = FocusPane::Input;
        } else {
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.session.is_busy()
    }

    /// Submit the input field through the rate gate and start the request
    pub fn send(&mut self) {
        let before = self.session.conversation().len();
        let submission = self.session.submit_input(Instant::now());

        match submission {
            Submission::Accepted(message) => {
                self.input_cursor = 0;
                let client = self.client.clone();
                self.dispatch_task = Some(tokio::spawn(async move { client.fetch(&message).await }));
            }
            Submission::Busy => {
                self.status = Some("Still waiting for the last reply".to_string());
            }
            Submission::RateLimited | Submission::Empty => {}
        }

        if self.session.conversation().len() != before {
            self.scroll_chat_to_bottom();
        }
    }

    /// Hand the finished request (if any) back to the session
    pub async fn poll_dispatch(&mut self) {
        let finished = self
            .dispatch_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.dispatch_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(task_failure(e)),
            };
            self.session.complete(result);
            self.scroll_chat_to_bottom();
            self.select_newest_source();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of lines the chat history wraps to at the current width
    pub fn chat_line_count(&self) -> u16 {
        let width = if self.chat_width > 0 { self.chat_width } else { 50 };
        let lines = ui::chat_paragraph(self).line_count(width);
        u16::try_from(lines).unwrap_or(u16::MAX)
    }

    /// Keep the newest message in view
    pub fn scroll_chat_to_bottom(&mut self) {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.chat_scroll = self.chat_line_count().saturating_sub(visible_height);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    // Sources pane
    pub fn source_links(&self) -> Vec<SourceLink> {
        self.session
            .conversation()
            .sources()
            .into_iter()
            .map(SourceLink::new)
            .collect()
    }

    pub fn sources_nav_down(&mut self) {
        let len = self.session.conversation().sources().len();
        if len > 0 {
            let i = self.sources_state.selected().unwrap_or(0);
            self.sources_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sources_nav_up(&mut self) {
        let i = self.sources_state.selected().unwrap_or(0);
        self.sources_state.select(Some(i.saturating_sub(1)));
    }

    /// Point the selection at the newest source after new citations arrive
    fn select_newest_source(&mut self) {
        let len = self.session.conversation().sources().len();
        if len == 0 {
            self.sources_state.select(None);
        } else {
            self.sources_state.select(Some(len - 1));
        }
    }

    pub fn selected_source(&self) -> Option<SourceLink> {
        let idx = self.sources_state.selected()?;
        self.source_links().into_iter().nth(idx)
    }

    pub fn open_selected_source(&mut self) {
        let Some(link) = self.selected_source() else {
            return;
        };
        if link.target.is_empty() {
            return;
        }

        match open::that(&link.target) {
            Ok(()) => {
                info!(url = %link.target, "opened source");
                self.status = Some(format!("Opened {}", link.target));
            }
            Err(e) => {
                warn!(url = %link.target, error = %e, "could not open source");
                self.status = Some(format!("Could not open {}: {}", link.target, e));
            }
        }
    }

    pub fn cycle_focus(&mut self) {
        let has_sources = !self.session.conversation().sources().is_empty();
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Chat,
            FocusPane::Chat if has_sources => FocusPane::Sources,
            FocusPane::Chat | FocusPane::Sources => FocusPane::Input,
        };
        if self.focus == FocusPane::Sources && self.sources_state.selected().is_none() {
            self.sources_state.select(Some(0));
        }
    }
}
