//! Chat widget controller
//!
//! `ChatWidget` is the single context object behind a chat front end: it owns
//! the message log, the input buffer, the status indicator and the scroll
//! position. Front ends feed it user intent and render what it holds.
//!
//! Submitting a question is split in two so the network call can run as a
//! separate task: [`ChatWidget::begin_submit`] records the user message and
//! hands back the question to send, and [`ChatWidget::settle`] is the single
//! resolution point that appends the answer (or the fallback) and returns the
//! status to idle. [`ChatWidget::submit_question`] runs both around an
//! [`AskBackend`] for callers that can await in place.

use crate::client::{AskBackend, AskError};
use crate::state::{ChatMessage, ChatRole, Status};

/// Seeded into the log whenever the chat is cleared
pub const GREETING: &str = "Hello! I'm your IT Infrastructure Assistant. Ask me anything about enterprise computing, virtualization, or end-user computing solutions.";

/// Shown in place of an answer when anything goes wrong
pub const FALLBACK_MESSAGE: &str = "Sorry, I couldn't process your request. Please try again.";

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    messages: Vec<ChatMessage>,
    input: String,
    cursor: usize, // char index into input
    status: Status,
    scroll: u16,
    follow_latest: bool,
    viewport_height: u16,
    content_height: u16,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    /// A fresh widget shows the greeting, like a cleared chat
    pub fn new() -> Self {
        let mut widget = Self {
            messages: Vec::new(),
            input: String::new(),
            cursor: 0,
            status: Status::Idle,
            scroll: 0,
            follow_latest: true,
            viewport_height: 0,
            content_height: 0,
        };
        widget.clear_chat();
        widget
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// True while a question is waiting for its answer
    pub fn is_busy(&self) -> bool {
        self.status.is_typing()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    // Log operations

    /// Append a bubble and scroll so it is visible
    pub fn append_message(&mut self, text: impl Into<String>, role: ChatRole) {
        self.messages.push(ChatMessage {
            role,
            content: text.into(),
        });
        self.scroll_to_bottom();
    }

    /// Empty the log and re-seed it with the greeting
    pub fn clear_chat(&mut self) {
        self.messages.clear();
        self.scroll = 0;
        self.append_message(GREETING, ChatRole::Assistant);
    }

    // Submission

    /// Start a submission from the current input.
    ///
    /// Returns the trimmed question to send, or `None` when there is nothing
    /// to send: the input is blank, or a previous question is still in
    /// flight. In the in-flight case the input is left as typed.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.is_busy() {
            tracing::debug!("submission ignored, a question is already in flight");
            return None;
        }

        let question = self.input.trim().to_string();
        if question.is_empty() {
            return None;
        }

        self.append_message(question.clone(), ChatRole::User);
        self.input.clear();
        self.cursor = 0;

        self.status = Status::Thinking;
        self.scroll_to_bottom();

        Some(question)
    }

    /// Resolve a submission with the outcome of its request.
    ///
    /// Every failure collapses into the fallback message; the error itself
    /// only goes to the log. The status returns to idle on both branches.
    pub fn settle(&mut self, outcome: Result<String, AskError>) {
        match outcome {
            Ok(answer) => self.append_message(answer, ChatRole::Assistant),
            Err(err) => {
                tracing::error!(error = %err, "failed to get an answer");
                self.append_message(FALLBACK_MESSAGE, ChatRole::Assistant);
            }
        }

        self.status = Status::Idle;
        self.scroll_to_bottom();
    }

    /// Run a whole submission against `backend`. Returns false when nothing was sent.
    pub async fn submit_question<B>(&mut self, backend: &B) -> bool
    where
        B: AskBackend + ?Sized,
    {
        let Some(question) = self.begin_submit() else {
            return false;
        };
        let outcome = backend.ask(&question).await;
        self.settle(outcome);
        true
    }

    // Input editing

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    // Scrolling

    /// Record the log area as last rendered: its inner height and the number
    /// of lines the log wrapped to at the rendered width.
    ///
    /// The front end measures the wrapped height, so the scroll model always
    /// agrees with what is on screen. A log that was following its latest
    /// message keeps following it.
    pub fn set_layout(&mut self, viewport_height: u16, content_height: u16) {
        self.viewport_height = viewport_height;
        self.content_height = content_height;

        if self.follow_latest {
            self.scroll = self.max_scroll();
        } else {
            self.scroll = self.scroll.min(self.max_scroll());
        }
    }

    /// Wrapped line count of the log, as last measured by the front end
    pub fn content_height(&self) -> u16 {
        self.content_height
    }

    pub fn max_scroll(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Jump to the latest message and stay there as the log grows
    pub fn scroll_to_bottom(&mut self) {
        self.follow_latest = true;
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow_latest = self.scroll >= self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll());
        self.follow_latest = self.scroll >= self.max_scroll();
    }
}
