use std::sync::Arc;
use infra_assist_core::{AskBackend, AskError, ChatWidget};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

pub struct App {
    pub should_quit: bool,

    // Chat state
    pub widget: ChatWidget,
    pub backend: Arc<dyn AskBackend>,
    pub endpoint: String,
    pub ask_task: Option<JoinHandle<Result<String, AskError>>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_button: Option<Rect>,
    pub clear_button: Option<Rect>,
}

impl App {
    pub fn new(backend: Arc<dyn AskBackend>, endpoint: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            widget: ChatWidget::new(),
            backend,
            endpoint: endpoint.into(),
            ask_task: None,
            animation_frame: 0,
            chat_area: None,
            send_button: None,
            clear_button: None,
        }
    }

    /// Send the current input, if there is anything to send
    pub fn submit(&mut self) {
        let Some(question) = self.widget.begin_submit() else {
            return;
        };

        tracing::info!(chars = question.chars().count(), "question submitted");
        self.animation_frame = 0;

        let backend = Arc::clone(&self.backend);
        self.ask_task = Some(tokio::spawn(async move { backend.ask(&question).await }));
    }

    pub fn clear(&mut self) {
        self.widget.clear_chat();
    }

    /// Settle the in-flight question if its task has finished
    pub async fn poll_ask_task(&mut self) {
        let finished = self
            .ask_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if finished {
            self.finish_ask_task().await;
        }
    }

    /// Wait for the in-flight question and settle it
    pub async fn finish_ask_task(&mut self) {
        if let Some(task) = self.ask_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(AskError::Interrupted(e.to_string())),
            };
            self.widget.settle(outcome);
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
