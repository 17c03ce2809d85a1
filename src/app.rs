use crate::client::RequestFailed;
use crate::conversation::Conversation;
use crate::theme::Theme;

pub struct App {
    pub conversation: Conversation,
    pub input: String,
    pub theme: Theme,
    pub should_quit: bool,
    // Scroll state of the conversation pane
    pub scroll_offset: u16,
    pub follow_bottom: bool,
    max_scroll: u16,
    seen_messages: usize,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            conversation: Conversation::new(),
            input: String::new(),
            theme,
            should_quit: false,
            scroll_offset: 0,
            follow_bottom: true,
            max_scroll: 0,
            seen_messages: 0,
        }
    }

    /// Input is locked while a request is in flight.
    pub fn input_enabled(&self) -> bool {
        !self.conversation.is_loading()
    }

    pub fn push_char(&mut self, c: char) {
        if self.input_enabled() {
            self.input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.input_enabled() {
            self.input.pop();
        }
    }

    pub fn clear_input(&mut self) {
        if self.input_enabled() {
            self.input.clear();
        }
    }

    /// Start a submission from the input box. Returns the question to send.
    pub fn submit_input(&mut self) -> Option<String> {
        if !self.input_enabled() {
            return None;
        }
        self.conversation.begin(&self.input)
    }

    pub fn apply_outcome(&mut self, outcome: Result<String, RequestFailed>) {
        self.conversation.finish(outcome);
        self.input.clear();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = ?self.theme, "theme toggled");
    }

    /// Called by the renderer with the furthest the pane can scroll. Jumps to
    /// the bottom whenever a message was added since the last frame.
    pub fn sync_scroll(&mut self, max_scroll: u16) {
        self.max_scroll = max_scroll;

        let count = self.conversation.messages().len();
        if count != self.seen_messages {
            self.seen_messages = count;
            self.follow_bottom = true;
        }

        if self.follow_bottom {
            self.scroll_offset = max_scroll;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_scroll);
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
        if self.scroll_offset >= self.max_scroll {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll_offset = self.max_scroll;
    }
}
