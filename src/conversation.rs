//! Conversation state and the request/response cycle around it.
//!
//! A submission is split in two: [`Conversation::begin`] records the user's
//! message and marks the conversation as loading, [`Conversation::finish`]
//! folds the service outcome back in. The UI loop calls them on either side
//! of a spawned request; [`Conversation::submit`] runs both around an awaited
//! call for callers that can block on the answer.

use crate::client::{AnswerService, RequestFailed};

pub const ERROR_MESSAGE: &str = "❌ Une erreur s'est produite. Vérifiez votre connexion !";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub is_user: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: true,
        }
    }

    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_user: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    is_loading: bool,
    error: Option<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading {
            Phase::Pending
        } else {
            Phase::Idle
        }
    }

    /// Record a submission. Returns the question to send, or `None` when the
    /// text is blank and nothing changed.
    ///
    /// Does not check `is_loading`; keeping a single request in flight is up
    /// to the caller.
    pub fn begin(&mut self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text));
        self.is_loading = true;
        Some(text.to_string())
    }

    /// Apply the outcome of a request started with [`Conversation::begin`].
    pub fn finish(&mut self, outcome: Result<String, RequestFailed>) {
        match outcome {
            Ok(answer) => {
                self.messages.push(Message::answer(answer));
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "question could not be answered");
                self.error = Some(ERROR_MESSAGE.to_string());
            }
        }
        self.is_loading = false;
    }

    pub async fn submit<S>(&mut self, service: &S, text: &str)
    where
        S: AnswerService + ?Sized,
    {
        let Some(question) = self.begin(text) else {
            return;
        };

        let outcome = service.ask(&question).await;
        self.finish(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed answer, or fails when `answer` is `None`.
    struct Scripted {
        answer: Option<String>,
        asked: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn answering(answer: &str) -> Self {
            Self {
                answer: Some(answer.to_string()),
                asked: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                answer: None,
                asked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AnswerService for Scripted {
        async fn ask(&self, question: &str) -> Result<String, RequestFailed> {
            self.asked.lock().unwrap().push(question.to_string());
            self.answer
                .clone()
                .ok_or_else(|| RequestFailed::new("connection refused"))
        }
    }

    #[test]
    fn test_begin_appends_user_message_before_resolution() {
        let mut conv = Conversation::new();
        let question = conv.begin("Hello");

        assert_eq!(question.as_deref(), Some("Hello"));
        assert_eq!(conv.messages(), &[Message::user("Hello")]);
        assert!(conv.is_loading());
        assert_eq!(conv.phase(), Phase::Pending);
    }

    #[test]
    fn test_blank_input_is_a_noop() {
        let mut conv = Conversation::new();
        for text in ["", "   ", "\n\t "] {
            assert!(conv.begin(text).is_none());
        }
        assert!(conv.messages().is_empty());
        assert!(!conv.is_loading());
        assert!(conv.error().is_none());
    }

    #[test]
    fn test_text_is_kept_untrimmed() {
        let mut conv = Conversation::new();
        conv.begin("  spaced  ");
        assert_eq!(conv.messages()[0].text, "  spaced  ");
    }

    #[tokio::test]
    async fn test_successful_round_trip() {
        let service = Scripted::answering("Hi there");
        let mut conv = Conversation::new();

        conv.submit(&service, "Hello").await;

        assert_eq!(
            conv.messages(),
            &[Message::user("Hello"), Message::answer("Hi there")]
        );
        assert!(conv.error().is_none());
        assert!(!conv.is_loading());
        assert_eq!(*service.asked.lock().unwrap(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_round_trip_keeps_user_message() {
        let service = Scripted::failing();
        let mut conv = Conversation::new();

        conv.submit(&service, "Hello").await;

        assert_eq!(conv.messages(), &[Message::user("Hello")]);
        assert_eq!(conv.error(), Some(ERROR_MESSAGE));
        assert!(!conv.is_loading());
        assert_eq!(conv.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let mut conv = Conversation::new();
        conv.submit(&Scripted::failing(), "first").await;
        assert!(conv.error().is_some());

        conv.submit(&Scripted::answering("ok"), "second").await;

        assert!(conv.error().is_none());
        assert_eq!(conv.messages().len(), 3);
        assert_eq!(conv.messages()[2], Message::answer("ok"));
    }

    #[tokio::test]
    async fn test_empty_submit_never_reaches_service() {
        let service = Scripted::answering("unused");
        let mut conv = Conversation::new();

        for _ in 0..5 {
            conv.submit(&service, "").await;
        }

        assert!(service.asked.lock().unwrap().is_empty());
        assert!(conv.messages().is_empty());
        assert!(!conv.is_loading());
    }

    #[test]
    fn test_overlapping_completions_apply_in_arrival_order() {
        let mut conv = Conversation::new();
        conv.begin("one");
        conv.begin("two");

        conv.finish(Ok("answer to two".to_string()));
        assert!(!conv.is_loading());
        conv.finish(Ok("answer to one".to_string()));

        let texts: Vec<&str> = conv.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "answer to two", "answer to one"]);
    }
}
