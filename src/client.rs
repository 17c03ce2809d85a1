use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

/// Any failure talking to the answer service: transport, status or body.
#[derive(Debug, Error)]
#[error("answer request failed: {detail}")]
pub struct RequestFailed {
    detail: String,
}

impl RequestFailed {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl From<reqwest::Error> for RequestFailed {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Something that turns a question into an answer.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &str) -> Result<String, RequestFailed>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatRequest {
    question: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatResponse {
    answer: String,
}

pub struct AnswerClient {
    client: Client,
    endpoint: String,
}

impl AnswerClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerService for AnswerClient {
    async fn ask(&self, question: &str) -> Result<String, RequestFailed> {
        let request = ChatRequest {
            question: question.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RequestFailed::new(format!(
                "answer service returned {}",
                response.status()
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        Ok(chat_response.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    async fn spawn_server(app: Router) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/chat")
    }

    #[tokio::test]
    async fn test_ask_posts_question_and_decodes_answer() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_by_handler = seen.clone();
        let app = Router::new().route(
            "/chat",
            post(move |Json(req): Json<ChatRequest>| {
                let seen = seen_by_handler.clone();
                async move {
                    seen.lock().await.push(req.question.clone());
                    Json(ChatResponse {
                        answer: format!("echo: {}", req.question),
                    })
                }
            }),
        );
        let endpoint = spawn_server(app).await;

        let client = AnswerClient::new(endpoint);
        let answer = client.ask("Hello").await.unwrap();

        assert_eq!(answer, "echo: Hello");
        assert_eq!(*seen.lock().await, vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_ask_fails_on_server_error() {
        let app = Router::new().route(
            "/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let endpoint = spawn_server(app).await;

        let err = AnswerClient::new(endpoint).ask("Hello").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_ask_fails_on_malformed_body() {
        let app = Router::new().route(
            "/chat",
            post(|| async { Json(serde_json::json!({ "reply": "wrong field" })) }),
        );
        let endpoint = spawn_server(app).await;

        assert!(AnswerClient::new(endpoint).ask("Hello").await.is_err());
    }

    #[tokio::test]
    async fn test_ask_fails_when_nothing_listens() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AnswerClient::new(format!("http://{addr}/chat"));
        assert!(client.ask("Hello").await.is_err());
    }

    #[test]
    fn test_request_payload_shape() {
        let body = serde_json::to_value(ChatRequest {
            question: "Comment fonctionne l'IA ?".to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "question": "Comment fonctionne l'IA ?" }));
    }
}
