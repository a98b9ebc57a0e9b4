use serde::Serialize;
use std::time::Duration;

use super::ChatMessage;
use crate::error::{DigestError, Result};

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Client for a local Ollama-style chat service
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(api_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        tracing::debug!("POST {} (model {})", self.api_url, self.model);

        let response = self
            .http
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach local LLM service at {}: {}", self.api_url, e);
                DigestError::Http(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Local LLM service error {}: {}", status, error_text);
            return Err(DigestError::Api(format!(
                "{} from {}: {}",
                status, self.api_url, error_text
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!("Local LLM service returned non-JSON body: {}", e);
            DigestError::InvalidResponse(format!("malformed body: {}", e))
        })?;

        extract_content(&body)
    }
}

/// Pull `message.content` out of a chat reply.
fn extract_content(body: &serde_json::Value) -> Result<String> {
    body.pointer("/message/content")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::error!("Local LLM response missing message.content: {}", body);
            DigestError::InvalidResponse("missing message.content".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("Summarize the posts."),
            ChatMessage::user("### 2024-09-01 08:30:00+00:00\ncontent:hello"),
        ]
    }

    #[test]
    fn test_request_disables_streaming() {
        let msgs = messages();
        let request = OllamaRequest {
            model: "llama3",
            messages: &msgs,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_content() {
        let body = json!({"model": "llama3", "message": {"role": "assistant", "content": "ok"}});
        assert_eq!(extract_content(&body).unwrap(), "ok");
    }

    #[test]
    fn test_extract_content_rejects_missing_field() {
        for body in [
            json!({"message": {"role": "assistant"}}),
            json!({"response": "text"}),
            json!({"message": {"content": 42}}),
        ] {
            assert!(matches!(
                extract_content(&body),
                Err(DigestError::InvalidResponse(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_chat_posts_expected_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::Json(json!({
                "model": "llama3",
                "messages": [
                    {"role": "system", "content": "Summarize the posts."},
                    {"role": "user", "content": "### 2024-09-01 08:30:00+00:00\ncontent:hello"}
                ],
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": {"role": "assistant", "content": "A summary"}, "done": true}"#)
            .create_async()
            .await;

        let url = format!("{}/api/chat", server.url());
        let client = OllamaClient::new(&url, "llama3", Duration::from_secs(5)).unwrap();

        assert_eq!(client.chat(&messages()).await.unwrap(), "A summary");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_invalid_structure() {
        let mut server = mockito::Server::new_async().await;
        let _chat = server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "model not loaded"}"#)
            .create_async()
            .await;

        let url = format!("{}/api/chat", server.url());
        let client = OllamaClient::new(&url, "llama3", Duration::from_secs(5)).unwrap();

        assert!(matches!(
            client.chat(&messages()).await,
            Err(DigestError::InvalidResponse(_))
        ));
    }
}
