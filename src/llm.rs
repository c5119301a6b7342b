//! Client for an OpenAI-compatible chat completion endpoint.

use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::ChatSettings;
use crate::error::{CopilotError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct ChatClient {
    http: reqwest::Client,
    settings: ChatSettings,
}

impl ChatClient {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Sends one system/user exchange and returns the assistant's reply.
    /// Any status other than 200 comes back as `RemoteService` carrying the body.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        let request = ChatRequest {
            model: &self.settings.model,
            messages: &messages,
        };

        debug!("posting chat completion to {}", self.settings.api_url);
        let response = self
            .http
            .post(&self.settings.api_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.settings.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            warn!("chat completion failed with status {status}");
            return Err(CopilotError::RemoteService {
                status: status.as_u16(),
                payload: pretty_payload(&body),
            });
        }

        parse_reply(&body).map_err(|reason| CopilotError::RemoteService {
            status: status.as_u16(),
            payload: format!("{reason}\n{}", pretty_payload(&body)),
        })
    }
}

fn parse_reply(body: &str) -> std::result::Result<String, String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|err| format!("unreadable reply: {err}"))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| "reply has no choices".to_string())
}

/// Pretty-prints JSON bodies; anything else is returned untouched.
pub fn pretty_payload(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_matches_chat_completion_shape() {
        let messages = [ChatMessage::system("sys"), ChatMessage::user("hello")];
        let request = ChatRequest {
            model: "llama3-70b-8192",
            messages: &messages,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "model": "llama3-70b-8192",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hello"}
                ]
            })
        );
    }

    #[test]
    fn reply_content_is_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Tendances..."}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Tendances...");
    }

    #[test]
    fn reply_without_choices_is_rejected() {
        assert!(parse_reply(r#"{"choices":[]}"#).is_err());
        assert!(parse_reply("<html>").is_err());
    }

    #[test]
    fn payload_is_pretty_printed_when_json() {
        let payload = pretty_payload(r#"{"error":{"message":"Invalid API Key"}}"#);
        assert!(payload.contains("\n"));
        assert!(payload.contains("Invalid API Key"));
        assert_eq!(pretty_payload("Bad Gateway"), "Bad Gateway");
    }
}
