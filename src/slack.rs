//! Minimal Slack Web API client (conversations + read markers).
//!
//! Every call is a GET with query parameters, which is how this tool has
//! always talked to Slack (the API accepts it for all four endpoints used
//! here). Responses arrive in the standard `{ok, error, ...}` envelope.

use reqwest::Client;
use serde::Deserialize;

use crate::{Error, Result};

/// A private channel visible to the configured identity.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// A single channel message. `bot_id` is absent for human authors.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub ts: String,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Option<Vec<Channel>>,
    #[serde(default)]
    channel: Option<ChannelInfo>,
    #[serde(default)]
    messages: Option<Vec<Message>>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    #[serde(default)]
    last_read: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    /// Create client with provided bearer token against the real Slack API.
    pub fn new<S1: Into<String>, S2: Into<String>>(token: S1, base_url: S2) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument("SLACK_TOKEN не задан".to_string()));
        }

        let http = Client::builder()
            .user_agent(format!("slack_sweep/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            token,
            base_url: base_url.into(),
        })
    }

    async fn get(&self, method: &str, params: &[(&str, &str)]) -> Result<Envelope> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::SlackApi(format!(
                "{} вернул HTTP {}: {}",
                method,
                status.as_u16(),
                text
            )));
        }

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| Error::SlackApi(format!("{} вернул не-JSON ответ: {} ({})", method, text, e)))?;

        if !envelope.ok {
            return Err(Error::SlackApi(format!(
                "{}: {}",
                method,
                envelope.error.unwrap_or_else(|| "unknown_error".to_string())
            )));
        }

        Ok(envelope)
    }

    /// All private channels visible to the configured identity, draining the
    /// cursor until Slack reports no more pages.
    pub async fn list_private_channels(&self) -> Result<Vec<Channel>> {
        let mut channels = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut params = vec![("types", "private_channel")];
            if let Some(ref c) = cursor {
                params.push(("cursor", c.as_str()));
            }

            let envelope = self.get("users.conversations", &params).await?;
            channels.extend(envelope.channels.unwrap_or_default());

            cursor = envelope
                .response_metadata
                .and_then(|m| m.next_cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        Ok(channels)
    }

    /// Timestamp of the last message that has been read in the given channel.
    pub async fn last_read(&self, channel_id: &str) -> Result<String> {
        let envelope = self
            .get("conversations.info", &[("channel", channel_id)])
            .await?;

        envelope
            .channel
            .and_then(|c| c.last_read)
            .ok_or_else(|| Error::SlackApi("conversations.info: нет поля last_read".to_string()))
    }

    /// All messages strictly after the given timestamp, most recent first
    /// (Slack's native order).
    pub async fn history_since(&self, channel_id: &str, oldest: &str) -> Result<Vec<Message>> {
        let envelope = self
            .get(
                "conversations.history",
                &[("channel", channel_id), ("oldest", oldest)],
            )
            .await?;

        Ok(envelope.messages.unwrap_or_default())
    }

    /// Advance the channel's read marker to the given timestamp.
    pub async fn set_read_marker(&self, channel_id: &str, ts: &str) -> Result<()> {
        self.get(
            "conversations.mark",
            &[("channel", channel_id), ("ts", ts)],
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> SlackClient {
        SlackClient::new("xoxp-test", server.base_url()).expect("client")
    }

    #[test]
    fn new_rejects_empty_token() {
        let err = SlackClient::new("  ", "https://slack.com/api").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn list_private_channels_follows_cursor() {
        let server = MockServer::start_async().await;

        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path("/users.conversations")
                .query_param("types", "private_channel")
                .query_param_missing("cursor")
                .header("authorization", "Bearer xoxp-test");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "channels": [{"id": "C001", "name": "ops"}],
                "response_metadata": {"next_cursor": "abc"}
            }));
        });

        let second_page = server.mock(|when, then| {
            when.method(GET)
                .path("/users.conversations")
                .query_param("cursor", "abc");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "channels": [{"id": "C002", "name": "status"}],
                "response_metadata": {"next_cursor": ""}
            }));
        });

        let channels = client_for(&server).list_private_channels().await.unwrap();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].id, "C001");
        assert_eq!(channels[1].name, "status");
        first_page.assert_calls(1);
        second_page.assert_calls(1);
    }

    #[tokio::test]
    async fn last_read_extracts_marker() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/conversations.info")
                .query_param("channel", "C001");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "channel": {"id": "C001", "last_read": "1700000000.000100"}
            }));
        });

        let last_read = client_for(&server).last_read("C001").await.unwrap();
        assert_eq!(last_read, "1700000000.000100");
    }

    #[tokio::test]
    async fn history_since_passes_oldest_param() {
        let server = MockServer::start_async().await;
        let history = server.mock(|when, then| {
            when.method(GET)
                .path("/conversations.history")
                .query_param("channel", "C001")
                .query_param("oldest", "1699999999.000100");
            then.status(200).json_body(serde_json::json!({
                "ok": true,
                "messages": [
                    {"ts": "1700000300.000400", "bot_id": "B0TEST001", "text": "resolved"},
                    {"ts": "1700000200.000300", "text": "hello", "user": "U123"}
                ]
            }));
        });

        let messages = client_for(&server)
            .history_since("C001", "1699999999.000100")
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].bot_id.as_deref(), Some("B0TEST001"));
        assert_eq!(messages[1].bot_id, None);
        history.assert_calls(1);
    }

    #[tokio::test]
    async fn history_since_tolerates_missing_messages_field() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/conversations.history");
            then.status(200).json_body(serde_json::json!({"ok": true}));
        });

        let messages = client_for(&server)
            .history_since("C001", "0")
            .await
            .unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn set_read_marker_sends_channel_and_ts() {
        let server = MockServer::start_async().await;
        let mark = server.mock(|when, then| {
            when.method(GET)
                .path("/conversations.mark")
                .query_param("channel", "C001")
                .query_param("ts", "1700000300.000400");
            then.status(200).json_body(serde_json::json!({"ok": true}));
        });

        client_for(&server)
            .set_read_marker("C001", "1700000300.000400")
            .await
            .unwrap();
        mark.assert_calls(1);
    }

    #[tokio::test]
    async fn envelope_error_is_surfaced() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/conversations.info");
            then.status(200)
                .json_body(serde_json::json!({"ok": false, "error": "channel_not_found"}));
        });

        let err = client_for(&server).last_read("C404").await.unwrap_err();
        assert!(matches!(err, Error::SlackApi(_)));
        assert!(err.to_string().contains("channel_not_found"));
    }

    #[tokio::test]
    async fn http_error_status_is_surfaced() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/users.conversations");
            then.status(503).body("upstream down");
        });

        let err = client_for(&server).list_private_channels().await.unwrap_err();
        assert!(matches!(err, Error::SlackApi(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/conversations.history");
            then.status(200).body("<html>login</html>");
        });

        let err = client_for(&server).history_since("C001", "0").await.unwrap_err();
        assert!(matches!(err, Error::SlackApi(_)));
    }
}
