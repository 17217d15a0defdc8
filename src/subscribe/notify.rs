//! Outbound email notifications

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::content::{escape_html, Post};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A single outgoing email. `from` falls back to the notifier's default sender.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub from: Option<String>,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("mail server request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("mail server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Postal answers 200 but refuses the message
    #[error("mail server rejected message ({status}): {message}")]
    Rejected { status: String, message: String },
}

/// Envelope of every Postal API response
#[derive(Debug, Deserialize)]
struct PostalResponse {
    status: String,
    #[serde(default)]
    data: Value,
}

impl PostalResponse {
    fn into_result(self) -> Result<(), NotifyError> {
        if self.status == "success" {
            return Ok(());
        }
        let message = self
            .data
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no details given")
            .to_string();
        Err(NotifyError::Rejected {
            status: self.status,
            message,
        })
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Sends through a Postal server's HTTP API
pub struct PostalNotifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    default_from: String,
}

impl PostalNotifier {
    pub fn new(server_url: &str, api_key: &str, default_from: &str) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/v1/send/message", server_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            default_from: default_from.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for PostalNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let body = json!({
            "to": [{ "email": message.to }],
            "from": message.from.as_deref().unwrap_or(&self.default_from),
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Server-API-Key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotifyError::Status { status, body });
        }

        let body = response.text().await?;
        let reply: PostalResponse =
            serde_json::from_str(&body).map_err(|_| NotifyError::Status { status, body })?;
        reply.into_result()?;

        tracing::debug!("Sent \"{}\" to {}", message.subject, message.to);
        Ok(())
    }
}

/// Drops every message; stands in when no mail server is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(
            "Email delivery not configured, skipping \"{}\" to {}",
            message.subject,
            message.to
        );
        Ok(())
    }
}

/// Sent right after a successful subscription
pub fn welcome_email(to: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Welcome to Ryeo Labs".to_string(),
        html: concat!(
            "<h1>Welcome to Ryeo Labs</h1>\n",
            "<p>Thanks for subscribing to my newsletter!</p>\n",
            "<p>You'll be the first to know about new blog posts, projects, and updates.</p>\n",
            "<p>- Anne Reyes</p>\n",
        )
        .to_string(),
        from: None,
    }
}

/// Announces a freshly published post
pub fn new_post_email(to: &str, post: &Post, post_url: &str) -> EmailMessage {
    let title = escape_html(&post.title);
    EmailMessage {
        to: to.to_string(),
        subject: format!("New Post: {}", post.title),
        html: format!(
            "<h2>{}</h2>\n<p>{}</p>\n<a href=\"{}\">Read the full post</a>\n<hr />\n<p>Keep Moving Forward,<br />Anne Reyes - Ryeo Labs</p>\n",
            title,
            escape_html(&post.excerpt),
            escape_html(post_url),
        ),
        from: None,
    }
}
