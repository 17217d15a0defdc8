//! Subscriber storage
//!
//! The store owns the real uniqueness guarantee for emails: `insert` must
//! refuse a second record for the same address with [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A newsletter subscriber row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a subscriber with this email already exists")]
    Conflict,

    #[error("subscriber store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("subscriber store returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Exact, case-sensitive lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError>;

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError>;

    /// Every subscriber, oldest first
    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError>;
}

/// In-process store.
///
/// Used by tests and as the stand-in when no database is configured, in which
/// case subscribers live only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SubscriberStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        let subscribers = self.subscribers.lock().await;
        Ok(subscribers.iter().find(|s| s.email == email).cloned())
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.iter().any(|s| s.email == subscriber.email) {
            return Err(StoreError::Conflict);
        }
        subscribers.push(subscriber.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let mut all = self.subscribers.lock().await.clone();
        all.sort_by(|a, b| a.subscribed_at.cmp(&b.subscribed_at));
        Ok(all)
    }
}

/// Supabase (PostgREST) table access over HTTP.
///
/// The table is expected to carry a unique constraint on `email`; PostgREST
/// reports a violation as `409 Conflict`.
pub struct SupabaseStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.to_string(),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<Subscriber>, StoreError> {
        let response = self.get(url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl SubscriberStore for SupabaseStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        let url = format!(
            "{}?select=email,subscribed_at&email=eq.{}&limit=1",
            self.endpoint,
            utf8_percent_encode(email, NON_ALPHANUMERIC)
        );
        Ok(self.fetch(&url).await?.into_iter().next())
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[subscriber])
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict);
        }
        check_status(response).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, StoreError> {
        let url = format!(
            "{}?select=email,subscribed_at&order=subscribed_at.asc",
            self.endpoint
        );
        self.fetch(&url).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err(StoreError::Status { status, body })
}
