//! Newsletter subscriptions
//!
//! A subscribe call walks `validate -> check existing -> insert -> notify`.
//! Only the insert decides the outcome; the welcome email is attempted once
//! and a failure there is logged, never returned.

mod email;
mod notify;
mod store;

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

pub use email::{EmailAddress, EmailError};
pub use notify::{
    new_post_email, welcome_email, EmailMessage, NoopNotifier, Notifier, NotifyError,
    PostalNotifier,
};
pub use store::{MemoryStore, StoreError, Subscriber, SubscriberStore, SupabaseStore};

use crate::config::SiteConfig;

#[derive(Error, Debug)]
pub enum SubscribeError {
    /// No email, or not a non-empty string
    #[error("Invalid email provided")]
    InvalidInput,

    #[error("Invalid email format")]
    InvalidFormat,

    #[error("Already subscribed with this email")]
    AlreadySubscribed,

    /// The subscriber was not stored
    #[error("failed to store subscriber: {0}")]
    Storage(#[source] StoreError),
}

impl From<EmailError> for SubscribeError {
    fn from(e: EmailError) -> Self {
        match e {
            EmailError::Empty => SubscribeError::InvalidInput,
            EmailError::Malformed => SubscribeError::InvalidFormat,
        }
    }
}

/// Successful subscription; carries nothing beyond the fact itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscribed {
    pub confirmed: bool,
}

/// Storage and mail collaborators, chosen once at start-up
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn SubscriberStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Services {
    pub fn new(store: Arc<dyn SubscriberStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Real clients where credentials exist, stand-ins otherwise
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let store: Arc<dyn SubscriberStore> = match config.database.credentials() {
            Some((url, key)) => {
                tracing::info!("Storing subscribers in {}", url);
                Arc::new(SupabaseStore::new(url, key, &config.database.table)?)
            }
            None => {
                tracing::warn!("No database configured; subscribers are kept in memory only");
                Arc::new(MemoryStore::new())
            }
        };

        let notifier: Arc<dyn Notifier> = match config.email.credentials() {
            Some((url, key)) => {
                tracing::info!("Sending email through {}", url);
                Arc::new(PostalNotifier::new(url, key, &config.email.from)?)
            }
            None => {
                tracing::warn!("No mail server configured; emails will not be sent");
                Arc::new(NoopNotifier)
            }
        };

        Ok(Self::new(store, notifier))
    }
}

#[derive(Clone)]
pub struct SubscriptionHandler {
    services: Services,
}

impl SubscriptionHandler {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Subscribe `email` to the newsletter.
    ///
    /// `None` stands for a request that carried no usable email value.
    pub async fn subscribe(&self, email: Option<&str>) -> Result<Subscribed, SubscribeError> {
        let email = EmailAddress::parse(email.ok_or(SubscribeError::InvalidInput)?)?;

        // Friendly duplicate check only; the store's conflict is the real guard.
        match self.services.store.find_by_email(email.as_ref()).await {
            Ok(Some(_)) => return Err(SubscribeError::AlreadySubscribed),
            Ok(None) => {}
            Err(e) => tracing::warn!("Subscriber lookup for {} failed: {}", email, e),
        }

        let subscriber = Subscriber {
            email: email.to_string(),
            subscribed_at: Utc::now(),
        };
        match self.services.store.insert(&subscriber).await {
            Ok(()) => tracing::info!("New subscriber: {}", email),
            Err(StoreError::Conflict) => return Err(SubscribeError::AlreadySubscribed),
            Err(e) => {
                tracing::error!("Failed to store subscriber {}: {}", email, e);
                return Err(SubscribeError::Storage(e));
            }
        }

        if let Err(e) = self.services.notifier.send(&welcome_email(email.as_ref())).await {
            tracing::warn!("Welcome email to {} failed: {}", email, e);
        }

        Ok(Subscribed { confirmed: true })
    }
}
