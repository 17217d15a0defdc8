//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::DEFAULT_FEATURED_LIMIT;

/// Environment variables that override credentials from the config file
pub const ENV_DATABASE_URL: &str = "SUPABASE_URL";
pub const ENV_DATABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_EMAIL_SERVER: &str = "POSTAL_SERVER_URL";
pub const ENV_EMAIL_KEY: &str = "POSTAL_API_KEY";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Home page
    pub featured_limit: usize,

    // Services
    pub database: DatabaseConfig,
    pub email: EmailConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Ryeo Labs".to_string(),
            author: "Anne Reyes".to_string(),
            url: "http://localhost:4000".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            featured_limit: DEFAULT_FEATURED_LIMIT,

            database: DatabaseConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Apply credentials from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Replace credentials with whatever `lookup` returns for the known keys.
    ///
    /// Empty values are ignored so that `FOO=` does not erase a file setting.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_DATABASE_URL) {
            self.database.url = Some(v);
        }
        if let Some(v) = get(ENV_DATABASE_KEY) {
            self.database.anon_key = Some(v);
        }
        if let Some(v) = get(ENV_EMAIL_SERVER) {
            self.email.server_url = Some(v);
        }
        if let Some(v) = get(ENV_EMAIL_KEY) {
            self.email.api_key = Some(v);
        }
    }
}

/// Subscriber database (PostgREST endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            table: "subscribers".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// URL and key, if both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}

/// Outbound mail server (Postal HTTP API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub server_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            from: "noreply@ryeo-labs.com".to_string(),
        }
    }
}

impl EmailConfig {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.server_url.as_deref(), self.api_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }
}
