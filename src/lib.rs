//! ryeo-site: content and newsletter backend for the Ryeo Labs website
//!
//! Blog posts and projects are markdown files with YAML front-matter, the
//! timeline is a single JSON file, and the newsletter form stores subscribers
//! in a PostgREST table before sending a best-effort welcome email.

pub mod commands;
pub mod config;
pub mod content;
pub mod server;
pub mod subscribe;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site checkout on disk
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory (posts/, projects/, timeline.json)
    pub content_dir: PathBuf,
    /// Pre-built static pages
    pub public_dir: PathBuf,
}

impl Site {
    /// Open a site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            public_dir,
        }
    }

    /// Reader for posts and projects
    pub fn content(&self) -> content::ContentRepository {
        content::ContentRepository::new(&self.content_dir)
    }

    pub fn timeline(&self) -> content::TimelineReader {
        content::TimelineReader::new(&self.content_dir)
    }

    /// Public URL of a record page
    pub fn record_url(&self, post: &content::Post) -> String {
        let section = match post.content_type {
            content::ContentType::Blog => "blog",
            content::ContentType::Project => "projects",
        };
        format!("{}/{}/{}", self.config.url.trim_end_matches('/'), section, post.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_site_defaults() {
        let dir = TempDir::new().unwrap();
        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.content_dir, dir.path().join("content"));
        assert_eq!(site.public_dir, dir.path().join("public"));
    }

    #[test]
    fn test_site_reads_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("_config.yml"),
            "url: https://ryeo-labs.com/\ncontent_dir: src/content\n",
        )
        .unwrap();

        let site = Site::new(dir.path()).unwrap();
        assert_eq!(site.content_dir, dir.path().join("src/content"));
        assert_eq!(site.config.url, "https://ryeo-labs.com/");
    }

    #[test]
    fn test_record_url() {
        let mut config = config::SiteConfig::default();
        config.url = "https://ryeo-labs.com/".to_string();
        let site = Site::with_config(PathBuf::from("/srv/site"), config);

        let post = content::Post {
            slug: "first".to_string(),
            title: "First".to_string(),
            author: None,
            date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            content_type: content::ContentType::Project,
            tags: Vec::new(),
            image: None,
            excerpt: String::new(),
            content: String::new(),
            featured: false,
            source: PathBuf::new(),
        };
        assert_eq!(site.record_url(&post), "https://ryeo-labs.com/projects/first");
    }
}
