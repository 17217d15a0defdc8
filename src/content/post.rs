//! Content record models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::frontmatter::lenient_date;

/// The two one-file-per-record content collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Project,
}

impl ContentType {
    /// Directory under the content root holding this collection
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentType::Blog => "posts",
            ContentType::Project => "projects",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Blog => "blog",
            ContentType::Project => "project",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" | "post" | "posts" => Ok(ContentType::Blog),
            "project" | "projects" => Ok(ContentType::Project),
            other => Err(format!("unknown content type `{}` (expected blog or project)", other)),
        }
    }
}

/// A blog post or project entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// URL-friendly identifier, unique within its content type
    pub slug: String,

    pub title: String,

    pub author: Option<String>,

    /// Publication date, the sort key
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Tags in the order the author wrote them
    pub tags: Vec<String>,

    /// Cover image path or URL
    pub image: Option<String>,

    pub excerpt: String,

    /// Raw markdown body
    pub content: String,

    pub featured: bool,

    /// File the record was read from
    #[serde(skip)]
    pub source: PathBuf,
}

impl Post {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Order records newest first, breaking date ties by slug
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
}

/// Category of a timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Award,
    Milestone,
    Activity,
    Event,
}

impl FromStr for TimelineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "award" => Ok(TimelineKind::Award),
            "milestone" => Ok(TimelineKind::Milestone),
            "activity" => Ok(TimelineKind::Activity),
            "event" => Ok(TimelineKind::Event),
            other => Err(format!(
                "unknown timeline type `{}` (expected award, milestone, activity or event)",
                other
            )),
        }
    }
}

impl fmt::Display for TimelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimelineKind::Award => "award",
            TimelineKind::Milestone => "milestone",
            TimelineKind::Activity => "activity",
            TimelineKind::Event => "event",
        };
        f.write_str(name)
    }
}

/// One entry of `timeline.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: String,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TimelineKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
