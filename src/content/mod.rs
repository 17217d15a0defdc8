//! Content module - blog posts, projects and the timeline

mod error;
mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod timeline;

pub use error::{ContentError, FrontMatterError};
pub use frontmatter::FrontMatter;
pub use loader::{ContentRepository, DEFAULT_FEATURED_LIMIT};
pub(crate) use markdown::escape_html;
pub use markdown::MarkdownRenderer;
pub use post::{ContentType, Post, TimelineEvent, TimelineKind};
pub use timeline::TimelineReader;
