//! List site content

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::content::ContentType;
use crate::Site;

/// Print site content of one kind
pub fn run(site: &Site, what: &str, tag_type: ContentType) -> Result<()> {
    print!("{}", render(site, what, tag_type)?);
    Ok(())
}

/// Build the listing printed by `run`.
///
/// `what` is `blog`, `project`, `featured`, `tags` or `timeline`; `tag_type`
/// selects the collection for `featured` and `tags`.
pub fn render(site: &Site, what: &str, tag_type: ContentType) -> Result<String> {
    let repo = site.content();
    let mut out = String::new();

    match what {
        "tag" | "tags" => {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for post in repo.list_all(tag_type)? {
                for tag in post.tags {
                    *counts.entry(tag).or_insert(0) += 1;
                }
            }
            writeln!(out, "Tags ({}):", counts.len())?;
            for (tag, count) in counts {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        "featured" => {
            let posts = repo.list_featured(tag_type, site.config.featured_limit)?;
            writeln!(out, "Featured {} ({}):", tag_type, posts.len())?;
            for post in posts {
                writeln!(out, "  {} - {} [{}]", post.date, post.title, post.slug)?;
            }
        }
        "timeline" => {
            let events = site.timeline().list_all()?;
            writeln!(out, "Timeline ({}):", events.len())?;
            for event in events {
                writeln!(out, "  {} - {} ({})", event.date, event.title, event.kind)?;
            }
        }
        other => {
            let content_type: ContentType = other.parse().map_err(|_| {
                anyhow::anyhow!(
                    "Unknown type: {}. Available: blog, project, featured, tags, timeline",
                    other
                )
            })?;
            let posts = repo.list_all(content_type)?;
            writeln!(out, "{} ({}):", content_type, posts.len())?;
            for post in posts {
                let marker = if post.featured { " *" } else { "" };
                writeln!(
                    out,
                    "  {} - {} [{}]{}",
                    post.date, post.title, post.slug, marker
                )?;
            }
        }
    }

    Ok(out)
}
