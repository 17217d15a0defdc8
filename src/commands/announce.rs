//! Announce a blog post to every subscriber

use anyhow::{bail, Result};

use crate::content::ContentType;
use crate::subscribe::{new_post_email, Services};
use crate::Site;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnounceReport {
    pub sent: usize,
    pub failed: usize,
}

/// Email the new-post notification for `slug` to all subscribers.
///
/// One failed recipient does not stop the rest; failures are logged and
/// counted in the report.
pub async fn run(site: &Site, services: &Services, slug: &str) -> Result<AnnounceReport> {
    let Some(post) = site.content().get_by_slug(slug, ContentType::Blog)? else {
        bail!("No blog post with slug `{}`", slug);
    };
    let url = site.record_url(&post);

    let subscribers = services.store.list_all().await?;
    tracing::info!(
        "Announcing \"{}\" to {} subscribers",
        post.title,
        subscribers.len()
    );

    let mut report = AnnounceReport::default();
    for subscriber in &subscribers {
        let message = new_post_email(&subscriber.email, &post, &url);
        match services.notifier.send(&message).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::warn!("Announcement to {} failed: {}", subscriber.email, e);
                report.failed += 1;
            }
        }
    }

    println!(
        "Announced \"{}\": {} sent, {} failed",
        post.title, report.sent, report.failed
    );
    Ok(report)
}
