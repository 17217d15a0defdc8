//! Content repository - reads posts and projects from the content directory
//!
//! Every query goes back to the filesystem; nothing is cached between calls.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::ContentError;
use super::frontmatter::{parse_date, FrontMatter};
use super::post::{sort_newest_first, ContentType, Post};

/// Number of records `list_featured` returns when the caller has no opinion
pub const DEFAULT_FEATURED_LIMIT: usize = 6;

/// Reads one-file-per-record content collections
#[derive(Debug, Clone)]
pub struct ContentRepository {
    content_dir: PathBuf,
}

impl ContentRepository {
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// All records of a type, newest first.
    ///
    /// A missing collection directory yields an empty list.
    pub fn list_all(&self, content_type: ContentType) -> Result<Vec<Post>, ContentError> {
        let dir = self.content_dir.join(content_type.dir_name());
        if !dir.is_dir() {
            tracing::debug!("No {} directory at {:?}", content_type, dir);
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|source| ContentError::Walk {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && is_content_file(path) {
                posts.push(load_post(path, content_type)?);
            } else {
                tracing::trace!("Skipping {:?}", path);
            }
        }

        ensure_unique_slugs(&posts, content_type)?;
        sort_newest_first(&mut posts);

        tracing::debug!("Loaded {} {} records", posts.len(), content_type);
        Ok(posts)
    }

    /// Featured records, newest first, at most `limit` of them
    pub fn list_featured(
        &self,
        content_type: ContentType,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        Ok(self
            .list_all(content_type)?
            .into_iter()
            .filter(|p| p.featured)
            .take(limit)
            .collect())
    }

    /// Look up one record; `Ok(None)` when no record has this slug
    pub fn get_by_slug(
        &self,
        slug: &str,
        content_type: ContentType,
    ) -> Result<Option<Post>, ContentError> {
        Ok(self
            .list_all(content_type)?
            .into_iter()
            .find(|p| p.slug == slug))
    }

    pub fn list_by_tag(
        &self,
        tag: &str,
        content_type: ContentType,
    ) -> Result<Vec<Post>, ContentError> {
        Ok(self
            .list_all(content_type)?
            .into_iter()
            .filter(|p| p.has_tag(tag))
            .collect())
    }

    /// Every distinct tag of a type, sorted
    pub fn list_all_tags(&self, content_type: ContentType) -> Result<Vec<String>, ContentError> {
        let tags: BTreeSet<String> = self
            .list_all(content_type)?
            .into_iter()
            .flat_map(|p| p.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }
}

/// Read and validate a single record file
fn load_post(path: &Path, content_type: ContentType) -> Result<Post, ContentError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (fm, body) = FrontMatter::parse(&raw).map_err(|source| ContentError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    let missing = |field| ContentError::MissingField {
        path: path.to_path_buf(),
        field,
    };

    if let Some(declared) = fm.content_type.as_deref() {
        if declared.parse::<ContentType>() != Ok(content_type) {
            return Err(ContentError::TypeMismatch {
                path: path.to_path_buf(),
                expected: content_type,
                found: declared.to_string(),
            });
        }
    }

    let title = fm.title.ok_or_else(|| missing("title"))?;
    let slug = fm.slug.ok_or_else(|| missing("slug"))?;
    let excerpt = fm.excerpt.ok_or_else(|| missing("excerpt"))?;
    let raw_date = fm.date.ok_or_else(|| missing("date"))?;
    let date = parse_date(&raw_date).ok_or_else(|| ContentError::InvalidDate {
        path: path.to_path_buf(),
        value: raw_date.clone(),
    })?;

    Ok(Post {
        slug,
        title,
        author: fm.author,
        date,
        content_type,
        tags: fm.tags,
        image: fm.image,
        excerpt,
        content: body.to_string(),
        featured: fm.featured.unwrap_or(false),
        source: path.to_path_buf(),
    })
}

fn ensure_unique_slugs(posts: &[Post], content_type: ContentType) -> Result<(), ContentError> {
    let mut seen = HashSet::new();
    for post in posts {
        if !seen.insert(post.slug.as_str()) {
            return Err(ContentError::DuplicateSlug {
                content_type,
                slug: post.slug.clone(),
            });
        }
    }
    Ok(())
}

/// Check if a file is a markdown or MDX content file
fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "mdx")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_record(root: &Path, content_type: ContentType, file: &str, front: &str) {
        let dir = root.join(content_type.dir_name());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(file), format!("---\n{}\n---\nBody of {}\n", front, file)).unwrap();
    }

    fn record(slug: &str, date: &str, extra: &str) -> String {
        format!(
            "title: {slug}\nslug: {slug}\ndate: {date}\nexcerpt: About {slug}\n{extra}",
            slug = slug,
            date = date,
            extra = extra
        )
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let repo = ContentRepository::new(dir.path().join("nowhere"));
        assert!(repo.list_all(ContentType::Blog).unwrap().is_empty());
        assert!(repo.list_all_tags(ContentType::Project).unwrap().is_empty());
    }

    #[test]
    fn test_list_all_newest_first() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "old.md", &record("old", "2024-01-01", ""));
        write_record(dir.path(), ContentType::Blog, "new.mdx", &record("new", "2024-06-01", ""));

        let repo = ContentRepository::new(dir.path());
        let posts = repo.list_all(ContentType::Blog).unwrap();
        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "old"]);
        assert_eq!(posts[0].content, "Body of new.mdx\n");
        assert_eq!(posts[0].content_type, ContentType::Blog);
        assert!(!posts[0].featured);
    }

    #[test]
    fn test_same_date_orders_by_slug() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "1.md", &record("zulu", "2024-03-03", ""));
        write_record(dir.path(), ContentType::Blog, "2.md", &record("alpha", "2024-03-03", ""));

        let repo = ContentRepository::new(dir.path());
        for _ in 0..3 {
            let slugs: Vec<_> = repo
                .list_all(ContentType::Blog)
                .unwrap()
                .into_iter()
                .map(|p| p.slug)
                .collect();
            assert_eq!(slugs, vec!["alpha", "zulu"]);
        }
    }

    #[test]
    fn test_non_content_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "post.md", &record("post", "2024-01-01", ""));
        let posts_dir = dir.path().join("posts");
        fs::write(posts_dir.join("notes.txt"), "not front-matter at all").unwrap();
        fs::write(posts_dir.join(".DS_Store"), [0u8, 1, 2]).unwrap();
        fs::create_dir_all(posts_dir.join("drafts")).unwrap();

        let repo = ContentRepository::new(dir.path());
        assert_eq!(repo.list_all(ContentType::Blog).unwrap().len(), 1);
    }

    #[test]
    fn test_list_featured_limits_and_filters() {
        let dir = TempDir::new().unwrap();
        let p = ContentType::Project;
        write_record(dir.path(), p, "a.md", &record("a", "2024-01-01", "featured: true"));
        write_record(dir.path(), p, "b.md", &record("b", "2024-02-01", "featured: true"));
        write_record(dir.path(), p, "c.md", &record("c", "2024-03-01", "featured: true"));
        write_record(dir.path(), p, "d.md", &record("d", "2024-04-01", "featured: false"));
        write_record(dir.path(), p, "e.md", &record("e", "2024-05-01", ""));

        let repo = ContentRepository::new(dir.path());
        let featured = repo.list_featured(p, 2).unwrap();
        assert_eq!(featured.len(), 2);
        assert!(featured.iter().all(|p| p.featured));
        assert_eq!(featured[0].slug, "c");
        assert_eq!(featured[1].slug, "b");

        let all = repo.list_featured(p, DEFAULT_FEATURED_LIMIT).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_get_by_slug() {
        let dir = TempDir::new().unwrap();
        write_record(
            dir.path(),
            ContentType::Blog,
            "hello.md",
            &record("hello", "2024-01-01", "author: Anne Reyes\nimage: /img/hello.png"),
        );

        let repo = ContentRepository::new(dir.path());
        let post = repo.get_by_slug("hello", ContentType::Blog).unwrap().unwrap();
        assert_eq!(post.author.as_deref(), Some("Anne Reyes"));
        assert_eq!(post.image.as_deref(), Some("/img/hello.png"));

        assert_eq!(repo.get_by_slug("missing-slug", ContentType::Blog).unwrap(), None);
        assert_eq!(repo.get_by_slug("hello", ContentType::Project).unwrap(), None);
    }

    #[test]
    fn test_tags() {
        let dir = TempDir::new().unwrap();
        let b = ContentType::Blog;
        write_record(dir.path(), b, "one.md", &record("one", "2024-01-01", "tags: [b, a]"));
        write_record(dir.path(), b, "two.md", &record("two", "2024-02-01", "tags: [b, c]"));

        let repo = ContentRepository::new(dir.path());
        assert_eq!(repo.list_all_tags(b).unwrap(), vec!["a", "b", "c"]);

        let tagged: Vec<_> = repo
            .list_by_tag("b", b)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(tagged, vec!["two", "one"]);
        assert!(repo.list_by_tag("z", b).unwrap().is_empty());

        let one = repo.get_by_slug("one", b).unwrap().unwrap();
        assert_eq!(one.tags, vec!["b", "a"]);
    }

    #[test]
    fn test_missing_required_field() {
        let dir = TempDir::new().unwrap();
        write_record(
            dir.path(),
            ContentType::Blog,
            "broken.md",
            "title: No slug\ndate: 2024-01-01\nexcerpt: x",
        );

        let repo = ContentRepository::new(dir.path());
        let err = repo.list_all(ContentType::Blog).unwrap_err();
        assert!(matches!(err, ContentError::MissingField { field: "slug", .. }));
    }

    #[test]
    fn test_invalid_date() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "x.md", &record("x", "someday", ""));

        let repo = ContentRepository::new(dir.path());
        let err = repo.list_all(ContentType::Blog).unwrap_err();
        assert!(matches!(err, ContentError::InvalidDate { .. }));
    }

    #[test]
    fn test_missing_front_matter_is_error() {
        let dir = TempDir::new().unwrap();
        let posts_dir = dir.path().join("posts");
        fs::create_dir_all(&posts_dir).unwrap();
        fs::write(posts_dir.join("plain.md"), "# No metadata\n").unwrap();

        let repo = ContentRepository::new(dir.path());
        let err = repo.list_all(ContentType::Blog).unwrap_err();
        assert!(matches!(err, ContentError::FrontMatter { .. }));
    }

    #[test]
    fn test_type_mismatch() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "p.md", &record("p", "2024-01-01", "type: project"));
        write_record(dir.path(), ContentType::Project, "q.md", &record("q", "2024-01-01", "type: project"));

        let repo = ContentRepository::new(dir.path());
        assert!(matches!(
            repo.list_all(ContentType::Blog).unwrap_err(),
            ContentError::TypeMismatch { .. }
        ));
        assert_eq!(repo.list_all(ContentType::Project).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_slug() {
        let dir = TempDir::new().unwrap();
        write_record(dir.path(), ContentType::Blog, "a.md", &record("same", "2024-01-01", ""));
        write_record(dir.path(), ContentType::Blog, "b.md", &record("same", "2024-02-01", ""));

        let repo = ContentRepository::new(dir.path());
        let err = repo.list_all(ContentType::Blog).unwrap_err();
        assert!(matches!(err, ContentError::DuplicateSlug { ref slug, .. } if slug == "same"));
    }

    #[test]
    fn test_reads_are_fresh() {
        let dir = TempDir::new().unwrap();
        let repo = ContentRepository::new(dir.path());
        assert!(repo.list_all(ContentType::Blog).unwrap().is_empty());

        write_record(dir.path(), ContentType::Blog, "late.md", &record("late", "2024-01-01", ""));
        assert_eq!(repo.list_all(ContentType::Blog).unwrap().len(), 1);
    }
}
