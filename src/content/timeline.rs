//! Timeline reader - a single JSON file listing every event

use std::fs;
use std::path::{Path, PathBuf};

use super::error::ContentError;
use super::post::{TimelineEvent, TimelineKind};

pub const TIMELINE_FILE: &str = "timeline.json";

#[derive(Debug, Clone)]
pub struct TimelineReader {
    path: PathBuf,
}

impl TimelineReader {
    /// Reader for `timeline.json` inside the content directory
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self {
            path: content_dir.as_ref().join(TIMELINE_FILE),
        }
    }

    /// All events, newest first; ties are ordered by id.
    ///
    /// Returns an empty list when the file does not exist.
    pub fn list_all(&self) -> Result<Vec<TimelineEvent>, ContentError> {
        if !self.path.is_file() {
            tracing::debug!("No timeline at {:?}", self.path);
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| ContentError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut events: Vec<TimelineEvent> =
            serde_json::from_str(&raw).map_err(|source| ContentError::Timeline {
                path: self.path.clone(),
                source,
            })?;

        events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    pub fn list_by_type(&self, kind: TimelineKind) -> Result<Vec<TimelineEvent>, ContentError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    const EVENTS: &str = r#"[
        {"id": "first-award", "date": "2022-03-10", "type": "award", "title": "Best Demo", "description": "Hackathon win"},
        {"id": "launch", "date": "2024-01-20", "type": "milestone", "title": "Lab launch", "description": "Ryeo Labs opens", "image": "/img/launch.jpg"},
        {"id": "b-talk", "date": "2023-08-01", "type": "event", "title": "Talk", "description": "Meetup talk"},
        {"id": "a-award", "date": "2023-08-01", "type": "award", "title": "Grant", "description": "Research grant"}
    ]"#;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let reader = TimelineReader::new(dir.path());
        assert!(reader.list_all().unwrap().is_empty());
        assert!(reader.list_by_type(TimelineKind::Award).unwrap().is_empty());
    }

    #[test]
    fn test_list_all_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(TIMELINE_FILE), EVENTS).unwrap();

        let events = TimelineReader::new(dir.path()).list_all().unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["launch", "a-award", "b-talk", "first-award"]);
        assert_eq!(events[0].image.as_deref(), Some("/img/launch.jpg"));
    }

    #[test]
    fn test_list_by_type() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(TIMELINE_FILE), EVENTS).unwrap();

        let awards = TimelineReader::new(dir.path())
            .list_by_type(TimelineKind::Award)
            .unwrap();
        let ids: Vec<_> = awards.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a-award", "first-award"]);
    }

    #[test]
    fn test_datetime_entries_use_their_day() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(TIMELINE_FILE),
            r#"[{"id": "x", "date": "2024-01-20T10:00:00Z", "type": "milestone", "title": "t", "description": "d"},
                {"id": "y", "date": "2023/05/02", "type": "event", "title": "t", "description": "d"}]"#,
        )
        .unwrap();

        let events = TimelineReader::new(dir.path()).list_all().unwrap();
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2023, 5, 2).unwrap());
    }

    #[test]
    fn test_unparseable_date_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(TIMELINE_FILE),
            r#"[{"id": "x", "date": "someday", "type": "event", "title": "t", "description": "d"}]"#,
        )
        .unwrap();

        let err = TimelineReader::new(dir.path()).list_all().unwrap_err();
        assert!(matches!(err, ContentError::Timeline { .. }));
    }

    #[test]
    fn test_malformed_timeline() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(TIMELINE_FILE),
            r#"[{"id": "x", "date": "2024-01-01", "type": "party", "title": "t", "description": "d"}]"#,
        )
        .unwrap();

        let err = TimelineReader::new(dir.path()).list_all().unwrap_err();
        assert!(matches!(err, ContentError::Timeline { .. }));
    }
}
