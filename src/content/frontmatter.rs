//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::error::FrontMatterError;

/// Accepts either `tags: rust` or `tags: [rust, web]`
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut tags = Vec::new();
            while let Some(tag) = seq.next_element::<String>()? {
                tags.push(tag);
            }
            Ok(tags)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Raw metadata block of a post or project file.
///
/// Every field is optional at this stage; the loader decides which ones a
/// record cannot live without.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub excerpt: Option<String>,
    pub featured: Option<bool>,
}

impl FrontMatter {
    /// Split a content file into its metadata and body.
    ///
    /// The file must open with a `---` line; the block runs to the next line
    /// that is exactly `---`.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();

        let mut lines = content.split_inclusive('\n');
        let opening = lines.next().ok_or(FrontMatterError::Missing)?;
        if opening.trim_end() != "---" {
            return Err(FrontMatterError::Missing);
        }

        let yaml_start = opening.len();
        let mut offset = yaml_start;
        for line in lines {
            if line.trim_end() == "---" {
                let yaml = &content[yaml_start..offset];
                let body = content[offset + line.len()..].trim_start_matches(['\n', '\r']);

                let fm = if yaml.trim().is_empty() {
                    FrontMatter::default()
                } else {
                    serde_yaml::from_str(yaml)?
                };
                return Ok((fm, body));
            }
            offset += line.len();
        }

        Err(FrontMatterError::Unterminated)
    }
}

/// Parse a front-matter date down to its calendar day
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Deserialize a date string with the same leniency as front-matter dates
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date `{}`", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
slug: hello-world
date: 2024-01-15
featured: true
tags:
  - rust
  - web
---

This is the content.
"#;

        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Hello World"));
        assert_eq!(fm.slug.as_deref(), Some("hello-world"));
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert_eq!(fm.featured, Some(true));
        assert_eq!(fm.tags, vec!["rust", "web"]);
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_single_string_tag() {
        let content = "---\ntitle: One\ntags: Notes\n---\nbody";
        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
    }

    #[test]
    fn test_type_field_is_renamed() {
        let content = "---\ntype: project\n---\n";
        let (fm, body) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.content_type.as_deref(), Some("project"));
        assert!(body.is_empty());
    }

    #[test]
    fn test_empty_block_is_default() {
        let (fm, body) = FrontMatter::parse("---\n---\nJust text").unwrap();
        assert!(fm.title.is_none());
        assert!(fm.tags.is_empty());
        assert_eq!(body, "Just text");
    }

    #[test]
    fn test_missing_block() {
        let err = FrontMatter::parse("# Just markdown\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Missing));
    }

    #[test]
    fn test_unterminated_block() {
        let err = FrontMatter::parse("---\ntitle: Oops\n\nbody").unwrap_err();
        assert!(matches!(err, FrontMatterError::Unterminated));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = FrontMatter::parse("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, FrontMatterError::Yaml(_)));
    }

    #[test]
    fn test_body_keeps_horizontal_rules() {
        let content = "---\ntitle: Rules\n---\nabove\n\n---\n\nbelow\n";
        let (_, body) = FrontMatter::parse(content).unwrap();
        assert!(body.contains("above"));
        assert!(body.contains("below"));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_date("2024-06-01"), Some(expected));
        assert_eq!(parse_date("2024/06/01"), Some(expected));
        assert_eq!(parse_date("2024-06-01 10:30:00"), Some(expected));
        assert_eq!(parse_date("2024-06-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_date("June first"), None);
    }
}
