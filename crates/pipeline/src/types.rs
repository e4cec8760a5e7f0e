//! Shared value types for the Blog Studio pipeline domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (a parsed topic always has a primary
//! keyword, an article always has a title) and flow from one stage to the next
//! by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PipelineError, RepoPath};

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// One raw queue entry, e.g. `"Primary: Seoul street food; Secondary: night market"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicLine(String);

impl TopicLine {
    /// Wraps a queue line, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing but whitespace remains.
    pub fn new(line: impl AsRef<str>) -> Option<Self> {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TopicLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keywords extracted from a [`TopicLine`].
///
/// `primary` is never empty; construction goes through
/// [`crate::keywords::parse_topic`] or [`ParsedTopic::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTopic {
    primary: String,
    secondary: Vec<String>,
}

impl ParsedTopic {
    /// Returns `None` if `primary` is empty after trimming.
    pub fn new(primary: impl Into<String>, secondary: Vec<String>) -> Option<Self> {
        let primary = primary.into().trim().to_string();
        if primary.is_empty() {
            return None;
        }
        Some(Self { primary, secondary })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn secondary(&self) -> &[String] {
        &self.secondary
    }
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

/// A generated Markdown article split into its publishable parts.
///
/// Layout of the generated text:
///
/// ```text
/// <title>
/// <subtitle>
/// <body ...>
/// #tag1 #tag2 #tag3        (optional)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    raw: String,
    title: String,
    body: String,
    tags: Option<String>,
}

impl Article {
    /// Splits generated text into title, body (subtitle included) and tag line.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Parse`] if the text has no usable title line.
    pub fn parse(text: &str) -> Result<Self, PipelineError> {
        let raw = text.trim().to_string();
        let mut lines: Vec<&str> = raw.lines().collect();

        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        let tags = match lines.last() {
            Some(last) if is_hashtag_line(last) => {
                let tags = last.trim().to_string();
                lines.pop();
                Some(tags)
            }
            _ => None,
        };

        let mut rest = lines.into_iter().skip_while(|l| l.trim().is_empty());
        let title = rest.next().map(clean_heading).unwrap_or_default();
        if title.is_empty() {
            return Err(PipelineError::parse("generated article has no title line"));
        }
        let body = rest.collect::<Vec<_>>().join("\n").trim().to_string();

        Ok(Self {
            raw,
            title,
            body,
            tags,
        })
    }

    /// The full generated text, trimmed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Subtitle and body, without the title and tag lines.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn tags(&self) -> Option<&str> {
        self.tags.as_deref()
    }
}

/// `true` when every whitespace-separated token is a hashtag (`#word`).
///
/// Markdown headings (`# Title`, `## Section`) are rejected because their
/// first token is a bare run of `#`.
pub fn is_hashtag_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some()
        && tokens.all(|token| {
            token
                .strip_prefix('#')
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c != '#')
        })
}

/// Strips heading markers, bold markers and a `Title:` label in either order.
fn clean_heading(line: &str) -> String {
    let s = line.trim().trim_start_matches('#').trim();
    let s = strip_title_label(s);
    let s = s
        .strip_prefix("**")
        .and_then(|r| r.strip_suffix("**"))
        .map(str::trim)
        .unwrap_or(s);
    let s = strip_title_label(s);
    s.trim_matches('"').trim().to_string()
}

/// Removes a leading `Title:` or `**Title:**`, case-insensitively.
fn strip_title_label(s: &str) -> &str {
    ["**title:**", "title:"]
        .into_iter()
        .find_map(|label| {
            s.get(..label.len())
                .filter(|head| head.eq_ignore_ascii_case(label))
                .and_then(|_| s.get(label.len()..))
        })
        .map(str::trim)
        .unwrap_or(s)
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    /// Repository path of the created Markdown file.
    pub path: RepoPath,
    /// Public URL of the created file as reported by the repository host.
    pub html_url: String,
    /// Site-absolute image path written to the frontmatter, if any.
    pub featured_image: Option<String>,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// `YYYY-MM-DD`, as written to frontmatter.
    pub fn date_stamp(self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// `YYYY-MM-DD-HHMMSS`, the post filename prefix.
    pub fn file_stamp(self) -> String {
        self.0.format("%Y-%m-%d-%H%M%S").to_string()
    }

    /// `HHMMSS`, the image filename suffix.
    pub fn clock_stamp(self) -> String {
        self.0.format("%H%M%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
