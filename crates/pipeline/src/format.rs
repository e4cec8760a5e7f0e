//! Deterministic naming and document assembly for published posts.
//!
//! Every function here is pure: given the same title/topic and [`Timestamp`]
//! the same filename or document is produced.

use crate::{Category, RepoPath, Timestamp};

/// Directory in the target repository that receives posts.
pub const POSTS_DIR: &str = "_posts";

/// Slug used when a title strips down to nothing.
pub const DEFAULT_POST_SLUG: &str = "new-post";

/// Slug used when a topic strips down to nothing.
pub const DEFAULT_IMAGE_SLUG: &str = "blog-post";

/// Lowercases, drops everything outside `[a-z0-9 -]`, and joins words with `-`.
///
/// May return an empty string (e.g. for titles written entirely in Hangul).
pub fn slugify(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

fn slug_or(text: &str, fallback: &str) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// `_posts/<YYYY-MM-DD-HHMMSS>-<slug>.md`
pub fn post_path(title: &str, at: Timestamp) -> RepoPath {
    let file = format!("{}-{}.md", at.file_stamp(), slug_or(title, DEFAULT_POST_SLUG));
    RepoPath::join(POSTS_DIR, &file)
}

/// `<slug>-<HHMMSS>.<extension>`
pub fn image_file_name(topic: &str, at: Timestamp, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        slug_or(topic, DEFAULT_IMAGE_SLUG),
        at.clock_stamp(),
        extension
    )
}

// ---------------------------------------------------------------------------
// Site layout
// ---------------------------------------------------------------------------

/// Where the static-site generator expects uploaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteLayout {
    /// Images under `images/`, served as `/images/<file>`.
    #[default]
    Jekyll,
    /// Images under `static/images/`, served as `/images/<file>`.
    Hugo,
}

impl SiteLayout {
    /// Repository path the image file is uploaded to.
    pub fn image_repo_path(self, file_name: &str) -> RepoPath {
        let dir = match self {
            Self::Jekyll => "images",
            Self::Hugo => "static/images",
        };
        RepoPath::join(dir, file_name)
    }

    /// Site-absolute path written to `featured_image`.
    pub fn image_public_path(self, file_name: &str) -> String {
        format!("/images/{file_name}")
    }
}

// ---------------------------------------------------------------------------
// Frontmatter
// ---------------------------------------------------------------------------

/// Metadata block written at the top of every post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    pub title: String,
    pub date: Timestamp,
    pub category: Category,
    /// Site-absolute image path, e.g. `/images/seoul-101010.jpg`.
    pub featured_image: Option<String>,
}

impl Frontmatter {
    pub fn render(&self) -> String {
        let mut lines = vec![
            "---".to_string(),
            format!("title: {}", quoted(&self.title)),
            format!("date: {}", self.date.date_stamp()),
            format!("category: {}", quoted(self.category.label())),
        ];
        if let Some(image) = &self.featured_image {
            lines.push(format!("featured_image: {}", quoted(image)));
        }
        lines.push("---".to_string());
        lines.join("\n")
    }
}

/// A YAML double-quoted scalar. JSON string syntax is a subset of it, so
/// quotes, backslashes and control characters come out escaped.
fn quoted(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Frontmatter, blank line, body, and the tag line when present.
pub fn compose_post(frontmatter: &Frontmatter, body: &str, tags: Option<&str>) -> String {
    let mut document = format!("{}\n\n{}\n", frontmatter.render(), body.trim());
    if let Some(tags) = tags.map(str::trim).filter(|t| !t.is_empty()) {
        document.push('\n');
        document.push_str(tags);
        document.push('\n');
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn at() -> Timestamp {
        Timestamp::from_utc(Utc.with_ymd_and_hms(2025, 6, 1, 18, 30, 9).unwrap())
    }

    #[test]
    fn slug_examples() {
        assert_eq!(slugify("Seoul Street Food: 5 Night Markets!"), "seoul-street-food-5-night-markets");
        assert_eq!(slugify("  Phở   &  Bánh mì  "), "ph-bnh-m");
        assert_eq!(slugify("서울 야시장"), "");
    }

    #[test]
    fn post_path_uses_timestamp_and_slug() {
        let path = post_path("Seoul After Dark", at());
        assert_eq!(path.as_str(), "_posts/2025-06-01-183009-seoul-after-dark.md");
    }

    #[test]
    fn post_path_falls_back_to_new_post() {
        let path = post_path("서울 야시장", at());
        assert_eq!(path.as_str(), "_posts/2025-06-01-183009-new-post.md");
    }

    #[test]
    fn image_name_uses_clock_suffix() {
        assert_eq!(
            image_file_name("Seoul street food", at(), "jpg"),
            "seoul-street-food-183009.jpg"
        );
        assert_eq!(image_file_name("!!!", at(), "png"), "blog-post-183009.png");
    }

    #[test]
    fn frontmatter_with_and_without_image() {
        let mut fm = Frontmatter {
            title: "The \"Real\" Seoul".to_string(),
            date: at(),
            category: Category::StreetFoodNightMarkets,
            featured_image: None,
        };
        assert_eq!(
            fm.render(),
            "---\ntitle: \"The \\\"Real\\\" Seoul\"\ndate: 2025-06-01\ncategory: \"Street Food & Night Markets\"\n---"
        );

        fm.featured_image = Some("/images/seoul-183009.jpg".to_string());
        assert!(fm
            .render()
            .contains("\nfeatured_image: \"/images/seoul-183009.jpg\"\n---"));
    }

    #[test]
    fn frontmatter_escapes_control_characters_and_backslashes() {
        let fm = Frontmatter {
            title: "Line one\nC:\\Seoul\t\u{1}".to_string(),
            date: at(),
            category: Category::Uncategorized,
            featured_image: None,
        };
        let rendered = fm.render();
        let title_line = rendered.lines().nth(1).unwrap();

        assert_eq!(title_line, r#"title: "Line one\nC:\\Seoul\t\u0001""#);
        assert_eq!(rendered.lines().count(), 5);
    }

    #[test]
    fn compose_appends_tags_after_blank_line() {
        let fm = Frontmatter {
            title: "T".to_string(),
            date: at(),
            category: Category::Uncategorized,
            featured_image: None,
        };
        let doc = compose_post(&fm, "Body\n", Some("#a #b"));
        assert!(doc.ends_with("---\n\nBody\n\n#a #b\n"));

        let doc = compose_post(&fm, "Body", None);
        assert!(doc.ends_with("---\n\nBody\n"));
    }

    #[test]
    fn site_layout_paths() {
        assert_eq!(
            SiteLayout::Jekyll.image_repo_path("a-1.jpg").as_str(),
            "images/a-1.jpg"
        );
        assert_eq!(
            SiteLayout::Hugo.image_repo_path("a-1.jpg").as_str(),
            "static/images/a-1.jpg"
        );
        assert_eq!(SiteLayout::Hugo.image_public_path("a-1.jpg"), "/images/a-1.jpg");
    }

    proptest! {
        #[test]
        fn generated_names_stay_in_safe_alphabet(text in "\\PC{0,40}") {
            let path = post_path(&text, at());
            let stem = path.file_name().trim_end_matches(".md");
            prop_assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(path.as_str().starts_with("_posts/"));

            let image = image_file_name(&text, at(), "jpg");
            let stem = image.trim_end_matches(".jpg");
            prop_assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn names_are_deterministic(text in "\\PC{0,40}") {
            prop_assert_eq!(post_path(&text, at()), post_path(&text, at()));
            prop_assert_eq!(image_file_name(&text, at(), "png"), image_file_name(&text, at(), "png"));
        }
    }
}
