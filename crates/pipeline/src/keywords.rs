//! Keyword extraction from queue topic lines.
//!
//! A topic line has the shape `Primary: <text>[; Secondary: <a, b, c>]`.

use tracing::debug;

use crate::{ParsedTopic, PipelineError, TopicLine};

const PRIMARY_MARKER: &str = "Primary:";
const SECONDARY_MARKER: &str = "Secondary:";

/// Extracts the primary keyword and the secondary keyword list.
///
/// A missing `Secondary:` section, or one with nothing after the marker, yields
/// an empty list. Blank CSV entries are dropped.
///
/// # Errors
///
/// [`PipelineError::Parse`] if there is no `Primary:` marker or its content is
/// empty.
pub fn parse_topic(line: &TopicLine) -> Result<ParsedTopic, PipelineError> {
    let text = line.as_str();

    let primary = text
        .find(PRIMARY_MARKER)
        .map(|at| {
            let after = &text[at + PRIMARY_MARKER.len()..];
            let end = [after.find(';'), after.find(SECONDARY_MARKER)]
                .into_iter()
                .flatten()
                .min()
                .unwrap_or(after.len());
            after[..end].trim()
        })
        .unwrap_or_default();

    let secondary: Vec<String> = text
        .find(SECONDARY_MARKER)
        .map(|at| {
            text[at + SECONDARY_MARKER.len()..]
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let topic = ParsedTopic::new(primary, secondary).ok_or_else(|| {
        PipelineError::parse(format!("topic line has no primary keyword: '{line}'"))
    })?;
    debug!(
        primary = topic.primary(),
        secondary = topic.secondary().len(),
        "Parsed topic line"
    );
    Ok(topic)
}
