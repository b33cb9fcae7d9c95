use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::{Result, SummarizeError};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const THUMBNAIL_URL: &str = "http://img.youtube.com/vi/{video_id}/0.jpg";

/// Canonical identifier of a YouTube video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoReference(String);

impl VideoReference {
    /// Wrap an identifier that is already known to be non-empty
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SummarizeError::MalformedInput(
                "video identifier is empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL, urlencoding::encode(&self.0))
    }

    /// Preview image for the video
    pub fn thumbnail_url(&self) -> String {
        THUMBNAIL_URL.replace("{video_id}", &urlencoding::encode(&self.0))
    }
}

impl fmt::Display for VideoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video identifier from a YouTube link.
///
/// Only the `v` query parameter is accepted. It is read through a real URL
/// parser, so trailing parameters such as `&t=42s` never leak into the
/// identifier. Path-only links (`youtu.be/<id>`, `/embed/<id>`) carry no `v`
/// and are rejected.
pub fn resolve(input: &str) -> Result<VideoReference> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SummarizeError::MalformedInput("link is empty".to_string()));
    }

    let url = parse_link(trimmed)?;

    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "v") {
        return VideoReference::new(id.into_owned()).map_err(|_| {
            SummarizeError::MalformedInput(format!("'v' parameter is empty in {}", trimmed))
        });
    }

    Err(SummarizeError::MalformedInput(format!(
        "no video identifier found in {}",
        trimmed
    )))
}

fn parse_link(input: &str) -> Result<Url> {
    let candidate = if input.contains("://") {
        input.to_string()
    } else if input.contains("youtube.com") || input.contains("youtu.be") {
        format!("https://{}", input)
    } else {
        input.to_string()
    };

    let url = Url::parse(&candidate)
        .map_err(|e| SummarizeError::MalformedInput(format!("{} ({})", input, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(SummarizeError::MalformedInput(format!(
            "{} (link must use HTTP or HTTPS)",
            input
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_watch_url() {
        let video = resolve("https://youtube.com/watch?v=ABC123").unwrap();
        assert_eq!(video.as_str(), "ABC123");
    }

    #[test]
    fn test_resolve_ignores_trailing_parameters() {
        let video = resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s&list=PL1").unwrap();
        assert_eq!(video.as_str(), "dQw4w9WgXcQ");

        let video = resolve("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ").unwrap();
        assert_eq!(video.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let link = "https://www.youtube.com/watch?v=XyZ_-09&ab_channel=Someone";
        assert_eq!(resolve(link).unwrap(), resolve(link).unwrap());
    }

    #[test]
    fn test_resolve_without_scheme() {
        let video = resolve("www.youtube.com/watch?v=abc").unwrap();
        assert_eq!(video.as_str(), "abc");
    }

    #[test]
    fn test_resolve_rejects_links_without_v_parameter() {
        for link in [
            "https://youtu.be/ABC123",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtube.com/shorts/abcdefghijk",
            "https://www.youtube.com/live/abcdefghijk",
        ] {
            assert!(
                matches!(resolve(link), Err(SummarizeError::MalformedInput(_))),
                "expected MalformedInput for {:?}",
                link
            );
        }
    }

    #[test]
    fn test_resolve_rejects_missing_identifier() {
        for link in [
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://example.com/page",
            "not a link",
            "",
            "ftp://youtube.com/watch?v=abc",
        ] {
            assert!(
                matches!(resolve(link), Err(SummarizeError::MalformedInput(_))),
                "expected MalformedInput for {:?}",
                link
            );
        }
    }

    #[test]
    fn test_thumbnail_and_watch_urls() {
        let video = VideoReference::new("ABC123").unwrap();
        assert_eq!(video.thumbnail_url(), "http://img.youtube.com/vi/ABC123/0.jpg");
        assert_eq!(video.watch_url(), "https://www.youtube.com/watch?v=ABC123");
    }
}
