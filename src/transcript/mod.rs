use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod parser;
pub mod youtube;

use crate::language::LanguageSelection;
use crate::resolver::VideoReference;
use crate::Result;

/// A unit of transcript text with its timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// One transcript track of a video in a single spoken language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub language_code: String,
    pub language_name: String,

    /// Auto-generated (speech recognition) rather than uploaded captions
    pub is_generated: bool,

    /// Where the track's timed text is downloaded from
    pub base_url: String,
}

/// Transcript segments joined into a single string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptText(String);

impl TranscriptText {
    /// Join segment texts with exactly one space, keeping their order
    pub fn from_segments(segments: &[Segment]) -> Self {
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        Self(texts.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TranscriptText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why no transcript could be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    TranscriptsDisabled,
    LanguageNotFound {
        requested: String,
        available: Vec<String>,
    },
    Empty,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::TranscriptsDisabled => write!(f, "transcripts are disabled"),
            UnavailableReason::LanguageNotFound {
                requested,
                available,
            } if available.is_empty() => write!(f, "no '{}' track", requested),
            UnavailableReason::LanguageNotFound {
                requested,
                available,
            } => write!(
                f,
                "no '{}' track (available: {})",
                requested,
                available.join(", ")
            ),
            UnavailableReason::Empty => write!(f, "transcript is empty"),
        }
    }
}

/// Outcome of a transcript acquisition that did not fault
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    Transcript(TranscriptText),
    Unavailable(UnavailableReason),
}

/// Failures reported by a transcript provider
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("no transcript found in {0}")]
    NoTranscriptFound(String),

    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("video {0} is unplayable: {1}")]
    VideoUnplayable(String, String),

    #[error("video {0} is age restricted")]
    AgeRestricted(String),

    #[error("YouTube is blocking requests for video {0}")]
    RequestBlocked(String),

    #[error("YouTube asked for cookie consent on video {0} and did not accept it")]
    ConsentRequired(String),

    #[error("video {0} requires a PO token to fetch its transcript")]
    PoTokenRequired(String),

    #[error("could not parse YouTube data: {0}")]
    Unparsable(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// Source of transcript tracks for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// List every transcript track available for the video
    async fn list_transcripts(
        &self,
        video: &VideoReference,
    ) -> std::result::Result<Vec<TrackInfo>, ProviderError>;

    /// Fetch the ordered timed segments of one track
    async fn fetch_track(&self, track: &TrackInfo)
        -> std::result::Result<Vec<Segment>, ProviderError>;
}

/// Obtains transcript text for a video in a requested language
pub struct TranscriptAcquirer<'a> {
    provider: &'a dyn TranscriptProvider,
}

impl<'a> TranscriptAcquirer<'a> {
    pub fn new(provider: &'a dyn TranscriptProvider) -> Self {
        Self { provider }
    }

    /// Fetch the transcript of `video` in exactly `language`.
    ///
    /// Disabled transcripts and a missing language are reported as
    /// [`Acquisition::Unavailable`]; every other provider failure is returned
    /// as an error unchanged.
    pub async fn acquire(
        &self,
        video: &VideoReference,
        language: LanguageSelection,
    ) -> Result<Acquisition> {
        let tracks = match self.provider.list_transcripts(video).await {
            Ok(tracks) => tracks,
            Err(ProviderError::TranscriptsDisabled(_)) => {
                tracing::info!("Transcripts are disabled for video {}", video);
                return Ok(Acquisition::Unavailable(
                    UnavailableReason::TranscriptsDisabled,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Video {} has {} transcript track(s): {:?}",
            video,
            tracks.len(),
            tracks.iter().map(|t| t.language_code.as_str()).collect::<Vec<_>>()
        );

        let track = match select_track(&tracks, language.code()) {
            Some(track) => track,
            None => {
                tracing::info!("No '{}' transcript for video {}", language.code(), video);
                return Ok(Acquisition::Unavailable(
                    UnavailableReason::LanguageNotFound {
                        requested: language.code().to_string(),
                        available: available_codes(&tracks),
                    },
                ));
            }
        };

        let segments = match self.provider.fetch_track(track).await {
            Ok(segments) => segments,
            Err(ProviderError::NoTranscriptFound(_)) => {
                return Ok(Acquisition::Unavailable(
                    UnavailableReason::LanguageNotFound {
                        requested: language.code().to_string(),
                        available: available_codes(&tracks),
                    },
                ));
            }
            Err(ProviderError::TranscriptsDisabled(_)) => {
                return Ok(Acquisition::Unavailable(
                    UnavailableReason::TranscriptsDisabled,
                ));
            }
            Err(e) => return Err(e.into()),
        };

        let text = TranscriptText::from_segments(&segments);
        if text.is_blank() {
            tracing::info!("Transcript for video {} has no text", video);
            return Ok(Acquisition::Unavailable(UnavailableReason::Empty));
        }

        tracing::info!(
            "Acquired {} transcript: {} segments, {} characters",
            language.code(),
            segments.len(),
            text.len()
        );

        Ok(Acquisition::Transcript(text))
    }
}

/// Exact language-code match, preferring uploaded captions over generated ones
fn select_track<'t>(tracks: &'t [TrackInfo], code: &str) -> Option<&'t TrackInfo> {
    tracks
        .iter()
        .filter(|t| t.language_code == code)
        .min_by_key(|t| t.is_generated)
}

fn available_codes(tracks: &[TrackInfo]) -> Vec<String> {
    let mut codes: Vec<String> = tracks.iter().map(|t| t.language_code.clone()).collect();
    codes.sort();
    codes.dedup();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SummarizeError;

    fn track(code: &str, generated: bool) -> TrackInfo {
        TrackInfo {
            language_code: code.to_string(),
            language_name: code.to_string(),
            is_generated: generated,
            base_url: format!("https://example.com/{}/{}", code, generated),
        }
    }

    fn segments(texts: &[&str]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Segment {
                text: t.to_string(),
                start: i as f64,
                duration: 1.0,
            })
            .collect()
    }

    fn video() -> VideoReference {
        VideoReference::new("ABC123").unwrap()
    }

    #[test]
    fn test_join_uses_single_spaces_in_order() {
        let text = TranscriptText::from_segments(&segments(&["hello", "world"]));
        assert_eq!(text.as_str(), "hello world");

        let text = TranscriptText::from_segments(&segments(&[" a", "b ", "c"]));
        assert_eq!(text.as_str(), " a b  c");

        assert_eq!(TranscriptText::from_segments(&[]).as_str(), "");
    }

    #[test]
    fn test_select_track_is_exact() {
        let tracks = vec![track("en-GB", false), track("en", true), track("en", false)];
        let selected = select_track(&tracks, "en").unwrap();
        assert!(!selected.is_generated);
        assert!(select_track(&tracks, "e").is_none());
        assert!(select_track(&tracks, "hi").is_none());
    }

    #[tokio::test]
    async fn test_acquire_concatenates_segments() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .times(1)
            .returning(|_| Ok(vec![track("en", false)]));
        provider
            .expect_fetch_track()
            .withf(|t| t.language_code == "en")
            .times(1)
            .returning(|_| Ok(segments(&["a", "b", "c"])));

        let result = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::English)
            .await
            .unwrap();

        assert_eq!(
            result,
            Acquisition::Transcript(TranscriptText("a b c".to_string()))
        );
    }

    #[tokio::test]
    async fn test_acquire_missing_language_is_unavailable() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("en", false), track("es", true)]));
        provider.expect_fetch_track().never();

        let result = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::Hindi)
            .await
            .unwrap();

        assert_eq!(
            result,
            Acquisition::Unavailable(UnavailableReason::LanguageNotFound {
                requested: "hi".to_string(),
                available: vec!["en".to_string(), "es".to_string()],
            })
        );
    }

    #[tokio::test]
    async fn test_acquire_disabled_transcripts_are_unavailable() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|v| Err(ProviderError::TranscriptsDisabled(v.to_string())));

        let result = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::English)
            .await
            .unwrap();

        assert_eq!(
            result,
            Acquisition::Unavailable(UnavailableReason::TranscriptsDisabled)
        );
    }

    #[tokio::test]
    async fn test_acquire_blank_transcript_is_unavailable() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("kn", true)]));
        provider
            .expect_fetch_track()
            .returning(|_| Ok(segments(&["", ""])));

        let result = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::Kannada)
            .await
            .unwrap();

        assert_eq!(result, Acquisition::Unavailable(UnavailableReason::Empty));
    }

    #[tokio::test]
    async fn test_acquire_propagates_other_failures() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Err(ProviderError::Http("connection reset".to_string())));

        let err = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::English)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SummarizeError::ProviderFailure(ProviderError::Http(_))
        ));
    }

    #[tokio::test]
    async fn test_acquire_propagates_fetch_failures() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("en", false)]));
        provider
            .expect_fetch_track()
            .returning(|_| Err(ProviderError::RequestBlocked("ABC123".to_string())));

        let err = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::English)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SummarizeError::ProviderFailure(ProviderError::RequestBlocked(_))
        ));
    }

    #[tokio::test]
    async fn test_acquire_missing_track_at_fetch_is_unavailable() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("kn", false)]));
        provider
            .expect_fetch_track()
            .returning(|_| Err(ProviderError::NoTranscriptFound("kn".to_string())));

        let acquisition = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::Kannada)
            .await
            .unwrap();

        match acquisition {
            Acquisition::Unavailable(UnavailableReason::LanguageNotFound { requested, available }) => {
                assert_eq!(requested, "kn");
                assert_eq!(available, vec!["kn".to_string()]);
            }
            other => panic!("expected LanguageNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_acquire_disabled_at_fetch_is_unavailable() {
        let mut provider = MockTranscriptProvider::new();
        provider
            .expect_list_transcripts()
            .returning(|_| Ok(vec![track("mr", true)]));
        provider
            .expect_fetch_track()
            .returning(|_| Err(ProviderError::TranscriptsDisabled("ABC123".to_string())));

        let acquisition = TranscriptAcquirer::new(&provider)
            .acquire(&video(), LanguageSelection::Marathi)
            .await
            .unwrap();

        assert!(matches!(
            acquisition,
            Acquisition::Unavailable(UnavailableReason::TranscriptsDisabled)
        ));
    }

    #[test]
    fn test_unavailable_reason_display() {
        let reason = UnavailableReason::LanguageNotFound {
            requested: "hi".to_string(),
            available: vec!["en".to_string()],
        };
        assert_eq!(reason.to_string(), "no 'hi' track (available: en)");
    }
}
