use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::language::LanguageSelection;
use crate::resolver::{self, VideoReference};
use crate::summarize::{build_request, GeminiSummarizer, Summarizer, SummarizerError};
use crate::transcript::youtube::YoutubeTranscriptProvider;
use crate::transcript::{
    Acquisition, ProviderError, TranscriptAcquirer, TranscriptProvider, TranscriptText,
    UnavailableReason,
};
use crate::{Result, SummarizeError};

/// Summary of one video, ready to be rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub video_id: String,
    pub watch_url: String,
    pub thumbnail_url: String,

    /// Two-letter code of the transcript language
    pub language: String,

    /// Characters of transcript sent to the summarizer
    pub transcript_chars: usize,

    pub model: String,

    /// Summary exactly as the service returned it
    pub summary: String,

    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// How a request ended when nothing faulted
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Summarized(SummaryReport),
    NoTranscript {
        video: VideoReference,
        language: LanguageSelection,
        reason: UnavailableReason,
    },
}

/// Transcript of one video without a summary
#[derive(Debug, Clone)]
pub enum TranscriptOutcome {
    Transcript {
        video: VideoReference,
        language: LanguageSelection,
        text: TranscriptText,
    },
    NoTranscript {
        video: VideoReference,
        language: LanguageSelection,
        reason: UnavailableReason,
    },
}

/// Main summarization pipeline: resolve, acquire, summarize
pub struct SummaryPipeline {
    provider: Box<dyn TranscriptProvider>,
    summarizer: Option<Box<dyn Summarizer>>,
    prompt: String,
    acquire_timeout: Duration,
    summarize_timeout: Duration,
    show_progress: bool,
}

impl SummaryPipeline {
    pub fn new(
        provider: Box<dyn TranscriptProvider>,
        summarizer: Option<Box<dyn Summarizer>>,
        prompt: impl Into<String>,
        acquire_timeout: Duration,
        summarize_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            summarizer,
            prompt: prompt.into(),
            acquire_timeout,
            summarize_timeout,
            show_progress: false,
        }
    }

    /// Wire the YouTube provider and Gemini summarizer from configuration.
    ///
    /// The API key is read and checked here, before any network call.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?;
        let summarizer = GeminiSummarizer::new(&config.summarizer, api_key)?;
        let mut pipeline = Self::transcript_only_from_config(config)?;
        pipeline.summarizer = Some(Box::new(summarizer));
        Ok(pipeline)
    }

    /// Pipeline that can fetch transcripts but never summarizes
    pub fn transcript_only_from_config(config: &Config) -> Result<Self> {
        let provider = YoutubeTranscriptProvider::new(&config.transcript)?;
        Ok(Self::new(
            Box::new(provider),
            None,
            config.prompt(),
            Duration::from_secs(config.transcript.timeout_secs),
            Duration::from_secs(config.summarizer.timeout_secs),
        ))
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Summarize the video behind `url` from its `language` transcript
    pub async fn run(&self, url: &str, language: LanguageSelection) -> Result<PipelineOutcome> {
        let summarizer = self.summarizer.as_deref().ok_or_else(|| {
            SummarizeError::Config("no summarizer configured".to_string())
        })?;

        let (video, text) = match self.resolve_and_acquire(url, language).await? {
            TranscriptOutcome::Transcript { video, text, .. } => (video, text),
            TranscriptOutcome::NoTranscript {
                video,
                language,
                reason,
            } => {
                return Ok(PipelineOutcome::NoTranscript {
                    video,
                    language,
                    reason,
                })
            }
        };

        tracing::info!(stage = "Summarizing", video = %video, model = %summarizer.model_name());
        let request = build_request(&self.prompt, text.as_str());

        let spinner = self.spinner(format!("Summarizing with {}...", summarizer.model_name()));
        let summary = bounded(
            summarizer.generate(&request),
            self.summarize_timeout,
            |secs| SummarizeError::SummarizerFailure(SummarizerError::Timeout(secs)),
        )
        .await;
        finish(spinner, summary.is_ok(), "Summary ready");

        let summary = summary.map_err(|e| {
            tracing::error!(stage = "Faulted", video = %video, "{}", e);
            e
        })?;

        tracing::info!(stage = "Done", video = %video, summary_chars = summary.len());

        Ok(PipelineOutcome::Summarized(SummaryReport {
            video_id: video.to_string(),
            watch_url: video.watch_url(),
            thumbnail_url: video.thumbnail_url(),
            language: language.code().to_string(),
            transcript_chars: text.len(),
            model: summarizer.model_name(),
            summary,
            generated_at: chrono::Utc::now(),
        }))
    }

    /// Resolve and acquire only; the summarizer is never involved
    pub async fn transcript(&self, url: &str, language: LanguageSelection) -> Result<TranscriptOutcome> {
        self.resolve_and_acquire(url, language).await
    }

    async fn resolve_and_acquire(
        &self,
        url: &str,
        language: LanguageSelection,
    ) -> Result<TranscriptOutcome> {
        tracing::info!(stage = "Resolving", url = %url);
        let video = resolver::resolve(url)?;

        tracing::info!(stage = "Acquiring", video = %video, language = language.code());
        let acquirer = TranscriptAcquirer::new(self.provider.as_ref());

        let spinner = self.spinner(format!("Fetching {} transcript for {}...", language, video));
        let acquisition = bounded(
            acquirer.acquire(&video, language),
            self.acquire_timeout,
            |secs| SummarizeError::ProviderFailure(ProviderError::Timeout(secs)),
        )
        .await;
        finish(spinner, acquisition.is_ok(), "Transcript fetched");

        match acquisition {
            Ok(Acquisition::Transcript(text)) => Ok(TranscriptOutcome::Transcript {
                video,
                language,
                text,
            }),
            Ok(Acquisition::Unavailable(reason)) => {
                tracing::info!(stage = "Unavailable", video = %video, reason = %reason);
                Ok(TranscriptOutcome::NoTranscript {
                    video,
                    language,
                    reason,
                })
            }
            Err(e) => {
                tracing::error!(stage = "Faulted", video = %video, "{}", e);
                Err(e)
            }
        }
    }

    fn spinner(&self, message: String) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message);
        progress.enable_steady_tick(Duration::from_millis(100));
        Some(progress)
    }
}

/// Run `future` to completion or fail once `limit` has elapsed
async fn bounded<T, E, F>(
    future: F,
    limit: Duration,
    on_timeout: impl FnOnce(u64) -> SummarizeError,
) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<SummarizeError>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(on_timeout(limit.as_secs())),
    }
}

fn finish(spinner: Option<ProgressBar>, ok: bool, message: &'static str) {
    if let Some(progress) = spinner {
        if ok {
            progress.finish_with_message(message);
        } else {
            progress.finish_and_clear();
        }
    }
}
