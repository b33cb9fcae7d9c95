use async_trait::async_trait;

pub mod gemini;

pub use gemini::GeminiSummarizer;

/// Instruction sent ahead of every transcript
pub const SUMMARY_PROMPT: &str = "You are a YouTube video summarizer. Your task is to read the provided transcript and create a concise summary of the video's content. Please condense the key points and main ideas into a list of bullet points, ensuring the summary is no longer than 500-1200 words. Use clear and precise language.  ";

/// Failures reported by the generative-text service
#[derive(thiserror::Error, Debug)]
pub enum SummarizerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request was blocked: {0}")]
    Blocked(String),

    #[error("response contained no summary text")]
    EmptyResponse,

    #[error("timed out after {0}s")]
    Timeout(u64),
}

/// Generative-text service that turns a prompt into a summary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Generate text for a single combined prompt and transcript
    async fn generate(&self, prompt_and_text: &str) -> Result<String, SummarizerError>;

    /// Name shown in logs and reports
    fn model_name(&self) -> String;
}

/// The request body is the prompt immediately followed by the transcript
pub fn build_request(prompt: &str, transcript: &str) -> String {
    let mut request = String::with_capacity(prompt.len() + transcript.len());
    request.push_str(prompt);
    request.push_str(transcript);
    request
}
