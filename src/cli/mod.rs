use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::language::LanguageSelection;

#[derive(Parser)]
#[command(
    name = "summarize",
    about = "Summarize AI - Turn YouTube video transcripts into bullet-point summaries with Google Gemini",
    version,
    long_about = "A CLI tool that fetches the transcript of a YouTube video in a chosen spoken language and asks Google Gemini for a concise bullet-point summary of it. Requires the GOOGLE_API_KEY environment variable for summaries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE", env = "SUMMARIZE_AI_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a YouTube video from its transcript
    Summarize {
        /// YouTube video link (e.g. https://www.youtube.com/watch?v=<id>)
        #[arg(value_name = "URL")]
        url: String,

        /// Spoken language of the transcript (defaults to the configured language)
        #[arg(short, long, value_enum, ignore_case = true, value_name = "LANG")]
        language: Option<LanguageSelection>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Do not print the video thumbnail link
        #[arg(long)]
        no_thumbnail: bool,
    },

    /// Print a video's transcript without summarizing it
    Transcript {
        /// YouTube video link
        #[arg(value_name = "URL")]
        url: String,

        /// Spoken language of the transcript (defaults to the configured language)
        #[arg(short, long, value_enum, ignore_case = true, value_name = "LANG")]
        language: Option<LanguageSelection>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List supported transcript languages
    Languages,

    /// Show or locate the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// Markdown with the thumbnail embedded
    Markdown,
    /// JSON report
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
