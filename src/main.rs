use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use summarize_ai::cli::{Cli, Commands};
use summarize_ai::config::Config;
use summarize_ai::language::LanguageSelection;
use summarize_ai::output;
use summarize_ai::pipeline::{PipelineOutcome, SummaryPipeline, TranscriptOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "summarize_ai=debug,summarize=debug"
    } else {
        "summarize_ai=info,summarize=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).await?;
    let show_progress = !cli.quiet;

    match cli.command {
        Commands::Summarize {
            url,
            language,
            format,
            output,
            no_thumbnail,
        } => {
            let language = language.unwrap_or(config.transcript.default_language);
            let format = format.unwrap_or(config.output.default_format);
            let show_thumbnail = config.output.show_thumbnail && !no_thumbnail;

            let pipeline = SummaryPipeline::from_config(&config)?.with_progress(show_progress);

            tracing::info!("Starting summary for URL: {}", url);

            match pipeline.run(&url, language).await? {
                PipelineOutcome::Summarized(report) => match output {
                    Some(path) => {
                        output::save_to_file(&report, &path, format, show_thumbnail).await?;
                        println!("Summary saved to: {}", path.display());
                    }
                    None => {
                        output::print_to_console(&report, format, show_thumbnail)?;
                    }
                },
                PipelineOutcome::NoTranscript {
                    video,
                    language,
                    reason,
                } => {
                    output::print_no_transcript(&video, language, &reason);
                }
            }
        }
        Commands::Transcript {
            url,
            language,
            output,
        } => {
            let language = language.unwrap_or(config.transcript.default_language);
            let pipeline =
                SummaryPipeline::transcript_only_from_config(&config)?.with_progress(show_progress);

            match pipeline.transcript(&url, language).await? {
                TranscriptOutcome::Transcript { text, .. } => match output {
                    Some(path) => {
                        fs_err::write(&path, text.as_str())
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        println!("Transcript saved to: {}", path.display());
                    }
                    None => println!("{}", text),
                },
                TranscriptOutcome::NoTranscript {
                    video,
                    language,
                    reason,
                } => {
                    output::print_no_transcript(&video, language, &reason);
                }
            }
        }
        Commands::Languages => {
            println!("Supported transcript languages:");
            for lang in LanguageSelection::ALL {
                println!("  • {} ({})", lang.label(), lang.code());
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path(cli.config.as_deref())?.display());
            }
        }
    }

    Ok(())
}
