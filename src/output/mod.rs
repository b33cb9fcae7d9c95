use anyhow::Result;
use console::style;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::language::LanguageSelection;
use crate::pipeline::SummaryReport;
use crate::resolver::VideoReference;
use crate::transcript::UnavailableReason;

pub const SUMMARY_HEADING: &str = "## Summarize AI says:";

/// Render a summary report in the requested format
pub fn format_report(report: &SummaryReport, format: OutputFormat, show_thumbnail: bool) -> Result<String> {
    let content = match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if show_thumbnail {
                out.push_str(&format!("Thumbnail: {}\n\n", report.thumbnail_url));
            }
            out.push_str(SUMMARY_HEADING);
            out.push_str("\n\n");
            out.push_str(&report.summary);
            out
        }
        OutputFormat::Markdown => {
            let mut out = String::new();
            if show_thumbnail {
                out.push_str(&format!(
                    "[![Video thumbnail]({})]({})\n\n",
                    report.thumbnail_url, report.watch_url
                ));
            }
            out.push_str(SUMMARY_HEADING);
            out.push_str("\n\n");
            out.push_str(&report.summary);
            out.push('\n');
            out
        }
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    Ok(content)
}

/// Notice shown instead of a summary when there is nothing to summarize
pub fn no_transcript_notice(video: &VideoReference, language: LanguageSelection) -> String {
    format!(
        "No transcript available for video {} in {}.",
        video, language
    )
}

/// Save a summary report to file
pub async fn save_to_file(
    report: &SummaryReport,
    path: &Path,
    format: OutputFormat,
    show_thumbnail: bool,
) -> Result<()> {
    let content = format_report(report, format, show_thumbnail)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a summary report to console
pub fn print_to_console(report: &SummaryReport, format: OutputFormat, show_thumbnail: bool) -> Result<()> {
    let content = format_report(report, format, show_thumbnail)?;

    if format == OutputFormat::Text {
        let styled = content.replacen(
            SUMMARY_HEADING,
            &style(SUMMARY_HEADING).bold().cyan().to_string(),
            1,
        );
        println!("{}", styled);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Print the no-transcript notice, with the reason on stderr
pub fn print_no_transcript(video: &VideoReference, language: LanguageSelection, reason: &UnavailableReason) {
    println!("{}", style(no_transcript_notice(video, language)).yellow());
    eprintln!("  ({})", reason);
}
