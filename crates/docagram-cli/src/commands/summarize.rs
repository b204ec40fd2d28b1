//! Summarize command implementation.

use crate::cli::InputArgs;
use crate::commands::read_input;
use crate::error::Result;
use crate::output::Formatter;
use docagram_llm::summarize::DEFAULT_MIN_LENGTH;
use docagram_llm::{summarize_with_retry, Summarizer, SummaryPolicy, SUMMARIZER_UNAVAILABLE};

/// Execute the summarize command.
pub async fn execute_summarize<S>(args: InputArgs, summarizer: &S, formatter: &Formatter) -> Result<()>
where
    S: Summarizer + ?Sized,
{
    let text = read_input(args.file.as_deref())?;
    match summarize_text(summarizer, &text, &SummaryPolicy::default()).await {
        Some(summary) => println!("{}", summary),
        None => println!(
            "{}",
            formatter.info(&format!(
                "Text is {} characters or shorter, nothing to summarize",
                DEFAULT_MIN_LENGTH
            ))
        ),
    }
    Ok(())
}

/// Summary of `text`, or `None` when it is too short to need one.
///
/// When the summarizer cannot be reached the marker text is returned as is.
pub async fn summarize_text<S>(summarizer: &S, text: &str, policy: &SummaryPolicy) -> Option<String>
where
    S: Summarizer + ?Sized,
{
    let summary = summarize_with_retry(summarizer, text, DEFAULT_MIN_LENGTH, policy).await;
    if summary.is_empty() {
        return None;
    }
    if summary == SUMMARIZER_UNAVAILABLE {
        tracing::warn!("Summarizer unavailable");
    }
    Some(summary)
}
