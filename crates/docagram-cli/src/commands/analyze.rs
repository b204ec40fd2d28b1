//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::commands::render_diagram;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::{write_export, Session};
use docagram_domain::Direction;
use docagram_extractor::{
    collapse_whitespace, combine_sections, AnalysisError, AnalysisEvent, AnalysisReport,
    AnalysisRequest, Analyzer, Section,
};
use docagram_llm::LanguageModel;
use docagram_store::RelationshipStore;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What a finished run produced.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Whole-page run
    Report(AnalysisReport),
    /// Section-by-section run, already merged into the store
    Sections(Vec<Section>),
}

/// Execute the analyze command.
///
/// The session is replaced by the result of this run. Whatever was parsed
/// before a failure or Ctrl-C is still saved.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    session: &mut Session,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let text = read_input(args.input.file.as_deref())?;
    let source_url = args
        .url
        .clone()
        .unwrap_or_else(|| default_source_url(args.input.file.as_deref()));
    let request = AnalysisRequest::new(text, source_url).with_summarize_first(args.summarize);

    let model = config.build_model()?;
    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let store = &mut session.store;
    let run = async {
        let analyzer = Analyzer::new(model.clone(), config.options.clone())
            .with_summarizer(model)
            .with_events(tx)
            .with_cancellation(cancel);
        run_analysis(&analyzer, store, request, args.sections).await
    };
    let (result, ()) = tokio::join!(run, print_progress(rx, formatter));
    interrupt.abort();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(AnalysisError::Cancelled) => {
            session.save()?;
            eprintln!(
                "{}",
                formatter.warning(&format!(
                    "Analysis cancelled, kept {} relationship(s)",
                    session.store.len()
                ))
            );
            return Ok(());
        }
        Err(e) => {
            session.save()?;
            return Err(e.into());
        }
    };

    session.save()?;
    if let Some(path) = &args.save {
        write_export(&session.store, path)?;
        eprintln!("{}", formatter.info(&format!("Session written to {}", path.display())));
    }

    match &outcome {
        AnalysisOutcome::Report(report) => println!("{}", formatter.format_report(report)?),
        AnalysisOutcome::Sections(sections) => println!("{}", formatter.format_sections(sections)?),
    }

    if args.diagram {
        match render_diagram(&session.store, None, Direction::default()) {
            Some(mermaid) => println!("{}", mermaid),
            None => println!("{}", formatter.info("No relationships to diagram")),
        }
    }

    Ok(())
}

/// Reset `store` and analyze `request` into it.
///
/// In section mode each chunk is analyzed on its own and the merged view
/// replaces the store contents, including when the run stops early.
pub async fn run_analysis<M: LanguageModel>(
    analyzer: &Analyzer<M>,
    store: &mut RelationshipStore,
    request: AnalysisRequest,
    sections: bool,
) -> std::result::Result<AnalysisOutcome, AnalysisError> {
    store.reset();

    if sections {
        let mut finished = Vec::new();
        let result = analyzer
            .analyze_sections(&mut finished, &request.text, &request.source_url)
            .await;
        store.import_from_json(combine_sections(&finished).to_export());
        result?;
        Ok(AnalysisOutcome::Sections(finished))
    } else {
        let report = analyzer.analyze(store, request).await?;
        Ok(AnalysisOutcome::Report(report))
    }
}

/// Read text from `file`, or stdin when `file` is `None` or `-`.
///
/// Whitespace runs are collapsed the way page text is extracted.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    let raw = match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let text = collapse_whitespace(&raw);
    if text.is_empty() {
        return Err(CliError::InvalidInput("No text to analyze".to_string()));
    }
    Ok(text)
}

fn default_source_url(file: Option<&Path>) -> String {
    match file {
        Some(path) if path != Path::new("-") => {
            let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
            format!("file://{}", absolute.display())
        }
        _ => "stdin".to_string(),
    }
}

async fn print_progress(mut rx: UnboundedReceiver<AnalysisEvent>, formatter: &Formatter) {
    while let Some(event) = rx.recv().await {
        match &event {
            AnalysisEvent::Snapshot { .. } => debug!("{}", event.status()),
            _ if formatter.is_quiet() => {}
            _ => eprintln!("{}", formatter.status(&event.status())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docagram_extractor::{AnalysisOptions, RetryPolicy};
    use docagram_llm::{MockModel, SummaryPolicy};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn analyzer(model: &MockModel, chunk_size: usize) -> Analyzer<MockModel> {
        let options = AnalysisOptions {
            chunk_size,
            ..AnalysisOptions::default()
        };
        Analyzer::new(model.clone(), options)
            .with_summarizer(model.clone())
            .with_retry_policy(RetryPolicy::immediate())
            .with_summary_policy(SummaryPolicy::immediate())
    }

    #[tokio::test]
    async fn test_run_replaces_previous_session() {
        let model = MockModel::with_default_output("Google to Chrome (develops)");
        let mut store = RelationshipStore::new();
        store.parse_relationships("Old to Data (stale)", "http://old");

        let outcome = run_analysis(
            &analyzer(&model, 3000),
            &mut store,
            AnalysisRequest::new("Google builds Chrome.", "http://g"),
            false,
        )
        .await
        .unwrap();

        assert!(matches!(outcome, AnalysisOutcome::Report(ref r) if r.relationships_added == 1));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_entity_count("Old"), 0);
    }

    #[tokio::test]
    async fn test_section_run_loads_combined_view() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)"]);
        model.push_snapshots(["B to A (x)\nB to C (y)"]);
        let mut store = RelationshipStore::new();

        let outcome = run_analysis(
            &analyzer(&model, 2),
            &mut store,
            AnalysisRequest::new("abcd", "http://a"),
            true,
        )
        .await
        .unwrap();

        match outcome {
            AnalysisOutcome::Sections(sections) => assert_eq!(sections.len(), 2),
            other => panic!("Expected sections, got {:?}", other),
        }
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_entity_count("B"), 2);
        assert_eq!(store.get_entity_source("C"), Some("http://a"));
    }

    #[tokio::test]
    async fn test_cancelled_section_run_keeps_finished_sections() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)"]);
        model.push_snapshots(["C to D (y)"]);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = RelationshipStore::new();
        store.parse_relationships("Old to Data (stale)", "http://old");

        let analyzer = analyzer(&model, 2)
            .with_events(tx)
            .with_cancellation(cancel.clone());
        let run = run_analysis(&analyzer, &mut store, AnalysisRequest::new("abcd", "http://a"), true);
        let watcher = async {
            while let Some(event) = rx.recv().await {
                if matches!(event, AnalysisEvent::ChunkCompleted { index: 0, .. }) {
                    cancel.cancel();
                    break;
                }
            }
        };
        let (result, ()) = tokio::join!(run, watcher);

        assert!(matches!(result, Err(AnalysisError::Cancelled)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_entity_count("B"), 1);
        assert_eq!(store.get_entity_source("A"), Some("http://a"));
        assert_eq!(store.get_entity_count("Old"), 0);
    }

    #[test]
    fn test_read_input_collapses_whitespace() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  Alice\n\n works   at\tAcme  ").unwrap();

        let text = read_input(Some(file.path())).unwrap();
        assert_eq!(text, "Alice works at Acme");
    }

    #[test]
    fn test_read_input_rejects_blank_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "   \n\t").unwrap();

        assert!(matches!(read_input(Some(file.path())), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_default_source_url() {
        assert_eq!(default_source_url(None), "stdin");
        assert!(default_source_url(Some(Path::new("page.txt"))).starts_with("file://"));
    }
}
