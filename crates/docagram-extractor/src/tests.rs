//! End-to-end tests for the Analyzer

#[cfg(test)]
mod tests {
    use crate::{
        AnalysisError, AnalysisEvent, AnalysisOptions, AnalysisRequest, Analyzer, RetryPolicy,
        combine_sections,
    };
    use docagram_llm::{MockModel, ModelError, SummaryPolicy};
    use docagram_store::RelationshipStore;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn options(chunk_size: usize) -> AnalysisOptions {
        AnalysisOptions {
            chunk_size,
            ..AnalysisOptions::default()
        }
    }

    fn analyzer(model: &MockModel, chunk_size: usize) -> Analyzer<MockModel> {
        Analyzer::new(model.clone(), options(chunk_size))
            .with_retry_policy(RetryPolicy::immediate())
            .with_summary_policy(SummaryPolicy::immediate())
    }

    fn not_readable() -> ModelError {
        ModelError::NotReadable("stream interrupted".into())
    }

    #[tokio::test]
    async fn test_full_analysis_flow() {
        let model = MockModel::new();
        model.push_snapshots(["Google to Chrome (develops)\nGoogle to Android (owns)"]);
        model.push_snapshots(["Chrome to Google (develops)\nAndroid to Linux (builds on)"]);
        let mut store = RelationshipStore::new();

        let report = analyzer(&model, 5)
            .analyze(&mut store, AnalysisRequest::new("0123456789", "http://page"))
            .await
            .unwrap();

        assert_eq!(report.chunks_total, 2);
        assert_eq!(report.relationships_added, 3);
        assert!(report.chunks_skipped.is_empty());
        assert!(report.transcript.contains("Chunk 2 results:"));
        assert_eq!(store.get_entity_count("Google"), 2);
        assert_eq!(store.get_entity_source("Linux"), Some("http://page"));

        let prompts = model.prompts();
        assert!(prompts[0].contains("(1 of 2)"));
        assert!(prompts[0].ends_with("Text chunk to analyze: 01234"));
        assert!(prompts[1].ends_with("Text chunk to analyze: 56789"));
    }

    #[tokio::test]
    async fn test_unparseable_output_is_not_an_error() {
        let model = MockModel::with_default_output("I could not find any relationships.");
        let mut store = RelationshipStore::new();

        let report = analyzer(&model, 3000)
            .analyze(&mut store, AnalysisRequest::new("some text", "http://a"))
            .await
            .unwrap();

        assert_eq!(report.relationships_added, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let model = MockModel::new();
        model.push_open_error(not_readable());
        model.push_stream(vec![Ok("A to".into()), Err(not_readable())]);
        model.push_snapshots(["A to B (x)"]);
        let mut store = RelationshipStore::new();

        let report = analyzer(&model, 3000)
            .analyze(&mut store, AnalysisRequest::new("text", "http://a"))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 3);
        assert!(report.chunks_skipped.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_chunk_is_skipped_with_partial_output() {
        let model = MockModel::new();
        model.push_stream(vec![Ok("A to B (x)".into()), Err(not_readable())]);
        model.push_open_error(ModelError::NotSupported("busy".into()));
        model.push_open_error(not_readable());
        model.push_snapshots(["C to D (y)"]);
        let mut store = RelationshipStore::new();

        let report = analyzer(&model, 4)
            .analyze(&mut store, AnalysisRequest::new("abcdefgh", "http://a"))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 4);
        assert_eq!(report.chunks_skipped, vec![0]);
        assert_eq!(store.len(), 2, "Partial output of the skipped chunk is kept");
        assert_eq!(store.get_entity_count("D"), 1);
    }

    #[tokio::test]
    async fn test_retry_with_empty_stream_discards_failed_partial() {
        let model = MockModel::new();
        model.push_stream(vec![Ok("A to B (x)".into()), Err(not_readable())]);
        model.push_stream(Vec::new());
        let mut store = RelationshipStore::new();

        let report = analyzer(&model, 3000)
            .analyze(&mut store, AnalysisRequest::new("text", "http://a"))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 2);
        assert!(report.chunks_skipped.is_empty());
        assert_eq!(report.relationships_added, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_fatal_error_aborts_run() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)"]);
        model.push_open_error(ModelError::Communication("connection refused".into()));
        let mut store = RelationshipStore::new();

        let result = analyzer(&model, 2)
            .analyze(&mut store, AnalysisRequest::new("abcdef", "http://a"))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "NetworkError");
        assert_eq!(model.call_count(), 2, "No chunk after the fatal one is opened");
        assert_eq!(store.len(), 1, "Earlier chunks stay in the store");
    }

    #[tokio::test]
    async fn test_invalid_state_reinitializes_once() {
        let model = MockModel::new();
        model.push_open_error(ModelError::InvalidState("session destroyed".into()));
        model.push_snapshots(["A to B (x)"]);
        let mut store = RelationshipStore::new();

        analyzer(&model, 3000)
            .analyze(&mut store, AnalysisRequest::new("text", "http://a"))
            .await
            .unwrap();

        assert_eq!(model.reinitialize_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_invalid_state_is_fatal() {
        let model = MockModel::new();
        model.push_open_error(ModelError::InvalidState("destroyed".into()));
        model.push_open_error(ModelError::InvalidState("still destroyed".into()));
        let mut store = RelationshipStore::new();

        let result = analyzer(&model, 3000)
            .analyze(&mut store, AnalysisRequest::new("text", "http://a"))
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), "InvalidStateError");
        assert!(err.report().starts_with("Analysis failed: "));
        assert!(err.report().ends_with("(InvalidStateError)"));
    }

    #[tokio::test]
    async fn test_events_are_reported() {
        let model = MockModel::new();
        model.push_snapshots(["A to", "A to B (x)"]);
        model.push_open_error(not_readable());
        model.push_snapshots(["B to C (y)"]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = RelationshipStore::new();

        analyzer(&model, 2)
            .with_events(tx)
            .analyze(&mut store, AnalysisRequest::new("abcd", "http://a"))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert_eq!(events[0], AnalysisEvent::ChunkStarted { index: 0, total: 2 });
        assert_eq!(
            events[1],
            AnalysisEvent::Snapshot {
                index: 0,
                text: "A to".into()
            }
        );
        assert!(events.contains(&AnalysisEvent::ChunkCompleted { index: 0, added: 1 }));
        assert!(events
            .iter()
            .any(|e| matches!(e, AnalysisEvent::Retrying { index: 1, attempt: 1, .. })));
        assert_eq!(
            events.last(),
            Some(&AnalysisEvent::Finished {
                relationships: 2,
                entities: 3
            })
        );
    }

    #[tokio::test]
    async fn test_cancel_mid_run_keeps_parsed_relationships() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)"]);
        model.push_snapshots(["C to D (y)"]);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut store = RelationshipStore::new();

        let analyzer = analyzer(&model, 2)
            .with_events(tx)
            .with_cancellation(cancel.clone());

        let run = analyzer.analyze(&mut store, AnalysisRequest::new("abcd", "http://a"));
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
        assert_eq!(model.call_count(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_first_uses_summary() {
        let model = MockModel::new();
        model.push_summary(Ok("Alice works at Acme.".into()));
        model.push_snapshots(["Alice to Acme (works at)"]);
        let mut store = RelationshipStore::new();
        let long_page = "Alice works at Acme. ".repeat(200);

        let report = analyzer(&model, 3000)
            .with_summarizer(model.clone())
            .analyze(
                &mut store,
                AnalysisRequest::new(long_page, "http://a").with_summarize_first(true),
            )
            .await
            .unwrap();

        assert!(report.summarized);
        assert_eq!(report.chunks_total, 1);
        assert!(model.prompts()[0].ends_with("Text chunk to analyze: Alice works at Acme."));
    }

    #[tokio::test]
    async fn test_summarize_first_falls_back_on_marker() {
        let model = MockModel::new();
        for _ in 0..4 {
            model.push_summary(Err(ModelError::NotReadable("busy".into())));
        }
        let mut store = RelationshipStore::new();
        let long_page = "x".repeat(2500);

        let report = analyzer(&model, 1000)
            .with_summarizer(model.clone())
            .analyze(
                &mut store,
                AnalysisRequest::new(long_page, "http://a").with_summarize_first(true),
            )
            .await
            .unwrap();

        assert!(!report.summarized);
        assert_eq!(report.chunks_total, 3);
    }

    #[tokio::test]
    async fn test_short_page_is_not_summarized() {
        let model = MockModel::new();
        let mut store = RelationshipStore::new();

        analyzer(&model, 3000)
            .with_summarizer(model.clone())
            .analyze(
                &mut store,
                AnalysisRequest::new("short page", "http://a").with_summarize_first(true),
            )
            .await
            .unwrap();

        assert_eq!(model.summarize_count(), 0);
    }

    #[tokio::test]
    async fn test_sections_and_combine() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)\nB to C (y)"]);
        model.push_open_error(ModelError::Other("boom".into()));
        model.push_snapshots(["B to A (x)\nC to D (z)"]);
        let analyzer = analyzer(&model, 2).with_summarizer(model.clone());

        let mut sections = Vec::new();
        analyzer
            .analyze_sections(&mut sections, "abcdef", "http://a")
            .await
            .unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].relationships.len(), 2);
        assert_eq!(sections[0].summary, "", "Short chunks are analyzed directly");
        assert!(sections[1].error.is_some());
        assert!(sections[1].relationships.is_empty());
        assert_eq!(sections[2].index, 2);

        let combined = combine_sections(&sections);
        assert_eq!(combined.relationships.len(), 3);
        assert_eq!(combined.entities[0].name, "B");
        assert_eq!(combined.entities[0].count, 2);
    }

    #[tokio::test]
    async fn test_cancelled_sections_keep_finished_ones() {
        let model = MockModel::new();
        model.push_snapshots(["A to B (x)"]);
        model.push_snapshots(["C to D (y)"]);
        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sections = Vec::new();

        let analyzer = analyzer(&model, 2)
            .with_summarizer(model.clone())
            .with_events(tx)
            .with_cancellation(cancel.clone());

        let run = analyzer.analyze_sections(&mut sections, "abcd", "http://a");
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
        assert_eq!(model.call_count(), 1);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].relationships.len(), 1);
        assert_eq!(combine_sections(&sections).relationships.len(), 1);
    }
}
