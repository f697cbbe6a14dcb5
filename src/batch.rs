//! Batch orchestration across multiple documents.
//!
//! Documents run through a bounded sliding window: at most
//! `config.concurrency` conversions are in flight, and a new one starts as
//! soon as any slot frees up. One document failing never aborts the batch;
//! its error is recorded and the remaining documents proceed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::config::InvertConfig;
use crate::convert::invert_bytes;
use crate::output::{BatchOutput, BatchSummary, DocumentOutcome};
use crate::pipeline::input::SourceFile;

/// Invert every document in `sources`, up to `config.concurrency` at a time.
///
/// Progress delivery, when a callback is configured: one `on_batch_start`,
/// then exactly one completion or error notification per document with a
/// monotonically increasing `completed` count, then one `on_batch_complete`.
/// An empty batch still gets its start and completion notifications, and
/// the converter is never invoked.
///
/// Outcomes are returned in submission order regardless of which documents
/// finished first.
pub async fn run_batch(sources: Vec<SourceFile>, config: &InvertConfig) -> BatchOutput {
    let started = Instant::now();
    let total = sources.len();

    if let Some(cb) = &config.progress {
        cb.on_batch_start(total);
    }

    if total == 0 {
        if let Some(cb) = &config.progress {
            cb.on_batch_complete(0, 0);
        }
        return BatchOutput {
            outcomes: Vec::new(),
            summary: BatchSummary {
                total: 0,
                succeeded: 0,
                failed: 0,
                total_ms: started.elapsed().as_millis() as u64,
            },
        };
    }

    info!(
        "Batch of {} documents, concurrency {}",
        total, config.concurrency
    );

    let completed = Arc::new(AtomicUsize::new(0));
    let mut outcomes: Vec<(usize, DocumentOutcome)> = stream::iter(
        sources.into_iter().enumerate().map(|(index, source)| {
            let config = config.clone();
            let completed = Arc::clone(&completed);
            async move {
                let SourceFile { name, data } = source;
                let result = invert_bytes(name.clone(), data, &config).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;

                let outcome = match result {
                    Ok(document) => {
                        if let Some(cb) = &config.progress {
                            cb.on_document_complete(done, total, &name);
                        }
                        DocumentOutcome::Success(document)
                    }
                    Err(error) => {
                        warn!("{}: {}", name, error);
                        if let Some(cb) = &config.progress {
                            cb.on_document_error(done, total, &name, &error.to_string());
                        }
                        DocumentOutcome::Failure {
                            source_name: name,
                            error,
                        }
                    }
                };
                (index, outcome)
            }
        }),
    )
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<DocumentOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();

    let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
    if let Some(cb) = &config.progress {
        cb.on_batch_complete(total, succeeded);
    }

    let summary = BatchSummary {
        total,
        succeeded,
        failed: total - succeeded,
        total_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        "Batch done: {}/{} succeeded in {} ms",
        succeeded, total, summary.total_ms
    );

    BatchOutput { outcomes, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvertError;
    use crate::progress::{BatchProgressCallback, ProgressCallback};
    use std::sync::Mutex;

    /// Records every callback invocation for assertion.
    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
        completions: Mutex<Vec<usize>>,
    }

    impl BatchProgressCallback for RecordingCallback {
        fn on_batch_start(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start:{total}"));
        }
        fn on_document_complete(&self, completed: usize, _total: usize, name: &str) {
            self.events.lock().unwrap().push(format!("ok:{name}"));
            self.completions.lock().unwrap().push(completed);
        }
        fn on_document_error(&self, completed: usize, _total: usize, name: &str, _error: &str) {
            self.events.lock().unwrap().push(format!("err:{name}"));
            self.completions.lock().unwrap().push(completed);
        }
        fn on_batch_complete(&self, total: usize, succeeded: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done:{succeeded}/{total}"));
        }
    }

    fn garbage_source(name: &str) -> SourceFile {
        // Fails the magic check before pdfium is ever bound.
        SourceFile::new(name, b"not a pdf at all".to_vec())
    }

    fn config_with(cb: ProgressCallback) -> InvertConfig {
        InvertConfig::builder().progress_callback(cb).build().unwrap()
    }

    #[tokio::test]
    async fn failures_are_isolated_and_ordered() {
        let sources = vec![
            garbage_source("a.bin"),
            garbage_source("b.bin"),
            garbage_source("c.bin"),
        ];
        let output = run_batch(sources, &InvertConfig::default()).await;

        assert_eq!(output.summary.total, 3);
        assert_eq!(output.summary.failed, 3);
        assert_eq!(output.summary.succeeded, 0);
        let names: Vec<&str> = output.outcomes.iter().map(|o| o.source_name()).collect();
        assert_eq!(names, vec!["a.bin", "b.bin", "c.bin"]);
        for outcome in &output.outcomes {
            match outcome {
                DocumentOutcome::Failure { error, .. } => {
                    assert!(matches!(error, InvertError::NotAPdf { .. }));
                }
                DocumentOutcome::Success(_) => panic!("garbage bytes cannot succeed"),
            }
        }
    }

    #[tokio::test]
    async fn progress_fires_once_per_document_plus_completion() {
        let cb = Arc::new(RecordingCallback::default());
        let config = config_with(cb.clone());

        let sources = vec![
            garbage_source("one.bin"),
            garbage_source("two.bin"),
            garbage_source("three.bin"),
            garbage_source("four.bin"),
        ];
        run_batch(sources, &config).await;

        let events = cb.events.lock().unwrap();
        assert_eq!(events.len(), 6); // start + 4 documents + done
        assert_eq!(events[0], "start:4");
        assert_eq!(events[5], "done:0/4");

        // Completed counts are a permutation-free monotone sequence 1..=4.
        let completions = cb.completions.lock().unwrap();
        assert_eq!(*completions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn empty_batch_reports_without_converting() {
        let cb = Arc::new(RecordingCallback::default());
        let config = config_with(cb.clone());

        let output = run_batch(Vec::new(), &config).await;

        assert!(output.outcomes.is_empty());
        assert_eq!(output.summary.total, 0);
        let events = cb.events.lock().unwrap();
        assert_eq!(*events, vec!["start:0".to_string(), "done:0/0".to_string()]);
    }

    #[tokio::test]
    async fn concurrency_one_preserves_completion_order() {
        let cb = Arc::new(RecordingCallback::default());
        let config = InvertConfig::builder()
            .concurrency(1)
            .progress_callback(cb.clone())
            .build()
            .unwrap();

        let sources = vec![garbage_source("first.bin"), garbage_source("second.bin")];
        run_batch(sources, &config).await;

        let events = cb.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "start:2".to_string(),
                "err:first.bin".to_string(),
                "err:second.bin".to_string(),
                "done:0/2".to_string(),
            ]
        );
    }
}
