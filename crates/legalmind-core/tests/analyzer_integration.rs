//! Integration tests for the analyzer against a real SQLite store

use legalmind_core::{
    AnalyzeError, ContractAnalyzer, LengthBounds, SummarizeError, Summarizer, SummaryStore,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;
use tokio::sync::Barrier;

/// Counts calls and returns the first half of the input's words
#[derive(Default)]
struct CountingSummarizer {
    calls: AtomicUsize,
}

impl CountingSummarizer {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Summarizer for CountingSummarizer {
    fn model_name(&self) -> &str {
        "counting"
    }

    async fn summarize(&self, text: &str, _: LengthBounds) -> Result<String, SummarizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let words: Vec<&str> = text.split_whitespace().collect();
        Ok(words[..words.len().div_ceil(2)].join(" "))
    }
}

/// Fails until `failures` calls have been made
struct FlakySummarizer {
    failures: usize,
    calls: AtomicUsize,
}

impl Summarizer for FlakySummarizer {
    fn model_name(&self) -> &str {
        "flaky"
    }

    async fn summarize(&self, text: &str, _: LengthBounds) -> Result<String, SummarizeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(SummarizeError::Unavailable("model not loaded".to_string()));
        }
        Ok(text.split_whitespace().take(3).collect::<Vec<_>>().join(" "))
    }
}

/// Holds every caller until `parties` callers are summarizing at once
struct BarrierSummarizer {
    barrier: Barrier,
    calls: AtomicUsize,
}

impl Summarizer for BarrierSummarizer {
    fn model_name(&self) -> &str {
        "barrier"
    }

    async fn summarize(&self, _: &str, _: LengthBounds) -> Result<String, SummarizeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.barrier.wait().await;
        Ok(format!("summary from call {call}"))
    }
}

fn open_store(dir: &std::path::Path) -> Arc<SummaryStore> {
    Arc::new(SummaryStore::open_in_dir(dir).unwrap())
}

#[tokio::test]
async fn test_termination_clause_scenario() {
    let dir = tempdir().unwrap();
    let analyzer = ContractAnalyzer::new(open_store(dir.path()), CountingSummarizer::default());
    let text = "This agreement shall terminate in 30 days.";

    let first = analyzer.analyze(text).await.unwrap();
    assert!(!first.cache_hit);
    assert_eq!(analyzer.summarizer().calls(), 1);
    assert_eq!(first.record.original_length, text.chars().count());
    assert_eq!(first.record.original_length, 42);
    assert!(first.record.summary_length <= first.record.original_length);
    assert!(first.record.compression_ratio <= 1.0);
    assert_eq!(first.record.fingerprint, legalmind_core::fingerprint(text));

    let second = analyzer.analyze(text).await.unwrap();
    assert!(second.cache_hit);
    assert_eq!(analyzer.summarizer().calls(), 1);
    assert_eq!(second.record, first.record);
}

#[tokio::test]
async fn test_whitespace_variant_is_cache_hit() {
    let dir = tempdir().unwrap();
    let analyzer = ContractAnalyzer::new(open_store(dir.path()), CountingSummarizer::default());

    let first = analyzer
        .analyze("Rent is payable monthly.\nDeposit is refundable.")
        .await
        .unwrap();
    let second = analyzer
        .analyze("  Rent is payable   monthly.\r\n\r\nDeposit is refundable.  ")
        .await
        .unwrap();

    assert!(second.cache_hit);
    assert_eq!(second.record, first.record);
    assert_eq!(analyzer.summarizer().calls(), 1);
}

#[tokio::test]
async fn test_empty_input_rejected_without_record() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    let analyzer = ContractAnalyzer::new(Arc::clone(&store), CountingSummarizer::default());

    for input in ["", "   ", "\n\t\r\n"] {
        let err = analyzer.analyze(input).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidInput { .. }));
    }

    assert_eq!(analyzer.summarizer().calls(), 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn test_summarizer_failure_writes_nothing_and_analyzer_recovers() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    let analyzer = ContractAnalyzer::new(
        Arc::clone(&store),
        FlakySummarizer {
            failures: 1,
            calls: AtomicUsize::new(0),
        },
    );
    let text = "The Licensee may not sublicense the Software.";

    let err = analyzer.analyze(text).await.unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::SummarizationFailed { ref model, source: SummarizeError::Unavailable(_) } if model == "flaky"
    ));
    assert_eq!(store.count().unwrap(), 0);

    let analysis = analyzer.analyze(text).await.unwrap();
    assert!(!analysis.cache_hit);
    assert_eq!(analysis.record.summary_text, "The Licensee may");
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_analyze_stores_one_record() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    let analyzer = Arc::new(ContractAnalyzer::new(
        Arc::clone(&store),
        BarrierSummarizer {
            barrier: Barrier::new(2),
            calls: AtomicUsize::new(0),
        },
    ));
    let text = "Either party may terminate for convenience on 90 days notice.";

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            tokio::spawn(async move { analyzer.analyze(text).await })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    // Both callers summarized, exactly one insert landed
    assert_eq!(analyzer.summarizer().calls.load(Ordering::SeqCst), 2);
    assert_eq!(store.count().unwrap(), 1);

    assert_eq!(results[0].record.fingerprint, results[1].record.fingerprint);
    assert_eq!(results[0].record, results[1].record);
    assert_eq!(results.iter().filter(|a| !a.cache_hit).count(), 1);

    let stored = store.get(&results[0].record.fingerprint).unwrap().unwrap();
    assert_eq!(stored, results[0].record);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_stores_on_one_database_share_dedup() {
    let dir = tempdir().unwrap();
    let text = "Confidentiality obligations survive termination for five years.";

    let analyzer_a = ContractAnalyzer::new(open_store(dir.path()), CountingSummarizer::default());
    let analyzer_b = ContractAnalyzer::new(open_store(dir.path()), CountingSummarizer::default());

    let a = analyzer_a.analyze(text).await.unwrap();
    let b = analyzer_b.analyze(text).await.unwrap();

    assert!(!a.cache_hit);
    assert!(b.cache_hit);
    assert_eq!(a.record, b.record);
    assert_eq!(analyzer_b.summarizer().calls(), 0);
}

#[tokio::test]
async fn test_history_is_newest_first() {
    let dir = tempdir().unwrap();
    let store = open_store(dir.path());
    let analyzer = ContractAnalyzer::new(Arc::clone(&store), CountingSummarizer::default());

    for text in [
        "First contract clause.",
        "Second contract clause.",
        "Third contract clause.",
    ] {
        analyzer.analyze(text).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let history = store.list_all().unwrap();
    let texts: Vec<&str> = history.iter().map(|r| r.original_text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Third contract clause.",
            "Second contract clause.",
            "First contract clause."
        ]
    );
    assert!(history
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}
