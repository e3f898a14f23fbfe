use std::sync::Arc;
use std::time::Duration;

use derive_new::new;
use futures::Future;
use snafu::Snafu;
use tokio::sync::oneshot;

use super::{SessionStore, ViewMarker};
use crate::model::ArticleId;

/// How long a page waits after render before reporting its view.
pub const DEFAULT_REPORT_DELAY: Duration = Duration::from_secs(3);

/// Delivery target for view reports, typically the view endpoint over HTTP.
pub trait ReportSink: Send + Sync + 'static {
    fn deliver(
        &self,
        article: &ArticleId,
    ) -> impl Future<Output = Result<Receipt, ReportError>> + Send;
}

/// Acknowledgement for one delivered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Receipt {
    /// Whether the server counted the view rather than throttling it.
    pub counted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu, new)]
#[snafu(display("failed to deliver the view report: {message}"))]
pub struct ReportError {
    pub message: String,
}

/// What became of one observed page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The report reached the server.
    Delivered { counted: bool },
    /// The page was torn down before the delay elapsed.
    Dropped,
    /// Delivery failed. The article stays unmarked so a later render retries.
    Failed,
}

type CancelSignal = oneshot::Receiver<Cancel>;

#[derive(Debug, Clone, Copy)]
struct Cancel;

/// Handle to one scheduled report.
///
/// Dropping the handle cancels a report that is still waiting out its delay,
/// the same way leaving the page would.
#[derive(Debug)]
pub struct ReportTask {
    tx: oneshot::Sender<Cancel>,
    handle: tokio::task::JoinHandle<ReportOutcome>,
}

impl ReportTask {
    fn spawn<F>(f: impl FnOnce(CancelSignal) -> F) -> Self
    where
        F: Future<Output = ReportOutcome> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::task::spawn(f(rx));
        Self { tx, handle }
    }

    /// Cancels a still-waiting report and waits for the task to settle.
    pub async fn cancel(self) -> ReportOutcome {
        let _ = self.tx.send(Cancel);
        self.handle.await.unwrap_or(ReportOutcome::Dropped)
    }

    /// Waits for the report to settle without cancelling it.
    pub async fn outcome(self) -> ReportOutcome {
        self.handle.await.unwrap_or(ReportOutcome::Dropped)
    }
}

/// The piece a page runs after render to report its own view.
///
/// One report is scheduled per article per session. The session is only
/// marked once the server acknowledges the delivery, so a dropped or failed
/// report leaves the next render free to try again.
#[derive(Debug, Clone, new)]
pub struct ViewReporter<S, K> {
    marker: ViewMarker<K>,
    sink: Arc<S>,
    delay: Duration,
}

impl<S, K> ViewReporter<S, K>
where
    S: ReportSink,
    K: SessionStore + Clone + Send + Sync + 'static,
{
    /// Schedules a view report for `article`, or returns `None` when this
    /// session already reported it.
    pub fn observe(&self, article: ArticleId) -> Option<ReportTask> {
        if self.marker.has_reported(&article) {
            tracing::debug!(%article, "article `{article}` already reported by this session");
            return None;
        }

        let marker = self.marker.clone();
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;

        Some(ReportTask::spawn(|mut cancel| async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut cancel => {
                    tracing::debug!(%article, "report dropped before the delay elapsed");
                    return ReportOutcome::Dropped;
                }
            }

            match sink.deliver(&article).await {
                Ok(receipt) => {
                    marker.mark_reported(&article);
                    ReportOutcome::Delivered {
                        counted: receipt.counted,
                    }
                }
                Err(error) => {
                    tracing::warn!(%article, %error, "failed to report the view, leaving it unmarked");
                    ReportOutcome::Failed
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::client::MemorySession;

    #[derive(Debug, Default)]
    struct RecordingSink {
        hits: AtomicUsize,
    }

    impl ReportSink for RecordingSink {
        async fn deliver(&self, _article: &ArticleId) -> Result<Receipt, ReportError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(Receipt::new(true))
        }
    }

    #[derive(Debug, Default)]
    struct FailingSink;

    impl ReportSink for FailingSink {
        async fn deliver(&self, _article: &ArticleId) -> Result<Receipt, ReportError> {
            Err(ReportError::new("connection reset".to_string()))
        }
    }

    fn id(input: &str) -> ArticleId {
        input.parse().unwrap()
    }

    #[tokio::test]
    async fn delivers_after_the_delay_and_marks_the_session() {
        let marker = ViewMarker::new(MemorySession::default());
        let reporter = ViewReporter::new(
            marker.clone(),
            Arc::new(RecordingSink::default()),
            Duration::from_millis(5),
        );
        let article = id("a1");

        let task = reporter
            .observe(article.clone())
            .expect("a fresh article should schedule a report");

        assert_eq!(task.outcome().await, ReportOutcome::Delivered { counted: true });
        assert!(marker.has_reported(&article));
        assert!(
            reporter.observe(article).is_none(),
            "a reported article should not schedule again"
        );
    }

    #[tokio::test]
    async fn cancelling_before_the_delay_drops_the_report() {
        let sink = Arc::new(RecordingSink::default());
        let marker = ViewMarker::new(MemorySession::default());
        let reporter = ViewReporter::new(marker.clone(), Arc::clone(&sink), Duration::from_secs(30));
        let article = id("a1");

        let task = reporter.observe(article.clone()).unwrap();

        assert_eq!(task.cancel().await, ReportOutcome::Dropped);
        assert_eq!(sink.hits.load(Ordering::SeqCst), 0, "the sink should never be reached");
        assert!(
            !marker.has_reported(&article),
            "a dropped report should leave the article unmarked"
        );
    }

    #[tokio::test]
    async fn failed_delivery_leaves_the_article_unmarked() {
        let marker = ViewMarker::new(MemorySession::default());
        let reporter = ViewReporter::new(
            marker.clone(),
            Arc::new(FailingSink),
            Duration::from_millis(5),
        );
        let article = id("a1");

        let task = reporter.observe(article.clone()).unwrap();

        assert_eq!(task.outcome().await, ReportOutcome::Failed);
        assert!(!marker.has_reported(&article));
        assert!(
            reporter.observe(article).is_some(),
            "the next render should retry a failed report"
        );
    }
}
