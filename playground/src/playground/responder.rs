use crate::outcome::OutcomeSource;
use http::{Method, StatusCode};
use log::trace;
use playground_metrics::{PlaygroundMetrics, RequestLabels};
use std::sync::Arc;

/// Answers every request with a randomly drawn status after a randomly drawn delay and
/// records the outcome.
pub struct Responder {
    metrics: Arc<PlaygroundMetrics>,
    outcomes: Arc<dyn OutcomeSource>,
}

impl Responder {
    pub fn new(metrics: Arc<PlaygroundMetrics>, outcomes: Arc<dyn OutcomeSource>) -> Self {
        Responder { metrics, outcomes }
    }

    pub fn metrics(&self) -> &Arc<PlaygroundMetrics> {
        &self.metrics
    }

    /// Handle one request and return the status to reply with.
    ///
    /// The method is used verbatim as a label. The delay slept here is the value observed
    /// into the duration histogram, and the returned status is the one recorded.
    pub async fn handle(&self, method: &Method, path: &str) -> StatusCode {
        let outcome = self.outcomes.draw();
        trace!(
            "[handle] - {} {} - status: {}, size: {}, delay: {:?}",
            method,
            path,
            outcome.status,
            outcome.size_bytes,
            outcome.delay
        );

        tokio::time::sleep(outcome.delay).await;

        let labels = RequestLabels::new(path, method.as_str(), outcome.status.as_str());
        self.metrics
            .record(&labels, outcome.delay, outcome.size_bytes);
        outcome.status
    }
}
