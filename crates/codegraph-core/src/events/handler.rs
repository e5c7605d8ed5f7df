use super::types::*;

/// Implemented by whatever consumes progress/lifecycle events — a CLI
/// progress bar, a metrics exporter, or (in tests) a recording fake.
/// Default methods are no-ops so implementors only override what they use.
pub trait CodeGraphEventHandler: Send + Sync {
    fn on_analysis_started(&self, _event: &AnalysisStartedEvent) {}
    fn on_analysis_progress(&self, _event: &AnalysisProgressEvent) {}
    fn on_analysis_failed(&self, _event: &AnalysisFailedEvent) {}
    fn on_analysis_completed(&self, _event: &AnalysisCompletedEvent) {}
}

/// A handler that only emits `tracing` records, used as the default when no
/// caller-supplied handler is configured.
pub struct TracingEventHandler;

impl CodeGraphEventHandler for TracingEventHandler {
    fn on_analysis_started(&self, event: &AnalysisStartedEvent) {
        tracing::info!(
            project_id = %event.project_id,
            pr_id = %event.pull_request_id,
            file_count = ?event.file_count,
            "analysis started"
        );
    }

    fn on_analysis_progress(&self, event: &AnalysisProgressEvent) {
        tracing::debug!(
            pr_id = %event.pull_request_id,
            processed = event.processed,
            total = event.total,
            "analysis progress"
        );
    }

    fn on_analysis_failed(&self, event: &AnalysisFailedEvent) {
        tracing::warn!(pr_id = %event.pull_request_id, message = %event.message, "analysis failed");
    }

    fn on_analysis_completed(&self, event: &AnalysisCompletedEvent) {
        tracing::info!(
            pr_id = %event.pull_request_id,
            risk_score = event.risk_score,
            "analysis completed"
        );
    }
}
