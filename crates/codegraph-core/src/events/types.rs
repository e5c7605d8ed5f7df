use crate::types::ProjectId;

#[derive(Debug, Clone)]
pub struct AnalysisStartedEvent {
    pub project_id: ProjectId,
    pub pull_request_id: String,
    pub file_count: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct AnalysisProgressEvent {
    pub pull_request_id: String,
    pub processed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisFailedEvent {
    pub pull_request_id: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisCompletedEvent {
    pub pull_request_id: String,
    pub risk_score: f64,
}
