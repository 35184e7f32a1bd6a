use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Complete,
    PublishFailed,
    WorkerFailed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Complete | JobStatus::PublishFailed | JobStatus::WorkerFailed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Complete => "complete",
            JobStatus::PublishFailed => "publish_failed",
            JobStatus::WorkerFailed => "worker_failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "complete" => Some(JobStatus::Complete),
            "publish_failed" => Some(JobStatus::PublishFailed),
            "worker_failed" => Some(JobStatus::WorkerFailed),
            _ => None,
        }
    }
}

/// In-memory view of a job's state, as assembled from the Job Store's three
/// keys. Not itself persisted as a single value.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub results: Vec<crate::models::ProcessedSong>,
    pub years: std::collections::HashSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_round_trips_through_as_str_and_parse() {
        let all = [
            JobStatus::Queued,
            JobStatus::Processing,
            JobStatus::Complete,
            JobStatus::PublishFailed,
            JobStatus::WorkerFailed,
        ];
        for status in all {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn only_complete_publish_failed_worker_failed_are_terminal() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::PublishFailed.is_terminal());
        assert!(JobStatus::WorkerFailed.is_terminal());
    }

    #[test]
    fn parse_rejects_unknown_status() {
        assert_eq!(JobStatus::parse("bogus"), None);
    }
}
