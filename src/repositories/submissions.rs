use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::backend::{CollectionBackend, StoreError};
use crate::db::models::Submission;

pub(crate) struct SubmissionRepository {
    backend: Arc<dyn CollectionBackend<Submission>>,
    write_lock: Mutex<()>,
}

impl SubmissionRepository {
    pub(crate) fn new(backend: Arc<dyn CollectionBackend<Submission>>) -> Self {
        Self { backend, write_lock: Mutex::new(()) }
    }

    pub(crate) async fn record(&self, submission: Submission) -> Result<Submission, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut submissions = self.backend.load().await?;
        submissions.push(submission.clone());
        self.backend.persist(&submissions).await?;

        tracing::info!(
            submission_id = %submission.id,
            exam_id = %submission.exam_id,
            score = submission.score,
            "Submission recorded"
        );
        Ok(submission)
    }

    pub(crate) async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        self.backend.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryBackend;
    use crate::test_support;

    #[tokio::test]
    async fn record_appends_in_order() {
        let repository =
            SubmissionRepository::new(Arc::new(MemoryBackend::<Submission>::new()));

        repository.record(test_support::sample_submission("exam_a", "Ama", 80)).await.unwrap();
        repository.record(test_support::sample_submission("exam_b", "Kofi", 70)).await.unwrap();

        let all = repository.list_all().await.expect("list");
        let names: Vec<&str> = all.iter().map(|item| item.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ama", "Kofi"]);
    }
}
