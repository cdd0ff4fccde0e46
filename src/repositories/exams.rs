use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::time::now_utc;
use crate::db::backend::{CollectionBackend, StoreError};
use crate::db::models::Exam;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SaveOutcome {
    Created(Exam),
    Updated(Exam),
}

impl SaveOutcome {
    pub(crate) fn exam(&self) -> &Exam {
        match self {
            Self::Created(exam) | Self::Updated(exam) => exam,
        }
    }
}

pub(crate) struct ExamRepository {
    backend: Arc<dyn CollectionBackend<Exam>>,
    write_lock: Mutex<()>,
}

impl ExamRepository {
    pub(crate) fn new(backend: Arc<dyn CollectionBackend<Exam>>) -> Self {
        Self { backend, write_lock: Mutex::new(()) }
    }

    pub(crate) fn backend(&self) -> &dyn CollectionBackend<Exam> {
        self.backend.as_ref()
    }

    /// Inserts a new exam or replaces the stored one with the same id.
    ///
    /// `totalMarks` is always recomputed from the questions. On replace the stored
    /// `createdAt` wins and `updatedAt` is stamped with the current time.
    pub(crate) async fn save(&self, mut exam: Exam) -> Result<SaveOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut exams = self.backend.load().await?;

        exam.recompute_total_marks();

        let outcome = match exams.iter().position(|stored| stored.id == exam.id) {
            Some(index) => {
                exam.created_at = exams[index].created_at;
                exam.updated_at = Some(now_utc());
                exams[index] = exam.clone();
                SaveOutcome::Updated(exam)
            }
            None => {
                exam.updated_at = None;
                exams.push(exam.clone());
                SaveOutcome::Created(exam)
            }
        };

        self.backend.persist(&exams).await?;

        tracing::info!(
            exam_id = %outcome.exam().id,
            created = matches!(outcome, SaveOutcome::Created(_)),
            total_marks = outcome.exam().total_marks,
            "Exam saved"
        );

        Ok(outcome)
    }

    pub(crate) async fn get_all(&self) -> Result<Vec<Exam>, StoreError> {
        self.backend.load().await
    }

    pub(crate) async fn get_by_id(&self, id: &str) -> Result<Option<Exam>, StoreError> {
        let exams = self.backend.load().await?;
        Ok(exams.into_iter().find(|exam| exam.id == id))
    }

    pub(crate) async fn get_by_creator(&self, creator_id: &str) -> Result<Vec<Exam>, StoreError> {
        let exams = self.backend.load().await?;
        Ok(exams.into_iter().filter(|exam| exam.created_by == creator_id).collect())
    }

    /// Returns `false` when no exam had the id; the collection is then left untouched.
    pub(crate) async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut exams = self.backend.load().await?;
        let before = exams.len();
        exams.retain(|exam| exam.id != id);

        if exams.len() == before {
            return Ok(false);
        }

        self.backend.persist(&exams).await?;
        tracing::info!(exam_id = %id, "Exam deleted");
        Ok(true)
    }
}
