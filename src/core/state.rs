use std::sync::Arc;

use crate::core::config::Settings;
use crate::repositories::exams::ExamRepository;
use crate::repositories::submissions::SubmissionRepository;
use crate::services::completion::CompletionClient;
use crate::services::exam_generation::ExamGenerator;
use crate::services::marking::MarkingService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    exams: ExamRepository,
    submissions: SubmissionRepository,
    completions: Arc<dyn CompletionClient>,
    marking: MarkingService,
    generator: ExamGenerator,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        exams: ExamRepository,
        submissions: SubmissionRepository,
        completions: Arc<dyn CompletionClient>,
    ) -> Self {
        let marking = MarkingService::from_settings(&settings, completions.clone());
        let generator = ExamGenerator::from_settings(&settings, completions.clone());
        Self {
            inner: Arc::new(InnerState {
                settings,
                exams,
                submissions,
                completions,
                marking,
                generator,
            }),
        }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn exams(&self) -> &ExamRepository {
        &self.inner.exams
    }

    pub(crate) fn submissions(&self) -> &SubmissionRepository {
        &self.inner.submissions
    }

    pub(crate) fn completions(&self) -> &dyn CompletionClient {
        self.inner.completions.as_ref()
    }

    pub(crate) fn marking(&self) -> &MarkingService {
        &self.inner.marking
    }

    pub(crate) fn generator(&self) -> &ExamGenerator {
        &self.inner.generator
    }
}
