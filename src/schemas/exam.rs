use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::models::{Exam, Question, SubQuestion};
use crate::db::types::QuestionType;
use crate::schemas::{deserialize_optional_marks, deserialize_optional_reference};

/// Body of `POST /save-exam`: sectioned questions from the manual editor, the AI draft
/// screen, or the edit screen (which also sends the stored exam's `id`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveExamRequest {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) subject: Option<String>,
    #[serde(default)]
    pub(crate) duration: Option<u32>,
    #[serde(default)]
    pub(crate) sections: Vec<DraftSection>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DraftSection {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) questions: Vec<DraftQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DraftQuestion {
    #[serde(default)]
    pub(crate) id: Option<String>,
    #[serde(default)]
    pub(crate) text: String,
    #[serde(rename = "type", default = "default_question_type")]
    pub(crate) kind: QuestionType,
    #[serde(default)]
    pub(crate) options: Vec<DraftOption>,
    #[serde(default, deserialize_with = "deserialize_optional_reference")]
    pub(crate) correct_answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_marks")]
    pub(crate) marks: Option<u32>,
    #[serde(default)]
    pub(crate) section: Option<String>,
    #[serde(default)]
    pub(crate) sub_questions: Vec<SubQuestion>,
}

/// Options arrive as `{id, text}` objects from the editors or as stored plain strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DraftOption {
    Labeled { text: String },
    Text(String),
}

impl DraftOption {
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Labeled { text } | Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveExamResponse {
    pub(crate) message: String,
    pub(crate) exam_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExamSummary {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) total_marks: u32,
    pub(crate) duration: u32,
    pub(crate) question_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
}

/// Exam as shown to students. The question type has no `correctAnswer` field at all.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentExamView {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub(crate) updated_at: Option<OffsetDateTime>,
    pub(crate) questions: Vec<StudentQuestion>,
    pub(crate) total_marks: u32,
    pub(crate) duration: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentQuestion {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(rename = "type")]
    pub(crate) kind: QuestionType,
    pub(crate) options: Vec<String>,
    pub(crate) marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) section: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) sub_questions: Vec<SubQuestion>,
}

impl From<&Exam> for ExamSummary {
    fn from(exam: &Exam) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            subject: exam.subject.clone(),
            total_marks: exam.total_marks,
            duration: exam.duration,
            question_count: exam.questions.len(),
            created_at: exam.created_at,
        }
    }
}

impl From<Exam> for StudentExamView {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            subject: exam.subject,
            created_by: exam.created_by,
            created_at: exam.created_at,
            updated_at: exam.updated_at,
            questions: exam.questions.into_iter().map(StudentQuestion::from).collect(),
            total_marks: exam.total_marks,
            duration: exam.duration,
        }
    }
}

impl From<Question> for StudentQuestion {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.text,
            kind: question.kind,
            options: question.options,
            marks: question.marks,
            section: question.section,
            sub_questions: question.sub_questions,
        }
    }
}

fn default_question_type() -> QuestionType {
    QuestionType::Essay
}
