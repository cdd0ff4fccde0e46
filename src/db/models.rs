use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::types::QuestionType;

pub(crate) const DEFAULT_DURATION_MINUTES: u32 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) subject: String,
    pub(crate) created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "time::serde::rfc3339::option")]
    pub(crate) updated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub(crate) questions: Vec<Question>,
    #[serde(default)]
    pub(crate) total_marks: u32,
    #[serde(default = "default_duration")]
    pub(crate) duration: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(rename = "type")]
    pub(crate) kind: QuestionType,
    #[serde(default)]
    pub(crate) options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) correct_answer: Option<String>,
    pub(crate) marks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) section: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) sub_questions: Vec<SubQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SubQuestion {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) marks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) student_name: String,
    pub(crate) score: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) submitted_at: OffsetDateTime,
}

impl Exam {
    /// Sub-question marks are an editor-side breakdown and do not count here.
    pub(crate) fn recompute_total_marks(&mut self) {
        self.total_marks = self.questions.iter().map(|question| question.marks).sum();
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}
