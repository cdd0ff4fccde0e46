use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AiMarkingRequest {
    #[serde(default)]
    #[validate(nested)]
    pub(crate) answers: Option<Vec<AnswerSubmission>>,
    #[serde(default)]
    pub(crate) criteria: Option<HashMap<String, String>>,
    #[serde(default)]
    #[validate(range(max = 100_000, message = "totalMarks must be at most 100000"))]
    pub(crate) total_marks: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnswerSubmission {
    #[validate(length(min = 1, message = "questionId must not be empty"))]
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) answer: String,
    #[serde(default)]
    #[validate(range(max = 1_000, message = "marks must be at most 1000 per answer"))]
    pub(crate) marks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CriterionScore {
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CriteriaScores {
    pub(crate) relevance: CriterionScore,
    pub(crate) grammar: CriterionScore,
    pub(crate) near_answer: CriterionScore,
    pub(crate) sentences: CriterionScore,
    pub(crate) detail: CriterionScore,
    pub(crate) excellence: CriterionScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OverallScore {
    pub(crate) score: f64,
    #[serde(default)]
    pub(crate) feedback: String,
}

/// The structured report the completion model is asked to return for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct MarkingReport {
    pub(crate) criteria: CriteriaScores,
    pub(crate) overall: OverallScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionMarking {
    #[serde(flatten)]
    pub(crate) report: MarkingReport,
    pub(crate) awarded_marks: u32,
    pub(crate) max_marks: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AiMarkingResponse {
    pub(crate) results: BTreeMap<String, QuestionMarking>,
    pub(crate) total_awarded_marks: u64,
    pub(crate) total_marks: u32,
    pub(crate) percent: u32,
    pub(crate) grade: u8,
    pub(crate) grade_label: &'static str,
}

impl CriteriaScores {
    pub(crate) fn named(&self) -> [(&'static str, &CriterionScore); 6] {
        [
            ("relevance", &self.relevance),
            ("grammar", &self.grammar),
            ("near_answer", &self.near_answer),
            ("sentences", &self.sentences),
            ("detail", &self.detail),
            ("excellence", &self.excellence),
        ]
    }
}
