use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionCreate {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "studentName must not be empty"))]
    pub(crate) student_name: String,
    #[validate(range(max = 100, message = "score must be a percentage between 0 and 100"))]
    pub(crate) score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LeaderboardEntry {
    pub(crate) name: String,
    pub(crate) average_score: u32,
    pub(crate) exams_taken: u32,
}
