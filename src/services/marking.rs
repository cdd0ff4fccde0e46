use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::core::config::Settings;
use crate::schemas::marking::{AiMarkingResponse, AnswerSubmission, MarkingReport, QuestionMarking};
use crate::services::completion::{strip_code_fence, AiError, CompletionClient, CompletionRequest};

const MISSING_CRITERIA: &str = "No specific criteria were provided for this question.";

const GRADE_BANDS: &[(u32, GradeBand)] = &[
    (80, GradeBand { grade: 1, label: "Highest" }),
    (75, GradeBand { grade: 2, label: "Higher" }),
    (70, GradeBand { grade: 3, label: "High" }),
    (65, GradeBand { grade: 4, label: "High average" }),
    (60, GradeBand { grade: 5, label: "Average" }),
    (55, GradeBand { grade: 6, label: "Low average" }),
    (50, GradeBand { grade: 7, label: "Low" }),
    (45, GradeBand { grade: 8, label: "Lower" }),
    (40, GradeBand { grade: 9, label: "Lowest" }),
];

const BELOW_LOWEST_BAND: GradeBand = GradeBand { grade: 9, label: "Lowest" };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GradeBand {
    pub(crate) grade: u8,
    pub(crate) label: &'static str,
}

pub(crate) fn grade_for_percent(percent: u32) -> GradeBand {
    GRADE_BANDS
        .iter()
        .find(|(threshold, _)| percent >= *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(BELOW_LOWEST_BAND)
}

pub(crate) fn awarded_marks(overall_score: f64, question_marks: u32) -> u32 {
    let awarded = (overall_score / 10.0 * f64::from(question_marks)).round();
    awarded.max(0.0) as u32
}

pub(crate) fn percent_of(awarded: u64, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (awarded as f64 / f64::from(total) * 100.0).round() as u32
}

pub(crate) fn build_marking_prompt(criteria: &str, answer: &str) -> String {
    format!(
        r#"You are an expert examiner marking against the JHS NACCA curriculum. Mark the student's answer using these criteria:
- Relevance to the question
- Grammatical correctness
- Near-answer marking (partial credit)
- Correct sentences
- Detail
- Marks for excellence

Give each criterion a score from 1 to 10 with a brief comment, then an overall score from 1 to 10 with summary feedback.
Respond with a single JSON object in exactly this shape:
{{
  "criteria": {{
    "relevance": {{ "score": <number>, "comment": "<string>" }},
    "grammar": {{ "score": <number>, "comment": "<string>" }},
    "near_answer": {{ "score": <number>, "comment": "<string>" }},
    "sentences": {{ "score": <number>, "comment": "<string>" }},
    "detail": {{ "score": <number>, "comment": "<string>" }},
    "excellence": {{ "score": <number>, "comment": "<string>" }}
  }},
  "overall": {{
    "score": <number>,
    "feedback": "<string>"
  }}
}}

Criteria: "{criteria}"
Student's Answer: "{answer}"
"#
    )
}

pub(crate) fn parse_marking_report(raw: &str) -> Result<MarkingReport, AiError> {
    let report: MarkingReport = serde_json::from_str(strip_code_fence(raw))
        .map_err(|err| AiError::MalformedOutput(format!("marking report: {err}")))?;

    for (name, criterion) in report.criteria.named() {
        check_score(name, criterion.score)?;
    }
    check_score("overall", report.overall.score)?;

    Ok(report)
}

fn check_score(name: &str, score: f64) -> Result<(), AiError> {
    if score.is_finite() && (1.0..=10.0).contains(&score) {
        Ok(())
    } else {
        Err(AiError::MalformedOutput(format!("{name} score {score} is outside 1-10")))
    }
}

#[derive(Clone)]
pub(crate) struct MarkingService {
    client: Arc<dyn CompletionClient>,
    model: String,
    temperature: f64,
}

impl MarkingService {
    pub(crate) fn from_settings(settings: &Settings, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            model: settings.ai().marking_model.clone(),
            temperature: settings.ai().marking_temperature,
        }
    }

    pub(crate) async fn mark_answer(
        &self,
        criteria: &str,
        answer: &AnswerSubmission,
    ) -> Result<QuestionMarking, AiError> {
        let request = CompletionRequest {
            flow: "marking",
            model: self.model.clone(),
            prompt: build_marking_prompt(criteria, &answer.answer),
            temperature: self.temperature,
        };

        let raw = self.client.complete(request).await?;
        let report = parse_marking_report(&raw)?;
        let awarded = awarded_marks(report.overall.score, answer.marks);

        Ok(QuestionMarking { report, awarded_marks: awarded, max_marks: answer.marks })
    }

    /// Marks answers one after another; the first failure aborts the whole batch.
    pub(crate) async fn mark_exam(
        &self,
        answers: &[AnswerSubmission],
        criteria: &HashMap<String, String>,
        total_marks: u32,
    ) -> Result<AiMarkingResponse, AiError> {
        let mut results = BTreeMap::new();
        let mut total_awarded_marks: u64 = 0;

        for answer in answers {
            let question_criteria = match criteria.get(&answer.question_id) {
                Some(text) => text.as_str(),
                None => {
                    tracing::warn!(
                        question_id = %answer.question_id,
                        "No marking criteria supplied"
                    );
                    MISSING_CRITERIA
                }
            };

            let marking = self.mark_answer(question_criteria, answer).await?;
            total_awarded_marks += u64::from(marking.awarded_marks);
            results.insert(answer.question_id.clone(), marking);
        }

        let percent = percent_of(total_awarded_marks, total_marks);
        let band = grade_for_percent(percent);

        tracing::info!(
            answers = answers.len(),
            total_awarded_marks,
            total_marks,
            percent,
            grade = band.grade,
            "AI marking completed"
        );

        Ok(AiMarkingResponse {
            results,
            total_awarded_marks,
            total_marks,
            percent,
            grade: band.grade,
            grade_label: band.label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, ScriptedCompletions};

    fn answer(question_id: &str, text: &str, marks: u32) -> AnswerSubmission {
        AnswerSubmission {
            question_id: question_id.to_string(),
            answer: text.to_string(),
            marks,
        }
    }

    fn service(client: Arc<ScriptedCompletions>) -> MarkingService {
        MarkingService { client, model: "gpt-4".to_string(), temperature: 0.5 }
    }

    #[test]
    fn grade_bands_follow_fixed_table() {
        assert_eq!(grade_for_percent(100), GradeBand { grade: 1, label: "Highest" });
        assert_eq!(grade_for_percent(80), GradeBand { grade: 1, label: "Highest" });
        assert_eq!(grade_for_percent(79), GradeBand { grade: 2, label: "Higher" });
        assert_eq!(grade_for_percent(70), GradeBand { grade: 3, label: "High" });
        assert_eq!(grade_for_percent(65), GradeBand { grade: 4, label: "High average" });
        assert_eq!(grade_for_percent(60), GradeBand { grade: 5, label: "Average" });
        assert_eq!(grade_for_percent(55), GradeBand { grade: 6, label: "Low average" });
        assert_eq!(grade_for_percent(50), GradeBand { grade: 7, label: "Low" });
        assert_eq!(grade_for_percent(45), GradeBand { grade: 8, label: "Lower" });
        assert_eq!(grade_for_percent(40), GradeBand { grade: 9, label: "Lowest" });
        assert_eq!(grade_for_percent(39), GradeBand { grade: 9, label: "Lowest" });
        assert_eq!(grade_for_percent(0), GradeBand { grade: 9, label: "Lowest" });
    }

    #[test]
    fn awarded_marks_scale_overall_score() {
        assert_eq!(awarded_marks(7.0, 10), 7);
        assert_eq!(awarded_marks(7.0, 5), 4);
        assert_eq!(awarded_marks(10.0, 3), 3);
        assert_eq!(awarded_marks(0.0, 8), 0);
    }

    #[test]
    fn percent_rounds_and_handles_zero_total() {
        assert_eq!(percent_of(2, 3), 67);
        assert_eq!(percent_of(0, 0), 0);
        assert_eq!(percent_of(17, 20), 85);
    }

    #[test]
    fn prompt_embeds_criteria_and_answer() {
        let prompt = build_marking_prompt("Mentions photosynthesis", "Plants make food");
        assert!(prompt.contains("Criteria: \"Mentions photosynthesis\""));
        assert!(prompt.contains("Student's Answer: \"Plants make food\""));
        assert!(prompt.contains("\"near_answer\""));
    }

    #[test]
    fn report_with_missing_criterion_is_malformed() {
        let raw = r#"{"criteria": {"relevance": {"score": 5, "comment": ""}}, "overall": {"score": 5}}"#;
        let err = parse_marking_report(raw).expect_err("missing criteria");
        assert!(matches!(err, AiError::MalformedOutput(_)));
    }

    #[test]
    fn report_with_out_of_range_score_is_malformed() {
        let raw = test_support::marking_report_json(12.0);
        let err = parse_marking_report(&raw).expect_err("score 12");
        assert!(matches!(err, AiError::MalformedOutput(message) if message.contains("overall")));
    }

    #[test]
    fn zero_score_is_below_the_rubric_scale() {
        let raw = test_support::marking_report_json(0.0);
        let err = parse_marking_report(&raw).expect_err("score 0");
        assert!(matches!(err, AiError::MalformedOutput(message) if message.contains("1-10")));
    }

    #[test]
    fn fenced_report_is_accepted() {
        let raw = format!("```json\n{}\n```", test_support::marking_report_json(6.0));
        let report = parse_marking_report(&raw).expect("fenced report");
        assert_eq!(report.overall.score, 6.0);
    }

    #[tokio::test]
    async fn mark_exam_aggregates_and_grades() {
        let client = Arc::new(ScriptedCompletions::new(vec![
            Ok(test_support::marking_report_json(7.0)),
            Ok(test_support::marking_report_json(9.0)),
        ]));
        let criteria = HashMap::from([
            ("q1".to_string(), "Explains osmosis".to_string()),
            ("q2".to_string(), "Names three organs".to_string()),
        ]);

        let response = service(client.clone())
            .mark_exam(&[answer("q1", "Water moves", 10), answer("q2", "Heart", 10)], &criteria, 20)
            .await
            .expect("marking");

        assert_eq!(response.results["q1"].awarded_marks, 7);
        assert_eq!(response.results["q2"].awarded_marks, 9);
        assert_eq!(response.results["q2"].max_marks, 10);
        assert_eq!(response.total_awarded_marks, 16);
        assert_eq!(response.percent, 80);
        assert_eq!(response.grade, 1);
        assert_eq!(response.grade_label, "Highest");

        let requests = client.requests().await;
        assert_eq!(requests.len(), 2);
        assert!(requests[0].prompt.contains("Explains osmosis"));
        assert_eq!(requests[1].flow, "marking");
        assert_eq!(requests[1].temperature, 0.5);
    }

    #[tokio::test]
    async fn awarded_total_beyond_u32_does_not_wrap() {
        let client = Arc::new(ScriptedCompletions::new(vec![
            Ok(test_support::marking_report_json(10.0)),
            Ok(test_support::marking_report_json(10.0)),
        ]));

        let response = service(client)
            .mark_exam(
                &[answer("q1", "a", u32::MAX), answer("q2", "b", u32::MAX)],
                &HashMap::new(),
                u32::MAX,
            )
            .await
            .expect("marking");

        assert_eq!(response.total_awarded_marks, 2 * u64::from(u32::MAX));
        assert_eq!(response.percent, 200);
        assert_eq!(response.grade, 1);
    }

    #[tokio::test]
    async fn first_failure_aborts_batch() {
        let client = Arc::new(ScriptedCompletions::new(vec![
            Ok("not json".to_string()),
            Ok(test_support::marking_report_json(9.0)),
        ]));

        let err = service(client.clone())
            .mark_exam(&[answer("q1", "a", 5), answer("q2", "b", 5)], &HashMap::new(), 10)
            .await
            .expect_err("malformed");

        assert!(matches!(err, AiError::MalformedOutput(_)));
        let requests = client.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains(MISSING_CRITERIA));
    }
}
