use std::sync::Arc;

use crate::core::config::Settings;
use crate::schemas::generation::{GenerateExamRequest, GeneratedExam};
use crate::services::completion::{strip_code_fence, AiError, CompletionClient, CompletionRequest};

pub(crate) fn build_generation_prompt(request: &GenerateExamRequest) -> String {
    let question_types = request.enabled_question_types().join(", ");
    let title = &request.exam_title;

    format!(
        r#"Generate an exam with the title "{title}" for the subject "{subject}" based on the NACCA curriculum.

Instructions:
- Number of questions: {count}
- Question types: {question_types}
- Additional instructions from the examiner: "{instructions}"
- Each question must have a unique ID, the question text, the question type, marks, and for multiple-choice questions, a list of options and the correct answer.

Return the response as a single JSON object in the following format:
{{
  "title": "{title}",
  "sections": [
    {{
      "id": "string",
      "title": "string",
      "questions": [
        {{
          "id": "string",
          "text": "string",
          "type": "'multiple-choice' or 'essay'",
          "options": [
            {{ "id": "string", "text": "string" }}
          ],
          "correctAnswer": "string (option id for multiple-choice)",
          "marks": "number"
        }}
      ]
    }}
  ]
}}
"#,
        subject = request.subject,
        count = request.num_questions,
        instructions = request.instructions,
    )
}

/// Parses the model output and fills in ids the model left blank.
///
/// Only the document shape is enforced. Id uniqueness, positive marks and whether
/// `correctAnswer` points at a real option are left to the editor.
pub(crate) fn parse_generated_exam(
    raw: &str,
    fallback_title: &str,
) -> Result<GeneratedExam, AiError> {
    let mut exam: GeneratedExam = serde_json::from_str(strip_code_fence(raw))
        .map_err(|err| AiError::MalformedOutput(format!("exam document: {err}")))?;

    if exam.sections.is_empty() {
        return Err(AiError::MalformedOutput("exam document has no sections".to_string()));
    }

    if exam.title.trim().is_empty() {
        exam.title = fallback_title.to_string();
    }

    for (section_index, section) in exam.sections.iter_mut().enumerate() {
        if section.id.trim().is_empty() {
            section.id = format!("section_{}", section_index + 1);
        }

        for (question_index, question) in section.questions.iter_mut().enumerate() {
            if question.text.trim().is_empty() {
                return Err(AiError::MalformedOutput(format!(
                    "question {} in section {} has no text",
                    question_index + 1,
                    section.id
                )));
            }
            if question.id.trim().is_empty() {
                question.id = format!("{}_q{}", section.id, question_index + 1);
            }
            for (option_index, option) in question.options.iter_mut().enumerate() {
                if option.id.trim().is_empty() {
                    option.id = format!("{}_opt{}", question.id, option_index + 1);
                }
            }
        }
    }

    Ok(exam)
}

#[derive(Clone)]
pub(crate) struct ExamGenerator {
    client: Arc<dyn CompletionClient>,
    model: String,
    temperature: f64,
}

impl ExamGenerator {
    pub(crate) fn from_settings(settings: &Settings, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            model: settings.ai().generation_model.clone(),
            temperature: settings.ai().generation_temperature,
        }
    }

    pub(crate) async fn generate(
        &self,
        request: &GenerateExamRequest,
    ) -> Result<GeneratedExam, AiError> {
        let completion = CompletionRequest {
            flow: "generation",
            model: self.model.clone(),
            prompt: build_generation_prompt(request),
            temperature: self.temperature,
        };

        let raw = self.client.complete(completion).await?;
        let exam = parse_generated_exam(&raw, &request.exam_title)?;

        let generated = exam.question_count();
        if generated != request.num_questions as usize {
            tracing::warn!(
                requested = request.num_questions,
                generated,
                "Generated exam question count differs from request"
            );
        }
        tracing::info!(subject = %request.subject, questions = generated, "AI exam generated");

        Ok(exam)
    }
}
