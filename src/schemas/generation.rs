use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::db::types::QuestionType;
use crate::schemas::{deserialize_optional_marks, deserialize_optional_reference};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_question_types"))]
pub(crate) struct GenerateExamRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "subject is required"))]
    pub(crate) subject: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "examTitle is required"))]
    pub(crate) exam_title: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 100, message = "numQuestions must be between 1 and 100"))]
    pub(crate) num_questions: u32,
    #[serde(default)]
    pub(crate) question_types: Option<BTreeMap<String, bool>>,
    #[serde(default)]
    pub(crate) instructions: String,
}

impl GenerateExamRequest {
    pub(crate) fn enabled_question_types(&self) -> Vec<&str> {
        self.question_types
            .iter()
            .flatten()
            .filter(|(_, enabled)| **enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

fn validate_question_types(request: &GenerateExamRequest) -> Result<(), ValidationError> {
    if request.enabled_question_types().is_empty() {
        let mut error = ValidationError::new("question_types");
        error.message = Some("at least one question type must be enabled".into());
        return Err(error);
    }
    Ok(())
}

/// Exam draft produced by the completion model, in the shape the editor consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeneratedExam {
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) sections: Vec<GeneratedSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct GeneratedSection {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeneratedQuestion {
    #[serde(default)]
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(rename = "type")]
    pub(crate) kind: QuestionType,
    #[serde(default)]
    pub(crate) options: Vec<GeneratedOption>,
    #[serde(default, deserialize_with = "deserialize_optional_reference")]
    pub(crate) correct_answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_marks")]
    pub(crate) marks: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub(crate) struct GeneratedOption {
    pub(crate) id: String,
    pub(crate) text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Labeled {
        #[serde(default)]
        id: String,
        text: String,
    },
    Text(String),
}

impl From<RawOption> for GeneratedOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Labeled { id, text } => Self { id, text },
            RawOption::Text(text) => Self { id: String::new(), text },
        }
    }
}

impl GeneratedExam {
    pub(crate) fn question_count(&self) -> usize {
        self.sections.iter().map(|section| section.questions.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_requires_an_enabled_question_type() {
        let request: GenerateExamRequest = serde_json::from_value(json!({
            "subject": "Mathematics",
            "examTitle": "End of term",
            "numQuestions": 5,
            "questionTypes": {"multiple-choice": false, "essay": false}
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: GenerateExamRequest = serde_json::from_value(json!({
            "subject": "Mathematics",
            "examTitle": "End of term",
            "numQuestions": 5,
            "questionTypes": {"multiple-choice": true, "essay": false}
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.enabled_question_types(), vec!["multiple-choice"]);
        assert!(request.instructions.is_empty());
    }

    #[test]
    fn missing_fields_fail_validation() {
        let request: GenerateExamRequest = serde_json::from_value(json!({})).unwrap();
        let errors = request.validate().expect_err("empty request");
        assert_eq!(errors.field_errors().len(), 3);
    }

    #[test]
    fn options_accept_objects_and_plain_strings() {
        let question: GeneratedQuestion = serde_json::from_value(json!({
            "text": "Pick one",
            "type": "multiple-choice",
            "options": [{"id": "a", "text": "Accra"}, "Kumasi"],
            "correctAnswer": "a",
            "marks": "2"
        }))
        .unwrap();

        assert_eq!(question.options[0], GeneratedOption { id: "a".into(), text: "Accra".into() });
        assert_eq!(question.options[1].text, "Kumasi");
        assert!(question.options[1].id.is_empty());
        assert_eq!(question.marks, Some(2));
    }
}
