use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum QuestionType {
    #[serde(alias = "multiple_choice", alias = "mcq")]
    MultipleChoice,
    Essay,
}

#[cfg(test)]
mod tests {
    use super::QuestionType;

    #[test]
    fn accepts_snake_case_alias() {
        let parsed: QuestionType = serde_json::from_str("\"multiple_choice\"").unwrap();
        assert_eq!(parsed, QuestionType::MultipleChoice);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"multiple-choice\"");
    }
}
