use rand::Rng;
use time::OffsetDateTime;

use crate::core::time::unix_millis;
use crate::db::models::{Exam, Question};
use crate::schemas::exam::{DraftQuestion, SaveExamRequest};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const UNTITLED_EXAM: &str = "Untitled Exam";
const GENERAL_SUBJECT: &str = "General";
const DEFAULT_QUESTION_MARKS: u32 = 1;

/// `exam_<unix millis>_<9 base36 chars>`.
pub(crate) fn new_exam_id(now: OffsetDateTime) -> String {
    format!("exam_{}_{}", unix_millis(now), random_base36(9))
}

fn new_question_id(now: OffsetDateTime) -> String {
    format!("q_{}_{}", unix_millis(now), random_base36(9))
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

pub(crate) struct DraftContext<'a> {
    pub(crate) exam_id: String,
    pub(crate) examiner_id: &'a str,
    pub(crate) default_duration: u32,
    pub(crate) now: OffsetDateTime,
}

/// Flattens an editor draft into a stored exam.
///
/// Each question is tagged with the title of the section it was listed under, falling
/// back to its own `section` label when that section is untitled. `createdAt` is set to
/// `now`; the repository keeps the stored timestamp when the id already exists.
pub(crate) fn exam_from_draft(draft: SaveExamRequest, context: DraftContext<'_>) -> Exam {
    let questions = draft
        .sections
        .into_iter()
        .flat_map(|section| {
            let section_title = section.title;
            section
                .questions
                .into_iter()
                .map(move |question| (section_title.clone(), question))
        })
        .map(|(section_title, question)| question_from_draft(question, section_title, context.now))
        .collect();

    let mut exam = Exam {
        id: context.exam_id,
        title: non_blank(draft.title).unwrap_or_else(|| UNTITLED_EXAM.to_string()),
        subject: non_blank(draft.subject).unwrap_or_else(|| GENERAL_SUBJECT.to_string()),
        created_by: context.examiner_id.to_string(),
        created_at: context.now,
        updated_at: None,
        questions,
        total_marks: 0,
        duration: draft
            .duration
            .filter(|minutes| *minutes > 0)
            .unwrap_or(context.default_duration),
    };
    exam.recompute_total_marks();
    exam
}

fn question_from_draft(
    draft: DraftQuestion,
    section_title: Option<String>,
    now: OffsetDateTime,
) -> Question {
    Question {
        id: non_blank(draft.id).unwrap_or_else(|| new_question_id(now)),
        text: draft.text,
        kind: draft.kind,
        options: draft.options.into_iter().map(|option| option.into_text()).collect(),
        correct_answer: draft.correct_answer,
        marks: draft.marks.filter(|marks| *marks > 0).unwrap_or(DEFAULT_QUESTION_MARKS),
        section: non_blank(section_title).or_else(|| non_blank(draft.section)),
        sub_questions: draft.sub_questions,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
