use std::collections::HashMap;

use crate::db::models::Submission;
use crate::schemas::leaderboard::LeaderboardEntry;

/// Aggregates submissions per student name, highest rounded average first.
///
/// Names compare exactly (no trimming or case folding). Ties keep first-seen order.
pub(crate) fn rank(submissions: &[Submission]) -> Vec<LeaderboardEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, (u64, u32)> = HashMap::new();

    for submission in submissions {
        let entry = totals.entry(submission.student_name.as_str()).or_insert_with(|| {
            order.push(submission.student_name.as_str());
            (0, 0)
        });
        entry.0 += u64::from(submission.score);
        entry.1 += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = order
        .into_iter()
        .filter_map(|name| {
            let (total, count) = totals.get(name).copied()?;
            Some(LeaderboardEntry {
                name: name.to_string(),
                average_score: rounded_average(total, count),
                exams_taken: count,
            })
        })
        .collect();

    entries.sort_by(|left, right| right.average_score.cmp(&left.average_score));
    entries
}

fn rounded_average(total: u64, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    let count = u64::from(count);
    u32::try_from((total * 2 + count) / (count * 2)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_submission;

    #[test]
    fn averages_are_rounded_and_sorted_descending() {
        let submissions = vec![
            sample_submission("exam_1", "Ama", 80),
            sample_submission("exam_1", "Kofi", 95),
            sample_submission("exam_2", "Ama", 91),
        ];

        let board = rank(&submissions);

        assert_eq!(
            board,
            vec![
                LeaderboardEntry { name: "Kofi".into(), average_score: 95, exams_taken: 1 },
                LeaderboardEntry { name: "Ama".into(), average_score: 86, exams_taken: 2 },
            ]
        );
    }

    #[test]
    fn half_rounds_up() {
        assert_eq!(rounded_average(171, 2), 86);
        assert_eq!(rounded_average(170, 2), 85);
        assert_eq!(rounded_average(0, 0), 0);
    }

    #[test]
    fn ties_keep_first_seen_order_and_names_are_exact() {
        let submissions = vec![
            sample_submission("exam_1", "ama", 70),
            sample_submission("exam_1", "Ama", 70),
        ];

        let board = rank(&submissions);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "ama");
        assert_eq!(board[1].name, "Ama");
    }

    #[test]
    fn empty_input_gives_empty_board() {
        assert!(rank(&[]).is_empty());
    }
}
