pub(crate) mod ai;
pub(crate) mod errors;
pub(crate) mod examiner;
pub(crate) mod exams;
pub(crate) mod handlers;
pub(crate) mod leaderboard;
pub(crate) mod router;
pub(crate) mod validation;
