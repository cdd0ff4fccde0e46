pub(crate) mod completion;
pub(crate) mod exam_drafts;
pub(crate) mod exam_generation;
pub(crate) mod leaderboard;
pub(crate) mod marking;
