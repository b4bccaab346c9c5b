pub mod answer_remap;
pub mod attempt_view;
pub mod grading;
pub mod irt;
pub mod scoring;
pub mod seeded_random;
pub mod shuffle;
