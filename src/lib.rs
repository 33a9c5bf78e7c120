// The quiz state machine and the pieces the terminal app is built from.
// Rendering and key handling stay in the binary.
pub mod app_dirs;
pub mod config;
pub mod logging;
pub mod questions;
pub mod quiz;
pub mod runtime;

pub use quiz::{reduce, Question, QuizError, QuizEvent, QuizState, Status};
