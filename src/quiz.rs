use std::{error::Error, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

/// Fixed time allowance granted per question when a quiz starts.
pub const SECS_PER_QUESTION: u64 = 5;

/// Upper bound for the per-question allowance (one hour).
pub const MAX_SECS_PER_QUESTION: u64 = 3600;

/// Upper bound for a single question's point value.
pub const MAX_POINTS_PER_QUESTION: u32 = 1000;

/// One multiple-choice item. Option order is the answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub options: Vec<String>,
    pub correct_option: String,
    pub points: u32,
}

impl Question {
    /// Position of the correct option within `options`, if it is listed at all.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_option)
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        self.correct_index() == Some(choice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Ready,
    Active,
    Finished,
}

/// Everything that can drive a [`QuizState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    Start,
    AnswerSelected(usize),
    Advance,
    Finish,
    Tick,
    Restart,
}

impl FromStr for QuizEvent {
    type Err = QuizError;

    /// Parses the textual event names used by `--replay`, e.g. `start` or `answer:2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unknown = || QuizError::UnknownEvent(s.to_string());

        match s.split_once(':') {
            Some((name, payload)) => match name.trim() {
                "answer" | "newAnswer" => payload
                    .trim()
                    .parse::<usize>()
                    .map(QuizEvent::AnswerSelected)
                    .map_err(|_| unknown()),
                _ => Err(unknown()),
            },
            None => match s {
                "start" => Ok(QuizEvent::Start),
                "advance" | "next" | "nextQuestion" => Ok(QuizEvent::Advance),
                "finish" => Ok(QuizEvent::Finish),
                "tick" => Ok(QuizEvent::Tick),
                "restart" => Ok(QuizEvent::Restart),
                _ => Err(unknown()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    /// An event name outside the transition table. Always a caller defect.
    UnknownEvent(String),
    EmptyQuestionSet,
    InvalidQuestion { index: usize, reason: String },
    InvalidAllowance(u64),
    PointTotalOverflow,
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::UnknownEvent(name) => write!(f, "unknown event: {name:?}"),
            QuizError::EmptyQuestionSet => write!(f, "a quiz needs at least one question"),
            QuizError::InvalidQuestion { index, reason } => {
                write!(f, "question #{}: {reason}", index + 1)
            }
            QuizError::InvalidAllowance(secs) => write!(
                f,
                "seconds per question must be between 1 and {MAX_SECS_PER_QUESTION}, got {secs}"
            ),
            QuizError::PointTotalOverflow => write!(f, "total point value is too large"),
        }
    }
}

impl Error for QuizError {}

/// Progress, score and countdown of one quiz session.
///
/// Only [`QuizState::dispatch`] mutates it. `questions` and `high_score`
/// survive a restart, every other field is reset.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    questions: Vec<Question>,
    status: Status,
    current_index: usize,
    selected_answer: Option<usize>,
    points: u32,
    high_score: u32,
    seconds_remaining: u64,
    secs_per_question: u64,
}

impl QuizState {
    pub fn new(questions: Vec<Question>, secs_per_question: u64) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionSet);
        }
        if !(1..=MAX_SECS_PER_QUESTION).contains(&secs_per_question) {
            return Err(QuizError::InvalidAllowance(secs_per_question));
        }
        // `points` can never exceed the total, so a total that fits keeps scoring in range
        questions
            .iter()
            .try_fold(0u32, |total, q| total.checked_add(q.points))
            .ok_or(QuizError::PointTotalOverflow)?;
        Ok(Self::fresh_progress(questions, 0, secs_per_question))
    }

    /// A ready state over `questions` carrying an existing high score.
    pub fn fresh_progress(
        questions: Vec<Question>,
        high_score: u32,
        secs_per_question: u64,
    ) -> Self {
        let seconds_remaining = (questions.len() as u64).saturating_mul(secs_per_question);
        Self {
            questions,
            status: Status::Ready,
            current_index: 0,
            selected_answer: None,
            points: 0,
            high_score,
            seconds_remaining,
            secs_per_question,
        }
    }

    /// Applies `event`. Returns false when its precondition does not hold,
    /// in which case the state is left untouched.
    pub fn dispatch(&mut self, event: QuizEvent) -> bool {
        let before = self.status;

        let applied = match event {
            QuizEvent::Start if self.status == Status::Ready => {
                self.status = Status::Active;
                self.seconds_remaining = self.total_secs();
                true
            }
            QuizEvent::AnswerSelected(choice)
                if self.status == Status::Active
                    && self.selected_answer.is_none()
                    && choice < self.current_question().options.len() =>
            {
                let question = &self.questions[self.current_index];
                if question.is_correct(choice) {
                    self.points = self.points.saturating_add(question.points);
                }
                self.selected_answer = Some(choice);
                true
            }
            QuizEvent::Advance if self.status == Status::Active && !self.is_last_question() => {
                self.current_index += 1;
                self.selected_answer = None;
                true
            }
            QuizEvent::Finish if self.status == Status::Active => {
                self.finish();
                true
            }
            QuizEvent::Tick if self.status == Status::Active => {
                self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
                if self.seconds_remaining == 0 {
                    self.finish();
                }
                true
            }
            QuizEvent::Restart => {
                let questions = std::mem::take(&mut self.questions);
                *self = Self::fresh_progress(questions, self.high_score, self.secs_per_question);
                true
            }
            _ => false,
        };

        if applied {
            debug!("{event:?}: {before} -> {}", self.status);
        } else {
            debug!("ignored {event:?} while {before}");
        }

        applied
    }

    // every way into `finished` records the high score
    fn finish(&mut self) {
        self.status = Status::Finished;
        self.high_score = self.high_score.max(self.points);
    }

    fn total_secs(&self) -> u64 {
        (self.questions.len() as u64).saturating_mul(self.secs_per_question)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn selected_answer(&self) -> Option<usize> {
        self.selected_answer
    }

    pub fn has_answered(&self) -> bool {
        self.selected_answer.is_some()
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn seconds_remaining(&self) -> u64 {
        self.seconds_remaining
    }

    pub fn secs_per_question(&self) -> u64 {
        self.secs_per_question
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn num_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    pub fn max_possible_points(&self) -> u32 {
        self.questions
            .iter()
            .fold(0u32, |total, q| total.saturating_add(q.points))
    }

    /// Whether the selected answer for the current question was right.
    pub fn answer_was_correct(&self) -> Option<bool> {
        self.selected_answer
            .map(|choice| self.current_question().is_correct(choice))
    }

    pub fn percentage(&self) -> u32 {
        match self.max_possible_points() {
            0 => 0,
            max => (u64::from(self.points) * 100).div_ceil(u64::from(max)) as u32,
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            status: self.status,
            current_index: self.current_index,
            selected_answer: self.selected_answer,
            points: self.points,
            high_score: self.high_score,
            seconds_remaining: self.seconds_remaining,
            num_questions: self.num_questions(),
            max_possible_points: self.max_possible_points(),
            questions: &self.questions,
        }
    }
}

/// Owned functional form of [`QuizState::dispatch`].
pub fn reduce(mut state: QuizState, event: QuizEvent) -> QuizState {
    state.dispatch(event);
    state
}

/// Read-only view handed to renderers and printed by `--replay`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    pub status: Status,
    pub current_index: usize,
    pub selected_answer: Option<usize>,
    pub points: u32,
    pub high_score: u32,
    pub seconds_remaining: u64,
    pub num_questions: usize,
    pub max_possible_points: u32,
    pub questions: &'a [Question],
}
