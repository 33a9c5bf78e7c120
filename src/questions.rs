use include_dir::{include_dir, Dir};
use log::info;
use rand::{seq::SliceRandom, Rng};
use serde_json::from_str;
use std::{error::Error, fs, path::Path};

use crate::quiz::{Question, QuizError, MAX_POINTS_PER_QUESTION};

static QUESTION_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/questions");

/// The question set shipped with the binary.
pub fn builtin() -> Result<Vec<Question>, Box<dyn Error>> {
    read_embedded("general.json")
}

fn read_embedded(file_name: &str) -> Result<Vec<Question>, Box<dyn Error>> {
    let file = QUESTION_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("question set {file_name} not found"))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| format!("question set {file_name} is not utf-8"))?;

    parse(contents)
}

/// Loads a question set from a local JSON file.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Question>, Box<dyn Error>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let questions = parse(&contents)?;
    info!("loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

pub fn parse(json: &str) -> Result<Vec<Question>, Box<dyn Error>> {
    let questions: Vec<Question> = from_str(json)?;
    validate(&questions)?;
    Ok(questions)
}

/// Rejects sets the state machine cannot play: empty sets, questions with
/// fewer than two options, a correct option missing from its options, or
/// a point value outside `1..=MAX_POINTS_PER_QUESTION`.
pub fn validate(questions: &[Question]) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(QuizError::EmptyQuestionSet);
    }

    for (index, q) in questions.iter().enumerate() {
        let reason = if q.options.len() < 2 {
            "needs at least two options"
        } else if q.correct_index().is_none() {
            "correct option is not one of the options"
        } else if q.points == 0 {
            "point value must be positive"
        } else if q.points > MAX_POINTS_PER_QUESTION {
            "point value is too large"
        } else {
            continue;
        };

        return Err(QuizError::InvalidQuestion {
            index,
            reason: reason.to_string(),
        });
    }

    Ok(())
}

pub fn shuffle<R: Rng + ?Sized>(questions: &mut [Question], rng: &mut R) {
    questions.shuffle(rng);
}
