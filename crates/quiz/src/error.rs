use core::fmt::{self, Display};

/// Reasons a game cannot start. The state of the game is left untouched.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationError {
    EmptyPlayerName,
    NoQuestions,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyPlayerName => "Please enter your name!",
            Self::NoQuestions => "No questions available. Please try again later.",
        })
    }
}

pub type Result<T> = core::result::Result<T, ValidationError>;
