#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod quiz;
pub mod score;

pub use quiz::{Question, QuestionKind};
pub use score::{NewScore, ScoreEntry};
