use alloc::string::String;
use serde::{Deserialize, Serialize};

/// How the question is presented to the player.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Only the question text is shown.
    Text,
    /// An image accompanies (or replaces) the question text.
    Image,
}

impl QuestionKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "text" => Self::Text,
            "image" => Self::Image,
            _ => return None,
        })
    }
}

/// A row of the `questions` table. Never mutated once loaded.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "question_type")]
    pub kind: QuestionKind,
    /// Question to be displayed above the choices. May be empty for image questions.
    #[serde(rename = "question_text")]
    pub text: String,
    /// Location of the accompanying image, if any.
    pub image_url: Option<String>,
    /// The one correct choice.
    pub correct_answer: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl Question {
    /// The image to render, which only image questions have.
    pub fn image(&self) -> Option<&str> {
        match self.kind {
            QuestionKind::Image => self.image_url.as_deref().filter(|url| !url.is_empty()),
            QuestionKind::Text => None,
        }
    }

    /// All four choices with the correct answer first.
    pub fn choices(&self) -> [&str; 4] {
        [&self.correct_answer, &self.option_b, &self.option_c, &self.option_d]
    }
}
