//! An in-memory stand-in for the page. The browser polls a serialized
//! [`View`] and mirrors it into the elements with the same IDs.

use model::NewScore;
use quiz::{Prompt, Verdict, QUESTION_TIME};
use serde::Serialize;
use std::collections::BTreeMap;

/// Stable IDs of the elements the game writes to (or reads from).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementId {
    Username,
    PlayerName,
    Score,
    Timer,
    QuestionImage,
    QuestionText,
    Answers,
    TopScores,
    FinalScore,
    ResultsText,
    LeaderboardScores,
}

/// The full-screen views. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Screen {
    #[default]
    #[serde(rename = "login-screen")]
    Login,
    #[serde(rename = "game-screen")]
    Game,
    #[serde(rename = "results-screen")]
    Results,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Correct,
    Wrong,
}

/// One of the four answer buttons.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BoardRow {
    pub rank: usize,
    pub player_name: String,
    pub score: u32,
    /// Unix seconds. Only the final leaderboard shows when a score was set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "state", content = "rows", rename_all = "lowercase")]
pub enum Board {
    Loading,
    /// Nobody has played yet.
    Empty,
    /// The scores could not be fetched.
    Error,
    Scores(Vec<BoardRow>),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Content {
    Text(String),
    /// A text field the player types into.
    Input(String),
    /// Image source. `None` hides the element.
    Image(Option<String>),
    Buttons(Vec<Button>),
    Board(Board),
}

#[derive(Clone, Debug, Serialize)]
pub struct View {
    screen: Screen,
    elements: BTreeMap<ElementId, Content>,
    /// Messages to pop up, oldest first.
    alerts: Vec<String>,
}

impl Default for View {
    fn default() -> Self {
        let elements = BTreeMap::from([
            (ElementId::Username, Content::Input(String::new())),
            (ElementId::PlayerName, Content::Text(String::new())),
            (ElementId::Score, Content::Text(String::from("0"))),
            (ElementId::Timer, Content::Text(QUESTION_TIME.to_string())),
            (ElementId::QuestionImage, Content::Image(None)),
            (ElementId::QuestionText, Content::Text(String::new())),
            (ElementId::Answers, Content::Buttons(Vec::new())),
            (ElementId::TopScores, Content::Board(Board::Loading)),
            (ElementId::FinalScore, Content::Text(String::new())),
            (ElementId::ResultsText, Content::Text(String::new())),
            (ElementId::LeaderboardScores, Content::Board(Board::Loading)),
        ]);
        Self { screen: Screen::Login, elements, alerts: Vec::new() }
    }
}

impl View {
    /// Activates `screen` and deactivates the rest. Any screen may follow any other.
    pub fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub const fn screen(&self) -> Screen {
        self.screen
    }

    pub fn get(&self, id: ElementId) -> Option<&Content> {
        self.elements.get(&id)
    }

    pub fn set(&mut self, id: ElementId, content: Content) {
        self.elements.insert(id, content);
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.set(id, Content::Text(text.into()));
    }

    /// The text of a text or input element.
    pub fn text(&self, id: ElementId) -> Option<&str> {
        match self.get(id)? {
            Content::Text(text) | Content::Input(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_input(&mut self, id: ElementId, value: impl Into<String>) {
        self.set(id, Content::Input(value.into()));
    }

    /// What the player has typed so far. Empty if the element is not an input.
    pub fn input(&self, id: ElementId) -> &str {
        match self.get(id) {
            Some(Content::Input(value)) => value,
            _ => "",
        }
    }

    pub fn buttons(&self) -> &[Button] {
        match self.get(ElementId::Answers) {
            Some(Content::Buttons(buttons)) => buttons,
            _ => &[],
        }
    }

    pub fn board(&self, id: ElementId) -> Option<&Board> {
        match self.get(id)? {
            Content::Board(board) => Some(board),
            _ => None,
        }
    }

    pub fn set_board(&mut self, id: ElementId, board: Board) {
        self.set(id, Content::Board(board));
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Copies the view for the browser. Alerts are only delivered once.
    pub fn snapshot(&mut self) -> Self {
        let alerts = core::mem::take(&mut self.alerts);
        Self { screen: self.screen, elements: self.elements.clone(), alerts }
    }

    /// Fresh game screen for `player`.
    pub fn render_start(&mut self, player: &str) {
        self.set_text(ElementId::PlayerName, player);
        self.render_score(0);
        self.render_timer(QUESTION_TIME);
        self.show_screen(Screen::Game);
    }

    pub fn render_score(&mut self, score: u32) {
        self.set_text(ElementId::Score, score.to_string());
    }

    pub fn render_timer(&mut self, seconds: u32) {
        self.set_text(ElementId::Timer, seconds.to_string());
    }

    /// Shows the question. `image` is the source to load, if the question has one.
    pub fn render_prompt(&mut self, prompt: &Prompt, image: Option<String>) {
        self.set(ElementId::QuestionImage, Content::Image(image));
        self.set_text(ElementId::QuestionText, prompt.text.as_str());
        self.render_timer(prompt.time_left);
        let buttons = prompt
            .answers
            .iter()
            .map(|label| Button { label: label.clone(), disabled: false, mark: None })
            .collect();
        self.set(ElementId::Answers, Content::Buttons(buttons));
    }

    /// Disables every button, then marks the correct one and the wrong pick, if any.
    pub fn render_verdict(&mut self, verdict: &Verdict) {
        if let Some(Content::Buttons(buttons)) = self.elements.get_mut(&ElementId::Answers) {
            for (i, button) in buttons.iter_mut().enumerate() {
                button.disabled = true;
                button.mark = if i == verdict.correct {
                    Some(Mark::Correct)
                } else if Some(i) == verdict.selected {
                    Some(Mark::Wrong)
                } else {
                    None
                };
            }
        }
        self.render_score(verdict.score);
    }

    pub fn render_results(&mut self, score: &NewScore, correct: usize, total: usize) {
        self.set_text(ElementId::FinalScore, score.score.to_string());
        self.set_text(
            ElementId::ResultsText,
            format!("Well played, {}! You answered {correct} of {total} questions correctly.", score.player_name),
        );
        self.set_board(ElementId::LeaderboardScores, Board::Loading);
        self.show_screen(Screen::Results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt {
            index: 0,
            total: 1,
            text: String::from("Capital of France?"),
            image: None,
            answers: [
                String::from("Berlin"),
                String::from("Paris"),
                String::from("Madrid"),
                String::from("London"),
            ],
            time_left: 90,
        }
    }

    #[test]
    fn serializes_with_page_ids() {
        let mut view = View::default();
        view.show_screen(Screen::Game);
        view.render_prompt(&prompt(), None);
        view.alert("Hello!");

        let json = serde_json::to_value(view.snapshot()).unwrap();
        assert_eq!(json["screen"], "game-screen");
        assert_eq!(json["elements"]["question-text"]["kind"], "text");
        assert_eq!(json["elements"]["question-text"]["value"], "Capital of France?");
        assert_eq!(json["elements"]["question-image"]["value"], serde_json::Value::Null);
        assert_eq!(json["elements"]["answers"]["value"][1]["label"], "Paris");
        assert_eq!(json["elements"]["top-scores"]["value"]["state"], "loading");
        assert_eq!(json["alerts"][0], "Hello!");
    }

    #[test]
    fn alerts_are_delivered_once() {
        let mut view = View::default();
        view.alert("Please enter your name!");
        assert_eq!(view.snapshot().alerts(), ["Please enter your name!"]);
        assert!(view.snapshot().alerts().is_empty());
    }

    #[test]
    fn wrong_pick_marks_both_buttons() {
        let mut view = View::default();
        view.render_prompt(&prompt(), None);
        view.render_verdict(&Verdict { correct: 1, selected: Some(0), awarded: 0, score: 0 });

        let marks: Vec<_> = view.buttons().iter().map(|button| button.mark).collect();
        assert_eq!(marks, [Some(Mark::Wrong), Some(Mark::Correct), None, None]);
        assert!(view.buttons().iter().all(|button| button.disabled));
    }

    #[test]
    fn right_pick_marks_only_the_answer() {
        let mut view = View::default();
        view.render_prompt(&prompt(), Some(String::from("/image/0")));
        view.render_verdict(&Verdict { correct: 1, selected: Some(1), awarded: 95, score: 95 });

        let marks: Vec<_> = view.buttons().iter().map(|button| button.mark).collect();
        assert_eq!(marks, [None, Some(Mark::Correct), None, None]);
        assert_eq!(view.text(ElementId::Score), Some("95"));
        assert_eq!(view.get(ElementId::QuestionImage), Some(&Content::Image(Some(String::from("/image/0")))));
    }

    #[test]
    fn timeout_marks_only_the_answer() {
        let mut view = View::default();
        view.render_prompt(&prompt(), None);
        view.render_verdict(&Verdict { correct: 2, selected: None, awarded: 0, score: 0 });

        let marks: Vec<_> = view.buttons().iter().map(|button| button.mark).collect();
        assert_eq!(marks, [None, None, Some(Mark::Correct), None]);
    }

    #[test]
    fn username_is_read_from_its_input() {
        let mut view = View::default();
        assert_eq!(view.input(ElementId::Username), "");
        view.set_input(ElementId::Username, "Ann");
        assert_eq!(view.input(ElementId::Username), "Ann");
        assert_eq!(view.input(ElementId::Score), "");
    }
}
