#![cfg_attr(not(test), no_std)]

//! The quiz state machine. Time only enters through [`Session::tick`], so the
//! caller decides what a "second" is.

extern crate alloc;

pub mod error;

use alloc::{boxed::Box, string::String, sync::Arc};
use model::{NewScore, Question};
use rand::{seq::SliceRandom, Rng};

pub use error::ValidationError;

/// Seconds on the clock at the start of every question.
pub const QUESTION_TIME: u32 = 90;
/// Points for any correct answer before the speed bonus.
pub const BASE_POINTS: u32 = 10;
/// Number of buttons rendered per question.
pub const CHOICE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Created or restarted, but no question has been shown yet.
    Idle,
    /// A question is on screen and its countdown is running.
    AwaitingAnswer,
    /// The answer has been judged and is on display.
    Scoring,
    /// Every question has been answered. The score is ready to be saved.
    Finished,
}

/// Everything needed to render the current question.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prompt {
    /// Position of this question in the run.
    pub index: usize,
    pub total: usize,
    pub text: String,
    pub image: Option<String>,
    /// Choices in display order.
    pub answers: [String; CHOICE_COUNT],
    pub time_left: u32,
}

/// The judgement of a single question.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Verdict {
    /// Button holding the correct answer.
    pub correct: usize,
    /// Button the player picked. `None` means the clock ran out.
    pub selected: Option<usize>,
    /// Points added by this answer.
    pub awarded: u32,
    /// Running total after this answer.
    pub score: u32,
}

impl Verdict {
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.correct)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tick {
    /// Seconds remaining after this tick.
    Running(u32),
    /// The clock hit zero and the question was judged unanswered.
    Expired(Verdict),
    /// No countdown is running.
    Ignored,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Step {
    Ask(Prompt),
    Finished(NewScore),
}

/// Returns the display order of the four choices, where `0` is the correct answer.
/// This is a Fisher-Yates shuffle, so every permutation is equally likely.
pub fn shuffled_order<R>(rng: &mut R) -> [usize; CHOICE_COUNT]
where
    R: Rng + ?Sized,
{
    let mut order = [0, 1, 2, 3];
    order.shuffle(rng);
    order
}

/// One player's attempt at the question list.
pub struct Session {
    player: Box<str>,
    questions: Arc<[Question]>,
    index: usize,
    score: u32,
    /// Questions answered correctly so far.
    correct: usize,
    time_left: u32,
    /// Maps each button to an index of [`Question::choices`].
    order: [usize; CHOICE_COUNT],
    phase: Phase,
}

impl Session {
    /// Validates the player and question list. The session starts out [`Phase::Idle`].
    pub fn new(player: &str, questions: Arc<[Question]>) -> error::Result<Self> {
        let player = player.trim();
        if player.is_empty() {
            return Err(ValidationError::EmptyPlayerName);
        }

        if questions.is_empty() {
            return Err(ValidationError::NoQuestions);
        }

        Ok(Self {
            player: player.into(),
            questions,
            index: 0,
            score: 0,
            correct: 0,
            time_left: QUESTION_TIME,
            order: [0, 1, 2, 3],
            phase: Phase::Idle,
        })
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn correct(&self) -> usize {
        self.correct
    }

    pub const fn time_left(&self) -> u32 {
        self.time_left
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Button currently holding the correct answer.
    pub fn correct_button(&self) -> usize {
        // The order is always a permutation of `0..4`.
        self.order.iter().position(|&choice| choice == 0).unwrap_or_default()
    }

    /// Same player, same questions, fresh score.
    pub fn restart(&mut self) {
        self.index = 0;
        self.score = 0;
        self.correct = 0;
        self.time_left = QUESTION_TIME;
        self.phase = Phase::Idle;
    }

    /// Shows the first question. Only valid while [`Phase::Idle`].
    pub fn load_question<R>(&mut self, rng: &mut R) -> Option<Step>
    where
        R: Rng + ?Sized,
    {
        if self.phase != Phase::Idle {
            return None;
        }
        Some(self.enter(rng))
    }

    /// Moves past a judged question. Only valid while [`Phase::Scoring`].
    pub fn advance<R>(&mut self, rng: &mut R) -> Option<Step>
    where
        R: Rng + ?Sized,
    {
        if self.phase != Phase::Scoring {
            return None;
        }
        self.index += 1;
        Some(self.enter(rng))
    }

    fn enter<R>(&mut self, rng: &mut R) -> Step
    where
        R: Rng + ?Sized,
    {
        let Some(question) = self.questions.get(self.index) else {
            self.phase = Phase::Finished;
            return Step::Finished(NewScore { player_name: String::from(&*self.player), score: self.score });
        };

        self.order = shuffled_order(rng);
        self.time_left = QUESTION_TIME;
        self.phase = Phase::AwaitingAnswer;

        let choices = question.choices();
        Step::Ask(Prompt {
            index: self.index,
            total: self.questions.len(),
            text: question.text.clone(),
            image: question.image().map(String::from),
            answers: self.order.map(|choice| String::from(choices[choice])),
            time_left: self.time_left,
        })
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.phase != Phase::AwaitingAnswer {
            return Tick::Ignored;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return Tick::Running(self.time_left);
        }

        match self.check_answer(None) {
            Some(verdict) => Tick::Expired(verdict),
            None => Tick::Ignored,
        }
    }

    /// Judges the button press for the given question. Presses meant for any
    /// other question are stale and ignored.
    pub fn answer(&mut self, question: usize, button: usize) -> Option<Verdict> {
        if question != self.index {
            return None;
        }
        self.check_answer(Some(button))
    }

    /// Judges the current question. `None` means no answer was given in time.
    /// Returns `None` if no question is awaiting an answer or the button does not exist.
    pub fn check_answer(&mut self, selected: Option<usize>) -> Option<Verdict> {
        if self.phase != Phase::AwaitingAnswer {
            return None;
        }

        if selected.is_some_and(|button| button >= CHOICE_COUNT) {
            return None;
        }

        let correct = self.correct_button();
        let awarded = if selected == Some(correct) {
            self.correct += 1;
            BASE_POINTS + self.time_left
        } else {
            0
        };
        self.score += awarded;
        self.phase = Phase::Scoring;

        Some(Verdict { correct, selected, awarded, score: self.score })
    }
}
