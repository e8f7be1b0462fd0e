//! In-memory stand-ins for the backend and the image host.

use crate::{
    gateway::{self, Gateway, GatewayError},
    preload::{self, Fetch, FetchError},
};
use core::{future, time::Duration};
use hyper::{body::Bytes, StatusCode, Uri};
use model::{NewScore, Question, QuestionKind, ScoreEntry};
use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub fn question(text: &str, correct: &str, others: [&str; 3]) -> Question {
    let [option_b, option_c, option_d] = others.map(String::from);
    Question {
        id: 1,
        kind: QuestionKind::Text,
        text: text.into(),
        image_url: None,
        correct_answer: correct.into(),
        option_b,
        option_c,
        option_d,
    }
}

pub fn capital_of_france() -> Question {
    question("What is the capital of France?", "Paris", ["London", "Berlin", "Madrid"])
}

#[derive(Default)]
pub struct FakeGateway {
    /// `None` makes every question fetch fail.
    questions: Option<Vec<Question>>,
    scores: Mutex<Vec<ScoreEntry>>,
    inserted: Mutex<Vec<NewScore>>,
    insert_calls: AtomicUsize,
    fail_scores: bool,
    fail_inserts: bool,
    /// Inserts never answer.
    stall_inserts: bool,
    /// How long the leaderboard takes to come back.
    scores_delay: Duration,
}

impl FakeGateway {
    pub fn with_questions(questions: Vec<Question>) -> Arc<Self> {
        Arc::new(Self { questions: Some(questions), ..Default::default() })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self { fail_scores: true, fail_inserts: true, ..Default::default() })
    }

    pub fn rejecting_inserts(questions: Vec<Question>) -> Arc<Self> {
        Arc::new(Self { questions: Some(questions), fail_inserts: true, ..Default::default() })
    }

    pub fn stalling_inserts(questions: Vec<Question>) -> Arc<Self> {
        Arc::new(Self { questions: Some(questions), stall_inserts: true, ..Default::default() })
    }

    pub fn slow_scores(questions: Vec<Question>, delay: Duration) -> Arc<Self> {
        Arc::new(Self { questions: Some(questions), scores_delay: delay, ..Default::default() })
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn inserted(&self) -> Vec<NewScore> {
        self.inserted.lock().unwrap().clone()
    }
}

impl Gateway for Arc<FakeGateway> {
    async fn questions(&self) -> gateway::Result<Vec<Question>> {
        self.questions.clone().ok_or(GatewayError::Unavailable)
    }

    async fn top_scores(&self, limit: u8) -> gateway::Result<Vec<ScoreEntry>> {
        if !self.scores_delay.is_zero() {
            tokio::time::sleep(self.scores_delay).await;
        }
        if self.fail_scores {
            return Err(GatewayError::Unavailable);
        }
        let mut scores = self.scores.lock().unwrap().clone();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores.truncate(usize::from(limit));
        Ok(scores)
    }

    async fn insert_score(&self, score: &NewScore) -> gateway::Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_inserts {
            future::pending::<()>().await;
        }
        if self.fail_inserts {
            return Err(GatewayError::Rejected);
        }
        self.inserted.lock().unwrap().push(score.clone());
        self.scores.lock().unwrap().push(ScoreEntry {
            player_name: score.player_name.clone(),
            score: score.score,
            created_at: Some(1_700_000_000),
        });
        Ok(())
    }
}

/// Serves each known URL with its own text as the body.
#[derive(Default)]
pub struct FakeFetcher {
    images: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_images<const N: usize>(urls: [&str; N]) -> Self {
        Self { images: urls.into_iter().map(String::from).collect(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetch for FakeFetcher {
    async fn fetch(&self, uri: Uri) -> preload::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = uri.to_string();
        if self.images.contains(&url) {
            Ok(Bytes::from(url))
        } else {
            Err(FetchError::Status(StatusCode::NOT_FOUND))
        }
    }
}
