#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;

use alloc::vec::Vec;
use model::{NewScore, Question, QuestionKind, ScoreEntry};
use tokio_postgres::{error::SqlState, Row};

pub use tokio_postgres::{tls::NoTls, Client, Config};

pub struct Database(Client);

impl From<Client> for Database {
    fn from(client: Client) -> Self {
        Self(client)
    }
}

fn malformed(err: tokio_postgres::Error) -> error::Error {
    log::error!("malformed row: {err}");
    error::Error::Schema
}

fn deserialize_question_from_row(row: Row) -> error::Result<Question> {
    let tag: &str = row.try_get("question_type").map_err(malformed)?;
    let kind = QuestionKind::from_tag(tag).ok_or(error::Error::Schema)?;
    let id = row.try_get("id").map_err(malformed)?;
    let text: Option<_> = row.try_get("question_text").map_err(malformed)?;
    let image_url = row.try_get("image_url").map_err(malformed)?;
    let correct_answer = row.try_get("correct_answer").map_err(malformed)?;
    let option_b = row.try_get("option_b").map_err(malformed)?;
    let option_c = row.try_get("option_c").map_err(malformed)?;
    let option_d = row.try_get("option_d").map_err(malformed)?;
    Ok(Question {
        id,
        kind,
        text: text.unwrap_or_default(),
        image_url,
        correct_answer,
        option_b,
        option_c,
        option_d,
    })
}

fn deserialize_score_from_row(row: Row) -> error::Result<ScoreEntry> {
    let player_name = row.try_get("player_name").map_err(malformed)?;
    let score: i32 = row.try_get("score").map_err(malformed)?;
    let score = u32::try_from(score).map_err(|_| error::Error::Schema)?;
    let created_at = row.try_get("created_at").map_err(malformed)?;
    Ok(ScoreEntry { player_name, score, created_at })
}

impl Database {
    /// Every question, in insertion order.
    pub async fn get_questions(&self) -> error::Result<Vec<Question>> {
        self.0
            .query(
                "SELECT id, question_type, question_text, image_url, correct_answer, option_b, option_c, option_d \
                 FROM questions ORDER BY id",
                &[],
            )
            .await
            .map_err(|err| {
                log::error!("failed to select questions: {err}");
                error::Error::Fatal
            })?
            .into_iter()
            .map(deserialize_question_from_row)
            .collect()
    }

    /// The highest scores first. Ties go to whoever got there first.
    pub async fn get_top_scores(&self, limit: u8) -> error::Result<Vec<ScoreEntry>> {
        let limit = i64::from(limit);
        self.0
            .query(
                "SELECT player_name, score, EXTRACT(EPOCH FROM created_at)::BIGINT AS created_at \
                 FROM scores ORDER BY score DESC, created_at ASC LIMIT $1",
                &[&limit],
            )
            .await
            .map_err(|err| {
                log::error!("failed to select scores: {err}");
                error::Error::Fatal
            })?
            .into_iter()
            .map(deserialize_score_from_row)
            .collect()
    }

    pub async fn create_score(&self, score: &NewScore) -> error::Result<()> {
        let points = i32::try_from(score.score).map_err(|_| error::Error::BadInput)?;
        let err = match self
            .0
            .execute("INSERT INTO scores (player_name, score) VALUES ($1, $2)", &[&score.player_name, &points])
            .await
        {
            Ok(1) => return Ok(()),
            Err(err) => err,
            _ => return Err(error::Error::Fatal),
        };

        log::error!("failed to insert score: {err}");
        let err = err.as_db_error().ok_or(error::Error::Fatal)?;
        Err(match err.code() {
            // Empty names or negative scores.
            &SqlState::CHECK_VIOLATION => error::Error::BadInput,
            // The name is too long for the `VARCHAR`.
            &SqlState::STRING_DATA_RIGHT_TRUNCATION => error::Error::BadInput,
            _ => error::Error::Fatal,
        })
    }
}
