use core::{
    fmt::{self, Display},
    future::Future,
    time::Duration,
};
use model::{NewScore, Question, ScoreEntry};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GatewayError {
    /// The backend refused the values we sent.
    Rejected,
    /// The backend answered with something we cannot decode.
    Schema,
    /// The backend could not be reached or failed internally.
    Unavailable,
    /// The backend did not answer in time.
    Timeout,
}

impl From<db::error::Error> for GatewayError {
    fn from(err: db::error::Error) -> Self {
        use db::error::Error;
        match err {
            Error::BadInput => Self::Rejected,
            Error::Schema => Self::Schema,
            Error::Fatal => Self::Unavailable,
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rejected => "The server rejected the request.",
            Self::Schema => "The server sent unexpected data.",
            Self::Unavailable => "The server is currently unavailable.",
            Self::Timeout => "The server took too long to respond.",
        })
    }
}

pub type Result<T> = core::result::Result<T, GatewayError>;

/// The backend holding the `questions` and `scores` tables.
pub trait Gateway: Send + Sync + 'static {
    /// Selects every question.
    fn questions(&self) -> impl Future<Output = Result<Vec<Question>>> + Send;

    /// Selects at most `limit` scores ordered from highest to lowest.
    fn top_scores(&self, limit: u8) -> impl Future<Output = Result<Vec<ScoreEntry>>> + Send;

    /// Inserts a finished game. Never retried.
    fn insert_score(&self, score: &NewScore) -> impl Future<Output = Result<()>> + Send;
}

impl Gateway for db::Database {
    async fn questions(&self) -> Result<Vec<Question>> {
        Ok(self.get_questions().await?)
    }

    async fn top_scores(&self, limit: u8) -> Result<Vec<ScoreEntry>> {
        Ok(self.get_top_scores(limit).await?)
    }

    async fn insert_score(&self, score: &NewScore) -> Result<()> {
        Ok(self.create_score(score).await?)
    }
}

/// Gives up on a gateway call after `limit` has elapsed.
pub async fn bounded<T, F>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, future).await.map_err(|_| GatewayError::Timeout)?
}
