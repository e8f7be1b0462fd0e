use crate::{gateway, view::{Board, BoardRow}};
use model::ScoreEntry;

/// Rows on the login screen.
pub const TOP_SCORES: u8 = 5;
/// Rows on the results screen.
pub const FINAL_SCORES: u8 = 10;

/// Turns a fetch of the top scores into a board. Timestamps are only kept `with_time`.
pub fn board(result: gateway::Result<Vec<ScoreEntry>>, with_time: bool) -> Board {
    let entries = match result {
        Ok(entries) => entries,
        Err(err) => {
            log::error!("failed to load leaderboard: {err}");
            return Board::Error;
        }
    };

    if entries.is_empty() {
        return Board::Empty;
    }

    let rows = entries
        .into_iter()
        .zip(1..)
        .map(|(ScoreEntry { player_name, score, created_at }, rank)| BoardRow {
            rank,
            player_name,
            score,
            created_at: created_at.filter(|_| with_time),
        })
        .collect();
    Board::Scores(rows)
}
