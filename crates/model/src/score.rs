use alloc::string::String;
use serde::{Deserialize, Serialize};

/// A row of the `scores` table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub player_name: String,
    pub score: u32,
    /// Server-assigned insertion time in Unix seconds. Only present when the query asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Payload for recording a finished game.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct NewScore {
    pub player_name: String,
    pub score: u32,
}
