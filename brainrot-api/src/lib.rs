use chrono::Utc;

mod comment;
mod db;
mod error;
mod vote;

pub use comment::{
    Comment, CommentDraft, CommentId, CommentPage, CommentSort, CommentStatus, CommentView,
    NewComment, PageRequest, Pagination, AUTHOR_LEN, BODY_LEN, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use db::Store;
pub use error::Error;
pub use vote::{CastVote, VoteCounts, VoteReceipt, VoteType};

pub type Time = chrono::DateTime<Utc>;

/// Identifier of a game page comments attach to, eg. `steal-brainrot`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct GameId(pub String);

impl GameId {
    /// The homepage game, used as the default when a request names no game.
    pub fn homepage() -> GameId {
        GameId(String::from("steal-brainrot"))
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a voter in the vote ledger. There is no account system: this
/// is the client's network address as seen by the server, which makes it a
/// coarse, spoofable proxy for "one visitor" (shared NATs and proxies
/// collide). That weakness is an accepted trust boundary, not something to
/// silently strengthen.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct VoterId(pub String);

impl std::fmt::Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Postgres TEXT columns cannot hold a NUL byte, so reject it at the API
/// boundary before any storage call.
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(s.to_string()));
    }
    Ok(())
}
