use async_trait::async_trait;

use crate::{
    Comment, CommentDraft, CommentId, CommentSort, CommentStatus, GameId, VoteCounts, VoteType,
    VoterId,
};

/// Storage contract shared by the Postgres backend and the in-memory mock.
/// The comment store and the vote ledger are both behind it; no transaction
/// is assumed to span any two calls.
#[async_trait]
pub trait Store {
    /// Persists a draft, assigning id, timestamp and zeroed counters, and
    /// returns the full record so callers can render it without a re-fetch.
    async fn insert_comment(&mut self, draft: CommentDraft) -> anyhow::Result<Comment>;

    async fn comment_by_id(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>>;

    /// Top-level comments of one game in the requested order, plus the total
    /// count of matching rows (for pagination).
    async fn list_top_level(
        &mut self,
        game: &GameId,
        status: CommentStatus,
        sort: CommentSort,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Comment>, i64)>;

    /// All replies whose parent is in `parents`, oldest first.
    async fn replies_for(
        &mut self,
        parents: &[CommentId],
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>>;

    async fn update_counts(&mut self, id: CommentId, counts: VoteCounts) -> anyhow::Result<()>;

    async fn find_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
    ) -> anyhow::Result<Option<VoteType>>;

    async fn upsert_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
        vote: VoteType,
    ) -> anyhow::Result<()>;

    async fn delete_vote(&mut self, comment: CommentId, voter: &VoterId) -> anyhow::Result<()>;

    /// Full recount of the ledger for one comment.
    async fn count_votes(&mut self, comment: CommentId) -> anyhow::Result<VoteCounts>;
}
