use std::collections::BTreeMap;

use async_trait::async_trait;
use brainrot_api::{
    Comment, CommentDraft, CommentId, CommentSort, CommentStatus, GameId, Store, Time, VoteCounts,
    VoteType, VoterId,
};
use chrono::TimeZone;

/// In-memory implementation of the storage contract, for driving the
/// services in tests without a live Postgres. Timestamps are deterministic:
/// each inserted comment is one minute after the previous one.
pub struct MemoryStore {
    comments: BTreeMap<i64, Comment>,
    votes: BTreeMap<(i64, VoterId), VoteType>,
    next_id: i64,
}

fn timestamp_for(id: i64) -> Time {
    chrono::Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(id)
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            comments: BTreeMap::new(),
            votes: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn test_num_comments(&self) -> usize {
        self.comments.len()
    }

    pub fn test_num_votes(&self) -> usize {
        self.votes.len()
    }

    /// Direct access to a stored record, including the fields the public
    /// projection hides (email, status, address).
    pub fn test_comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.get(&id.0)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_comment(&mut self, draft: CommentDraft) -> anyhow::Result<Comment> {
        let id = self.next_id;
        self.next_id += 1;
        let comment = Comment {
            id: CommentId(id),
            game_id: draft.game_id,
            parent_id: draft.parent_id,
            author: draft.author,
            email: draft.email,
            body: draft.body,
            status: draft.status,
            like_count: 0,
            dislike_count: 0,
            ip_address: draft.ip_address,
            created_at: timestamp_for(id),
        };
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn comment_by_id(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        Ok(self.comments.get(&id.0).cloned())
    }

    async fn list_top_level(
        &mut self,
        game: &GameId,
        status: CommentStatus,
        sort: CommentSort,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Comment>, i64)> {
        let mut all: Vec<&Comment> = self
            .comments
            .values()
            .filter(|c| c.game_id == *game && c.status == status && c.parent_id.is_none())
            .collect();
        match sort {
            CommentSort::Newest => {
                all.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)))
            }
            CommentSort::Oldest => {
                all.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)))
            }
            CommentSort::Popular => all.sort_by(|a, b| {
                (b.like_count, b.created_at, b.id).cmp(&(a.like_count, a.created_at, a.id))
            }),
        }
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn replies_for(
        &mut self,
        parents: &[CommentId],
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>> {
        let mut replies: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| {
                c.status == status
                    && c.parent_id
                        .map(|p| parents.contains(&p))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        replies.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(replies)
    }

    async fn update_counts(&mut self, id: CommentId, counts: VoteCounts) -> anyhow::Result<()> {
        let comment = self
            .comments
            .get_mut(&id.0)
            .ok_or_else(|| anyhow::anyhow!("updating counts of comment {id} that is not in db"))?;
        comment.like_count = counts.like;
        comment.dislike_count = counts.dislike;
        Ok(())
    }

    async fn find_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
    ) -> anyhow::Result<Option<VoteType>> {
        Ok(self.votes.get(&(comment.0, voter.clone())).copied())
    }

    async fn upsert_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
        vote: VoteType,
    ) -> anyhow::Result<()> {
        self.votes.insert((comment.0, voter.clone()), vote);
        Ok(())
    }

    async fn delete_vote(&mut self, comment: CommentId, voter: &VoterId) -> anyhow::Result<()> {
        self.votes.remove(&(comment.0, voter.clone()));
        Ok(())
    }

    async fn count_votes(&mut self, comment: CommentId) -> anyhow::Result<VoteCounts> {
        let mut counts = VoteCounts::default();
        for ((id, _), vote) in self.votes.iter() {
            if *id == comment.0 {
                match vote {
                    VoteType::Like => counts.like += 1,
                    VoteType::Dislike => counts.dislike += 1,
                }
            }
        }
        Ok(counts)
    }
}
