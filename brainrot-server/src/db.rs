use anyhow::Context;
use async_trait::async_trait;
use brainrot_api::{
    Comment, CommentDraft, CommentId, CommentSort, CommentStatus, GameId, Store, VoteCounts,
    VoteType, VoterId,
};
use futures::TryStreamExt;
use sqlx::Row;

/// The real storage backend: comments and the vote ledger live in Postgres,
/// one connection per request, no in-process caching.
pub struct PostgresStore<'a> {
    pub conn: &'a mut sqlx::PgConnection,
}

fn comment_from_row(row: &sqlx::postgres::PgRow) -> anyhow::Result<Comment> {
    Ok(Comment {
        id: CommentId(row.try_get("id").context("retrieving the id field")?),
        game_id: GameId(
            row.try_get("game_id")
                .context("retrieving the game_id field")?,
        ),
        parent_id: row
            .try_get::<Option<i64>, _>("parent_id")
            .context("retrieving the parent_id field")?
            .map(CommentId),
        author: row
            .try_get("author")
            .context("retrieving the author field")?,
        email: row.try_get("email").context("retrieving the email field")?,
        body: row.try_get("body").context("retrieving the body field")?,
        status: row
            .try_get::<String, _>("status")
            .context("retrieving the status field")?
            .parse()?,
        like_count: row
            .try_get("like_count")
            .context("retrieving the like_count field")?,
        dislike_count: row
            .try_get("dislike_count")
            .context("retrieving the dislike_count field")?,
        ip_address: row
            .try_get("ip_address")
            .context("retrieving the ip_address field")?,
        created_at: row
            .try_get("created_at")
            .context("retrieving the created_at field")?,
    })
}

/// Every variant includes the id so that pages stay stable when timestamps
/// or counts tie.
fn order_clause(sort: CommentSort) -> &'static str {
    match sort {
        CommentSort::Newest => "created_at DESC, id DESC",
        CommentSort::Oldest => "created_at ASC, id ASC",
        CommentSort::Popular => "like_count DESC, created_at DESC, id DESC",
    }
}

#[async_trait]
impl Store for PostgresStore<'_> {
    async fn insert_comment(&mut self, draft: CommentDraft) -> anyhow::Result<Comment> {
        let row = sqlx::query(
            "
                INSERT INTO comments
                    (game_id, parent_id, author, email, body, status, ip_address)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
            ",
        )
        .bind(&draft.game_id.0)
        .bind(draft.parent_id.map(|p| p.0))
        .bind(&draft.author)
        .bind(&draft.email)
        .bind(&draft.body)
        .bind(draft.status.as_str())
        .bind(&draft.ip_address)
        .fetch_one(&mut *self.conn)
        .await
        .context("inserting into comments table")?;
        comment_from_row(&row)
    }

    async fn comment_by_id(&mut self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query("SELECT * FROM comments WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&mut *self.conn)
            .await
            .context("querying comments table")?;
        row.as_ref().map(comment_from_row).transpose()
    }

    async fn list_top_level(
        &mut self,
        game: &GameId,
        status: CommentStatus,
        sort: CommentSort,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<(Vec<Comment>, i64)> {
        let total: i64 = sqlx::query(
            "
                SELECT COUNT(*) AS total FROM comments
                WHERE game_id = $1 AND status = $2 AND parent_id IS NULL
            ",
        )
        .bind(&game.0)
        .bind(status.as_str())
        .fetch_one(&mut *self.conn)
        .await
        .context("counting top-level comments")?
        .try_get("total")
        .context("retrieving the total field")?;

        let sql = format!(
            "
                SELECT * FROM comments
                WHERE game_id = $1 AND status = $2 AND parent_id IS NULL
                ORDER BY {}
                LIMIT $3 OFFSET $4
            ",
            order_clause(sort)
        );
        let comments = sqlx::query(&sql)
            .bind(&game.0)
            .bind(status.as_str())
            .bind(limit)
            .bind(offset)
            .fetch(&mut *self.conn)
            .map_err(anyhow::Error::from)
            .and_then(|row| futures::future::ready(comment_from_row(&row)))
            .try_collect()
            .await
            .context("querying top-level comments")?;

        Ok((comments, total))
    }

    async fn replies_for(
        &mut self,
        parents: &[CommentId],
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = parents.iter().map(|p| p.0).collect();
        let rows = sqlx::query(
            "
                SELECT * FROM comments
                WHERE parent_id = ANY($1) AND status = $2
                ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(&ids)
        .bind(status.as_str())
        .fetch_all(&mut *self.conn)
        .await
        .context("querying replies")?;
        rows.iter().map(comment_from_row).collect()
    }

    async fn update_counts(&mut self, id: CommentId, counts: VoteCounts) -> anyhow::Result<()> {
        let res = sqlx::query("UPDATE comments SET like_count = $2, dislike_count = $3 WHERE id = $1")
            .bind(id.0)
            .bind(counts.like)
            .bind(counts.dislike)
            .execute(&mut *self.conn)
            .await
            .with_context(|| format!("updating counts of comment {id}"))?;
        anyhow::ensure!(
            res.rows_affected() == 1,
            "updating counts of comment {} affected {} rows",
            id,
            res.rows_affected()
        );
        Ok(())
    }

    async fn find_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
    ) -> anyhow::Result<Option<VoteType>> {
        let row =
            sqlx::query("SELECT vote_type FROM comment_votes WHERE comment_id = $1 AND voter_ip = $2")
                .bind(comment.0)
                .bind(&voter.0)
                .fetch_optional(&mut *self.conn)
                .await
                .context("querying vote ledger")?;
        match row {
            None => Ok(None),
            Some(row) => Ok(Some(
                row.try_get::<String, _>("vote_type")
                    .context("retrieving the vote_type field")?
                    .parse()?,
            )),
        }
    }

    async fn upsert_vote(
        &mut self,
        comment: CommentId,
        voter: &VoterId,
        vote: VoteType,
    ) -> anyhow::Result<()> {
        // The primary key on (comment_id, voter_ip) keeps the one-vote-per-
        // voter invariant even when two requests race the read-then-write.
        sqlx::query(
            "
                INSERT INTO comment_votes (comment_id, voter_ip, vote_type)
                VALUES ($1, $2, $3)
                ON CONFLICT (comment_id, voter_ip) DO UPDATE SET vote_type = EXCLUDED.vote_type
            ",
        )
        .bind(comment.0)
        .bind(&voter.0)
        .bind(vote.as_str())
        .execute(&mut *self.conn)
        .await
        .with_context(|| format!("recording vote on comment {comment}"))?;
        Ok(())
    }

    async fn delete_vote(&mut self, comment: CommentId, voter: &VoterId) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM comment_votes WHERE comment_id = $1 AND voter_ip = $2")
            .bind(comment.0)
            .bind(&voter.0)
            .execute(&mut *self.conn)
            .await
            .with_context(|| format!("deleting vote on comment {comment}"))?;
        Ok(())
    }

    async fn count_votes(&mut self, comment: CommentId) -> anyhow::Result<VoteCounts> {
        let row = sqlx::query(
            "
                SELECT
                    COUNT(*) FILTER (WHERE vote_type = 'like') AS likes,
                    COUNT(*) FILTER (WHERE vote_type = 'dislike') AS dislikes
                FROM comment_votes
                WHERE comment_id = $1
            ",
        )
        .bind(comment.0)
        .fetch_one(&mut *self.conn)
        .await
        .context("counting votes")?;
        Ok(VoteCounts {
            like: row.try_get("likes").context("retrieving the likes field")?,
            dislike: row
                .try_get("dislikes")
                .context("retrieving the dislikes field")?,
        })
    }
}
