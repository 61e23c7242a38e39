use anyhow::Context;
use brainrot_api::{
    CommentDraft, CommentId, CommentPage, CommentStatus, CommentView, Error as ApiError,
    NewComment, PageRequest, Pagination, Store, VoteCounts, VoteType, VoterId,
};

use crate::{games::GameDirectory, Error};

/// One page of approved top-level comments, each carrying its approved
/// replies oldest-first. Replies are fetched in a second pass scoped to
/// exactly this page's parents, so no reply of an off-page comment is ever
/// read.
pub async fn fetch_page<S: Store>(
    store: &mut S,
    games: &GameDirectory,
    req: &PageRequest,
) -> Result<CommentPage, Error> {
    games.check(&req.game_id)?;

    let (top, total) = store
        .list_top_level(
            &req.game_id,
            CommentStatus::Approved,
            req.sort,
            i64::from(req.limit),
            req.offset(),
        )
        .await
        .with_context(|| format!("listing comments for game {}", req.game_id))?;

    let parents: Vec<CommentId> = top.iter().map(|c| c.id).collect();
    let replies = store
        .replies_for(&parents, CommentStatus::Approved)
        .await
        .context("listing replies")?;

    let mut comments: Vec<CommentView> = top.iter().map(CommentView::from).collect();
    for reply in &replies {
        if let Some(parent) = comments.iter_mut().find(|c| Some(c.id) == reply.parent_id) {
            parent.replies.push(CommentView::from(reply));
        }
    }

    Ok(CommentPage {
        comments,
        pagination: Pagination::new(req.page, req.limit, total),
    })
}

/// Validates and persists a new comment or reply. Validation runs before any
/// storage call, so a rejected submission has no side effect. Returns the
/// persisted record so the caller can render it without a re-fetch.
pub async fn submit_comment<S: Store>(
    store: &mut S,
    games: &GameDirectory,
    submitter: Option<VoterId>,
    data: &NewComment,
) -> Result<CommentView, Error> {
    data.validate()?;
    games.check(&data.game_id)?;

    let parent_id = match data.parent() {
        None => None,
        Some(parent) => {
            let parent_comment = store
                .comment_by_id(parent)
                .await
                .with_context(|| format!("looking up parent comment {parent}"))?
                .ok_or(ApiError::UnknownParent(parent))?;
            // Replies are exactly one level deep and never cross games; the
            // store does not enforce that, so the write path must.
            if parent_comment.parent_id.is_some() || parent_comment.game_id != data.game_id {
                return Err(ApiError::UnknownParent(parent).into());
            }
            Some(parent_comment.id)
        }
    };

    let comment = store
        .insert_comment(CommentDraft {
            game_id: data.game_id.clone(),
            parent_id,
            author: data.author.trim().to_string(),
            email: data.email.trim().to_lowercase(),
            body: data.body.trim().to_string(),
            status: CommentStatus::Approved,
            ip_address: submitter.map(|v| v.0),
        })
        .await
        .context("inserting comment")?;

    Ok(CommentView::from(&comment))
}

/// Applies one vote to the ledger and brings the denormalized counters back
/// in sync. Per (comment, voter): no vote + X inserts X, X + X deletes (a
/// toggle-off), X + Y flips to Y. Note the toggle makes a blind retry of the
/// same request undo itself, so clients must not auto-retry votes.
pub async fn cast_vote<S: Store>(
    store: &mut S,
    comment_id: CommentId,
    voter: &VoterId,
    requested: VoteType,
) -> Result<VoteCounts, Error> {
    store
        .comment_by_id(comment_id)
        .await
        .with_context(|| format!("looking up comment {comment_id}"))?
        .ok_or(ApiError::CommentNotFound(comment_id))?;

    let current = store
        .find_vote(comment_id, voter)
        .await
        .context("reading vote ledger")?;

    match current {
        Some(prev) if prev == requested => store
            .delete_vote(comment_id, voter)
            .await
            .context("deleting vote")?,
        _ => store
            .upsert_vote(comment_id, voter, requested)
            .await
            .context("recording vote")?,
    }

    // Full recount rather than +/-1, so concurrent votes cannot drift the
    // counters away from the ledger.
    let counts = store
        .count_votes(comment_id)
        .await
        .context("recounting votes")?;
    store
        .update_counts(comment_id, counts)
        .await
        .context("persisting vote counts")?;

    Ok(counts)
}
