use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use brainrot_api::{
    CastVote, CommentPage, CommentSort, CommentView, GameId, NewComment, PageRequest, VoteReceipt,
    DEFAULT_PAGE_LIMIT,
};

use crate::{db::PostgresStore, extractors::*, games::GameDirectory, services, Error};

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchCommentsParams {
    #[serde(default = "GameId::homepage", alias = "game_id")]
    game_id: GameId,
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
    #[serde(default)]
    sort: CommentSort,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

pub async fn fetch_comments(
    State(games): State<GameDirectory>,
    mut conn: PgConn,
    Query(params): Query<FetchCommentsParams>,
) -> Result<Json<CommentPage>, Error> {
    let req = PageRequest::new(params.game_id, params.page, params.limit, params.sort);
    let mut store = PostgresStore { conn: &mut *conn };
    Ok(Json(services::fetch_page(&mut store, &games, &req).await?))
}

pub async fn submit_comment(
    State(games): State<GameDirectory>,
    mut conn: PgConn,
    voter: VoterIp,
    Json(data): Json<NewComment>,
) -> Result<(StatusCode, Json<CommentView>), Error> {
    let mut store = PostgresStore { conn: &mut *conn };
    let comment = services::submit_comment(&mut store, &games, Some(voter.0), &data).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn cast_vote(
    mut conn: PgConn,
    voter: VoterIp,
    Json(data): Json<CastVote>,
) -> Result<Json<VoteReceipt>, Error> {
    let requested = data.requested()?;
    let mut store = PostgresStore { conn: &mut *conn };
    let counts = services::cast_vote(&mut store, data.comment_id, &voter.0, requested).await?;
    Ok(Json(VoteReceipt { counts }))
}
