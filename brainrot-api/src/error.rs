use anyhow::{anyhow, Context};
use serde_json::json;

use crate::{CommentId, GameId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Author must be between 2 and 50 characters")]
    InvalidAuthor,

    #[error("Email must look like local@domain.tld")]
    InvalidEmail,

    #[error("Comment body must be between 6 and 500 characters")]
    InvalidBody,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Unknown game {0}")]
    UnknownGame(GameId),

    #[error("Parent comment {0} does not exist or cannot receive replies")]
    UnknownParent(CommentId),

    #[error("Comment not found {0}")]
    CommentNotFound(CommentId),

    #[error("Invalid vote type {0:?}")]
    InvalidVoteType(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidAuthor => StatusCode::UNPROCESSABLE_ENTITY,
            Error::InvalidEmail => StatusCode::UNPROCESSABLE_ENTITY,
            Error::InvalidBody => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::UnknownGame(_) => StatusCode::BAD_REQUEST,
            Error::UnknownParent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidVoteType(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::InvalidAuthor => json!({
                "message": "author must be between 2 and 50 characters",
                "type": "invalid-author",
            }),
            Error::InvalidEmail => json!({
                "message": "email must look like local@domain.tld",
                "type": "invalid-email",
            }),
            Error::InvalidBody => json!({
                "message": "comment body must be between 6 and 500 characters",
                "type": "invalid-body",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::UnknownGame(g) => json!({
                "message": "game is not recognized",
                "type": "unknown-game",
                "game": g,
            }),
            Error::UnknownParent(p) => json!({
                "message": "parent comment does not exist or cannot receive replies",
                "type": "unknown-parent",
                "parent": p.0,
            }),
            Error::CommentNotFound(c) => json!({
                "message": "comment not found",
                "type": "comment-not-found",
                "comment": c.0,
            }),
            Error::InvalidVoteType(v) => json!({
                "message": "vote type must be like or dislike",
                "type": "invalid-vote-type",
                "voteType": v,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "invalid-author" => Error::InvalidAuthor,
                "invalid-email" => Error::InvalidEmail,
                "invalid-body" => Error::InvalidBody,
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "unknown-game" => Error::UnknownGame(GameId(String::from(
                    data.get("game")
                        .and_then(|g| g.as_str())
                        .ok_or_else(|| anyhow!("error is an unknown-game without a game"))?,
                ))),
                "unknown-parent" => Error::UnknownParent(CommentId(
                    data.get("parent")
                        .and_then(|p| p.as_i64())
                        .ok_or_else(|| anyhow!("error is an unknown-parent without a parent"))?,
                )),
                "comment-not-found" => Error::CommentNotFound(CommentId(
                    data.get("comment").and_then(|c| c.as_i64()).ok_or_else(|| {
                        anyhow!("error is a comment-not-found without a comment")
                    })?,
                )),
                "invalid-vote-type" => Error::InvalidVoteType(String::from(
                    data.get("voteType").and_then(|v| v.as_str()).ok_or_else(|| {
                        anyhow!("error is an invalid-vote-type without a voteType")
                    })?,
                )),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
