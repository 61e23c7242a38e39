use std::ops::RangeInclusive;

use crate::{Error, GameId, Time};

/// Accepted author length, in characters, after trimming.
pub const AUTHOR_LEN: RangeInclusive<usize> = 2..=50;

/// Accepted comment body length, in characters, after trimming.
pub const BODY_LEN: RangeInclusive<usize> = 6..=500;

/// Hard cap on the page size a client may request.
pub const MAX_PAGE_LIMIT: u32 = 20;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 5;

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub i64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Moderation state of a comment. Submission always writes `Approved`; the
/// other states exist for a moderation flow that has no behavior here yet.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Spam,
    Trash,
}

impl CommentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Spam => "spam",
            CommentStatus::Trash => "trash",
        }
    }
}

impl std::str::FromStr for CommentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<CommentStatus> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "spam" => Ok(CommentStatus::Spam),
            "trash" => Ok(CommentStatus::Trash),
            _ => Err(anyhow::anyhow!("unknown comment status {s:?}")),
        }
    }
}

/// A full comment record as the store holds it. This type carries the
/// submitter's email and address and is therefore never serialized to
/// clients; see [`CommentView`] for the public projection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub game_id: GameId,
    /// `None` for a top-level comment. A comment whose `parent_id` is set may
    /// itself never be the parent of another comment.
    pub parent_id: Option<CommentId>,
    pub author: String,
    /// Kept for moderation/contact only, never displayed.
    pub email: String,
    pub body: String,
    pub status: CommentStatus,
    /// Denormalized from the vote ledger; recomputed by full recount on
    /// every vote.
    pub like_count: i64,
    pub dislike_count: i64,
    /// Address the comment was submitted from, for moderation.
    pub ip_address: Option<String>,
    pub created_at: Time,
}

/// What the submission service hands to the store: a validated, normalized
/// comment minus the fields the store assigns (id, timestamp, counters).
#[derive(Clone, Debug)]
pub struct CommentDraft {
    pub game_id: GameId,
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub email: String,
    pub body: String,
    pub status: CommentStatus,
    pub ip_address: Option<String>,
}

/// Public projection of a comment, with its replies grouped on it.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub parent_id: Option<CommentId>,
    pub author: String,
    pub body: String,
    pub like_count: i64,
    pub dislike_count: i64,
    pub created_at: Time,
    #[serde(default)]
    pub replies: Vec<CommentView>,
}

impl From<&Comment> for CommentView {
    fn from(c: &Comment) -> CommentView {
        CommentView {
            id: c.id,
            parent_id: c.parent_id,
            author: c.author.clone(),
            body: c.body.clone(),
            like_count: c.like_count,
            dislike_count: c.dislike_count,
            created_at: c.created_at,
            replies: Vec::new(),
        }
    }
}

/// Submission payload. Field names accept both the current camelCase spelling
/// and the legacy ajax one (`name`/`content`/`parent_id`/`game_id`).
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default = "GameId::homepage", alias = "game_id")]
    pub game_id: GameId,
    #[serde(alias = "name")]
    pub author: String,
    pub email: String,
    #[serde(alias = "content")]
    pub body: String,
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<i64>,
}

impl NewComment {
    /// The legacy wire format uses `0` for "no parent".
    pub fn parent(&self) -> Option<CommentId> {
        match self.parent_id {
            None | Some(0) => None,
            Some(id) => Some(CommentId(id)),
        }
    }

    /// Checked before any storage call, so a validation failure is guaranteed
    /// to have had no side effect. Length checks apply to the trimmed text.
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.game_id.0)?;
        crate::validate_string(&self.author)?;
        crate::validate_string(&self.email)?;
        crate::validate_string(&self.body)?;
        if !AUTHOR_LEN.contains(&self.author.trim().chars().count()) {
            return Err(Error::InvalidAuthor);
        }
        if !email_shape_ok(self.email.trim()) {
            return Err(Error::InvalidEmail);
        }
        if !BODY_LEN.contains(&self.body.trim().chars().count()) {
            return Err(Error::InvalidBody);
        }
        Ok(())
    }
}

/// `local@domain.tld`: exactly one `@`, no whitespace, and a dot in the
/// domain with something on both sides.
fn email_shape_ok(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSort {
    /// Creation time, newest first. The default.
    #[default]
    Newest,
    /// Creation time, oldest first.
    Oldest,
    /// Like count descending; ties broken newest-first so pages stay stable.
    Popular,
}

/// A fetch-page request after server-side clamping.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    pub game_id: GameId,
    pub page: u32,
    pub limit: u32,
    pub sort: CommentSort,
}

impl PageRequest {
    /// Out-of-range values are clamped rather than rejected: `page` to at
    /// least 1, `limit` into `[1, MAX_PAGE_LIMIT]`.
    pub fn new(game_id: GameId, page: u32, limit: u32, sort: CommentSort) -> PageRequest {
        PageRequest {
            game_id,
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            sort,
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// `total_pages = ceil(total / limit)`; an empty set has zero pages.
    pub fn new(page: u32, limit: u32, total: i64) -> Pagination {
        let per_page = i64::from(limit.max(1));
        Pagination {
            page,
            limit,
            total,
            total_pages: (total + per_page - 1) / per_page,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentPage {
    pub comments: Vec<CommentView>,
    pub pagination: Pagination,
}
