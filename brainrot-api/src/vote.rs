use crate::{CommentId, Error};

/// The two vote states a ledger entry can hold. "No vote" is the absence of
/// an entry, not a third state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Like,
    Dislike,
}

impl VoteType {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteType::Like => "like",
            VoteType::Dislike => "dislike",
        }
    }
}

impl std::str::FromStr for VoteType {
    type Err = Error;

    fn from_str(s: &str) -> Result<VoteType, Error> {
        match s {
            "like" => Ok(VoteType::Like),
            "dislike" => Ok(VoteType::Dislike),
            _ => Err(Error::InvalidVoteType(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteCounts {
    pub like: i64,
    pub dislike: i64,
}

/// Vote payload. `vote_type` is carried as a raw string so that an unknown
/// value is a 400 with a typed error rather than a body-deserialization
/// rejection.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVote {
    #[serde(alias = "comment_id")]
    pub comment_id: CommentId,
    #[serde(alias = "vote_type")]
    pub vote_type: String,
}

impl CastVote {
    pub fn requested(&self) -> Result<VoteType, Error> {
        self.vote_type.parse()
    }
}

/// What a successful vote returns: the recounted totals, so the client can
/// update without a full re-fetch.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteReceipt {
    pub counts: VoteCounts,
}
