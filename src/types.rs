//! Request forms and the few response shapes this crate reads.
//!
//! Everything else an instance returns is handed back as
//! `serde_json::Value`.

use serde::{Deserialize, Serialize};

/// Comment and post listing order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortType {
    #[default]
    Hot,
    Top,
    New,
    Old,
    Controversial,
    Active,
    TopAll,
}

/// Which federated scope a listing covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingType {
    #[default]
    All,
    Local,
    Subscribed,
    ModeratorView,
}

/// `GET /comment/list` query.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GetComments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "type_")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_only: Option<bool>,
}

/// `GET /post/list` query.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GetPosts {
    #[serde(skip_serializing_if = "Option::is_none", rename = "type_")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreatePost {
    pub name: String,
    pub community_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EditPost {
    pub post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CreateComment {
    pub content: String,
    pub post_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EditComment {
    pub comment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_id: Option<i64>,
}

/// Vote direction: 1 up, -1 down, 0 clears the vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
    Clear,
}

impl Vote {
    #[must_use]
    pub const fn score(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
            Self::Clear => 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreatePostLike {
    pub post_id: i64,
    pub score: i8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CreateCommentLike {
    pub comment_id: i64,
    pub score: i8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FollowCommunity {
    pub community_id: i64,
    pub follow: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RemovePost {
    pub post_id: i64,
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LockPost {
    pub post_id: i64,
    pub locked: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RemoveComment {
    pub comment_id: i64,
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `GET /site`. Only `version` is read; everything else is kept verbatim.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GetSiteResponse {
    pub version: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// pictrs upload answer.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UploadImageResponse {
    pub msg: String,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub delete_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub file: String,
    pub delete_token: String,
}
