use crate::errors::LemmyError;
use reqwest::{Method, Url};
use serde::Serialize;

/// Path prefix of the Lemmy REST API.
pub const API_PATH: &str = "/api/v3";

/// Path of the pictrs image endpoint, outside the versioned API.
pub const PICTRS_PATH: &str = "/pictrs/image";

/// Lemmy API endpoints this crate calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint<'a> {
    GetSite,
    GetPost { id: i64 },
    GetPosts,
    GetComments,
    GetCommunity { name: &'a str },
    CreatePost,
    EditPost,
    LikePost,
    RemovePost,
    LockPost,
    CreateComment,
    EditComment,
    LikeComment,
    RemoveComment,
    FollowCommunity,
    UploadImage,
}

impl Endpoint<'_> {
    /// HTTP verb for this endpoint.
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::GetSite
            | Self::GetPost { .. }
            | Self::GetPosts
            | Self::GetComments
            | Self::GetCommunity { .. } => Method::GET,
            Self::EditPost | Self::EditComment => Method::PUT,
            Self::CreatePost
            | Self::LikePost
            | Self::RemovePost
            | Self::LockPost
            | Self::CreateComment
            | Self::LikeComment
            | Self::RemoveComment
            | Self::FollowCommunity
            | Self::UploadImage => Method::POST,
        }
    }

    fn to_path(&self) -> String {
        let api_path = match self {
            Self::UploadImage => return PICTRS_PATH.to_string(),
            Self::GetSite => "/site",
            Self::GetPost { .. } | Self::CreatePost | Self::EditPost => "/post",
            Self::GetPosts => "/post/list",
            Self::LikePost => "/post/like",
            Self::RemovePost => "/post/remove",
            Self::LockPost => "/post/lock",
            Self::GetComments => "/comment/list",
            Self::CreateComment | Self::EditComment => "/comment",
            Self::LikeComment => "/comment/like",
            Self::RemoveComment => "/comment/remove",
            Self::GetCommunity { .. } => "/community",
            Self::FollowCommunity => "/community/follow",
        };
        format!("{API_PATH}{api_path}")
    }

    fn query_params(&self) -> Option<String> {
        match self {
            Self::GetPost { id } => Some(format!("id={id}")),
            Self::GetCommunity { name } => Some(format!("name={}", urlencoding::encode(name))),
            _ => None,
        }
    }
}

/// Builds the full URL of `endpoint` on the instance at `base_url`.
///
/// `base_url` is an origin such as `https://lemmy.example`; a trailing slash
/// is ignored.
///
/// # Errors
///
/// Returns `InvalidUrl` if the result doesn't parse.
pub fn construct_endpoint_url(base_url: &str, endpoint: &Endpoint) -> Result<Url, LemmyError> {
    let base = base_url.trim_end_matches('/');
    let path = endpoint.to_path();
    let url = match endpoint.query_params() {
        Some(query) => format!("{base}{path}?{query}"),
        None => format!("{base}{path}"),
    };
    Url::parse(&url).map_err(|e| LemmyError::InvalidUrl(format!("{url}: {e}")))
}

/// Appends the fields of a query form to `url`.
///
/// The form is serialized to a JSON object; `null` fields are skipped, scalars
/// are written in their JSON text form, strings without quotes.
///
/// # Errors
///
/// Returns `InvalidInput` if the form isn't a flat object.
pub fn append_query<T: Serialize + ?Sized>(url: &mut Url, form: &T) -> Result<(), LemmyError> {
    let value = serde_json::to_value(form)?;
    let serde_json::Value::Object(fields) = value else {
        return Err(LemmyError::InvalidInput(
            "query form must serialize to an object".to_string(),
        ));
    };

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let rendered = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(LemmyError::InvalidInput(format!(
                    "query field '{key}' must be a scalar"
                )));
            }
        };
        pairs.push((key, rendered));
    }

    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(())
}
