//! Comment-thread query parameters for a post page.
//!
//! A post page URL looks like `/post/42-some-title?thread=0.17.23`. The
//! `thread` value is the dotted path of comment ids from the root (`0`) down
//! to the comment being focused.

use crate::errors::LemmyError;
use crate::types::{GetComments, ListingType, SortType};

/// Depth fetched when the whole post's comments are shown.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Depth fetched when a single thread is shown.
pub const THREAD_MAX_DEPTH: u32 = 10;

/// Path segments at which a deep thread is cut to show context only.
const DEEP_THREAD_SEGMENTS: usize = 9;

const COMMENT_PAGE_LIMIT: u32 = 50;

/// What to fetch and highlight for a post page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadParams {
    pub post_id: i64,
    /// Comment the fetched thread hangs from.
    pub parent_id: Option<i64>,
    /// Comment id to show as "continue thread" context, for deep paths.
    pub show_context: Option<String>,
    /// Last path segment, the comment to scroll to.
    pub focus: Option<String>,
    pub max_depth: u32,
}

impl ThreadParams {
    /// Derives the parameters from the page slug and optional `thread` value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the slug doesn't start with an integer post id.
    pub fn derive(slug: &str, thread: Option<&str>) -> Result<Self, LemmyError> {
        let post_id = parse_post_slug(slug)?;

        let mut params = Self {
            post_id,
            max_depth: DEFAULT_MAX_DEPTH,
            ..Self::default()
        };

        if let Some(thread) = thread {
            let split: Vec<&str> = thread.split('.').collect();
            let parent = if split.len() >= DEEP_THREAD_SEGMENTS {
                let context = split[split.len() - 5];
                params.show_context = Some(context.to_string());
                Some(context)
            } else {
                split.get(1).copied()
            };
            params.parent_id = parent.and_then(|p| p.parse::<i64>().ok());
            params.focus = split.last().map(|s| s.to_string());
        }

        // A `0` parent still shows a single thread but keeps the default depth.
        if params.parent_id.is_some_and(|p| p != 0) {
            params.max_depth = THREAD_MAX_DEPTH;
        }

        Ok(params)
    }

    /// Whether a single thread (rather than the whole post) is shown.
    #[must_use]
    pub fn single_thread(&self) -> bool {
        self.parent_id.is_some()
    }

    /// The `GET /comment/list` query for this page.
    #[must_use]
    pub fn to_get_comments(&self, sort: SortType) -> GetComments {
        GetComments {
            post_id: Some(self.post_id),
            parent_id: self.parent_id,
            listing_type: Some(ListingType::All),
            sort: Some(sort),
            max_depth: Some(self.max_depth),
            page: Some(1),
            limit: Some(COMMENT_PAGE_LIMIT),
            saved_only: Some(false),
        }
    }
}

/// Post id from a slug like `42-some-title` or `42`.
///
/// # Errors
///
/// Returns `InvalidInput` if the part before the first `-` isn't an integer.
pub fn parse_post_slug(slug: &str) -> Result<i64, LemmyError> {
    let head = slug.split('-').next().unwrap_or_default();
    head.parse::<i64>()
        .map_err(|_| LemmyError::InvalidInput(format!("Invalid post ID in slug '{slug}'")))
}
