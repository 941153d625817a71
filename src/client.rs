use crate::credential::Credential;
use crate::errors::LemmyError;
use crate::http::common::{Endpoint, append_query, construct_endpoint_url};
use crate::http::fetch::authenticated_fetch;
use crate::http::transport::{ReqwestTransport, Transport};
use crate::http::uploads::{self, UploadFile};
use crate::instance::instance_to_url;
use crate::request::{ApiResponse, RequestOptions};
use crate::types::{
    CreateComment, CreateCommentLike, CreatePost, CreatePostLike, EditComment, EditPost,
    FollowCommunity, GetComments, GetPosts, GetSiteResponse, LockPost, RemoveComment, RemovePost,
    Vote,
};
use crate::version::may_be_incompatible;
use reqwest::Client as ReqwestClient;
use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the instance to talk to.
pub const INSTANCE_ENV: &str = "LEMMY_INSTANCE";

/// Environment variable holding the session token.
pub const JWT_ENV: &str = "LEMMY_JWT";

/// Client for one Lemmy instance, optionally signed in.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct Client {
    pub(crate) base_url: String,
    pub(crate) credential: Option<Credential>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// Builder for `Client` instances.
///
/// # Example
///
/// ```
/// use lemmy_wire::Client;
/// use std::time::Duration;
///
/// let client = Client::builder("lemmy.example")
///     .credential("jwt-token")
///     .timeout(Duration::from_secs(30))
///     .connect_timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(client.base_url(), "https://lemmy.example");
/// ```
pub struct ClientBuilder {
    instance: String,
    credential: Option<Credential>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("instance", &self.instance)
            .field("credential", &self.credential)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientBuilder {
    /// Starts a builder for `instance` (a hostname or a base URL).
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            credential: None,
            timeout: None,
            connect_timeout: None,
            user_agent: None,
            transport: None,
        }
    }

    /// Starts a builder from `LEMMY_INSTANCE` and, if set, `LEMMY_JWT`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `LEMMY_INSTANCE` is unset or empty.
    pub fn from_env() -> Result<Self, LemmyError> {
        let instance = std::env::var(INSTANCE_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| LemmyError::InvalidInput(format!("{INSTANCE_ENV} is not set")))?;
        let mut builder = Self::new(instance);
        if let Ok(jwt) = std::env::var(JWT_ENV) {
            builder = builder.credential(jwt);
        }
        Ok(builder)
    }

    /// Signs requests with this token.
    #[must_use]
    pub fn credential(mut self, credential: impl Into<Credential>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Total per-request timeout of the default transport.
    ///
    /// Requests that carry their own deadline, such as video uploads, use that
    /// instead. Ignored when a custom transport is supplied.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Connect timeout of the default transport.
    ///
    /// Ignored when a custom transport is supplied.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// `User-Agent` of the default transport.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Routes all calls through `transport` instead of a reqwest client.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the `Client`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty instance and `ClientBuild` if the
    /// HTTP client can't be initialized.
    pub fn build(self) -> Result<Client, LemmyError> {
        if self.instance.trim().is_empty() {
            return Err(LemmyError::InvalidInput("instance must not be empty".to_string()));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = ReqwestClient::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                if let Some(connect_timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(connect_timeout);
                }
                if let Some(user_agent) = self.user_agent {
                    builder = builder.user_agent(user_agent);
                }
                let http_client = builder
                    .build()
                    .map_err(|e| LemmyError::ClientBuild(e.to_string()))?;
                Arc::new(ReqwestTransport::new(http_client)) as Arc<dyn Transport>
            }
        };

        Ok(Client {
            base_url: instance_to_url(self.instance.trim()).trim_end_matches('/').to_string(),
            credential: self.credential,
            transport,
        })
    }
}

impl Client {
    /// Creates a new builder for `Client` instances.
    pub fn builder(instance: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(instance)
    }

    /// Anonymous client with default settings.
    ///
    /// # Errors
    ///
    /// See [`ClientBuilder::build`].
    pub fn new(instance: impl Into<String>) -> Result<Self, LemmyError> {
        ClientBuilder::new(instance).build()
    }

    /// Base URL of the instance, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// A client for the same instance and transport signed in as someone else.
    #[must_use]
    pub fn with_credential(&self, credential: impl Into<Credential>) -> Self {
        Self {
            credential: Some(credential.into()),
            ..self.clone()
        }
    }

    /// Sends an arbitrary request through the authenticated wrapper.
    ///
    /// # Errors
    ///
    /// See [`authenticated_fetch`].
    pub async fn fetch(&self, url: Url, options: RequestOptions) -> Result<ApiResponse, LemmyError> {
        authenticated_fetch(&*self.transport, url, options, self.credential.as_ref()).await
    }

    /// Calls a read endpoint with an optional query form and decodes the answer.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error, or `MalformedResponse` if decoding fails.
    pub async fn get_json<Q, R>(&self, endpoint: &Endpoint<'_>, query: Option<&Q>) -> Result<R, LemmyError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut url = construct_endpoint_url(&self.base_url, endpoint)?;
        if let Some(query) = query {
            append_query(&mut url, query)?;
        }
        let response = self.fetch(url, RequestOptions::get()).await?;
        response.json(&format!("{endpoint:?} response"))
    }

    /// Calls a write endpoint with a JSON body and decodes the answer.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error, or `MalformedResponse` if decoding fails.
    pub async fn send_json<B, R>(&self, endpoint: &Endpoint<'_>, body: &B) -> Result<R, LemmyError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = construct_endpoint_url(&self.base_url, endpoint)?;
        let options = RequestOptions::json(endpoint.method(), body)?;
        let response = self.fetch(url, options).await?;
        response.json(&format!("{endpoint:?} response"))
    }

    // --- Site ---

    /// `GET /site`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the answer has no `version`.
    pub async fn get_site(&self) -> Result<GetSiteResponse, LemmyError> {
        debug!("Getting site: {}", self.base_url);
        self.get_json::<(), _>(&Endpoint::GetSite, None).await
    }

    /// Whether this instance may lack features introduced in `min_version`.
    ///
    /// # Errors
    ///
    /// Returns an error if the site can't be fetched.
    pub async fn check_compatibility(&self, min_version: &str) -> Result<bool, LemmyError> {
        let site = self.get_site().await?;
        let incompatible = may_be_incompatible(min_version, &site.version);
        debug!(
            "Instance version {} vs required {min_version}: incompatible={incompatible}",
            site.version
        );
        Ok(incompatible)
    }

    // --- Posts ---

    /// `GET /post?id=`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn get_post(&self, id: i64) -> Result<Value, LemmyError> {
        self.get_json::<(), _>(&Endpoint::GetPost { id }, None).await
    }

    /// `GET /post/list`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn get_posts(&self, query: &GetPosts) -> Result<Value, LemmyError> {
        self.get_json(&Endpoint::GetPosts, Some(query)).await
    }

    /// `POST /post`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn create_post(&self, form: &CreatePost) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::CreatePost, form).await
    }

    /// `PUT /post`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn edit_post(&self, form: &EditPost) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::EditPost, form).await
    }

    /// `POST /post/like`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn like_post(&self, post_id: i64, vote: Vote) -> Result<Value, LemmyError> {
        let form = CreatePostLike {
            post_id,
            score: vote.score(),
        };
        self.send_json(&Endpoint::LikePost, &form).await
    }

    // --- Comments ---

    /// `GET /comment/list`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn get_comments(&self, query: &GetComments) -> Result<Value, LemmyError> {
        self.get_json(&Endpoint::GetComments, Some(query)).await
    }

    /// `POST /comment`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn create_comment(&self, form: &CreateComment) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::CreateComment, form).await
    }

    /// `PUT /comment`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn edit_comment(&self, form: &EditComment) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::EditComment, form).await
    }

    /// `POST /comment/like`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn like_comment(&self, comment_id: i64, vote: Vote) -> Result<Value, LemmyError> {
        let form = CreateCommentLike {
            comment_id,
            score: vote.score(),
        };
        self.send_json(&Endpoint::LikeComment, &form).await
    }

    // --- Communities ---

    /// `GET /community?name=`. Federated names look like `rust@lemmy.ml`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn get_community(&self, name: &str) -> Result<Value, LemmyError> {
        self.get_json::<(), _>(&Endpoint::GetCommunity { name }, None)
            .await
    }

    /// `POST /community/follow`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn follow_community(&self, community_id: i64, follow: bool) -> Result<Value, LemmyError> {
        let form = FollowCommunity {
            community_id,
            follow,
        };
        self.send_json(&Endpoint::FollowCommunity, &form).await
    }

    // --- Moderation ---

    /// `POST /post/remove`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn remove_post(&self, form: &RemovePost) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::RemovePost, form).await
    }

    /// `POST /post/lock`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn lock_post(&self, post_id: i64, locked: bool) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::LockPost, &LockPost { post_id, locked })
            .await
    }

    /// `POST /comment/remove`.
    ///
    /// # Errors
    ///
    /// Returns any wrapper error.
    pub async fn remove_comment(&self, form: &RemoveComment) -> Result<Value, LemmyError> {
        self.send_json(&Endpoint::RemoveComment, form).await
    }

    // --- Uploads ---

    /// Uploads an image and returns its URL. The file must carry a MIME type.
    ///
    /// # Errors
    ///
    /// See [`uploads::upload_image`].
    pub async fn upload_image(&self, file: UploadFile) -> Result<String, LemmyError> {
        uploads::upload_image(&*self.transport, &self.base_url, self.credential.as_ref(), file)
            .await
    }

    /// Uploads a video under a size-scaled deadline and returns its URL.
    ///
    /// # Errors
    ///
    /// See [`uploads::upload_video`].
    pub async fn upload_video(&self, file: UploadFile) -> Result<String, LemmyError> {
        uploads::upload_video(
            Arc::clone(&self.transport),
            &self.base_url,
            self.credential.as_ref(),
            file,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder_default() {
        let client = Client::builder("lemmy.example").build().unwrap();
        assert_eq!(client.base_url(), "https://lemmy.example");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_client_builder_keeps_scheme_and_trims_slash() {
        let client = Client::builder("http://localhost:8536/").build().unwrap();
        assert_eq!(client.base_url(), "http://localhost:8536");
    }

    #[test]
    fn test_client_builder_with_timeouts() {
        let client = Client::builder("lemmy.example")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("lemmy-wire-tests")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "https://lemmy.example");
    }

    #[test]
    fn test_client_builder_rejects_empty_instance() {
        let err = Client::builder("  ").build().unwrap_err();
        assert!(matches!(err, LemmyError::InvalidInput(_)));
    }

    #[test]
    fn test_client_with_credential() {
        let client = Client::new("lemmy.example").unwrap();
        let signed_in = client.with_credential("jwt");
        assert!(signed_in.is_authenticated());
        assert!(!client.is_authenticated());
        assert_eq!(signed_in.base_url(), client.base_url());
    }

    #[test]
    fn test_empty_credential_is_not_authenticated() {
        let client = Client::builder("lemmy.example").credential("").build().unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_client_debug_hides_token() {
        let client = Client::builder("lemmy.example")
            .credential("super-secret")
            .build()
            .unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("lemmy.example"));
        assert!(!debug.contains("super-secret"));

        let builder_debug = format!("{:?}", Client::builder("x").credential("super-secret"));
        assert!(!builder_debug.contains("super-secret"));
    }
}
