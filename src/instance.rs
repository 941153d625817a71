//! Helpers for naming and reaching federated instances.

use crate::client::Client;
use crate::errors::LemmyError;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use tracing::debug;

static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();

fn domain_regex() -> &'static Regex {
    DOMAIN_REGEX.get_or_init(|| {
        Regex::new(r"^(https?://)?([A-Za-z0-9][A-Za-z0-9-]{0,62}\.)+[A-Za-z]{2,63}(:[0-9]{0,5})?$")
            .expect("domain regex is valid")
    })
}

/// Turns an instance name into a base URL.
///
/// Inputs that already carry `http://` or `https://` are kept; anything else
/// gets `https://` in front.
///
/// ```
/// use lemmy_wire::instance_to_url;
///
/// assert_eq!(instance_to_url("lemmy.ml"), "https://lemmy.ml");
/// assert_eq!(instance_to_url("http://localhost:8536"), "http://localhost:8536");
/// ```
#[must_use]
pub fn instance_to_url(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{input}")
    }
}

/// Checks that `input` looks like an instance domain, optionally with scheme and port.
#[must_use]
pub fn is_instance_domain(input: &str) -> bool {
    domain_regex().is_match(input)
}

/// Hostname of an ActivityPub actor id such as `https://lemmy.ml/c/rust`.
///
/// # Errors
///
/// Returns `InvalidUrl` if `actor_id` isn't an absolute URL with a host.
pub fn instance_id(actor_id: &str) -> Result<String, LemmyError> {
    let url = Url::parse(actor_id).map_err(|e| LemmyError::InvalidUrl(format!("{actor_id}: {e}")))?;
    url.host_str()
        .map(String::from)
        .ok_or_else(|| LemmyError::InvalidUrl(format!("{actor_id}: no host")))
}

/// Federated community handle, `name@host`.
///
/// # Errors
///
/// Returns `InvalidUrl` if `actor_id` has no host.
pub fn full_community_name(name: &str, actor_id: &str) -> Result<String, LemmyError> {
    Ok(format!("{name}@{}", instance_id(actor_id)?))
}

/// Returns `true` if `instance` answers `GET /site` successfully.
///
/// The call is made anonymously. Empty input is rejected without a request.
pub async fn validate_instance(instance: &str) -> bool {
    if instance.is_empty() {
        return false;
    }
    let client = match Client::new(instance) {
        Ok(client) => client,
        Err(e) => {
            debug!("Instance {instance} rejected: {e}");
            return false;
        }
    };
    match client.get_site().await {
        Ok(_) => true,
        Err(e) => {
            debug!("Instance {instance} failed validation: {e}");
            false
        }
    }
}
