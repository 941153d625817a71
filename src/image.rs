//! pictrs image URL rewriting.

use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use tracing::debug;

/// Thumbnail widths pictrs is asked for.
pub const THUMBNAIL_WIDTHS: [u32; 7] = [128, 196, 256, 512, 728, 1024, 1536];

/// Requested width meaning "original size".
pub const ORIGINAL_WIDTH: i32 = -1;

static DOUBLED_SCHEME: OnceLock<Regex> = OnceLock::new();

fn doubled_scheme() -> &'static Regex {
    DOUBLED_SCHEME.get_or_init(|| {
        Regex::new(r"^(https?://)+(https?//)").expect("scheme regex is valid")
    })
}

/// Smallest thumbnail width at or above `target`, or the largest one.
#[must_use]
pub fn closest_thumbnail_width(target: u32) -> u32 {
    THUMBNAIL_WIDTHS
        .iter()
        .copied()
        .find(|w| *w >= target)
        .unwrap_or(THUMBNAIL_WIDTHS[THUMBNAIL_WIDTHS.len() - 1])
}

/// Asks pictrs for a webp thumbnail close to `width`.
///
/// Existing `format`/`thumbnail` parameters win. A `width` of
/// [`ORIGINAL_WIDTH`] drops any thumbnail parameter, `0` leaves it alone.
/// Unparseable input comes back unchanged.
#[must_use]
pub fn optimize_image_url(input: &str, width: i32) -> String {
    let cleaned = doubled_scheme().replace(input, "$1");
    let mut url = match Url::parse(&cleaned) {
        Ok(url) => url,
        Err(e) => {
            debug!("Leaving image URL as is ({e}): {input}");
            return input.to_string();
        }
    };

    let has = |url: &Url, key: &str| url.query_pairs().any(|(k, _)| k == key);

    if !has(&url, "format") {
        url.query_pairs_mut().append_pair("format", "webp");
    }
    if width > 0 && !has(&url, "thumbnail") {
        let thumbnail = closest_thumbnail_width(width.unsigned_abs()).to_string();
        url.query_pairs_mut().append_pair("thumbnail", &thumbnail);
    }
    if width == ORIGINAL_WIDTH {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "thumbnail")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closest_thumbnail_width_rounds_up() {
        assert_eq!(closest_thumbnail_width(76), 128);
        assert_eq!(closest_thumbnail_width(256), 256);
        assert_eq!(closest_thumbnail_width(700), 728);
        assert_eq!(closest_thumbnail_width(5000), 1536);
    }

    #[test]
    fn test_adds_format_and_thumbnail() {
        let out = optimize_image_url("https://lemmy.ml/pictrs/image/abc.png", 1024);
        assert_eq!(
            out,
            "https://lemmy.ml/pictrs/image/abc.png?format=webp&thumbnail=1024"
        );
    }

    #[test]
    fn test_keeps_existing_params() {
        let out = optimize_image_url("https://lemmy.ml/pictrs/image/abc.png?format=png&thumbnail=64", 512);
        assert_eq!(
            out,
            "https://lemmy.ml/pictrs/image/abc.png?format=png&thumbnail=64"
        );
    }

    #[test]
    fn test_original_width_drops_thumbnail() {
        let out = optimize_image_url("https://lemmy.ml/i.png?thumbnail=64", ORIGINAL_WIDTH);
        assert_eq!(out, "https://lemmy.ml/i.png?format=webp");
    }

    #[test]
    fn test_zero_width_only_sets_format() {
        let out = optimize_image_url("https://lemmy.ml/i.png", 0);
        assert_eq!(out, "https://lemmy.ml/i.png?format=webp");
    }

    #[test]
    fn test_collapses_doubled_scheme() {
        let out = optimize_image_url("https://https//lemmy.ml/i.png", 0);
        assert_eq!(out, "https://lemmy.ml/i.png?format=webp");
    }

    #[test]
    fn test_unparseable_input_is_returned() {
        assert_eq!(optimize_image_url("not a url", 256), "not a url");
    }
}
