//! Instance version comparison.

/// Returns `true` if an instance running `available` may lack features
/// introduced in `min`.
///
/// Versions are compared segment by segment on their leading integer
/// (`"19-beta"` counts as 19). Segments without a leading integer are skipped.
/// Versions with a different number of segments, or strings with no digits or
/// dots at all, are reported as possibly incompatible.
///
/// ```
/// use lemmy_wire::may_be_incompatible;
///
/// assert!(!may_be_incompatible("0.19.0", "0.19.3"));
/// assert!(may_be_incompatible("0.19.0", "0.18.5"));
/// assert!(may_be_incompatible("0.19.0", "0.19"));
/// ```
#[must_use]
pub fn may_be_incompatible(min: &str, available: &str) -> bool {
    if min == available {
        return false;
    }

    let looks_like_version = |v: &str| v.chars().any(|c| c.is_ascii_digit() || c == '.');
    if !looks_like_version(min) || !looks_like_version(available) {
        return true;
    }

    let min_segments: Vec<&str> = min.split('.').collect();
    let available_segments: Vec<&str> = available.split('.').collect();
    if min_segments.len() != available_segments.len() {
        return true;
    }

    for (min_seg, available_seg) in min_segments.iter().zip(&available_segments) {
        let (Some(min_n), Some(available_n)) = (leading_int(min_seg), leading_int(available_seg))
        else {
            continue;
        };
        if min_n < available_n {
            return false;
        }
        if available_n < min_n {
            return true;
        }
    }

    false
}

fn leading_int(segment: &str) -> Option<u64> {
    let trimmed = segment.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_versions() {
        assert!(!may_be_incompatible("0.19.3", "0.19.3"));
    }

    #[test]
    fn test_newer_available() {
        assert!(!may_be_incompatible("0.18.0", "0.19.0"));
        assert!(!may_be_incompatible("0.19.0", "1.0.0"));
        assert!(!may_be_incompatible("0.19.3", "0.19.10"));
    }

    #[test]
    fn test_older_available() {
        assert!(may_be_incompatible("0.19.4", "0.19.3"));
        assert!(may_be_incompatible("1.0.0", "0.99.99"));
    }

    #[test]
    fn test_segment_count_mismatch() {
        assert!(may_be_incompatible("0.19.0", "0.19.0.1"));
    }

    #[test]
    fn test_not_a_version() {
        assert!(may_be_incompatible("0.19.0", "unknown"));
        assert!(may_be_incompatible("", "0.19.0"));
    }

    #[test]
    fn test_suffixes_use_leading_digits() {
        assert!(!may_be_incompatible("0.19.0", "0.19.0-rc1"));
        assert!(may_be_incompatible("0.19.1", "0.19.0-rc1"));
    }

    #[test]
    fn test_non_numeric_segments_are_skipped() {
        assert!(!may_be_incompatible("0.x.1", "0.y.1"));
        assert!(may_be_incompatible("0.x.2", "0.y.1"));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("19"), Some(19));
        assert_eq!(leading_int("3-beta"), Some(3));
        assert_eq!(leading_int("beta"), None);
        assert_eq!(leading_int(""), None);
    }
}
