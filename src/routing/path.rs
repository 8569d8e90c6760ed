//! Prefix path parsing.
//!
//! `/mal/v1/oauth2/token` splits into prefix `mal` and remainder
//! `/v1/oauth2/token`. The prefix segment is consumed entirely and never
//! forwarded.

/// A request path split into its routing prefix and forwarded remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixPath<'a> {
    pub prefix: &'a str,
    pub remainder: &'a str,
}

/// Split a request path into prefix and remainder.
///
/// Returns `None` when there is no prefix or the remainder would be `/`.
/// The returned remainder always starts with `/`.
pub fn parse_prefix_path(path: &str) -> Option<PrefixPath<'_>> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (prefix, rest) = trimmed.split_once('/')?;

    // `rest` is a suffix of `path`, so the byte before it is the separator.
    let remainder = &path[path.len() - rest.len() - 1..];
    if prefix.is_empty() || rest.is_empty() {
        return None;
    }

    Some(PrefixPath { prefix, remainder })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_prefix_and_remainder() {
        assert_eq!(
            parse_prefix_path("/mal/v1/oauth2/token"),
            Some(PrefixPath {
                prefix: "mal",
                remainder: "/v1/oauth2/token",
            })
        );
        assert_eq!(
            parse_prefix_path("/mal/x"),
            Some(PrefixPath {
                prefix: "mal",
                remainder: "/x",
            })
        );
    }

    #[test]
    fn test_keeps_trailing_slash_and_empty_segments() {
        assert_eq!(parse_prefix_path("/mal/v2/").unwrap().remainder, "/v2/");
        assert_eq!(parse_prefix_path("/mal//x").unwrap().remainder, "//x");
    }

    #[test]
    fn test_malformed_paths() {
        for path in ["", "/", "/mal", "/mal/", "//", "//x"] {
            assert_eq!(parse_prefix_path(path), None, "path {path:?}");
        }
    }

    #[test]
    fn test_prefix_is_case_sensitive_text() {
        assert_eq!(parse_prefix_path("/MAL/a").unwrap().prefix, "MAL");
    }
}
