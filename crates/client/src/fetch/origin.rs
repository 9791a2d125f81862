//! Same-origin classification.
//!
//! Interception only writes back responses for requests on the app's own
//! origin (or explicitly listed externals). Origin identity is the usual
//! scheme + host + port triple.

use super::url::canonicalize;

/// Check whether a URL is same-origin with the given origin URL.
///
/// Both sides are canonicalized first; unparsable input is never
/// same-origin.
pub fn same_origin(url: &str, origin: &str) -> bool {
    match (canonicalize(url), canonicalize(origin)) {
        (Ok(url), Ok(origin)) => url.origin() == origin.origin(),
        _ => false,
    }
}
