//! Path splitting and normalization shared by route patterns and requests.

/// Splits `path` at `/`, dropping empty segments, so `//a/b/` yields `["a", "b"]`.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Resolves `.` and `..` segments and collapses repeated slashes.
///
/// Returns `None` when a `..` would climb above the root.
///
/// ```
/// use sprig_web::router::normalize_path;
///
/// assert_eq!(normalize_path("/a/./b/../c/").as_deref(), Some("/a/c"));
/// assert_eq!(normalize_path("").as_deref(), Some("/"));
/// assert_eq!(normalize_path("/a/../../b"), None);
/// ```
pub fn normalize_path(path: &str) -> Option<String> {
    let mut segments = Vec::new();
    for segment in split_path(path) {
        match segment {
            "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(segment),
        }
    }

    Some(format!("/{}", segments.join("/")))
}
