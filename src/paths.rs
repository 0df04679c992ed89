//! Path string helpers for display and prompt embedding.
//!
//! File paths arrive from drag-drop events and file pickers on any platform,
//! so both `\` and `/` separators must be accepted. These are pure string
//! transforms with no filesystem access.

/// Returns the display name of a path: the substring after the last path
/// separator. An empty or separator-less input is returned unchanged.
pub fn display_name(path: &str) -> &str {
    match path.rfind(['\\', '/']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Rewrites backslash separators to forward slashes for cross-platform
/// embedding in generated commands.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
