//! Download URL construction.

/// Resolve the `download_url` path echoed by the service against its origin.
pub fn absolute(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

/// Per-file download URL used by history rows.
pub fn by_filename(origin: &str, filename: &str) -> String {
    format!(
        "{}/download/{}",
        origin.trim_end_matches('/'),
        urlencoding::encode(filename)
    )
}
