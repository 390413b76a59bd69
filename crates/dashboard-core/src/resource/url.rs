/// Prefix `https://` unless the URL already carries an http(s) scheme.
///
/// Pure and idempotent: normalizing a normalized URL returns it unchanged.
pub fn normalize_url(url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}
