//! Base URL handling for the completion endpoint.

/// Join a base URL and an endpoint path without doubling slashes.
///
/// ```
/// use palaver::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.openai.com/v1/", "/responses"),
///     "https://api.openai.com/v1/responses"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Accepts `http://` and `https://` URLs with a non-empty host and returns
/// them without trailing slashes.
pub fn validate_base_url(base_url: &str) -> Result<String, String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| format!("Base URL must start with http:// or https:// (got '{base_url}')"))?;
    if rest.split('/').next().unwrap_or_default().is_empty() {
        return Err(format!("Base URL has no host: '{base_url}'"));
    }
    Ok(trimmed.to_string())
}

/// `host:port` of a base URL, for name resolution. The port defaults from the
/// scheme.
pub fn host_and_port(base_url: &str) -> Option<String> {
    let (rest, default_port) = if let Some(rest) = base_url.strip_prefix("https://") {
        (rest, 443)
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        (rest, 80)
    } else {
        return None;
    };

    let authority = rest.split(['/', '?', '#']).next()?;
    let authority = authority.rsplit('@').next()?;
    if authority.is_empty() {
        return None;
    }
    if authority.starts_with('[') || authority.contains(':') {
        // explicit port, or a bracketed IPv6 literal
        if authority.ends_with(']') {
            return Some(format!("{authority}:{default_port}"));
        }
        return Some(authority.to_string());
    }
    Some(format!("{authority}:{default_port}"))
}
