//! Authentication headers for completion requests.

/// Attach the bearer credential used by the Responses API.
pub fn add_auth_headers(request: reqwest::RequestBuilder, api_key: &str) -> reqwest::RequestBuilder {
    request.bearer_auth(api_key)
}
