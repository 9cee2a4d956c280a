//! Per-host bearer-token injection for asset downloads.

/// Maps a host pattern to a bearer token for authenticated asset hosts.
///
/// The pattern is matched as a plain substring of the source URL, which is
/// enough to distinguish the handful of known weight-hosting providers.
#[derive(Debug, Clone)]
pub struct HostToken {
    pub pattern: String,
    pub token: String,
}

impl HostToken {
    pub fn new(pattern: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            token: token.into(),
        }
    }
}

/// Find the bearer token for `url`, if any.
///
/// Returns the token of the first entry whose pattern occurs in the URL and
/// whose token is non-empty. Entries with an empty token (credential not
/// configured) are skipped, so the request goes out unauthenticated.
pub fn token_for<'a>(tokens: &'a [HostToken], url: &str) -> Option<&'a str> {
    tokens
        .iter()
        .find(|entry| !entry.token.is_empty() && url.contains(&entry.pattern))
        .map(|entry| entry.token.as_str())
}
