//! Transport helpers shared by the reqwest adapters.

use std::time::Duration;

use reqwest::Client;
use url::Url;

/// Outbound identity and timeout settings shared by every adapter.
#[derive(Debug, Clone)]
pub struct HttpIdentity {
    /// HTTP user-agent header value.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: concat!("registry-client/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpIdentity {
    /// Build a reqwest client carrying this identity.
    pub(super) fn client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
    }
}

/// Append path segments to `base`, keeping any path it already has.
pub(super) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Whitespace-collapsed prefix of a response body for error messages.
pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
