use crate::domain::ResourceDescriptor;
use crate::ports::Upstream;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{Error, Result};
use std::time::Duration;

/// Client for the upstream analytics API.
///
/// Bearer-token authenticated, with a hard request timeout. Status codes
/// are mapped onto the error taxonomy the service retries and falls back
/// on; everything else about the upstream is opaque.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpUpstream {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url, token))
    }

    /// For tests or custom TLS setups.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url_for(&self, resource: &ResourceDescriptor) -> String {
        format!("{}/{}", self.base_url, resource.path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, resource: &ResourceDescriptor) -> Result<String> {
        let response = self
            .client
            .get(self.url_for(resource))
            .query(&resource.params)
            .bearer_auth(&self.token)
            .send()
            .await
            // Connect failures and timeouts are retryable.
            .map_err(|e| Error::Transient(format!("request failed: {}", e)))?;

        let status = response.status();
        match status {
            s if s.is_success() => response
                .text()
                .await
                .map_err(|e| Error::Transient(format!("failed to read upstream body: {}", e))),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::AuthFailed(format!("upstream returned {}", status)))
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            s => Err(Error::Transient(format!("upstream returned {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let upstream = HttpUpstream::with_client(
            Client::new(),
            "https://app.asana.com/api/1.0/",
            "token",
        );

        let resource = ResourceDescriptor::new("/projects/123/tasks");
        assert_eq!(
            upstream.url_for(&resource),
            "https://app.asana.com/api/1.0/projects/123/tasks"
        );
    }
}
