//! REST client for the repository's public v1 API

use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

use shared::run_debug;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::traits::RemoteRepository;
use crate::types::{AdminIdentity, GroupMembershipRequest, PersonRequest, RemoteResponse};

/// Path segments of the public API root, relative to the server base URL
const PUBLIC_API_SEGMENTS: [&str; 6] = ["alfresco", "api", "-default-", "public", "alfresco", "versions"];
const PUBLIC_API_VERSION: &str = "1";

/// Default request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Real repository client using HTTP basic authentication
#[derive(Clone)]
pub struct RestRepositoryClient {
    client: Client,
    base_url: Url,
}

impl RestRepositoryClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:8080`)
    pub fn new(base_url: &str, timeout: Duration) -> ProvisionerResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ProvisionerError::invalid_configuration(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProvisionerError::invalid_configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of a public API resource, keeping any path prefix of the base URL
    pub fn api_url(&self, resource: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(PUBLIC_API_SEGMENTS)
                .push(PUBLIC_API_VERSION)
                .extend(resource);
        }
        url
    }

    async fn post_json<B>(&self, admin: &AdminIdentity, url: Url, body: &B) -> ProvisionerResult<RemoteResponse>
    where
        B: serde::Serialize + Sync + ?Sized,
    {
        run_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .basic_auth(&admin.username, Some(&admin.password))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                run_debug!("Could not read response body ({}): {}", status, e);
                String::new()
            }
        };
        Ok(RemoteResponse::new(status.as_u16(), reason_phrase(status)).with_body(body))
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown").to_string()
}

#[async_trait]
impl RemoteRepository for RestRepositoryClient {
    async fn create_person(&self, admin: &AdminIdentity, person: &PersonRequest) -> ProvisionerResult<RemoteResponse> {
        let url = self.api_url(&["people"]);
        self.post_json(admin, url, person).await
    }

    async fn create_group_membership(
        &self,
        admin: &AdminIdentity,
        group_id: &str,
        membership: &GroupMembershipRequest,
    ) -> ProvisionerResult<RemoteResponse> {
        let url = self.api_url(&["groups", group_id, "members"]);
        self.post_json(admin, url, membership).await
    }
}
