use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};
use log::debug;
use reqwest::{Client, header};
use url::Url;

use crate::error::FetchError;
use crate::models::{ApiPullRequest, PullRequest};
use crate::reviewers::extract_reviewers;

const USER_AGENT: &str = concat!("pull-reviewers/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API client
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    auth_header: String,
}

impl GitHubClient {
    pub fn new(api_url: &Url, token: &str) -> Result<Self> {
        if api_url.cannot_be_a_base() {
            return Err(anyhow::anyhow!(
                "API URL cannot be used as a base: {}",
                api_url
            ));
        }

        // Token-as-username basic auth, no scopes needed for public metadata
        let credentials = format!("{}:x-oauth-basic", token);
        let auth_token = general_purpose::STANDARD.encode(credentials);
        let auth_header = format!("Basic {}", auth_token);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.clone(),
            auth_header,
        })
    }

    fn pulls_url(&self, organization: &str, repository: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repos", organization, repository, "pulls"]);
        }
        url
    }

    /// Get the first page of open pull requests for one repository
    pub async fn open_pull_requests(
        &self,
        organization: &str,
        repository: &str,
    ) -> Result<Vec<PullRequest>, FetchError> {
        let url = self.pulls_url(organization, repository);

        debug!("Fetching open pull requests from {}", url);

        let request_failed = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .header(header::AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("Unable to read response body"));
            return Err(FetchError::Status {
                repo: format!("{}/{}", organization, repository),
                status,
                body,
            });
        }

        let body = response.text().await.map_err(request_failed)?;
        decode_pull_requests(organization, repository, &body)
    }
}

/// Decode a pulls listing into pull requests, keeping response order.
pub fn decode_pull_requests(
    organization: &str,
    repository: &str,
    body: &str,
) -> Result<Vec<PullRequest>, FetchError> {
    let records: Vec<ApiPullRequest> =
        serde_json::from_str(body).map_err(|source| FetchError::Decode {
            repo: format!("{}/{}", organization, repository),
            source,
        })?;

    Ok(records
        .into_iter()
        .map(|record| to_pull_request(repository, record))
        .collect())
}

fn to_pull_request(repository: &str, record: ApiPullRequest) -> PullRequest {
    let reviewers = record
        .body
        .as_deref()
        .map(extract_reviewers)
        .unwrap_or_default();

    PullRequest {
        repository: repository.to_string(),
        title: record.title,
        author: record.user.login,
        url: record.html_url,
        created_at: record.created_at,
        reviewers,
    }
}
