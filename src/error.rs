use reqwest::StatusCode;

/// Failures while fetching pull requests for one repository.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request for {repo} failed with status {status}: {body}")]
    Status {
        repo: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected pull request payload for {repo}: {source}")]
    Decode {
        repo: String,
        #[source]
        source: serde_json::Error,
    },
}
