use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::env;
use std::str::FromStr;
use url::Url;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Number of reviewers a pull request needs before it drops off the
/// "requiring more reviewers" list.
pub const DEFAULT_REQUIRED_REVIEWERS: usize = 2;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: String,
    pub organization: String,
    pub repositories: Vec<String>,
    pub candidate_reviewers: Vec<String>,
    pub required_reviewers: usize,
    pub api_url: Url,
    pub smtp: SmtpConfig,
    pub from_address: String,
    pub addresses: Vec<String>,
    pub send: bool,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source. `lookup` returns
    /// `None` for an unset variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name).with_context(|| format!("Environment variable {} not set", name))
        };

        let api_url = match lookup("GH_API_URL") {
            Some(raw) => Url::parse(&raw)
                .with_context(|| format!("GH_API_URL is not a valid URL: {}", raw))?,
            None => Url::parse(DEFAULT_API_URL)?,
        };

        let required_reviewers = match lookup("REQUIRED_REVIEWERS") {
            Some(raw) => parse_number("REQUIRED_REVIEWERS", &raw)?,
            None => DEFAULT_REQUIRED_REVIEWERS,
        };

        let send: i64 = parse_number("SEND", &required("SEND")?)?;

        let config = AppConfig {
            token: required("GH_TOKEN")?,
            organization: required("GH_ORG")?,
            repositories: parse_json_list("GH_REPOS", &required("GH_REPOS")?)?,
            candidate_reviewers: parse_json_list(
                "POSSIBLE_REVIEWERS",
                &required("POSSIBLE_REVIEWERS")?,
            )?,
            required_reviewers,
            api_url,
            smtp: SmtpConfig {
                server: required("SMTP_SERVER")?,
                port: parse_number("SMTP_PORT", &required("SMTP_PORT")?)?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
            },
            from_address: required("FROM_ADDRESS")?,
            addresses: parse_json_list("ADDRESSES", &required("ADDRESSES")?)?,
            send: send != 0,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(anyhow::anyhow!("GH_TOKEN cannot be empty"));
        }

        if self.organization.is_empty() {
            return Err(anyhow::anyhow!("GH_ORG cannot be empty"));
        }

        if self.repositories.is_empty() {
            return Err(anyhow::anyhow!("GH_REPOS cannot be empty"));
        }

        if self.candidate_reviewers.is_empty() {
            return Err(anyhow::anyhow!("POSSIBLE_REVIEWERS cannot be empty"));
        }

        if self.addresses.is_empty() {
            return Err(anyhow::anyhow!("ADDRESSES cannot be empty"));
        }

        Ok(())
    }
}

fn parse_json_list<T: DeserializeOwned>(name: &str, raw: &str) -> Result<Vec<T>> {
    serde_json::from_str(raw)
        .with_context(|| format!("{} must be a JSON array, got: {}", name, raw))
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a number, got: {}", name, raw))
}
