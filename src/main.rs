use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

mod config;
mod error;
mod github_client;
mod mailer;
mod models;
mod report;
mod reviewers;

use config::AppConfig;
use github_client::GitHubClient;
use models::PullRequest;
use report::ReviewerReport;

/// Pull Reviewers - Report open pull requests by assigned reviewer
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// dotenv file to load before reading configuration (default: .env if present)
    #[clap(long)]
    env_file: Option<PathBuf>,

    /// Print the report without emailing it, whatever SEND says
    #[clap(long)]
    no_send: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Pick up variables from a dotenv file, if any
    match &args.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file: {:?}", path))?;
        }
        None => {
            if dotenv::dotenv().is_ok() {
                debug!("Loaded .env");
            }
        }
    }

    // Load configuration
    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if args.no_send {
        config.send = false;
    }

    info!("Organization: {}", config.organization);
    info!("Checking {} repositories", config.repositories.len());
    info!("Tracking {} possible reviewers", config.candidate_reviewers.len());

    // Create GitHub client and collect open pull requests
    let client = GitHubClient::new(&config.api_url, &config.token)?;
    let pull_requests = fetch_all(&client, &config).await?;

    info!("Found {} open pull requests", pull_requests.len());

    // Group by reviewer and render the report
    let now = Utc::now();
    let report = ReviewerReport::build(
        &pull_requests,
        &config.candidate_reviewers,
        config.required_reviewers,
    );
    let text = report.render(now, &mut rand::rng());

    println!();
    println!("{}", text);
    println!();

    // Email the report (or explain why not)
    let transport = mailer::smtp_transport(&config)?;
    mailer::dispatch(&config, &transport, &text, now).await
}

/// Fetch repositories one after another, keeping configured order.
async fn fetch_all(client: &GitHubClient, config: &AppConfig) -> Result<Vec<PullRequest>> {
    let mut pull_requests = Vec::new();

    for repository in &config.repositories {
        let prs = client
            .open_pull_requests(&config.organization, repository)
            .await
            .with_context(|| format!("Failed to fetch pull requests for {}", repository))?;

        debug!("{}: {} open pull requests", repository, prs.len());
        for pr in &prs {
            debug!(
                "  {} by {} ({} reviewers named)",
                pr.title,
                pr.author,
                pr.reviewers.len()
            );
        }
        pull_requests.extend(prs);
    }

    Ok(pull_requests)
}
