use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::config::AppConfig;

pub fn subject(now: DateTime<Utc>) -> String {
    format!("Open PRs: {}", now.format("%d %b %Y"))
}

/// Build the plain-text report email addressed to every configured recipient.
pub fn build_message(config: &AppConfig, body: &str, now: DateTime<Utc>) -> Result<Message> {
    let from: Mailbox = config
        .from_address
        .parse()
        .with_context(|| format!("Invalid from address: {}", config.from_address))?;

    let mut builder = Message::builder().from(from).subject(subject(now));
    for address in &config.addresses {
        let to: Mailbox = address
            .parse()
            .with_context(|| format!("Invalid destination address: {}", address))?;
        builder = builder.to(to);
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .context("Failed to build report email")
}

/// SMTP relay with login credentials, upgrading to TLS when the server offers it.
pub fn smtp_transport(config: &AppConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
    let tls = TlsParameters::new(config.smtp.server.clone())
        .context("Failed to set up TLS parameters")?;

    let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp.server)
        .port(config.smtp.port)
        .tls(Tls::Opportunistic(tls))
        .credentials(Credentials::new(
            config.smtp.username.clone(),
            config.smtp.password.clone(),
        ))
        .build();

    Ok(transport)
}

/// Email the report when sending is enabled, otherwise say why nothing was sent.
pub async fn dispatch<T>(
    config: &AppConfig,
    transport: &T,
    report: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    if !config.send {
        println!("not sending (set SEND env var to 1 to send)");
        return Ok(());
    }

    let message = build_message(config, report, now)?;
    transport
        .send(message)
        .await
        .context("Failed to send report email")?;

    info!("Sent report to {} address(es)", config.addresses.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SmtpConfig;
    use chrono::TimeZone;
    use lettre::transport::stub::AsyncStubTransport;
    use url::Url;

    fn config(send: bool) -> AppConfig {
        AppConfig {
            token: "secret".into(),
            organization: "acme".into(),
            repositories: vec!["api".into()],
            candidate_reviewers: vec!["@alice".into()],
            required_reviewers: 2,
            api_url: Url::parse("https://api.github.com").unwrap(),
            smtp: SmtpConfig {
                server: "smtp.example.com".into(),
                port: 587,
                username: "bot".into(),
                password: "hunter2".into(),
            },
            from_address: "bot@example.com".into(),
            addresses: vec!["team@example.com".into(), "lead@example.com".into()],
            send,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn subject_has_date() {
        assert_eq!(subject(now()), "Open PRs: 01 Jun 2024");
    }

    #[test]
    fn message_addresses_everyone() {
        let message = build_message(&config(true), "report", now()).unwrap();
        let envelope = message.envelope();

        assert_eq!(envelope.to().len(), 2);
        assert_eq!(
            envelope.from().map(|a| a.to_string()),
            Some("bot@example.com".to_string())
        );
    }

    #[test]
    fn invalid_address_fails() {
        let mut config = config(true);
        config.addresses = vec!["not an address".into()];
        assert!(build_message(&config, "body", now()).is_err());
    }

    #[tokio::test]
    async fn sends_when_enabled() {
        let transport = AsyncStubTransport::new_ok();

        dispatch(&config(true), &transport, "Open pull requests:      3", now())
            .await
            .unwrap();

        let sent = transport.messages().await;
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        assert_eq!(envelope.to().len(), 2);
        assert!(raw.contains("Subject: Open PRs: 01 Jun 2024"));
        assert!(raw.contains("Open pull requests:      3"));
    }

    #[tokio::test]
    async fn nothing_sent_when_disabled() {
        let transport = AsyncStubTransport::new_ok();

        dispatch(&config(false), &transport, "report", now())
            .await
            .unwrap();

        assert!(transport.messages().await.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let transport = AsyncStubTransport::new_error();
        let result = dispatch(&config(true), &transport, "report", now()).await;
        assert!(result.is_err());
    }
}
