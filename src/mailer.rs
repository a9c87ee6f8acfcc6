use std::time::Duration;

use anyhow::{bail, Context};
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParametersBuilder},
        response::Response,
    },
    Message, SmtpTransport, Transport,
};
use log::debug;

use crate::{config::Config, report::ComposedReport};

/// Bound on the handshake and the send call so neither can hang forever.
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Wraps one SMTP transport built from the config, used for the startup
/// connectivity check and the single send of a run.
pub struct Mailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let transport = build_transport(config)?;
        let address = config.email.parse().with_context(|| {
            format!(
                "Configured sender address {:?} is not a valid email",
                config.email
            )
        })?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);
        Ok(Self { transport, from })
    }

    /// One blocking handshake against the configured endpoint. Runs before
    /// any questionnaire prompt so a dead server fails the run early.
    pub fn verify(&self) -> anyhow::Result<()> {
        debug!("Verifying SMTP connectivity");
        let reachable = self
            .transport
            .test_connection()
            .context("Failed to connect to the SMTP server")?;
        if !reachable {
            bail!("SMTP server refused the connection check");
        }
        Ok(())
    }

    /// Dispatches one plain-text mail to every recipient. No retry; a
    /// failure here ends the run with a visible error.
    pub fn send(&self, report: &ComposedReport, recipients: &[String]) -> anyhow::Result<Response> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&report.subject);

        for recipient in recipients {
            let mailbox: Mailbox = recipient.parse().with_context(|| {
                format!("Recipient {recipient:?} is not a valid email address")
            })?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .header(ContentType::TEXT_PLAIN)
            .body(report.body.clone())
            .context("Failed to build mail message")?;

        debug!("Sending mail to {} recipient(s)", recipients.len());
        self.transport
            .send(&message)
            .context("Failed to send mail")
    }
}

fn build_transport(config: &Config) -> anyhow::Result<SmtpTransport> {
    let credentials = Credentials::new(config.email.clone(), config.password.clone());

    let mut builder = if config.ssl {
        SmtpTransport::starttls_relay(&config.smtp_server).with_context(|| {
            format!(
                "Failed to set up STARTTLS relay for {:?}",
                config.smtp_server
            )
        })?
    } else {
        // Unencrypted connection, only sensible against a trusted local relay
        SmtpTransport::builder_dangerous(&config.smtp_server)
    };

    builder = builder
        .port(config.smtp_port)
        .credentials(credentials)
        .timeout(Some(SMTP_TIMEOUT));

    if config.ssl && config.self_signed {
        let tls_parameters = TlsParametersBuilder::new(config.smtp_server.clone())
            .dangerous_accept_invalid_certs(true)
            .dangerous_accept_invalid_hostnames(true)
            .build()
            .context("Failed to build TLS parameters")?;
        builder = builder.tls(Tls::Required(tls_parameters));
    }

    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_builds_for_encrypted_config() {
        let config = Config {
            smtp_server: "mail.example.com".to_string(),
            email: "me@example.com".to_string(),
            ..Config::default()
        };

        assert!(build_transport(&config).is_ok());
    }

    #[test]
    fn transport_builds_for_self_signed_config() {
        let config = Config {
            smtp_server: "mail.example.com".to_string(),
            self_signed: true,
            ..Config::default()
        };

        assert!(build_transport(&config).is_ok());
    }

    #[test]
    fn transport_builds_for_unencrypted_config() {
        let config = Config {
            smtp_server: "localhost".to_string(),
            ssl: false,
            ..Config::default()
        };

        assert!(build_transport(&config).is_ok());
    }

    #[test]
    fn mailer_rejects_invalid_sender_address() {
        let config = Config {
            smtp_server: "mail.example.com".to_string(),
            email: "not an address".to_string(),
            ..Config::default()
        };

        assert!(Mailer::new(&config).is_err());
    }
}
