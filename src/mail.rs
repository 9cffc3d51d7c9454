// Transactional email sender
// Fire-and-forget welcome and cancellation messages over SMTP

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

/// Outbound mailer built once at startup and shared through app state
///
/// When the SMTP environment is not configured the mailer is disabled and
/// every send is skipped with a debug log, so development and tests run
/// without an SMTP server.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Option<Mailbox>,
}

impl Mailer {
    /// Builds the mailer from SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and
    /// MAIL_FROM; returns a disabled mailer when any of them is absent.
    pub fn from_env() -> Self {
        let host = std::env::var("SMTP_HOST").ok();
        let username = std::env::var("SMTP_USERNAME").ok();
        let password = std::env::var("SMTP_PASSWORD").ok();
        let from = std::env::var("MAIL_FROM").ok();

        let (host, username, password, from) = match (host, username, password, from) {
            (Some(h), Some(u), Some(p), Some(f)) => (h, u, p, f),
            _ => {
                debug!("SMTP environment not configured; mailer disabled");
                return Self::disabled();
            }
        };

        let from = match from.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("MAIL_FROM is not a valid mailbox ({}); mailer disabled", e);
                return Self::disabled();
            }
        };

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::relay(&host) {
            Ok(builder) => builder.credentials(Credentials::new(username, password)).build(),
            Err(e) => {
                warn!("Failed to build SMTP transport ({}); mailer disabled", e);
                return Self::disabled();
            }
        };

        Self {
            transport: Some(transport),
            from: Some(from),
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: None,
        }
    }

    /// Sends the signup welcome email
    pub fn send_welcome(&self, email: &str, name: &str) {
        self.send(
            email,
            "Thanks for joining us!",
            format!(
                "Welcome, {}! Your account has been created! \
                 Let us know how you get along with the app.",
                name
            ),
        );
    }

    /// Sends the account-cancellation email
    pub fn send_cancellation(&self, email: &str, name: &str) {
        self.send(
            email,
            "We're sorry to see you go!",
            format!(
                "Hi, {}! It seems like you're about to delete your profile! \
                 We'd appreciate if you tell us why you've decided to leave. \
                 You can reply to this email mentioning the reason. \
                 However, you can come back again whenever you want. \
                 Just create an account again!",
                name
            ),
        );
    }

    /// Fire-and-forget send: the message is spawned onto the runtime and
    /// failures are logged, never surfaced to the request that triggered it.
    fn send(&self, to: &str, subject: &str, body: String) {
        let (transport, from) = match (&self.transport, &self.from) {
            (Some(t), Some(f)) => (t.clone(), f.clone()),
            _ => {
                debug!("Mailer disabled; skipping '{}' to {}", subject, to);
                return;
            }
        };

        let to_mailbox = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(e) => {
                warn!("Refusing to mail invalid address {}: {}", to, e);
                return;
            }
        };

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject);

        let message = match message.body(body) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to build email: {}", e);
                return;
            }
        };

        let subject = subject.to_string();
        let to = to.to_string();
        tokio::spawn(async move {
            match transport.send(message).await {
                Ok(_) => debug!("Sent '{}' to {}", subject, to),
                Err(e) => warn!("Failed to send '{}' to {}: {}", subject, to, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_mailer_skips_sends() {
        // Must not panic or require a runtime connection
        let mailer = Mailer::disabled();
        mailer.send_welcome("someone@example.com", "Someone");
        mailer.send_cancellation("someone@example.com", "Someone");
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_dropped() {
        let mailer = Mailer::disabled();
        mailer.send_welcome("not-an-email", "Nobody");
    }
}
