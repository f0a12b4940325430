use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Alert, Notifier};
use crate::config::SmtpConfig;
use crate::errors::NotifyError;

/// Authenticated SMTP submission over STARTTLS.
pub struct EmailNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        let from = config.from.parse::<Mailbox>()?;
        let to = config
            .to
            .iter()
            .map(|addr| addr.parse::<Mailbox>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    /// Multipart message with the HTML body, one envelope for all recipients.
    fn build_message(&self, alert: &Alert) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(alert.subject.as_str());
        for rcpt in &self.to {
            builder = builder.to(rcpt.clone());
        }

        let message = builder.multipart(MultiPart::mixed().singlepart(SinglePart::html(alert.html.clone())))?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        let message = self.build_message(alert)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
