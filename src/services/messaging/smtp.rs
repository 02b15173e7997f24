use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Mailer, OutgoingEmail};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    from_name: String,
}

impl SmtpMailer {
    pub fn new(
        server: &str,
        port: u16,
        username: String,
        password: String,
        from_name: String,
    ) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)
            .with_context(|| format!("invalid SMTP relay: {server}"))?
            .port(port)
            .credentials(Credentials::new(username.clone(), password))
            .build();

        Ok(Self {
            transport,
            from_address: username,
            from_name,
        })
    }

    fn sender(&self) -> anyhow::Result<Mailbox> {
        let address = self
            .from_address
            .parse()
            .with_context(|| format!("invalid sender address: {:?}", self.from_address))?;
        Ok(Mailbox::new(Some(self.from_name.clone()), address))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        let recipient: Mailbox = email
            .to
            .parse()
            .with_context(|| format!("invalid recipient address: {:?}", email.to))?;

        let message = Message::builder()
            .from(self.sender()?)
            .to(recipient)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .context("failed to build email")?;

        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;

        Ok(())
    }
}
