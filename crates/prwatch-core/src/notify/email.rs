//! SMTP delivery of a PDF as an attachment (STARTTLS + login).

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::path::Path;
use std::sync::Arc;

use crate::config::EmailConfig;

pub const DEFAULT_SUBJECT: &str = "New MoSPI PDF Available";

/// Hands a finished message to a mail transport.
trait MailSender: Send + Sync {
    fn send(&self, message: &Message) -> Result<()>;
}

/// STARTTLS relay from the config; connects per message.
struct SmtpRelay {
    cfg: EmailConfig,
}

impl MailSender for SmtpRelay {
    fn send(&self, message: &Message) -> Result<()> {
        let mailer = SmtpTransport::starttls_relay(&self.cfg.smtp_server)
            .with_context(|| format!("SMTP relay {}", self.cfg.smtp_server))?
            .port(self.cfg.smtp_port)
            .credentials(Credentials::new(
                self.cfg.from.clone(),
                self.cfg.password.clone(),
            ))
            .build();
        mailer
            .send(message)
            .with_context(|| format!("send mail to {}", self.cfg.to))?;
        Ok(())
    }
}

/// Any other lettre transport (stub, file, sendmail).
struct LettreSender<T>(T);

impl<T> MailSender for LettreSender<T>
where
    T: Transport + Send + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    fn send(&self, message: &Message) -> Result<()> {
        self.0.send(message).context("send mail")?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmailNotifier {
    cfg: EmailConfig,
    sender: Arc<dyn MailSender>,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier").field("cfg", &self.cfg).finish()
    }
}

impl EmailNotifier {
    /// Notifier sending through the configured SMTP server.
    pub fn new(cfg: EmailConfig) -> Self {
        let sender = Arc::new(SmtpRelay { cfg: cfg.clone() });
        Self { cfg, sender }
    }

    /// Notifier sending through `transport` instead of SMTP; the config still
    /// supplies the addresses.
    pub fn with_transport<T>(cfg: EmailConfig, transport: T) -> Self
    where
        T: Transport + Send + Sync + 'static,
        T::Error: std::error::Error + Send + Sync + 'static,
    {
        Self {
            cfg,
            sender: Arc::new(LettreSender(transport)),
        }
    }

    /// Mail `pdf_path` to the configured recipient.
    pub fn send_pdf(&self, subject: &str, body: &str, pdf_path: &Path) -> Result<()> {
        let data =
            std::fs::read(pdf_path).with_context(|| format!("read {}", pdf_path.display()))?;
        let filename = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        let message = build_message(&self.cfg, subject, body, &filename, data)?;
        self.sender.send(&message)?;
        tracing::info!(to = %self.cfg.to, file = %filename, "email sent");
        Ok(())
    }
}

/// Build the message: plain-text body plus one `application/pdf` attachment.
pub fn build_message(
    cfg: &EmailConfig,
    subject: &str,
    body: &str,
    filename: &str,
    data: Vec<u8>,
) -> Result<Message> {
    let from: Mailbox = cfg
        .from
        .parse()
        .with_context(|| format!("invalid EMAIL_FROM: {}", cfg.from))?;
    let to: Mailbox = cfg
        .to
        .parse()
        .with_context(|| format!("invalid EMAIL_TO: {}", cfg.to))?;
    let pdf_type = ContentType::parse("application/pdf").context("content type")?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(body.to_string()))
                .singlepart(Attachment::new(filename.to_string()).body(data, pdf_type)),
        )
        .context("build mail message")?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettre::transport::stub::StubTransport;

    fn cfg() -> EmailConfig {
        EmailConfig {
            from: "watcher@example.org".into(),
            to: "desk@example.org".into(),
            password: "secret".into(),
            smtp_server: "smtp.example.org".into(),
            smtp_port: 587,
        }
    }

    #[test]
    fn message_has_headers_and_attachment() {
        let msg = build_message(
            &cfg(),
            DEFAULT_SUBJECT,
            "A new PDF has been uploaded:\nhttps://mospi.gov.in/a.pdf",
            "a.pdf",
            b"%PDF-1.4".to_vec(),
        )
        .unwrap();
        let raw = String::from_utf8_lossy(&msg.formatted()).into_owned();
        assert!(raw.contains("Subject: New MoSPI PDF Available"));
        assert!(raw.contains("From: watcher@example.org"));
        assert!(raw.contains("To: desk@example.org"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("a.pdf"));
    }

    #[test]
    fn invalid_address_is_error() {
        let mut bad = cfg();
        bad.to = "not an address".into();
        assert!(build_message(&bad, "s", "b", "a.pdf", Vec::new()).is_err());
    }

    #[test]
    fn missing_file_is_error() {
        let n = EmailNotifier::new(cfg());
        let err = n
            .send_pdf("s", "b", Path::new("/nonexistent/prwatch/x.pdf"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("read /nonexistent/prwatch/x.pdf"));
    }

    #[test]
    fn injected_transport_receives_message() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("bulletin.pdf");
        std::fs::write(&pdf, b"%PDF-1.4 bulletin").unwrap();

        let stub = StubTransport::new_ok();
        let n = EmailNotifier::with_transport(cfg(), stub.clone());
        n.send_pdf(DEFAULT_SUBJECT, "A new PDF has been uploaded:\nhttps://x/b.pdf", &pdf)
            .unwrap();

        let sent = stub.messages();
        assert_eq!(sent.len(), 1);
        let (envelope, raw) = &sent[0];
        assert_eq!(envelope.to().len(), 1);
        assert_eq!(envelope.to()[0].to_string(), "desk@example.org");
        assert!(raw.contains("Subject: New MoSPI PDF Available"));
        assert!(raw.contains("bulletin.pdf"));
    }

    #[test]
    fn transport_failure_is_error() {
        let n = EmailNotifier::with_transport(cfg(), StubTransport::new_error());
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("a.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        assert!(n.send_pdf("s", "b", &pdf).is_err());
    }
}
