use std::path::Path;
use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use log::{error, info, warn};

use crate::config::SmtpConfig;
use crate::smtp::transport::{SmtpSubmitter, Submit};
use crate::smtp::{DeliveryError, Security, Sent};

const PDF_CONTENT_TYPE: &str = "application/pdf";

pub struct MailDispatcher {
    sender: Mailbox,
    submitter: Arc<dyn Submit>,
}

impl MailDispatcher {
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let sender = parse_mailbox(&config.sender_email)?;
        Ok(Self::with_submitter(sender, Arc::new(SmtpSubmitter::new(config))))
    }

    pub fn with_submitter(sender: Mailbox, submitter: Arc<dyn Submit>) -> Self {
        Self { sender, submitter }
    }

    /// Delivers one message, trying implicit TLS first and STARTTLS once if
    /// that fails. A missing attachment file is not an error; the message
    /// goes out without it.
    pub async fn send(
        &self,
        subject: &str,
        body: &str,
        to_address: &str,
        attachment: Option<&Path>,
    ) -> Result<Sent, DeliveryError> {
        let message = self.build_message(subject, body, to_address, attachment).await?;

        let implicit_tls = match self.submitter.submit(Security::ImplicitTls, &message).await {
            Ok(()) => {
                info!("Mail delivered to {} over {}", to_address, Security::ImplicitTls);
                return Ok(Sent {
                    security: Security::ImplicitTls,
                    fallback_reason: None,
                });
            }
            Err(e) => e,
        };

        warn!(
            "Implicit TLS delivery to {} failed: {}. Retrying with STARTTLS",
            to_address, implicit_tls
        );

        match self.submitter.submit(Security::StartTls, &message).await {
            Ok(()) => {
                info!("Mail delivered to {} over {}", to_address, Security::StartTls);
                Ok(Sent {
                    security: Security::StartTls,
                    fallback_reason: Some(implicit_tls),
                })
            }
            Err(starttls) => {
                error!(
                    "Delivery to {} failed over both implicit TLS and STARTTLS: {}",
                    to_address, starttls
                );
                Err(DeliveryError::Exhausted {
                    implicit_tls,
                    starttls,
                })
            }
        }
    }

    pub async fn build_message(
        &self,
        subject: &str,
        body: &str,
        to_address: &str,
        attachment: Option<&Path>,
    ) -> Result<Message, DeliveryError> {
        let to = parse_mailbox(to_address)?;

        let mut parts = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(body.to_string()),
        );

        match attachment {
            Some(path) if path.is_file() => {
                let content = tokio::fs::read(path)
                    .await
                    .map_err(|source| DeliveryError::Attachment {
                        path: path.to_path_buf(),
                        source,
                    })?;
                let filename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                parts = parts.singlepart(
                    Attachment::new(filename).body(content, ContentType::parse(PDF_CONTENT_TYPE)?),
                );
            }
            Some(path) => {
                warn!(
                    "Attachment {} not found, sending to {} without it",
                    path.display(),
                    to_address
                );
            }
            None => {}
        }

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(subject)
            .multipart(parts)?;
        Ok(message)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .trim()
        .parse()
        .map_err(|source| DeliveryError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailparse::MailHeaderMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Fails the first `failures` submissions, records every attempt.
    struct Scripted {
        failures: usize,
        attempts: Mutex<Vec<Security>>,
    }

    impl Scripted {
        fn failing(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                failures,
                attempts: Mutex::new(Vec::new()),
            })
        }

        fn attempts(&self) -> Vec<Security> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Submit for Scripted {
        async fn submit(&self, security: Security, _message: &Message) -> Result<(), String> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(security);
            if attempts.len() <= self.failures {
                Err(format!("{} refused", security))
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher(submitter: Arc<Scripted>) -> MailDispatcher {
        MailDispatcher::with_submitter("sender@example.com".parse().unwrap(), submitter)
    }

    #[tokio::test]
    async fn implicit_tls_success_makes_one_attempt() {
        let submitter = Scripted::failing(0);
        let sent = dispatcher(submitter.clone())
            .send("Hi", "Body", "alice@example.com", None)
            .await
            .unwrap();

        assert_eq!(sent.security, Security::ImplicitTls);
        assert_eq!(sent.fallback_reason, None);
        assert_eq!(submitter.attempts(), vec![Security::ImplicitTls]);
    }

    #[tokio::test]
    async fn falls_back_to_starttls_once() {
        let submitter = Scripted::failing(1);
        let sent = dispatcher(submitter.clone())
            .send("Hi", "Body", "alice@example.com", None)
            .await
            .unwrap();

        assert_eq!(sent.security, Security::StartTls);
        assert_eq!(sent.fallback_reason.as_deref(), Some("implicit TLS refused"));
        assert_eq!(
            submitter.attempts(),
            vec![Security::ImplicitTls, Security::StartTls]
        );
    }

    #[tokio::test]
    async fn both_attempts_failing_is_exhausted() {
        let submitter = Scripted::failing(2);
        let err = dispatcher(submitter.clone())
            .send("Hi", "Body", "alice@example.com", None)
            .await
            .unwrap_err();

        assert!(err.is_transport());
        match err {
            DeliveryError::Exhausted {
                implicit_tls,
                starttls,
            } => {
                assert_eq!(implicit_tls, "implicit TLS refused");
                assert_eq!(starttls, "STARTTLS refused");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(submitter.attempts().len(), 2);
    }

    #[tokio::test]
    async fn invalid_recipient_never_connects() {
        let submitter = Scripted::failing(0);
        let err = dispatcher(submitter.clone())
            .send("Hi", "Body", "not an address", None)
            .await
            .unwrap_err();

        assert!(matches!(err, DeliveryError::InvalidAddress { .. }));
        assert!(!err.is_transport());
        assert!(submitter.attempts().is_empty());
    }

    #[tokio::test]
    async fn attaches_pdf_under_its_base_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Course-Alice.pdf");
        std::fs::write(&path, b"%PDF-1.4 fake").unwrap();

        let message = dispatcher(Scripted::failing(0))
            .build_message("證書", "您好", "alice@example.com", Some(path.as_path()))
            .await
            .unwrap();
        let raw = message.formatted();
        let parsed = mailparse::parse_mail(&raw).unwrap();

        assert_eq!(parsed.subparts.len(), 2);
        assert_eq!(parsed.subparts[0].ctype.mimetype, "text/plain");
        assert_eq!(parsed.subparts[0].get_body().unwrap().trim_end(), "您好");
        let attachment = &parsed.subparts[1];
        assert_eq!(attachment.ctype.mimetype, "application/pdf");
        assert_eq!(attachment.get_body_raw().unwrap(), b"%PDF-1.4 fake");
        let disposition = attachment.get_content_disposition();
        assert_eq!(
            disposition.params.get("filename").map(String::as_str),
            Some("Course-Alice.pdf")
        );
        assert_eq!(
            parsed.get_headers().get_first_value("Subject").as_deref(),
            Some("證書")
        );
    }

    #[tokio::test]
    async fn missing_attachment_sends_text_only() {
        let dir = TempDir::new().unwrap();
        let submitter = Scripted::failing(0);
        let dispatcher = dispatcher(submitter.clone());
        let missing = dir.path().join("Course-Ghost.pdf");

        let message = dispatcher
            .build_message("Hi", "Body", "alice@example.com", Some(missing.as_path()))
            .await
            .unwrap();
        let raw = message.formatted();
        let parsed = mailparse::parse_mail(&raw).unwrap();
        assert_eq!(parsed.subparts.len(), 1);

        let sent = dispatcher
            .send("Hi", "Body", "alice@example.com", Some(missing.as_path()))
            .await;
        assert!(sent.is_ok());
    }
}
