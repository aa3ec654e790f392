use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cert_mailer::campaign::{CampaignRunner, DeliveryMode, MessageComposer};
use cert_mailer::config::CampaignConfig;
use cert_mailer::roster::{CertificateIndex, ContactRecord};
use cert_mailer::smtp::{MailDispatcher, Security, Submit};
use lettre::Message;

/// One submission as seen by the mock server.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub security: Security,
    pub to: Vec<String>,
    pub raw: Vec<u8>,
}

/// Accepts everything except mail to `refused`, which fails on both
/// implicit TLS and STARTTLS.
#[derive(Default)]
pub struct RecordingSubmitter {
    refused: HashSet<String>,
    attempts: Mutex<Vec<Attempt>>,
}

impl RecordingSubmitter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refusing(addresses: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            refused: addresses.iter().map(|a| a.to_string()).collect(),
            attempts: Mutex::new(Vec::new()),
        })
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    /// Recipients of accepted submissions, in order.
    pub fn delivered_to(&self) -> Vec<String> {
        self.attempts()
            .into_iter()
            .filter(|a| !a.to.iter().any(|to| self.refused.contains(to)))
            .flat_map(|a| a.to)
            .collect()
    }
}

#[async_trait]
impl Submit for RecordingSubmitter {
    async fn submit(&self, security: Security, message: &Message) -> Result<(), String> {
        let to: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();
        let refused = to.iter().any(|address| self.refused.contains(address));
        self.attempts.lock().unwrap().push(Attempt {
            security,
            to,
            raw: message.formatted(),
        });

        if refused {
            Err(format!("{} connection refused", security))
        } else {
            Ok(())
        }
    }
}

pub fn contact(row_number: usize, name: &str, email: &str) -> ContactRecord {
    ContactRecord {
        row_number,
        name: name.to_string(),
        email: email.to_string(),
        fields: Vec::new(),
    }
}

/// Writes a placeholder PDF per name and indexes them.
pub fn certificates(dir: &Path, names: &[&str]) -> CertificateIndex {
    names
        .iter()
        .map(|name| {
            let path = dir.join(format!("Course-{}.pdf", name));
            fs::write(&path, b"%PDF-1.4").unwrap();
            (name.to_string(), path)
        })
        .collect()
}

pub fn runner(
    mode: DeliveryMode,
    submitter: Arc<RecordingSubmitter>,
    certificates: CertificateIndex,
) -> CampaignRunner {
    let dispatcher =
        MailDispatcher::with_submitter("sender@example.com".parse().unwrap(), submitter);
    CampaignRunner::new(
        mode,
        MessageComposer::new(&CampaignConfig::default()),
        dispatcher,
        certificates,
    )
    .with_delay(Duration::ZERO)
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
