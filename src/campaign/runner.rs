use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};
use tokio::time::sleep;

use crate::campaign::composer::MessageComposer;
use crate::campaign::mode::DeliveryMode;
use crate::campaign::summary::{
    CampaignSummary, DeliveryOutcome, FailReason, OutcomeStatus, SkipReason,
};
use crate::roster::{CertificateIndex, ContactRecord};
use crate::smtp::MailDispatcher;

pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(2);

/// Walks the roster one contact at a time.
pub struct CampaignRunner {
    mode: DeliveryMode,
    composer: MessageComposer,
    dispatcher: MailDispatcher,
    certificates: CertificateIndex,
    delay: Duration,
}

impl CampaignRunner {
    pub fn new(
        mode: DeliveryMode,
        composer: MessageComposer,
        dispatcher: MailDispatcher,
        certificates: CertificateIndex,
    ) -> Self {
        Self {
            mode,
            composer,
            dispatcher,
            certificates,
            delay: DEFAULT_SEND_DELAY,
        }
    }

    /// Pause between a send attempt and the next row.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn run(&self, contacts: &[ContactRecord]) -> CampaignSummary {
        match &self.mode {
            DeliveryMode::Test { name, email } => {
                info!("Test mode: every message goes to {} <{}>", name, email)
            }
            DeliveryMode::Live => info!("Live mode: sending to roster addresses"),
        }
        if contacts.is_empty() {
            info!("Roster is empty, nothing to send");
        }

        let mut summary = CampaignSummary::new();
        let last = contacts.len().saturating_sub(1);

        for (index, contact) in contacts.iter().enumerate() {
            let outcome = self.process(contact).await;
            let attempted = outcome.attempted_email.is_some();
            summary = summary.record(&outcome);

            if attempted && index < last && !self.delay.is_zero() {
                info!("Waiting {:?} before the next send", self.delay);
                sleep(self.delay).await;
            }
        }

        summary.finish()
    }

    /// Processes one row. Never fails: every problem becomes an outcome.
    pub async fn process(&self, contact: &ContactRecord) -> DeliveryOutcome {
        let row = contact.row_number;
        let name = contact.name.trim();
        let email = contact.email.trim();
        let outcome = |attempted_email: Option<String>,
                       certificate: Option<PathBuf>,
                       status: OutcomeStatus| DeliveryOutcome {
            row_number: row,
            recipient_name: name.to_string(),
            recipient_email: email.to_string(),
            attempted_email,
            certificate,
            status,
        };

        if name.is_empty() || email.is_empty() {
            warn!(
                "Row {}: name ('{}') or email ('{}') is blank, skipping",
                row, name, email
            );
            return outcome(None, None, OutcomeStatus::Skipped(SkipReason::BlankField));
        }

        let Some(certificate) = self.certificates.get(name) else {
            warn!("Row {}: no certificate found for {}, skipping", row, name);
            return outcome(None, None, OutcomeStatus::Skipped(SkipReason::NoCertificate));
        };

        let to = self.mode.destination(email);
        if self.mode.is_test() {
            info!("Row {}: sending {}'s message to test inbox {}", row, name, to);
        } else {
            info!("Row {}: sending to {} <{}>", row, name, to);
        }

        let composed = self.composer.compose(&self.mode, name, &contact.fields);
        let status = match self
            .dispatcher
            .send(&composed.subject, &composed.body, to, Some(certificate))
            .await
        {
            Ok(sent) => OutcomeStatus::Sent(sent.security),
            Err(e) if e.is_transport() => {
                OutcomeStatus::Failed(FailReason::Delivery(e.to_string()))
            }
            Err(e) => {
                error!("Row {}: could not prepare message for {}: {}", row, name, e);
                OutcomeStatus::Failed(FailReason::Unexpected(e.to_string()))
            }
        };

        outcome(Some(to.to_string()), Some(certificate.to_path_buf()), status)
    }
}
