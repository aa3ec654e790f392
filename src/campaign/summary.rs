use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::smtp::Security;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    BlankField,
    NoCertificate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// Both connection attempts failed.
    Delivery(String),
    /// The message could not be prepared.
    Unexpected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Sent(Security),
    Skipped(SkipReason),
    Failed(FailReason),
}

/// Result of processing one roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub row_number: usize,
    pub recipient_name: String,
    /// The roster address, before any test-mode redirection.
    pub recipient_email: String,
    /// The address a send was attempted to, if one was.
    pub attempted_email: Option<String>,
    pub certificate: Option<PathBuf>,
    pub status: OutcomeStatus,
}

impl DeliveryOutcome {
    fn describe(&self) -> Option<String> {
        let reason = match &self.status {
            OutcomeStatus::Sent(_) => return None,
            OutcomeStatus::Skipped(SkipReason::BlankField) => "blank name or email".to_string(),
            OutcomeStatus::Skipped(SkipReason::NoCertificate) => "no certificate".to_string(),
            OutcomeStatus::Failed(FailReason::Delivery(e)) => format!("send failed: {}", e),
            OutcomeStatus::Failed(FailReason::Unexpected(e)) => format!("unexpected error: {}", e),
        };
        Some(format!(
            "row {}: {} <{}> - {}",
            self.row_number, self.recipient_name, self.recipient_email, reason
        ))
    }
}

/// Running tally for one campaign.
#[derive(Debug, Clone)]
pub struct CampaignSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
    pub issues: Vec<String>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl Default for CampaignSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignSummary {
    pub fn new() -> Self {
        Self {
            sent: 0,
            failed: 0,
            skipped: 0,
            issues: Vec::new(),
            started_at: Local::now(),
            finished_at: None,
        }
    }

    pub fn record(mut self, outcome: &DeliveryOutcome) -> Self {
        match outcome.status {
            OutcomeStatus::Sent(_) => self.sent += 1,
            OutcomeStatus::Skipped(_) => self.skipped += 1,
            OutcomeStatus::Failed(_) => self.failed += 1,
        }
        if let Some(issue) = outcome.describe() {
            self.issues.push(issue);
        }
        self
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Local::now());
        self
    }

    pub fn total(&self) -> usize {
        self.sent + self.failed + self.skipped
    }
}

impl fmt::Display for CampaignSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(30);
        writeln!(f, "{} Delivery summary {}", rule, rule)?;
        writeln!(f, "Started:  {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(finished) = self.finished_at {
            writeln!(f, "Finished: {}", finished.format("%Y-%m-%d %H:%M:%S"))?;
        }
        writeln!(f, "Sent:     {}", self.sent)?;
        writeln!(f, "Failed:   {}", self.failed)?;
        writeln!(f, "Skipped:  {} (incomplete data or no certificate)", self.skipped)?;

        if !self.issues.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- Skipped or failed rows ---")?;
            for issue in &self.issues {
                writeln!(f, "  - {}", issue)?;
            }
        }
        write!(f, "{}", "=".repeat(78))
    }
}
