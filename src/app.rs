use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info};

use crate::campaign::{CampaignRunner, CampaignSummary, DeliveryMode, MessageComposer};
use crate::config::loader::{ensure_config_exists, load_config, Bootstrap};
use crate::roster::contacts::{load_contacts, Columns};
use crate::roster::CertificateIndex;
use crate::smtp::MailDispatcher;

/// How a run ended, short of a fatal error.
#[derive(Debug)]
pub enum RunStatus {
    /// No config existed; a placeholder was written to this path.
    ConfigCreated(PathBuf),
    Completed(CampaignSummary),
}

impl RunStatus {
    /// Whether the process should exit with status 0.
    pub fn success(&self) -> bool {
        matches!(self, RunStatus::Completed(_))
    }
}

/// Startup and campaign, driven by the config file at `path`.
///
/// Startup happens in two phases: make sure a config exists, then validate
/// it. Any error returned here is fatal and happens before the first row.
pub async fn run_with(path: &Path) -> Result<RunStatus, Box<dyn Error>> {
    if ensure_config_exists(path)? == Bootstrap::Created {
        error!(
            "No config found. A default one was written to {}; edit the [SMTP] section and run again.",
            path.display()
        );
        return Ok(RunStatus::ConfigCreated(path.to_path_buf()));
    }
    let config = load_config(path)?;
    let mode = DeliveryMode::from_config(&config.test)?;

    let campaign = &config.campaign;
    let contacts = load_contacts(
        &campaign.contact_file,
        &Columns {
            name: &campaign.name_column,
            email: &campaign.email_column,
        },
    )?;
    let certificates = CertificateIndex::build(&campaign.certificate_dir)?;
    let dispatcher = MailDispatcher::new(&config.smtp)?;

    let runner = CampaignRunner::new(
        mode,
        MessageComposer::new(campaign),
        dispatcher,
        certificates,
    )
    .with_delay(Duration::from_secs(campaign.send_delay_secs));

    let summary = runner.run(&contacts).await;
    info!(
        "Campaign finished: {} sent, {} failed, {} skipped",
        summary.sent, summary.failed, summary.skipped
    );
    Ok(RunStatus::Completed(summary))
}
