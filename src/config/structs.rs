use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "SMTP")]
    pub smtp: SmtpConfig,
    #[serde(rename = "TEST", default)]
    pub test: TestConfig,
    #[serde(rename = "CAMPAIGN", default)]
    pub campaign: CampaignConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_email: String,
    pub use_tls: bool,
}

/// Redirection settings. Absent keys leave test mode disabled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestConfig {
    #[serde(default)]
    pub recipient_name: String,
    #[serde(default)]
    pub recipient_email: String,
    #[serde(default)]
    pub enable_test_mode: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    #[default]
    Certificate,
    Grades,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    pub course_name: String,
    pub certificate_dir: PathBuf,
    pub contact_file: PathBuf,
    pub name_column: String,
    pub email_column: String,
    pub template: TemplateKind,
    pub send_delay_secs: u64,
    pub signature: String,
    pub contact_email: String,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            course_name: "2025 未來造浪 AI Studio".to_string(),
            certificate_dir: PathBuf::from("data/certificates"),
            contact_file: PathBuf::from("data/contacts.csv"),
            name_column: "姓名".to_string(),
            email_column: "電子郵件".to_string(),
            template: TemplateKind::Certificate,
            send_delay_secs: 2,
            signature: "自主學習與資訊專業成長教學團隊".to_string(),
            contact_email: "team@example.com".to_string(),
        }
    }
}
