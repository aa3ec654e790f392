use crate::config::{Config, ConfigError};
use dotenv::dotenv;
use log::info;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_VAR: &str = "CERT_MAILER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Written on first run. Every `[SMTP]` key must be edited before sending.
pub const DEFAULT_CONFIG: &str = r#"# cert-mailer configuration

[SMTP]
server = "smtp.example.com"
# 465 for implicit TLS; the STARTTLS fallback reuses the same port
port = 465
username = "your_username"
password = "your_password"
sender_email = "sender@example.com"
use_tls = true

[TEST]
# When enabled, every message is delivered to recipient_email instead of the roster address
recipient_name = "測試姓名"
recipient_email = "test_recipient@example.com"
enable_test_mode = false

[CAMPAIGN]
course_name = "2025 未來造浪 AI Studio"
certificate_dir = "data/certificates"
contact_file = "data/contacts.csv"
name_column = "姓名"
email_column = "電子郵件"
# "certificate" or "grades"
template = "certificate"
send_delay_secs = 2
signature = "自主學習與資訊專業成長教學團隊"
contact_email = "team@example.com"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Existing,
    Created,
}

pub fn config_path() -> PathBuf {
    dotenv().ok();

    env::var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Writes the placeholder config when `path` does not exist yet. Never
/// touches an existing file.
pub fn ensure_config_exists(path: &Path) -> Result<Bootstrap, ConfigError> {
    if path.exists() {
        return Ok(Bootstrap::Existing);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Created default config at {}", path.display());

    Ok(Bootstrap::Created)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = Config::load(path)?;
    info!(
        "Loaded config from {} (server {}:{}, use_tls = {})",
        path.display(),
        config.smtp.server,
        config.smtp.port,
        config.smtp.use_tls
    );
    Ok(config)
}
