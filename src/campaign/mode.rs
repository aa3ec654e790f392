use lettre::Address;

use crate::config::{ConfigError, TestConfig};

/// Where messages go. Decided once before the roster is walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Each message goes to the roster's own email column.
    Live,
    /// Every message goes to `email`; content stays per recipient.
    Test { name: String, email: String },
}

impl DeliveryMode {
    pub fn from_config(test: &TestConfig) -> Result<Self, ConfigError> {
        if !test.enable_test_mode {
            return Ok(DeliveryMode::Live);
        }

        let email = test.recipient_email.trim();
        if email.is_empty() {
            return Err(ConfigError::MissingTestRecipient);
        }
        if email.parse::<Address>().is_err() {
            return Err(ConfigError::InvalidTestRecipient(email.to_string()));
        }

        Ok(DeliveryMode::Test {
            name: test.recipient_name.trim().to_string(),
            email: email.to_string(),
        })
    }

    /// The address a message for `original` is actually sent to.
    pub fn destination<'a>(&'a self, original: &'a str) -> &'a str {
        match self {
            DeliveryMode::Live => original,
            DeliveryMode::Test { email, .. } => email,
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, DeliveryMode::Test { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(enabled: bool, email: &str) -> TestConfig {
        TestConfig {
            recipient_name: "Tester".to_string(),
            recipient_email: email.to_string(),
            enable_test_mode: enabled,
        }
    }

    #[test]
    fn disabled_test_mode_is_live() {
        let mode = DeliveryMode::from_config(&test_config(false, "")).unwrap();
        assert_eq!(mode, DeliveryMode::Live);
        assert_eq!(mode.destination("alice@example.com"), "alice@example.com");
    }

    #[test]
    fn enabled_test_mode_redirects_everything() {
        let mode = DeliveryMode::from_config(&test_config(true, " qa@example.com ")).unwrap();
        assert!(mode.is_test());
        assert_eq!(mode.destination("alice@example.com"), "qa@example.com");
        assert_eq!(mode.destination("bob@example.com"), "qa@example.com");
    }

    #[test]
    fn enabled_without_recipient_is_an_error() {
        let err = DeliveryMode::from_config(&test_config(true, "   ")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTestRecipient));
    }

    #[test]
    fn enabled_with_garbage_recipient_is_an_error() {
        let err = DeliveryMode::from_config(&test_config(true, "qa at example")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTestRecipient(_)));
    }
}
