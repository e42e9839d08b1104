// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailerResult;
use crate::raise_error;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the connection to the relay is secured.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Encryption {
    /// Unencrypted connection, STARTTLS is never attempted
    None,
    /// Upgrade with STARTTLS when the relay advertises it
    #[default]
    Opportunistic,
    /// Require STARTTLS
    StartTls,
    /// SSL/TLS encrypted connection from the first byte
    Ssl,
}

/// Tunables for template rendering and relay delivery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerSettings {
    /// Connect and per-command timeout, in seconds (default: 30)
    pub timeout_secs: u64,
    /// Transport security used when talking to the relay (default: Opportunistic)
    pub encryption: Encryption,
    /// Skip certificate verification, only meant for test relays (default: false)
    pub accept_invalid_certs: bool,
    /// Name announced in EHLO. Falls back to the machine hostname.
    pub local_hostname: Option<String>,
    /// Fail rendering when a template references a missing field (default: true)
    pub strict_rendering: bool,
    /// HTML-escape interpolated values (default: false, templates are plain text)
    pub escape_html: bool,
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            encryption: Encryption::default(),
            accept_invalid_certs: false,
            local_hostname: None,
            strict_rendering: true,
            escape_html: false,
        }
    }
}

impl MailerSettings {
    pub fn validate(&self) -> MailerResult<()> {
        if self.timeout_secs == 0 {
            return Err(raise_error!(
                "timeout_secs must be greater than zero".into(),
                ErrorCode::InvalidParameter
            ));
        }
        if let Some(name) = &self.local_hostname {
            if name.trim().is_empty() || name.contains(['\r', '\n', ' ']) {
                return Err(raise_error!(
                    format!("Invalid local hostname '{}'", name.escape_debug()),
                    ErrorCode::InvalidParameter
                ));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ehlo_hostname(&self) -> String {
        match &self.local_hostname {
            Some(name) => name.clone(),
            None => gethostname::gethostname()
                .to_str()
                .unwrap_or("[127.0.0.1]")
                .to_string(),
        }
    }
}

/// Subscriber options for applications that let this crate install logging.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// One of error, warn, info, debug, trace (default: "info")
    pub level: String,
    /// Enable ANSI formatted logs (default: false)
    pub ansi: bool,
    /// Emit logs as JSON lines (default: false)
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: false,
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = MailerSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.encryption, Encryption::Opportunistic);
        assert!(settings.strict_rendering);
        assert!(!settings.escape_html);
        assert!(!settings.ehlo_hostname().is_empty());
    }

    #[test]
    fn rejects_zero_timeout_and_bad_hostname() {
        let settings = MailerSettings {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            settings.validate().unwrap_err().code(),
            ErrorCode::InvalidParameter
        );

        let settings = MailerSettings {
            local_hostname: Some("mail\r\nhost".into()),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn deserializes_partial_settings() {
        let settings: MailerSettings =
            serde_json::from_str(r#"{ "timeout_secs": 5, "encryption": "None" }"#).unwrap();
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.encryption, Encryption::None);
        assert!(settings.strict_rendering);

        let log: LogSettings = serde_json::from_str(r#"{ "level": "debug" }"#).unwrap();
        assert_eq!(log.level, "debug");
        assert!(!log.json);
    }
}
