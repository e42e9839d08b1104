// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

/// Authentication used when talking to the relay. Only one scheme is active
/// on a mailer at a time; setting another replaces it.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// SASL CRAM-MD5 challenge-response.
    CramMd5 { username: String, secret: String },
    /// SASL PLAIN. `host` must match the relay host, and the password is only
    /// sent over TLS or to a relay on localhost.
    Plain {
        identity: String,
        username: String,
        password: String,
        host: String,
    },
}

impl Credentials {
    pub fn cram_md5(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials::CramMd5 {
            username: username.into(),
            secret: secret.into(),
        }
    }

    pub fn plain(
        identity: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Credentials::Plain {
            identity: identity.into(),
            username: username.into(),
            password: password.into(),
            host: host.into(),
        }
    }

    /// SASL mechanism name.
    pub fn mechanism(&self) -> &'static str {
        match self {
            Credentials::CramMd5 { .. } => "CRAM-MD5",
            Credentials::Plain { .. } => "PLAIN",
        }
    }

    pub fn username(&self) -> &str {
        match self {
            Credentials::CramMd5 { username, .. } | Credentials::Plain { username, .. } => username,
        }
    }

    /// `authzid NUL authcid NUL passwd`, RFC 4616.
    pub(crate) fn plain_response(&self) -> Option<Vec<u8>> {
        match self {
            Credentials::Plain {
                identity,
                username,
                password,
                ..
            } => {
                let mut response =
                    Vec::with_capacity(identity.len() + username.len() + password.len() + 2);
                response.extend_from_slice(identity.as_bytes());
                response.push(0);
                response.extend_from_slice(username.as_bytes());
                response.push(0);
                response.extend_from_slice(password.as_bytes());
                Some(response)
            }
            Credentials::CramMd5 { .. } => None,
        }
    }
}

// Secrets never reach logs or panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::CramMd5 { username, .. } => f
                .debug_struct("CramMd5")
                .field("username", username)
                .field("secret", &"<redacted>")
                .finish(),
            Credentials::Plain {
                identity,
                username,
                host,
                ..
            } => f
                .debug_struct("Plain")
                .field("identity", identity)
                .field("username", username)
                .field("password", &"<redacted>")
                .field("host", host)
                .finish(),
        }
    }
}
