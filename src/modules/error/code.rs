// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,

    // Template errors (20000–20999)
    TemplateLoadFailed = 20000,
    TemplateParseFailed = 20010,
    TemplateNotFound = 20020,
    TemplateRenderFailed = 20030,

    // Network connection errors (40000–40999)
    NetworkError = 40000,
    ConnectionTimeout = 40010,

    // Mail service errors (50000–50999)
    SmtpCommandFailed = 50030,
    SmtpConnectionFailed = 50040,
    SmtpAuthenticationFailed = 50050,

    // Internal system errors (70000–70999)
    InternalError = 70000,
}

impl ErrorCode {
    /// Failures reported while reaching or talking to the relay.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ErrorCode::NetworkError
                | ErrorCode::ConnectionTimeout
                | ErrorCode::SmtpCommandFailed
                | ErrorCode::SmtpConnectionFailed
                | ErrorCode::SmtpAuthenticationFailed
        )
    }

    pub fn is_template(&self) -> bool {
        matches!(
            self,
            ErrorCode::TemplateLoadFailed
                | ErrorCode::TemplateParseFailed
                | ErrorCode::TemplateNotFound
                | ErrorCode::TemplateRenderFailed
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, *self as u32)
    }
}
