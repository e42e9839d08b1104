// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use code::ErrorCode;
use snafu::{Location, Snafu};

pub mod code;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MailerError {
    #[snafu(display("{message}"))]
    Generic {
        message: String,
        #[snafu(implicit)]
        location: Location,
        code: ErrorCode,
    },
}

pub type MailerResult<T, E = MailerError> = std::result::Result<T, E>;

impl MailerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MailerError::Generic { code, .. } => *code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MailerError::Generic { message, .. } => message,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            MailerError::Generic { location, .. } => location,
        }
    }

    /// Shorthand for `self.code().is_transport()`.
    pub fn is_transport(&self) -> bool {
        self.code().is_transport()
    }
}
