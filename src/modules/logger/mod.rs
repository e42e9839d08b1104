// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Optional subscriber setup. The mailer itself only emits `tracing` events;
//! installing a subscriber is left to the embedding application.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailerResult;
use crate::modules::settings::LogSettings;
use crate::raise_error;
use chrono::Local;
use tracing::Level;
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

pub(crate) struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

/// Installs a stdout subscriber as the global default.
pub fn initialize_logging(settings: &LogSettings) -> MailerResult<()> {
    let level = validate_log_level(&settings.level)?;

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(settings.ansi)
        .with_level(true)
        .with_target(true)
        .with_timer(LocalTimer)
        .with_writer(std::io::stdout);

    let result = if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| {
        raise_error!(
            format!("Failed to install tracing subscriber: {}", e),
            ErrorCode::InternalError
        )
    })
}

pub(crate) fn validate_log_level(value: &str) -> MailerResult<Level> {
    value.parse::<Level>().map_err(|_| {
        raise_error!(
            format!(
                "Invalid log level '{}'. Use one of: error, warn, info, debug, trace.",
                value
            ),
            ErrorCode::InvalidParameter
        )
    })
}
