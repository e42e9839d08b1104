// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailerResult;
use crate::{raise_error, run_with_timeout};
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::error;

/// A relay address split into host and port. IPv6 hosts are kept without
/// their brackets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayAddr {
    pub host: String,
    pub port: u16,
}

impl RelayAddr {
    pub fn is_localhost(&self) -> bool {
        matches!(self.host.as_str(), "localhost" | "127.0.0.1" | "::1")
    }
}

impl fmt::Display for RelayAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Parses `host:port` or `[v6-host]:port`.
pub fn parse_relay_addr(input: &str) -> MailerResult<RelayAddr> {
    let invalid = |reason: &str| {
        raise_error!(
            format!("Invalid relay address '{}': {}", input, reason),
            ErrorCode::InvalidParameter
        )
    };

    let (host, port) = if let Some(rest) = input.strip_prefix('[') {
        let (host, port) = rest
            .split_once("]:")
            .ok_or_else(|| invalid("expected '[host]:port'"))?;
        (host, port)
    } else {
        input
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| invalid(&format!("bad port '{}': {}", port, e)))?;

    Ok(RelayAddr {
        host: host.to_string(),
        port,
    })
}

pub(crate) async fn connect_with_timeout(
    address: &RelayAddr,
    timeout: Duration,
) -> MailerResult<TcpStream> {
    let stream = run_with_timeout!(
        timeout,
        TcpStream::connect((address.host.as_str(), address.port)),
        {
            error!(
                "TCP connection to {} timed out after {}s",
                address,
                timeout.as_secs()
            );
            raise_error!(
                format!(
                    "TCP connection to {} timed out after {}s",
                    address,
                    timeout.as_secs()
                ),
                ErrorCode::ConnectionTimeout
            )
        }
    )?
    .map_err(|e| {
        raise_error!(
            format!("Failed to connect to relay {}: {}", address, e),
            ErrorCode::SmtpConnectionFailed
        )
    })?;

    // Disable Nagle's algorithm, SMTP is a chatty request/reply protocol
    stream
        .set_nodelay(true)
        .map_err(|e| raise_error!(e.to_string(), ErrorCode::NetworkError))?;
    Ok(stream)
}
