// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::rustls::MailerTls;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{MailerError, MailerResult};
use crate::modules::settings::{Encryption, MailerSettings};
use crate::modules::smtp::auth::Credentials;
use crate::modules::smtp::client::{smtp_error, RelayClient, Sender};
use crate::modules::smtp::util::validate_line;
use crate::modules::utils::net::{connect_with_timeout, parse_relay_addr, RelayAddr};
use crate::{raise_error, run_with_timeout};
use mail_send::smtp::message::Message;
use mail_send::smtp::tls::build_tls_connector;
use mail_send::smtp::AssertReply;
use mail_send::SmtpClient;
use smtp_proto::EXT_START_TLS;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// One connection per delivery: connect, negotiate, authenticate, send, quit.
pub struct RelayTransport {
    settings: MailerSettings,
}

impl RelayTransport {
    pub fn new(settings: MailerSettings) -> Self {
        Self { settings }
    }

    pub async fn deliver(
        &self,
        server: &str,
        credentials: Option<&Credentials>,
        sender: &str,
        recipient: &str,
        body: Vec<u8>,
    ) -> MailerResult<()> {
        validate_line(sender)?;
        validate_line(recipient)?;
        let relay = parse_relay_addr(server)?;

        let mut client = self.connect(&relay, credentials).await?;
        let size = body.len();
        client
            .send_email(Message::new(sender, [recipient], body))
            .await?;
        info!(
            "Relayed {} bytes from <{}> to <{}> via {}",
            size, sender, recipient, relay
        );

        // The relay already accepted the message at this point
        if let Err(e) = client.quit().await {
            debug!("Ignoring QUIT failure on {}: {}", relay, e);
        }
        Ok(())
    }

    async fn connect(
        &self,
        relay: &RelayAddr,
        credentials: Option<&Credentials>,
    ) -> MailerResult<RelayClient> {
        let timeout = self.settings.timeout();
        let tcp_stream = connect_with_timeout(relay, timeout).await?;
        debug!("Connected to relay {}", relay);

        run_with_timeout!(
            timeout,
            self.handshake(relay, tcp_stream, credentials),
            raise_error!(
                format!(
                    "SMTP handshake with {} timed out after {}s",
                    relay,
                    timeout.as_secs()
                ),
                ErrorCode::ConnectionTimeout
            )
        )?
    }

    async fn handshake(
        &self,
        relay: &RelayAddr,
        tcp_stream: TcpStream,
        credentials: Option<&Credentials>,
    ) -> MailerResult<RelayClient> {
        let client = SmtpClient {
            stream: tcp_stream,
            timeout: self.settings.timeout(),
        };
        let local_host = self.settings.ehlo_hostname();
        let failed = connection_failed(relay);

        let (mut client, capabilities) = match self.settings.encryption {
            Encryption::Ssl => {
                MailerTls::initialize()?;
                let tls_connector = build_tls_connector(self.settings.accept_invalid_certs);
                let mut client = client
                    .into_tls(&tls_connector, &relay.host)
                    .await
                    .map_err(&failed)?;
                // Read greeting
                client
                    .read()
                    .await
                    .and_then(|reply| reply.assert_positive_completion())
                    .map_err(&failed)?;
                let capabilities = client
                    .capabilities(&local_host, false)
                    .await
                    .map_err(&failed)?;
                (RelayClient::Tls(client), capabilities)
            }
            Encryption::StartTls | Encryption::Opportunistic => {
                let mut client = client;
                // Read greeting
                client
                    .read()
                    .await
                    .and_then(|reply| reply.assert_positive_completion())
                    .map_err(&failed)?;
                // Send EHLO
                let response = client.ehlo(&local_host).await.map_err(&failed)?;
                if response.has_capability(EXT_START_TLS) {
                    MailerTls::initialize()?;
                    let tls_connector = build_tls_connector(self.settings.accept_invalid_certs);
                    let mut client = client
                        .start_tls(&tls_connector, &relay.host)
                        .await
                        .map_err(&failed)?;
                    let capabilities = client
                        .capabilities(&local_host, false)
                        .await
                        .map_err(&failed)?;
                    (RelayClient::Tls(client), capabilities)
                } else if self.settings.encryption == Encryption::StartTls {
                    return Err(raise_error!(
                        format!("Relay {} does not advertise STARTTLS", relay),
                        ErrorCode::SmtpConnectionFailed
                    ));
                } else {
                    debug!("Relay {} does not offer STARTTLS, continuing in plaintext", relay);
                    (RelayClient::Plain(client), response)
                }
            }
            Encryption::None => {
                let mut client = client;
                // Read greeting
                client
                    .read()
                    .await
                    .and_then(|reply| reply.assert_positive_completion())
                    .map_err(&failed)?;
                let capabilities = client
                    .capabilities(&local_host, false)
                    .await
                    .map_err(&failed)?;
                (RelayClient::Plain(client), capabilities)
            }
        };

        if let Some(credentials) = credentials {
            client.authenticate(credentials, capabilities, relay).await?;
        }
        debug!(
            "SMTP session with {} ready (encrypted: {})",
            relay,
            client.is_encrypted()
        );
        Ok(client)
    }
}

fn connection_failed(relay: &RelayAddr) -> impl Fn(mail_send::Error) -> MailerError + '_ {
    move |e| {
        smtp_error(
            &format!("SMTP session with {} failed", relay),
            e,
            ErrorCode::SmtpConnectionFailed,
        )
    }
}
