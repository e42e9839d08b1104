use crate::modules::error::code::ErrorCode;
use crate::modules::error::{MailerError, MailerResult};
use crate::modules::smtp::auth::Credentials;
use crate::modules::utils::net::RelayAddr;
use crate::{base64_encode, raise_error};
use mail_send::smtp::message::IntoMessage;
use mail_send::SmtpClient;
use smtp_proto::{EhloResponse, AUTH_CRAM_MD5, AUTH_PLAIN};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

pub enum RelayClient {
    Plain(SmtpClient<TcpStream>),
    Tls(SmtpClient<TlsStream<TcpStream>>),
}

pub(crate) trait Sender {
    async fn authenticate(
        &mut self,
        credentials: &Credentials,
        capabilities: EhloResponse<String>,
        relay: &RelayAddr,
    ) -> MailerResult<()>;
    async fn send_email<'x>(&mut self, message: impl IntoMessage<'x>) -> MailerResult<()>;
    async fn quit(self) -> MailerResult<()>;
}

impl RelayClient {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, RelayClient::Tls(_))
    }
}

impl Sender for RelayClient {
    async fn authenticate(
        &mut self,
        credentials: &Credentials,
        capabilities: EhloResponse<String>,
        relay: &RelayAddr,
    ) -> MailerResult<()> {
        match self {
            RelayClient::Plain(smtp_client) => {
                authenticate_with(smtp_client, credentials, capabilities, relay, false).await
            }
            RelayClient::Tls(smtp_client) => {
                authenticate_with(smtp_client, credentials, capabilities, relay, true).await
            }
        }
    }

    async fn send_email<'x>(&mut self, message: impl IntoMessage<'x>) -> MailerResult<()> {
        match self {
            RelayClient::Plain(smtp_client) => smtp_client
                .send(message)
                .await
                .map_err(|e| smtp_error("Relay rejected message", e, ErrorCode::SmtpCommandFailed)),
            RelayClient::Tls(smtp_client) => smtp_client
                .send(message)
                .await
                .map_err(|e| smtp_error("Relay rejected message", e, ErrorCode::SmtpCommandFailed)),
        }
    }

    async fn quit(self) -> MailerResult<()> {
        match self {
            RelayClient::Plain(smtp_client) => smtp_client
                .quit()
                .await
                .map_err(|e| smtp_error("QUIT failed", e, ErrorCode::SmtpCommandFailed)),
            RelayClient::Tls(smtp_client) => smtp_client
                .quit()
                .await
                .map_err(|e| smtp_error("QUIT failed", e, ErrorCode::SmtpCommandFailed)),
        }
    }
}

async fn authenticate_with<T: AsyncRead + AsyncWrite + Unpin>(
    smtp_client: &mut SmtpClient<T>,
    credentials: &Credentials,
    mut capabilities: EhloResponse<String>,
    relay: &RelayAddr,
    encrypted: bool,
) -> MailerResult<()> {
    let auth_failed = |message: String| raise_error!(message, ErrorCode::SmtpAuthenticationFailed);

    match credentials {
        Credentials::CramMd5 { username, secret } => {
            if capabilities.auth_mechanisms & AUTH_CRAM_MD5 == 0 {
                return Err(auth_failed(format!(
                    "Relay {} does not support AUTH CRAM-MD5",
                    relay
                )));
            }
            // Restrict mail-send's negotiation to the configured mechanism
            capabilities.auth_mechanisms = AUTH_CRAM_MD5;
            let credentials = mail_send::Credentials::new(username.clone(), secret.clone());
            smtp_client
                .authenticate(&credentials, &capabilities)
                .await
                .map_err(|e| {
                    smtp_error(
                        "CRAM-MD5 authentication failed",
                        e,
                        ErrorCode::SmtpAuthenticationFailed,
                    )
                })?;
        }
        Credentials::Plain { host, .. } => {
            if !encrypted && !relay.is_localhost() {
                return Err(auth_failed(format!(
                    "Refusing PLAIN authentication over an unencrypted connection to {}",
                    relay
                )));
            }
            if host != &relay.host {
                return Err(auth_failed(format!(
                    "PLAIN credentials are bound to host '{}', not '{}'",
                    host, relay.host
                )));
            }
            if capabilities.auth_mechanisms & AUTH_PLAIN == 0 {
                return Err(auth_failed(format!(
                    "Relay {} does not support AUTH PLAIN",
                    relay
                )));
            }
            let response = base64_encode!(credentials.plain_response().unwrap_or_default());
            let reply = smtp_client
                .cmd(format!("AUTH PLAIN {}\r\n", response).as_bytes())
                .await
                .map_err(|e| {
                    smtp_error(
                        "PLAIN authentication failed",
                        e,
                        ErrorCode::SmtpAuthenticationFailed,
                    )
                })?;
            if reply.code() != 235 {
                return Err(auth_failed(format!(
                    "PLAIN authentication rejected by {}: {:?}",
                    relay, reply
                )));
            }
        }
    }

    debug!(
        "Authenticated to {} as '{}' using {}",
        relay,
        credentials.username(),
        credentials.mechanism()
    );
    Ok(())
}

pub(crate) fn smtp_error(context: &str, error: mail_send::Error, fallback: ErrorCode) -> MailerError {
    let code = match &error {
        mail_send::Error::AuthenticationFailed(_)
        | mail_send::Error::UnsupportedAuthMechanism
        | mail_send::Error::MissingCredentials => ErrorCode::SmtpAuthenticationFailed,
        mail_send::Error::Timeout => ErrorCode::ConnectionTimeout,
        _ => fallback,
    };
    raise_error!(format!("{}: {}", context, error), code)
}
