//! In-process SMTP relay used by the tests. It speaks just enough ESMTP for
//! mail-send: EHLO, AUTH (initial response or one 334 round), MAIL, RCPT,
//! DATA, RSET, NOOP and QUIT, and records what it saw.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// base64("<1896.697170952@localhost>"), the RFC 2195 sample challenge
const CHALLENGE: &str = "PDE4OTYuNjk3MTcwOTUyQGxvY2FsaG9zdD4=";

#[derive(Clone, Debug)]
pub struct RelayOptions {
    pub auth_mechanisms: Vec<&'static str>,
    pub reject_auth: bool,
    pub reject_recipients: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            auth_mechanisms: vec!["CRAM-MD5", "PLAIN"],
            reject_auth: false,
            reject_recipients: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthExchange {
    pub mechanism: String,
    /// Decoded client response.
    pub response: Vec<u8>,
}

#[derive(Clone, Debug, Default)]
pub struct Delivery {
    pub mail_from: String,
    pub rcpt_to: Vec<String>,
    pub data: String,
    pub auth: Option<AuthExchange>,
}

#[derive(Default)]
struct RelayLog {
    connections: usize,
    auth_attempts: Vec<AuthExchange>,
    deliveries: Vec<Delivery>,
}

pub struct FakeRelay {
    address: SocketAddr,
    log: Arc<Mutex<RelayLog>>,
    task: JoinHandle<()>,
}

impl FakeRelay {
    pub async fn start() -> Self {
        Self::start_with(RelayOptions::default()).await
    }

    pub async fn start_with(options: RelayOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let log = Arc::new(Mutex::new(RelayLog::default()));

        let task = tokio::spawn({
            let log = log.clone();
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    log.lock().unwrap().connections += 1;
                    let log = log.clone();
                    let options = options.clone();
                    tokio::spawn(async move {
                        let _ = serve(stream, options, log).await;
                    });
                }
            }
        });

        Self { address, log, task }
    }

    /// `127.0.0.1:<port>`
    pub fn address(&self) -> String {
        self.address.to_string()
    }

    pub fn connections(&self) -> usize {
        self.log.lock().unwrap().connections
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().unwrap().deliveries.clone()
    }

    pub fn auth_attempts(&self) -> Vec<AuthExchange> {
        self.log.lock().unwrap().auth_attempts.clone()
    }
}

impl Drop for FakeRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A loopback address with nothing listening on it.
pub async fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    address.to_string()
}

async fn serve(
    stream: TcpStream,
    options: RelayOptions,
    log: Arc<Mutex<RelayLog>>,
) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    writer
        .write_all(b"220 localhost ESMTP test relay\r\n")
        .await?;

    let mut auth: Option<AuthExchange> = None;
    let mut current = Delivery::default();

    while let Some(line) = lines.next_line().await? {
        let command = line.to_ascii_uppercase();

        if command.starts_with("EHLO") || command.starts_with("HELO") {
            let mut reply = String::from("250-localhost greets you\r\n");
            if !options.auth_mechanisms.is_empty() {
                reply.push_str(&format!("250-AUTH {}\r\n", options.auth_mechanisms.join(" ")));
            }
            reply.push_str("250 8BITMIME\r\n");
            writer.write_all(reply.as_bytes()).await?;
        } else if command.starts_with("AUTH ") {
            let mut parts = line.split_whitespace().skip(1);
            let mechanism = parts.next().unwrap_or_default().to_ascii_uppercase();
            let encoded = match parts.next() {
                Some(initial) => initial.to_string(),
                None => {
                    writer
                        .write_all(format!("334 {}\r\n", CHALLENGE).as_bytes())
                        .await?;
                    lines.next_line().await?.unwrap_or_default()
                }
            };
            let exchange = AuthExchange {
                mechanism,
                response: STANDARD.decode(encoded.trim()).unwrap_or_default(),
            };
            log.lock().unwrap().auth_attempts.push(exchange.clone());

            if options.reject_auth {
                writer
                    .write_all(b"535 5.7.8 Authentication credentials invalid\r\n")
                    .await?;
            } else {
                auth = Some(exchange);
                writer
                    .write_all(b"235 2.7.0 Authentication successful\r\n")
                    .await?;
            }
        } else if command.starts_with("MAIL FROM:") {
            current = Delivery {
                mail_from: extract_path(&line["MAIL FROM:".len()..]),
                auth: auth.clone(),
                ..Default::default()
            };
            writer.write_all(b"250 2.1.0 OK\r\n").await?;
        } else if command.starts_with("RCPT TO:") {
            if options.reject_recipients {
                writer
                    .write_all(b"550 5.1.1 Mailbox unavailable\r\n")
                    .await?;
            } else {
                current
                    .rcpt_to
                    .push(extract_path(&line["RCPT TO:".len()..]));
                writer.write_all(b"250 2.1.5 OK\r\n").await?;
            }
        } else if command == "DATA" {
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
            let mut body = Vec::new();
            while let Some(data_line) = lines.next_line().await? {
                if data_line == "." {
                    break;
                }
                match data_line.strip_prefix('.') {
                    Some(unstuffed) => body.push(unstuffed.to_string()),
                    None => body.push(data_line),
                }
            }
            current.data = body.join("\r\n");
            log.lock()
                .unwrap()
                .deliveries
                .push(std::mem::take(&mut current));
            writer.write_all(b"250 2.0.0 Queued\r\n").await?;
        } else if command == "QUIT" {
            writer.write_all(b"221 2.0.0 Bye\r\n").await?;
            break;
        } else if command == "RSET" || command == "NOOP" {
            writer.write_all(b"250 2.0.0 OK\r\n").await?;
        } else {
            writer
                .write_all(b"502 5.5.2 Command not recognized\r\n")
                .await?;
        }
    }
    Ok(())
}

fn extract_path(argument: &str) -> String {
    argument
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}
