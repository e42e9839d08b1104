// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

//! Render named handlebars templates with caller supplied data and relay the
//! result to an SMTP server, optionally authenticating with CRAM-MD5 or PLAIN.
//!
//! ```no_run
//! use relaymail::Mailer;
//! use serde_json::json;
//!
//! # async fn run() -> relaymail::MailerResult<()> {
//! let mailer = Mailer::new("localhost:25", "templates/");
//! mailer.add_templates(&["welcome.txt"]).await?;
//! mailer.set_cram_md5_auth("relay-user", "relay-secret").await;
//!
//! let data = json!({ "From": "admin@localhost", "To": "x@localhost", "Subject": "hi" });
//! mailer
//!     .send(&data, "admin@localhost", "x@localhost", "welcome.txt")
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod modules;

pub use modules::error::code::ErrorCode;
pub use modules::error::{MailerError, MailerResult};
pub use modules::mailer::Mailer;
pub use modules::settings::{Encryption, LogSettings, MailerSettings};
pub use modules::smtp::auth::Credentials;
