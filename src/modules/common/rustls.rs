use std::sync::OnceLock;

use crate::{
    modules::error::{code::ErrorCode, MailerResult},
    raise_error,
};

static PROVIDER_INSTALLED: OnceLock<bool> = OnceLock::new();

pub struct MailerTls;

impl MailerTls {
    /// Makes sure rustls has a process wide crypto provider before the first
    /// TLS handshake. Another provider installed by the host application is
    /// left in place.
    pub fn initialize() -> MailerResult<()> {
        let installed = *PROVIDER_INSTALLED.get_or_init(|| {
            rustls::crypto::CryptoProvider::install_default(
                rustls::crypto::ring::default_provider(),
            )
            .is_ok()
                || rustls::crypto::CryptoProvider::get_default().is_some()
        });

        if installed {
            Ok(())
        } else {
            Err(raise_error!(
                "failed to set crypto provider".into(),
                ErrorCode::InternalError
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MailerTls;

    #[test]
    fn initialize_is_idempotent() {
        MailerTls::initialize().unwrap();
        MailerTls::initialize().unwrap();
        assert!(rustls::crypto::CryptoProvider::get_default().is_some());
    }
}
