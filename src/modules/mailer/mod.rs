// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::MailerResult;
use crate::modules::settings::MailerSettings;
use crate::modules::smtp::auth::Credentials;
use crate::modules::smtp::manager::RelayTransport;
use crate::modules::smtp::template::render::{load_source, Templates};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};


struct MailerState {
    /// Every name ever passed to `add_templates`, duplicates included.
    template_names: Vec<String>,
    credentials: Option<Credentials>,
    templates: Templates,
}

/// Renders registered templates and relays them to a single SMTP server.
///
/// Template registration and credential changes take the write lock; `send`
/// takes the read lock only while rendering and copying the credentials, so
/// network I/O for concurrent sends never waits on each other. Share it
/// between tasks with an `Arc<Mailer>`.
pub struct Mailer {
    server: String,
    template_root: PathBuf,
    settings: MailerSettings,
    transport: RelayTransport,
    state: RwLock<MailerState>,
}

impl Mailer {
    /// `server` is the relay as `host:port`, `template_root` the directory
    /// template names are resolved against. Nothing is read or connected yet.
    pub fn new(server: impl Into<String>, template_root: impl Into<PathBuf>) -> Self {
        Self::build(server.into(), template_root.into(), MailerSettings::default())
    }

    pub fn with_settings(
        server: impl Into<String>,
        template_root: impl Into<PathBuf>,
        settings: MailerSettings,
    ) -> MailerResult<Self> {
        settings.validate()?;
        Ok(Self::build(server.into(), template_root.into(), settings))
    }

    fn build(server: String, template_root: PathBuf, settings: MailerSettings) -> Self {
        let state = MailerState {
            template_names: Vec::new(),
            credentials: None,
            templates: Templates::new(&settings),
        };
        Self {
            server,
            template_root,
            transport: RelayTransport::new(settings.clone()),
            settings,
            state: RwLock::new(state),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    pub fn settings(&self) -> &MailerSettings {
        &self.settings
    }

    pub async fn template_names(&self) -> Vec<String> {
        self.state.read().await.template_names.clone()
    }

    pub async fn has_template(&self, name: &str) -> bool {
        self.state.read().await.templates.contains(name)
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.state.read().await.credentials.clone()
    }

    /// Loads `template_root/<name>` for each name and merges it into the
    /// template set.
    ///
    /// All names are recorded before compilation starts. The first template
    /// that cannot be read or parsed aborts the call; templates merged
    /// earlier in the same batch stay installed. Use
    /// [`Mailer::add_templates_atomic`] for all-or-nothing semantics.
    pub async fn add_templates<S: AsRef<str>>(&self, names: &[S]) -> MailerResult<()> {
        let mut state = self.state.write().await;
        state
            .template_names
            .extend(names.iter().map(|name| name.as_ref().to_string()));

        for (index, name) in names.iter().enumerate() {
            if let Err(e) = self.install(&mut state.templates, name.as_ref()).await {
                warn!(
                    "Template batch stopped at '{}' after {} installed: {}",
                    name.as_ref(),
                    index,
                    e
                );
                return Err(e);
            }
        }

        debug!(
            "Registered {} template(s) from {}",
            names.len(),
            self.template_root.display()
        );
        Ok(())
    }

    /// Like [`Mailer::add_templates`], but a failure leaves both the template
    /// set and the recorded names exactly as they were.
    pub async fn add_templates_atomic<S: AsRef<str>>(&self, names: &[S]) -> MailerResult<()> {
        let mut state = self.state.write().await;
        let mut staged = state.templates.clone();
        for name in names {
            self.install(&mut staged, name.as_ref()).await?;
        }

        state.templates = staged;
        state
            .template_names
            .extend(names.iter().map(|name| name.as_ref().to_string()));
        debug!(
            "Registered {} template(s) atomically from {}",
            names.len(),
            self.template_root.display()
        );
        Ok(())
    }

    async fn install(&self, templates: &mut Templates, name: &str) -> MailerResult<()> {
        let source = load_source(&self.template_root, name).await?;
        templates.register(name, &source)
    }

    /// CRAM-MD5 credentials, replacing whatever was set before.
    pub async fn set_cram_md5_auth(&self, username: impl Into<String>, secret: impl Into<String>) {
        self.set_credentials(Credentials::cram_md5(username, secret))
            .await;
    }

    /// PLAIN credentials, replacing whatever was set before. `host` has to
    /// match the relay host when the mail is sent.
    pub async fn set_plain_auth(
        &self,
        identity: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) {
        self.set_credentials(Credentials::plain(identity, username, password, host))
            .await;
    }

    pub async fn set_credentials(&self, credentials: Credentials) {
        let mut state = self.state.write().await;
        debug!(
            "Using {} authentication as '{}'",
            credentials.mechanism(),
            credentials.username()
        );
        state.credentials = Some(credentials);
    }

    pub async fn clear_credentials(&self) {
        self.state.write().await.credentials = None;
    }

    /// Renders `template_name` against `data` and relays the result from
    /// `sender` to `recipient`. The template supplies the headers.
    pub async fn send<T: Serialize>(
        &self,
        data: &T,
        sender: &str,
        recipient: &str,
        template_name: &str,
    ) -> MailerResult<()> {
        let (body, credentials) = {
            let state = self.state.read().await;
            let body = state.templates.render(template_name, data)?;
            (body, state.credentials.clone())
        };

        self.transport
            .deliver(&self.server, credentials.as_ref(), sender, recipient, body)
            .await
    }
}
