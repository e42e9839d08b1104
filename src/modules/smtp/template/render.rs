use crate::modules::error::code::ErrorCode;
use crate::modules::error::MailerResult;
use crate::modules::settings::MailerSettings;
use crate::modules::smtp::util::normalize_line_endings;
use crate::raise_error;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

/// Every registered template lives in one registry, so any template can pull
/// in another one as a partial with `{{> name}}`.
#[derive(Clone)]
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new(settings: &MailerSettings) -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(settings.strict_rendering);
        if !settings.escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }
        Self { registry }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn len(&self) -> usize {
        self.registry.get_templates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compiles `source` and installs it under `name`, replacing any template
    /// already registered with that name.
    pub fn register(&mut self, name: &str, source: &str) -> MailerResult<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| {
                raise_error!(
                    format!("Handlebars register '{name}' error: {e}"),
                    ErrorCode::TemplateParseFailed
                )
            })
    }

    /// Renders `name` against `data`. Line endings are normalized to CRLF so
    /// the buffer can go straight into DATA.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> MailerResult<Vec<u8>> {
        if !self.contains(name) {
            return Err(raise_error!(
                format!("Template '{name}' is not registered"),
                ErrorCode::TemplateNotFound
            ));
        }

        let rendered = self.registry.render(name, data).map_err(|e| {
            raise_error!(
                format!("Handlebars '{name}' render error: {e}"),
                ErrorCode::TemplateRenderFailed
            )
        })?;
        Ok(normalize_line_endings(&rendered))
    }
}

pub async fn load_source(root: &Path, name: &str) -> MailerResult<String> {
    let path = root.join(name);
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        raise_error!(
            format!("Failed to read template '{}': {}", path.display(), e),
            ErrorCode::TemplateLoadFailed
        )
    })
}
