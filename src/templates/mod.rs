//! Page templates
//!
//! HTML templates are compiled into the binary with `rust-embed` and
//! rendered with Tera. Error pages are plain static HTML so they can be
//! served without a template engine.

use anyhow::{Context, Result};
use rust_embed::RustEmbed;
use std::error::Error as _;
use tera::{Context as TeraContext, Tera};

/// Embedded template files
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct TemplateAssets;

/// Template loading and rendering errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template error: {0}")]
    Render(String),
}

/// Tera instance holding every embedded page template
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Load all embedded templates.
    ///
    /// Templates under `errors/` are static and are not registered with Tera.
    pub fn new() -> Result<Self> {
        let mut templates: Vec<(String, String)> = Vec::new();

        for name in TemplateAssets::iter() {
            if name.starts_with("errors/") {
                continue;
            }
            let file = TemplateAssets::get(&name)
                .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
            let content = String::from_utf8(file.data.into_owned())
                .with_context(|| format!("Template is not UTF-8: {}", name))?;
            templates.push((name.to_string(), content));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| TemplateError::Render(describe(&e)))
            .context("Failed to load templates")?;

        tracing::debug!("Loaded {} templates", tera.get_template_names().count());
        Ok(Self { tera })
    }

    /// Render `template` with `context`
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let message = format!("Failed to render '{}': {}", template, describe(&e));
            TemplateError::Render(message).into()
        })
    }
}

/// Static HTML of an error page such as `404.html`
pub fn error_page(name: &str) -> Option<String> {
    TemplateAssets::get(&format!("errors/{}", name))
        .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
}

/// Flatten a Tera error and its causes into one message
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!("\n  Caused by: {}", cause));
        source = cause.source();
    }
    message
}
