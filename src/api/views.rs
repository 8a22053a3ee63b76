//! Page rendering
//!
//! Handlers describe a page as a template name plus a JSON context. The
//! rendered response carries that context as a `RenderedContext` extension
//! so callers inside the process can inspect what the template saw.

use anyhow::Context;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tera::Context as TeraContext;

use crate::api::middleware::{AppError, AppState};
use crate::models::User;

/// Template context of a rendered page
#[derive(Debug, Clone)]
pub struct RenderedContext(pub Value);

/// A page waiting to be rendered
#[derive(Debug)]
pub struct PageView {
    template: &'static str,
    context: Map<String, Value>,
}

impl PageView {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Map::new(),
        }
    }

    /// Add a context variable
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, AppError> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize context variable '{}'", key))?;
        self.context.insert(key.to_string(), value);
        Ok(self)
    }

    /// Render with `user` exposed to the template as `user`
    pub fn render(mut self, state: &AppState, user: Option<&User>) -> Result<Response, AppError> {
        let user = serde_json::to_value(user).context("Failed to serialize current user")?;
        self.context.insert("user".to_string(), user);

        let context = Value::Object(self.context);
        let tera_context =
            TeraContext::from_value(context.clone()).context("Invalid template context")?;
        let html = state.templates.render(self.template, &tera_context)?;

        let mut response = Html(html).into_response();
        response.extensions_mut().insert(RenderedContext(context));
        Ok(response)
    }
}
