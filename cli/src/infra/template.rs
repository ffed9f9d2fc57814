//! Handlebars implementation of the `TemplateRenderer` port.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

use crate::application::ports::TemplateRenderer;
use crate::domain::SupplyError;

/// Renders buildpack templates with Handlebars.
///
/// Escaping is off because the output is configuration, not HTML. Strict
/// mode stays off so an absent optional field makes `{{#if field}}` false
/// instead of failing the render.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render<T: Serialize>(
        &self,
        template: &Path,
        context: &T,
        out: &mut dyn Write,
    ) -> Result<()> {
        let source =
            std::fs::read_to_string(template).map_err(|e| SupplyError::TemplateError {
                path: template.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.registry
            .render_template_to_write(&source, context, out)
            .map_err(|e| SupplyError::TemplateError {
                path: template.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
