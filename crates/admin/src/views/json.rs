//! JSON view renderer.

use super::{RenderError, View, ViewRenderer};

/// Renders a view as `{ "view": name, "model": ... }`.
///
/// Used by API clients that draw their own UI, and by tests that assert on
/// the model instead of on markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn render(&self, view: &View<'_>) -> Result<String, RenderError> {
        Ok(serde_json::to_string(view)?)
    }
}
