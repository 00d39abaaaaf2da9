//! Template rendering collaborator.

use thiserror::Error;

use crate::BoxError;

/// Named values made available to a custom template (`message`, `url`,
/// `mailingList`, `contact` / `pendingContact`).
pub type RenderContext = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum RenderError {
  /// The template is missing or malformed. Recoverable: callers fall back
  /// to a plain default body.
  #[error("template error: {0}")]
  Template(String),

  /// Anything else (I/O, a bug in the renderer). Never swallowed.
  #[error(transparent)]
  Other(BoxError),
}

pub trait TemplateRenderer: Send + Sync {
  fn render(
    &self,
    template: &str,
    context: &RenderContext,
  ) -> Result<String, RenderError>;
}
