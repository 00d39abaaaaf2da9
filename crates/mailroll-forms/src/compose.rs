//! [`NotificationComposer`] — subject/body composition with template
//! fallback.

use std::sync::Arc;

use mailroll_core::{
  Error, Result,
  mailing_list::non_empty,
  render::{RenderContext, RenderError, TemplateRenderer},
};

/// The defaults and per-list overrides for one notification.
#[derive(Debug, Clone, Copy)]
pub struct NotificationTemplate<'a> {
  pub default_subject:  &'a str,
  /// Instructional sentence preceding the link in the plain body.
  pub default_body:     &'a str,
  pub subject_override: Option<&'a str>,
  pub template:         Option<&'a str>,
}

/// A composed subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
  pub subject: String,
  pub body:    String,
}

#[derive(Clone)]
pub struct NotificationComposer {
  renderer: Arc<dyn TemplateRenderer>,
}

impl NotificationComposer {
  pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self { Self { renderer } }

  /// Compose a notification.
  ///
  /// The body comes from the custom template when one is set; a
  /// [`RenderError::Template`] falls back to `default_body + "\n" + url`.
  /// Other renderer failures are returned as [`Error::Render`].
  pub fn compose(
    &self,
    template: NotificationTemplate<'_>,
    url: &str,
    context: &RenderContext,
  ) -> Result<Composed> {
    let subject = non_empty(template.subject_override)
      .unwrap_or(template.default_subject)
      .to_owned();

    let fallback = || format!("{}\n{}", template.default_body, url);

    let body = match non_empty(template.template) {
      None => fallback(),
      Some(name) => match self.renderer.render(name, context) {
        Ok(body) => body,
        Err(RenderError::Template(reason)) => {
          tracing::warn!(
            template = name,
            %reason,
            "custom template failed to render, using default body"
          );
          fallback()
        }
        Err(RenderError::Other(e)) => return Err(Error::Render(e)),
      },
    };

    Ok(Composed { subject, body })
  }
}
