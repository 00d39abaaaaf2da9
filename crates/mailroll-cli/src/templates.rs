//! Directory-backed custom email templates.
//!
//! Templates are plain files with `{{ name }}` placeholders. Dotted names
//! (`{{ mailingList.title }}`) walk into the render context. A missing file
//! or an undefined placeholder is a template fault, so the engine falls back
//! to its default body.

use std::{
  io,
  path::{Component, Path, PathBuf},
};

use mailroll_core::render::{RenderContext, RenderError, TemplateRenderer};
use serde_json::Value;

const EXTENSIONS: [&str; 3] = ["", "html", "txt"];

pub struct TemplateDir {
  root: PathBuf,
}

impl TemplateDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  fn locate(&self, template: &str) -> Result<String, RenderError> {
    let relative = Path::new(template);
    if relative
      .components()
      .any(|c| !matches!(c, Component::Normal(_)))
    {
      return Err(RenderError::Template(format!(
        "template path must be relative: {template:?}"
      )));
    }

    for ext in EXTENSIONS {
      let path = if ext.is_empty() {
        self.root.join(relative)
      } else {
        self.root.join(relative).with_extension(ext)
      };
      match std::fs::read_to_string(&path) {
        Ok(source) => return Ok(source),
        Err(e)
          if e.kind() == io::ErrorKind::NotFound
            || e.kind() == io::ErrorKind::IsADirectory => {}
        Err(e) => return Err(RenderError::Other(Box::new(e))),
      }
    }

    Err(RenderError::Template(format!("template not found: {template:?}")))
  }
}

impl TemplateRenderer for TemplateDir {
  fn render(
    &self,
    template: &str,
    context: &RenderContext,
  ) -> Result<String, RenderError> {
    let source = self.locate(template)?;
    substitute(&source, context)
  }
}

fn substitute(source: &str, context: &RenderContext) -> Result<String, RenderError> {
  let mut out = String::with_capacity(source.len());
  let mut rest = source;

  while let Some(start) = rest.find("{{") {
    out.push_str(&rest[..start]);
    let after = &rest[start + 2..];
    let end = after
      .find("}}")
      .ok_or_else(|| RenderError::Template("unclosed placeholder".into()))?;
    let name = after[..end].trim();
    let value = lookup(context, name).ok_or_else(|| {
      RenderError::Template(format!("undefined variable {name:?}"))
    })?;
    match value {
      Value::String(s) => out.push_str(s),
      Value::Null => {}
      other => out.push_str(&other.to_string()),
    }
    rest = &after[end + 2..];
  }

  out.push_str(rest);
  Ok(out)
}

fn lookup<'a>(context: &'a RenderContext, name: &str) -> Option<&'a Value> {
  let mut parts = name.split('.');
  let mut value = context.get(parts.next()?)?;
  for part in parts {
    value = value.get(part)?;
  }
  Some(value)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn context() -> RenderContext {
    let mut ctx = RenderContext::new();
    ctx.insert("message".into(), json!("Click:"));
    ctx.insert("url".into(), json!("https://x.example/v?pid=1"));
    ctx.insert("mailingList".into(), json!({ "title": "Weekly", "id": 9 }));
    ctx
  }

  fn dir_with(name: &str, body: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
    dir
  }

  #[test]
  fn renders_placeholders() {
    let dir = dir_with(
      "emails/verify.html",
      "<p>{{ message }} <a href=\"{{url}}\">{{ mailingList.title }} #{{ mailingList.id }}</a></p>",
    );
    let out = TemplateDir::new(dir.path())
      .render("emails/verify", &context())
      .unwrap();
    assert_eq!(
      out,
      "<p>Click: <a href=\"https://x.example/v?pid=1\">Weekly #9</a></p>"
    );
  }

  #[test]
  fn exact_file_name_is_tried_first() {
    let dir = dir_with("plain", "{{message}}");
    let out = TemplateDir::new(dir.path())
      .render("plain", &context())
      .unwrap();
    assert_eq!(out, "Click:");
  }

  #[test]
  fn missing_template_is_a_template_fault() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateDir::new(dir.path())
      .render("nope", &context())
      .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
  }

  #[test]
  fn undefined_variable_is_a_template_fault() {
    let dir = dir_with("t.txt", "{{ contact.email }}");
    let err = TemplateDir::new(dir.path())
      .render("t", &context())
      .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
  }

  #[test]
  fn unclosed_placeholder_is_a_template_fault() {
    let dir = dir_with("t.txt", "hello {{ url");
    let err = TemplateDir::new(dir.path())
      .render("t", &context())
      .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
  }

  #[test]
  fn parent_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = TemplateDir::new(dir.path())
      .render("../secret", &context())
      .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
  }
}
