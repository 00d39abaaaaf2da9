//! Application configuration: a TOML file overlaid with `MAILROLL__*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use mailroll_forms::{MailSettings, SiteConfig, notify::DEFAULT_ACTION_TRIGGER};
use serde::Deserialize;

use crate::smtp::SmtpConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Path to the SQLite database file. A leading `~/` is expanded.
  pub store_path:     PathBuf,
  #[serde(default = "default_action_trigger")]
  pub action_trigger: String,
  #[serde(default = "default_templates_dir")]
  pub templates_dir:  PathBuf,
  #[serde(default)]
  pub sites:          Vec<SiteConfig>,
  pub mail:           MailSettings,
  pub smtp:           SmtpConfig,
}

fn default_action_trigger() -> String { DEFAULT_ACTION_TRIGGER.to_owned() }

fn default_templates_dir() -> PathBuf { PathBuf::from("templates") }

impl AppConfig {
  /// Read `path` (optional) and the environment. `MAILROLL__SMTP__HOST`
  /// sets `smtp.host`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("MAILROLL")
          .prefix_separator("__")
          .separator("__"),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.templates_dir = expand_tilde(&cfg.templates_dir);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"
store_path = "/var/lib/mailroll/mailroll.db"

[[sites]]
id       = 1
base_url = "https://example.com"

[mail]
from_name  = "Newsroom"
from_email = "news@example.com"

[[mail.senders]]
site_id = 1
name    = "Example News"
email   = "news@example.com"

[smtp]
host = "smtp.example.com"
port = 587
"#;

  #[test]
  fn loads_file_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mailroll.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/mailroll/mailroll.db"));
    assert_eq!(cfg.action_trigger, "actions");
    assert_eq!(cfg.templates_dir, PathBuf::from("templates"));
    assert_eq!(cfg.sites.len(), 1);
    assert_eq!(cfg.sites[0].base_url, "https://example.com");
    assert_eq!(cfg.mail.senders.len(), 1);
    assert_eq!(cfg.smtp.port, Some(587));
  }

  #[test]
  fn missing_required_keys_fail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(AppConfig::load(&path).is_err());
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/mailroll.db")),
      PathBuf::from(home).join("mailroll.db")
    );
    assert_eq!(
      expand_tilde(Path::new("/abs/mailroll.db")),
      PathBuf::from("/abs/mailroll.db")
    );
  }
}
