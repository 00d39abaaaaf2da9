//! [`SiteUrls`] — a config-driven [`UrlBuilder`].

use std::collections::HashMap;

use mailroll_core::{Error, Result, site::UrlBuilder};
use serde::Deserialize;
use url::Url;

/// One entry of the `sites` configuration list.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
  pub id:       i64,
  pub base_url: String,
}

/// Resolves site-relative paths against each site's base URL.
#[derive(Debug, Clone, Default)]
pub struct SiteUrls {
  bases: HashMap<i64, Url>,
}

impl SiteUrls {
  pub fn new(sites: &[SiteConfig]) -> Result<Self> {
    let mut bases = HashMap::with_capacity(sites.len());
    for site in sites {
      let mut base = Url::parse(&site.base_url)
        .map_err(|e| Error::InvalidUrl(format!("{}: {e}", site.base_url)))?;
      // `Url::join` replaces the last segment unless the base ends in `/`.
      if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
      }
      bases.insert(site.id, base);
    }
    Ok(Self { bases })
  }
}

impl UrlBuilder for SiteUrls {
  fn site_url(
    &self,
    path: &str,
    query: &[(&str, &str)],
    site_id: i64,
  ) -> Result<String> {
    let base = self.bases.get(&site_id).ok_or(Error::UnknownSite(site_id))?;
    let mut url = base
      .join(path.trim_start_matches('/'))
      .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;

    if !query.is_empty() {
      url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn urls() -> SiteUrls {
    SiteUrls::new(&[
      SiteConfig { id: 1, base_url: "https://one.example".into() },
      SiteConfig { id: 2, base_url: "https://two.example/fr".into() },
    ])
    .unwrap()
  }

  #[test]
  fn builds_url_on_the_requested_site() {
    let url = urls()
      .site_url("actions/mailroll/forms/verify-email", &[("pid", "abc123")], 1)
      .unwrap();
    assert_eq!(
      url,
      "https://one.example/actions/mailroll/forms/verify-email?pid=abc123"
    );
  }

  #[test]
  fn keeps_base_path_prefix() {
    let url = urls().site_url("/a/b", &[], 2).unwrap();
    assert_eq!(url, "https://two.example/fr/a/b");
  }

  #[test]
  fn encodes_query_values() {
    let url = urls()
      .site_url("x", &[("mlid", "a b&c"), ("cid", "1")], 1)
      .unwrap();
    assert_eq!(url, "https://one.example/x?mlid=a+b%26c&cid=1");
  }

  #[test]
  fn unknown_site_is_an_error() {
    let err = urls().site_url("x", &[], 7).unwrap_err();
    assert!(matches!(err, Error::UnknownSite(7)));
  }

  #[test]
  fn rejects_invalid_base_url() {
    let err = SiteUrls::new(&[SiteConfig {
      id:       1,
      base_url: "not a url".into(),
    }])
    .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
  }
}
