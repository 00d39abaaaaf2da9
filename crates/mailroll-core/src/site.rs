//! Site-scoped URL building.

use crate::Result;

pub trait UrlBuilder: Send + Sync {
  /// Build an absolute URL for `path` on `site_id`, appending `query` in
  /// order.
  fn site_url(
    &self,
    path: &str,
    query: &[(&str, &str)],
    site_id: i64,
  ) -> Result<String>;
}
