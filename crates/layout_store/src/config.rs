use shared::{protocol::DEFAULT_BASE_URL, Resource};
use url::Url;

use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: Url,
}

impl StoreConfig {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
        })
    }

    /// Absolute URL of `resource`, keeping any path prefix of the base url.
    pub fn endpoint(&self, resource: Resource) -> StoreResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(resource.path().trim_start_matches('/'))
            .map_err(|source| StoreError::InvalidEndpoint { resource, source })
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
        }
    }
}
