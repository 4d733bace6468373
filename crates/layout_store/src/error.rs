use shared::{LayoutError, Resource};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot build {resource} endpoint from base url: {source}")]
    InvalidEndpoint {
        resource: Resource,
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("malformed {resource} json from {url}: {source}")]
    Decode {
        resource: Resource,
        url: String,
        source: serde_json::Error,
    },
    #[error("{resource} provider failed: {source:#}")]
    Provider {
        resource: Resource,
        source: anyhow::Error,
    },
    #[error("host configuration has no {resource} provider")]
    MissingProvider { resource: Resource },
    #[error("layout not loaded; fetch the layout before adding rows")]
    LayoutNotLoaded,
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
