use std::{
    future::Future,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::{
    future::{BoxFuture, Shared},
    FutureExt,
};
use serde::de::DeserializeOwned;
use shared::{ComponentPalette, Layout};

/// Source of data that preempts the default HTTP fetch for one resource.
#[async_trait]
pub trait DataProvider<T: Send + 'static>: Send + Sync {
    async fn provide(&self) -> Result<T>;
}

/// Host configuration handed to the store at construction; it replaces HTTP
/// for both resources, and a `None` field leaves that resource unavailable.
#[derive(Clone, Default)]
pub struct StoreOverrides {
    pub layout: Option<Arc<dyn DataProvider<Layout>>>,
    pub components: Option<Arc<dyn DataProvider<ComponentPalette>>>,
}

impl StoreOverrides {
    pub fn with_layout(mut self, provider: impl DataProvider<Layout> + 'static) -> Self {
        self.layout = Some(Arc::new(provider));
        self
    }

    pub fn with_components(
        mut self,
        provider: impl DataProvider<ComponentPalette> + 'static,
    ) -> Self {
        self.components = Some(Arc::new(provider));
        self
    }
}

/// Already-resolved value, cloned out on every fetch.
pub struct ValueProvider<T>(pub T);

#[async_trait]
impl<T> DataProvider<T> for ValueProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn provide(&self) -> Result<T> {
        Ok(self.0.clone())
    }
}

/// A computation that runs at most once; every fetch awaits the same outcome.
pub struct PendingProvider<T> {
    inner: Shared<BoxFuture<'static, std::result::Result<T, Arc<anyhow::Error>>>>,
}

impl<T> PendingProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(future: impl Future<Output = Result<T>> + Send + 'static) -> Self {
        Self {
            inner: future.map(|res| res.map_err(Arc::new)).boxed().shared(),
        }
    }
}

#[async_trait]
impl<T> DataProvider<T> for PendingProvider<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn provide(&self) -> Result<T> {
        self.inner.clone().await.map_err(|err| anyhow!("{err:#}"))
    }
}

/// Reads and parses a JSON document from disk on every fetch.
pub struct JsonFileProvider<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileProvider<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<T> DataProvider<T> for JsonFileProvider<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn provide(&self) -> Result<T> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read '{}'", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse '{}'", self.path.display()))
    }
}

#[cfg(test)]
#[path = "tests/provider_tests.rs"]
mod tests;
