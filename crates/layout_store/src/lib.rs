use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::{ComponentPalette, InsertPosition, Layout, Resource};
use tokio::sync::broadcast;
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod provider;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use provider::{DataProvider, JsonFileProvider, PendingProvider, StoreOverrides, ValueProvider};

const EVENT_CAPACITY: usize = 256;

/// Change notifications published after each successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    LayoutReplaced { rows: usize },
    ComponentsReplaced { components: usize },
    RowInserted { position: usize, cols: usize },
}

/// Point-in-time copy of the store contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub layout: Option<Layout>,
    pub components: Option<ComponentPalette>,
}

#[derive(Default)]
struct StoreState {
    layout: Option<Layout>,
    components: Option<ComponentPalette>,
}

/// Page-builder state shared between the UI root and its views.
///
/// The layout and palette are only ever written by [`fetch_layout`],
/// [`fetch_components`] and [`add_row`]; views read snapshots and
/// [`subscribe`] to learn when to re-read.
///
/// [`fetch_layout`]: LayoutStore::fetch_layout
/// [`fetch_components`]: LayoutStore::fetch_components
/// [`add_row`]: LayoutStore::add_row
/// [`subscribe`]: LayoutStore::subscribe
pub struct LayoutStore {
    http: Client,
    config: StoreConfig,
    overrides: Option<StoreOverrides>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl LayoutStore {
    /// Store that loads both documents over HTTP.
    pub fn new(config: StoreConfig) -> Arc<Self> {
        Self::build(config, None)
    }

    /// Store backed by a host configuration; HTTP is never used, and a
    /// resource without a provider fails with [`StoreError::MissingProvider`].
    pub fn new_with_overrides(config: StoreConfig, overrides: StoreOverrides) -> Arc<Self> {
        Self::build(config, Some(overrides))
    }

    fn build(config: StoreConfig, overrides: Option<StoreOverrides>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            http: Client::new(),
            config,
            overrides,
            state: RwLock::new(StoreState::default()),
            events,
        })
    }

    /// Loads the layout and replaces the stored one wholesale.
    pub async fn fetch_layout(&self) -> StoreResult<Layout> {
        let layout = match &self.overrides {
            Some(overrides) => provide(Resource::Layout, overrides.layout.as_deref()).await?,
            None => self.get_json(Resource::Layout).await?,
        };

        let rows = layout.rows.len();
        self.write_state().layout = Some(layout.clone());
        info!(rows, "layout replaced");
        let _ = self.events.send(StoreEvent::LayoutReplaced { rows });
        Ok(layout)
    }

    /// Loads the component palette and replaces the stored one wholesale.
    pub async fn fetch_components(&self) -> StoreResult<ComponentPalette> {
        let components = match &self.overrides {
            Some(overrides) => {
                provide(Resource::Components, overrides.components.as_deref()).await?
            }
            None => self.get_json(Resource::Components).await?,
        };

        let count = components.len();
        self.write_state().components = Some(components.clone());
        info!(components = count, "component palette replaced");
        let _ = self
            .events
            .send(StoreEvent::ComponentsReplaced { components: count });
        Ok(components)
    }

    /// Inserts a row of `cols` empty columns before or after row `index`.
    ///
    /// Returns the index the new row now occupies.
    pub fn add_row(&self, pos: InsertPosition, index: usize, cols: usize) -> StoreResult<usize> {
        let position = {
            let mut state = self.write_state();
            let layout = state.layout.as_mut().ok_or(StoreError::LayoutNotLoaded)?;
            layout.insert_row(pos, index, cols)?
        };

        info!(%pos, index, position, cols, "row inserted");
        let _ = self
            .events
            .send(StoreEvent::RowInserted { position, cols });
        Ok(position)
    }

    pub fn layout(&self) -> Option<Layout> {
        self.read_state().layout.clone()
    }

    pub fn components(&self) -> Option<ComponentPalette> {
        self.read_state().components.clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read_state();
        StoreSnapshot {
            layout: state.layout.clone(),
            components: state.components.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    async fn get_json<T: DeserializeOwned>(&self, resource: Resource) -> StoreResult<T> {
        let url = self.config.endpoint(resource)?;
        debug!(%url, "{resource}: fetching over http");

        let transport = |source| StoreError::Transport {
            url: url.to_string(),
            source,
        };
        let body = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .text()
            .await
            .map_err(transport)?;

        serde_json::from_str(&body).map_err(|source| StoreError::Decode {
            resource,
            url: url.to_string(),
            source,
        })
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn provide<T: Send + 'static>(
    resource: Resource,
    provider: Option<&dyn DataProvider<T>>,
) -> StoreResult<T> {
    let provider = provider.ok_or(StoreError::MissingProvider { resource })?;
    debug!("{resource}: resolving from configuration provider");
    provider
        .provide()
        .await
        .map_err(|source| StoreError::Provider { resource, source })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
