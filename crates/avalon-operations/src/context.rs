use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use avalon_config::config::{config_path, Config};
use avalon_core::{registry::Registry, AvalonResult};
use avalon_events::{EventSink, EventSinkHandle};

/// Shared state every operation runs against.
///
/// Cheap to clone; the configuration is a snapshot taken when the context was built.
#[derive(Clone)]
pub struct AvalonContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: Config,
    config_path: PathBuf,
    registry: Registry,
    events: EventSinkHandle,
}

impl AvalonContext {
    /// Builds the registry from `config` and saves back to the active config path.
    pub fn new(config: Config, events: EventSinkHandle) -> AvalonResult<Self> {
        let registry = Registry::from_config(&config)?;
        Ok(Self::with_registry(config, config_path(), registry, events))
    }

    pub fn with_registry(
        config: Config,
        config_path: PathBuf,
        registry: Registry,
        events: EventSinkHandle,
    ) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config,
                config_path,
                registry,
                events,
            }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// File `enable`/`disable` write to.
    pub fn config_path(&self) -> &Path {
        &self.inner.config_path
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn events(&self) -> &dyn EventSink {
        self.inner.events.as_ref()
    }

    pub fn event_handle(&self) -> EventSinkHandle {
        self.inner.events.clone()
    }
}
