use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use avalon_config::config::Config;
use avalon_core::{
    constants::{DOWNLOAD_URL, REMOTE_VERSION},
    error::AvalonError,
    provider::Provider,
    registry::Registry,
    task::TaskContext,
    AvalonResult,
};
use avalon_events::CollectorSink;
use tempfile::TempDir;

use crate::AvalonContext;

type StartLog = Arc<Mutex<Vec<String>>>;

/// In-process provider that records every call as `<stage>:<target>`.
pub struct FakeProvider {
    starts: StartLog,
    version: String,
    delay: Duration,
    fail: bool,
    panic: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            starts: StartLog::default(),
            version: "1.0.0".to_string(),
            delay: Duration::ZERO,
            fail: false,
            panic: false,
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    fn enter(&self, stage: &str, target: &str) -> AvalonResult<()> {
        self.starts
            .lock()
            .unwrap()
            .push(format!("{stage}:{target}"));
        std::thread::sleep(self.delay);
        if self.panic {
            panic!("{target} panicked");
        }
        if self.fail {
            return Err(AvalonError::Custom(format!("{target} failed")));
        }
        Ok(())
    }
}

impl Provider for FakeProvider {
    fn update(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        ctx.progress.set(0, 2);
        self.enter("update", ctx.target)?;
        ctx.progress.set(1, 2);
        ctx.cache.set(REMOTE_VERSION, self.version.as_str());
        ctx.cache
            .set(DOWNLOAD_URL, format!("fake://{}/{}", ctx.target, self.version));
        ctx.cache.save()?;
        ctx.progress.set(2, 2);
        Ok(())
    }

    fn install(&self, ctx: &mut TaskContext<'_>) -> AvalonResult<()> {
        ctx.progress.set(0, 1);
        self.enter("install", ctx.target)?;
        let version = ctx
            .cache
            .remote_version()
            .ok_or_else(|| {
                AvalonError::MissingCacheKey {
                    target: ctx.target.to_string(),
                    key: REMOTE_VERSION,
                }
            })?
            .to_string();
        ctx.store.install(&version, "payload", |path| {
            fs::write(path, b"payload").map_err(|err| AvalonError::Custom(err.to_string()))
        })?;
        ctx.progress.set(1, 1);
        Ok(())
    }
}

/// Temporary roots, a registry of fake providers, and a collecting event sink.
pub struct Harness {
    pub dir: TempDir,
    pub events: Arc<CollectorSink>,
    starts: StartLog,
    registry: Registry,
    enabled: Vec<String>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            events: Arc::new(CollectorSink::default()),
            starts: StartLog::default(),
            registry: Registry::empty(),
            enabled: Vec::new(),
        }
    }

    /// Registers and enables `name`.
    pub fn add(&mut self, name: &str, mut provider: FakeProvider) {
        provider.starts = self.starts.clone();
        self.registry.register(name, Arc::new(provider)).unwrap();
        self.enabled.push(name.to_string());
    }

    /// Registers `name` without enabling it.
    pub fn add_disabled(&mut self, name: &str, mut provider: FakeProvider) {
        provider.starts = self.starts.clone();
        self.registry.register(name, Arc::new(provider)).unwrap();
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default_config();
        config.path.data = Some(self.data_dir().display().to_string());
        config.path.cache = Some(self.cache_dir().display().to_string());
        config.targets.enabled = self.enabled.clone();
        config
    }

    pub fn context(&self) -> AvalonContext {
        AvalonContext::with_registry(
            self.config(),
            self.config_file(),
            self.registry.clone(),
            self.events.clone(),
        )
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().unwrap().clone()
    }

    pub fn count(&self, stage: &str) -> usize {
        let prefix = format!("{stage}:");
        self.starts()
            .iter()
            .filter(|entry| entry.starts_with(&prefix))
            .count()
    }

    pub fn latest_of(&self, name: &str) -> Option<String> {
        latest_version(&self.data_dir().join(name))
    }
}

fn latest_version(root: &Path) -> Option<String> {
    let target = fs::read_link(root.join("latest")).ok()?;
    target.file_name().map(|n| n.to_string_lossy().into_owned())
}
