// crates/engine/src/lib.rs
use std::sync::Arc;
use std::thread;

use reqwest::blocking::Client;

pub mod archive;
pub mod config;
pub mod counter;
pub mod entry;
pub mod error;
mod executor;
mod expand;
pub mod gitignore;
pub mod order;
pub mod results;
pub mod sniff;
pub mod tee;

use crate::config::Config;
use crate::entry::{Entry, StdinHandle};
use crate::error::{EngineError, ErrorCenter, Result};
use crate::executor::{Executor, collect};
use crate::expand::Expander;
use crate::results::ResultSet;

pub use crate::counter::{Category, Counter, CounterKind};
pub use crate::order::Order;

/// Everything a run produced. Item-level failures do not abort the run; they
/// are collected in `errors` next to the results of the items that worked.
#[derive(Debug)]
pub struct RunResult {
    pub results: ResultSet,
    pub errors: ErrorCenter,
}

impl RunResult {
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Counting engine bound to one configuration and HTTP client.
pub struct Engine {
    config: Arc<Config>,
    client: Client,
}

impl Engine {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be initialised.
    pub fn new(config: Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("wildcount/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EngineError::Client)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// Expands `args` (files, directories, URLs) and counts everything found.
    /// An empty `args` reads `stdin`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the run itself cannot be driven, e.g. the
    /// collector thread fails to start. Per-item errors end up in
    /// [`RunResult::errors`].
    pub fn run(&self, args: &[String], stdin: StdinHandle) -> Result<RunResult> {
        self.drive(|executor| {
            Expander::new(executor, &self.config.read, &self.client, &stdin).expand_args(args);
        })
    }

    /// Counts prepared entries, skipping argument expansion.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::run`].
    pub fn count_entries(&self, entries: Vec<Entry>) -> Result<RunResult> {
        self.drive(|executor| {
            for entry in entries {
                executor.schedule(entry);
            }
        })
    }

    fn drive(&self, feed: impl FnOnce(&Executor)) -> Result<RunResult> {
        let (tx, rx) = crossbeam_channel::bounded(0);
        let kind = self.config.kind;
        let collector = thread::Builder::new()
            .name("wildcount-collector".into())
            .spawn(move || collect(rx, kind))
            .map_err(|source| EngineError::Spawn {
                name: "collector".into(),
                source,
            })?;

        let executor = Executor::new(Arc::clone(&self.config), tx);
        feed(&executor);
        // workers hold their own clones; the channel closes after the last one
        drop(executor);

        let (results, errors) = collector.join().map_err(|_| EngineError::Collector)?;
        log::debug!("{} results, {} errors", results.len(), errors.len());
        Ok(RunResult { results, errors })
    }
}

/// Runs the engine once with a fresh HTTP client.
///
/// # Errors
///
/// See [`Engine::new`] and [`Engine::run`].
pub fn run(config: Config, args: &[String], stdin: StdinHandle) -> Result<RunResult> {
    Engine::new(config)?.run(args, stdin)
}
